// file: src/tracker/poller.rs
// description: cancellable periodic background task
// reference: https://docs.rs/tokio-util/latest/tokio_util/sync/struct.CancellationToken.html

use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Handle to a running periodic task. Dropping it cancels the task.
pub struct TaskHandle {
    token: CancellationToken,
    join: Option<JoinHandle<()>>,
}

impl TaskHandle {
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Cancels the task and waits for it to wind down.
    pub async fn stop(mut self) {
        self.token.cancel();
        if let Some(join) = self.join.take() {
            let _ = join.await;
        }
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Runs `tick` every `period`, starting one full period from now.
///
/// Once the handle is cancelled `tick` is never called again, and a tick in
/// progress is dropped at its next await point.
pub fn spawn_periodic<F, Fut>(period: Duration, mut tick: F) -> TaskHandle
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let period = period.max(Duration::from_millis(1));
    let token = CancellationToken::new();
    let cancelled = token.clone();

    let join = tokio::spawn(async move {
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = cancelled.cancelled() => break,
                _ = interval.tick() => {}
            }

            tokio::select! {
                biased;
                _ = cancelled.cancelled() => break,
                _ = tick() => {}
            }
        }

        debug!("Periodic task stopped");
    });

    TaskHandle {
        token,
        join: Some(join),
    }
}
