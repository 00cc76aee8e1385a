// file: src/client/datasets.rs
// description: read-only knowledge-base dataset listing client
// reference: https://docs.rs/reqwest

use crate::client::http::{ApiClient, Envelope};
use crate::config::ServiceConfig;
use crate::error::Result;
use crate::models::Dataset;
use serde::Serialize;
use tracing::debug;

pub const DATASETS_PATH: &str = "/api/dify";

#[derive(Debug, Serialize)]
struct DatasetFilter<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    customer_id: Option<&'a str>,
}

#[derive(Clone)]
pub struct DatasetClient {
    api: ApiClient,
}

impl DatasetClient {
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        Ok(Self {
            api: ApiClient::new(config)?,
        })
    }

    pub async fn list(&self, customer_id: Option<&str>) -> Result<Vec<Dataset>> {
        let url = self.api.url(&[DATASETS_PATH])?;
        let filter = DatasetFilter {
            customer_id: customer_id.filter(|c| !c.trim().is_empty()),
        };
        let envelope: Envelope<Vec<Dataset>> = self.api.get_json(url, &filter).await?;
        let datasets = envelope.into_data()?;
        debug!("Fetched {} datasets", datasets.len());
        Ok(datasets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_filter_serialization() {
        let filter = DatasetFilter {
            customer_id: Some("cust-01"),
        };
        assert_eq!(
            serde_json::to_value(filter).unwrap(),
            serde_json::json!({"customer_id": "cust-01"})
        );
    }

    #[test]
    fn test_decode_dataset_envelope() {
        let json = r#"{"data": [{"id": "kb-1", "name": "Manuals"}]}"#;
        let datasets = serde_json::from_str::<Envelope<Vec<Dataset>>>(json)
            .unwrap()
            .into_data()
            .unwrap();
        assert_eq!(datasets[0].name, "Manuals");
    }
}
