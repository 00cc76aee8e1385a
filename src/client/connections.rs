// file: src/client/connections.rs
// description: connection service CRUD client
// reference: https://docs.rs/reqwest

use crate::client::http::{ApiClient, Envelope, NO_QUERY};
use crate::config::ServiceConfig;
use crate::error::Result;
use crate::models::{Connection, CreateConnection, UpdateConnection};
use crate::utils::Validator;
use serde::Serialize;
use tracing::info;

pub const CONNECTIONS_PATH: &str = "/api/connections";

#[derive(Debug, Serialize)]
struct CustomerFilter<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    customer_id: Option<&'a str>,
}

#[derive(Clone)]
pub struct ConnectionClient {
    api: ApiClient,
}

impl ConnectionClient {
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        Ok(Self {
            api: ApiClient::new(config)?,
        })
    }

    pub fn base_url(&self) -> &str {
        self.api.base_url().as_str()
    }

    pub async fn list(&self, customer_id: Option<&str>) -> Result<Vec<Connection>> {
        let url = self.api.url(&[CONNECTIONS_PATH])?;
        let filter = CustomerFilter {
            customer_id: customer_id.filter(|c| !c.trim().is_empty()),
        };
        let envelope: Envelope<Vec<Connection>> = self.api.get_json(url, &filter).await?;
        envelope.into_data()
    }

    pub async fn get(&self, id: i64) -> Result<Connection> {
        let url = self
            .api
            .resource_url(CONNECTIONS_PATH, &id.to_string(), None)?;
        let envelope: Envelope<Connection> = self.api.get_json(url, NO_QUERY).await?;
        envelope.into_data()
    }

    pub async fn create(&self, input: &CreateConnection) -> Result<Connection> {
        Validator::validate_required("name", &input.name)?;
        Validator::validate_required("customer_id", &input.customer_id)?;

        let url = self.api.url(&[CONNECTIONS_PATH])?;
        let envelope: Envelope<Connection> = self.api.post_json(url, input).await?;
        let connection = envelope.into_data()?;
        info!("Created connection {} ({})", connection.id, connection.name);
        Ok(connection)
    }

    pub async fn update(&self, id: i64, input: &UpdateConnection) -> Result<Connection> {
        Validator::validate_required("customer_id", &input.customer_id)?;
        if let Some(name) = &input.name {
            Validator::validate_required("name", name)?;
        }

        let url = self
            .api
            .resource_url(CONNECTIONS_PATH, &id.to_string(), None)?;
        let envelope: Envelope<Connection> = self.api.put_json(url, input).await?;
        let connection = envelope.into_data()?;
        info!("Updated connection {}", connection.id);
        Ok(connection)
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let url = self
            .api
            .resource_url(CONNECTIONS_PATH, &id.to_string(), None)?;
        self.api.delete(url).await?;
        info!("Deleted connection {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConsoleError;

    fn client() -> ConnectionClient {
        ConnectionClient::new(&ServiceConfig {
            // nothing listens here
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 1,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_requires_name_and_customer() {
        let client = client();

        let missing_name = CreateConnection {
            name: " ".to_string(),
            customer_id: "cust-01".to_string(),
            knowledge_ids: None,
        };
        assert!(matches!(
            client.create(&missing_name).await,
            Err(ConsoleError::Validation(_))
        ));

        let missing_customer = CreateConnection {
            name: "Support".to_string(),
            customer_id: String::new(),
            knowledge_ids: None,
        };
        assert!(matches!(
            client.create(&missing_customer).await,
            Err(ConsoleError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_update_requires_customer() {
        let update = UpdateConnection {
            name: Some("Support".to_string()),
            customer_id: "  ".to_string(),
            knowledge_ids: None,
        };
        assert!(matches!(
            client().update(1, &update).await,
            Err(ConsoleError::Validation(_))
        ));
    }

    #[test]
    fn test_customer_filter_serialization() {
        let empty = serde_json::to_value(CustomerFilter { customer_id: None }).unwrap();
        assert_eq!(empty, serde_json::json!({}));
    }
}
