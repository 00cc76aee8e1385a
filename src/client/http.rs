// file: src/client/http.rs
// description: shared reqwest wrapper with base url, timeout and error mapping
// reference: https://docs.rs/reqwest

use crate::config::ServiceConfig;
use crate::error::{ConsoleError, Result};
use crate::models::Pagination;
use reqwest::multipart::Form;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

pub const NO_QUERY: &[(&str, &str)] = &[];

/// `{ success, data, pagination }` wrapper used by every service response.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    #[serde(default)]
    pub success: Option<bool>,
    pub data: T,
    #[serde(default)]
    pub pagination: Option<Pagination>,
    #[serde(default)]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    pub fn into_data(self) -> Result<T> {
        if self.success == Some(false) {
            return Err(ConsoleError::remote(None, self.message));
        }
        Ok(self.data)
    }
}

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            ConsoleError::Config(format!("Invalid base url {}: {}", config.base_url, e))
        })?;

        if base_url.cannot_be_a_base() {
            return Err(ConsoleError::Config(format!(
                "Base url cannot carry paths: {}",
                config.base_url
            )));
        }

        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ConsoleError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends path segments to the base url, percent-encoding each one.
    pub fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                ConsoleError::Config(format!("Base url cannot carry paths: {}", self.base_url))
            })?;
            path.pop_if_empty();
            for segment in segments {
                path.extend(segment.split('/').filter(|s| !s.is_empty()));
            }
        }
        Ok(url)
    }

    /// Like [`ApiClient::url`] but treats `id` as a single opaque segment.
    pub fn resource_url(&self, collection: &str, id: &str, action: Option<&str>) -> Result<Url> {
        let mut url = self.url(&[collection])?;
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                ConsoleError::Config(format!("Base url cannot carry paths: {}", self.base_url))
            })?;
            path.push(id);
            if let Some(action) = action {
                path.push(action);
            }
        }
        Ok(url)
    }

    pub fn request(&self, method: reqwest::Method, url: Url) -> RequestBuilder {
        debug!("{} {}", method, url);
        self.client.request(method, url)
    }

    /// Sends a request, turning transport failures and non-2xx responses into
    /// [`ConsoleError::Remote`].
    pub async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await.map_err(|e| {
            warn!("Request failed before a response arrived: {}", e);
            ConsoleError::remote(e.status().map(|s| s.as_u16()), None)
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        warn!("Request failed with status {}: {}", status, body);
        Err(ConsoleError::remote(
            Some(status.as_u16()),
            extract_error_message(&body),
        ))
    }

    pub async fn get_json<T, Q>(&self, url: Url, query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let response = self
            .send(self.request(reqwest::Method::GET, url).query(query))
            .await?;
        decode(response).await
    }

    pub async fn post_json<T, B>(&self, url: Url, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self
            .send(self.request(reqwest::Method::POST, url).json(body))
            .await?;
        decode(response).await
    }

    pub async fn put_json<T, B>(&self, url: Url, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self
            .send(self.request(reqwest::Method::PUT, url).json(body))
            .await?;
        decode(response).await
    }

    pub async fn post_multipart<T>(&self, url: Url, form: Form) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let response = self
            .send(self.request(reqwest::Method::POST, url).multipart(form))
            .await?;
        decode(response).await
    }

    pub async fn delete(&self, url: Url) -> Result<()> {
        self.send(self.request(reqwest::Method::DELETE, url))
            .await?;
        Ok(())
    }

    pub async fn get_bytes(&self, url: Url) -> Result<Vec<u8>> {
        let response = self.send(self.request(reqwest::Method::GET, url)).await?;
        let bytes = response.bytes().await.map_err(|e| {
            warn!("Failed to read response body: {}", e);
            ConsoleError::remote(None, None)
        })?;
        Ok(bytes.to_vec())
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let body = response.text().await.map_err(|e| {
        warn!("Failed to read response body: {}", e);
        ConsoleError::remote(None, None)
    })?;
    serde_json::from_str(&body).map_err(|e| ConsoleError::InvalidResponse(e.to_string()))
}

/// Pulls the server message out of `{error: {message}}`, `{error: "..."}` or
/// `{message}` bodies.
pub fn extract_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;

    let message = value
        .pointer("/error/message")
        .or_else(|| value.get("error").filter(|e| e.is_string()))
        .or_else(|| value.get("message"))?;

    message
        .as_str()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn client(base_url: &str) -> ApiClient {
        ApiClient::new(&ServiceConfig {
            base_url: base_url.to_string(),
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[test]
    fn test_url_joins_segments() {
        let api = client("http://localhost:3001");
        assert_eq!(
            api.url(&["/api/v1/files"]).unwrap().as_str(),
            "http://localhost:3001/api/v1/files"
        );

        let prefixed = client("http://gateway.local/files-svc/");
        assert_eq!(
            prefixed.url(&["/api/v1/files", "upload"]).unwrap().as_str(),
            "http://gateway.local/files-svc/api/v1/files/upload"
        );
    }

    #[test]
    fn test_resource_url_encodes_id() {
        let api = client("http://localhost:3001");
        assert_eq!(
            api.resource_url("/api/v1/files", "a b/c", Some("status"))
                .unwrap()
                .as_str(),
            "http://localhost:3001/api/v1/files/a%20b%2Fc/status"
        );
        assert_eq!(
            api.resource_url("/api/connections", "4", None)
                .unwrap()
                .as_str(),
            "http://localhost:3001/api/connections/4"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let result = ApiClient::new(&ServiceConfig {
            base_url: "not a url".to_string(),
            timeout_secs: 5,
        });
        assert!(matches!(result, Err(ConsoleError::Config(_))));
    }

    #[test]
    fn test_extract_error_message() {
        assert_eq!(
            extract_error_message(r#"{"success":false,"error":{"message":"File not found"}}"#),
            Some("File not found".to_string())
        );
        assert_eq!(
            extract_error_message(r#"{"error":"Invalid file type"}"#),
            Some("Invalid file type".to_string())
        );
        assert_eq!(
            extract_error_message(r#"{"message":"Connection not found"}"#),
            Some("Connection not found".to_string())
        );
        assert_eq!(extract_error_message(r#"{"error":{"code":500}}"#), None);
        assert_eq!(extract_error_message("<html>Bad Gateway</html>"), None);
    }

    #[test]
    fn test_envelope_failure_becomes_remote_error() {
        let envelope: Envelope<serde_json::Value> =
            serde_json::from_str(r#"{"success":false,"data":null,"message":"quota exceeded"}"#)
                .unwrap();
        match envelope.into_data() {
            Err(ConsoleError::Remote { message, .. }) => assert_eq!(message, "quota exceeded"),
            other => panic!("unexpected: {:?}", other),
        }
    }
}
