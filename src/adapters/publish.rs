use crate::domain::model::PublishReceipt;
use crate::domain::ports::Publisher;
use crate::utils::error::{RelayError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub const DEFAULT_GRAPH_URL: &str = "https://graph.facebook.com";

/// Posts to a Facebook Page feed through the Graph API.
pub struct FacebookPublisher {
    client: Client,
    graph_url: String,
    api_version: String,
    page_id: String,
    access_token: String,
}

impl fmt::Debug for FacebookPublisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FacebookPublisher")
            .field("graph_url", &self.graph_url)
            .field("api_version", &self.api_version)
            .field("page_id", &self.page_id)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

impl FacebookPublisher {
    pub fn new(
        graph_url: impl Into<String>,
        api_version: impl Into<String>,
        page_id: impl Into<String>,
        access_token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            graph_url: graph_url.into(),
            api_version: api_version.into(),
            page_id: page_id.into(),
            access_token: access_token.into(),
        })
    }

    fn feed_url(&self) -> String {
        format!(
            "{}/{}/{}/feed",
            self.graph_url.trim_end_matches('/'),
            self.api_version,
            self.page_id
        )
    }
}

#[async_trait]
impl Publisher for FacebookPublisher {
    async fn publish(&self, message: &str) -> Result<PublishReceipt> {
        let response = self
            .client
            .post(self.feed_url())
            .form(&[("message", message), ("access_token", self.access_token.as_str())])
            .send()
            .await
            .map_err(|e| RelayError::PublishError {
                status: None,
                message: e.to_string(),
            })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let parsed: Option<serde_json::Value> = serde_json::from_str(&body).ok();

        if !status.is_success() {
            let detail = parsed
                .as_ref()
                .and_then(|v| v.pointer("/error/message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
                .unwrap_or(body);
            return Err(RelayError::PublishError {
                status: Some(status.as_u16()),
                message: format!("Facebook API error (HTTP {}): {}", status.as_u16(), detail),
            });
        }

        match parsed
            .as_ref()
            .and_then(|v| v.get("id"))
            .and_then(|id| id.as_str())
        {
            Some(post_id) => Ok(PublishReceipt {
                post_id: post_id.to_string(),
            }),
            None => Err(RelayError::PublishError {
                status: Some(status.as_u16()),
                message: format!("Facebook API response has no post id: {}", body),
            }),
        }
    }
}

/// Logs posts instead of publishing them.
#[derive(Debug, Default)]
pub struct DryRunPublisher {
    count: AtomicUsize,
}

impl DryRunPublisher {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Publisher for DryRunPublisher {
    async fn publish(&self, message: &str) -> Result<PublishReceipt> {
        let n = self.count.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::info!("🔍 DRY RUN post #{}:\n{}", n, message);
        Ok(PublishReceipt {
            post_id: format!("dry-run-{}", n),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn publisher(server: &MockServer) -> FacebookPublisher {
        FacebookPublisher::new(server.base_url(), "v19.0", "12345", "token-abc", Duration::from_secs(5))
            .unwrap()
    }

    #[tokio::test]
    async fn test_publish_returns_post_id() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v19.0/12345/feed")
                .body_contains("access_token=token-abc");
            then.status(200).json_body(serde_json::json!({"id": "12345_678"}));
        });

        let receipt = publisher(&server).publish("Hej världen").await.unwrap();

        api_mock.assert();
        assert_eq!(receipt.post_id, "12345_678");
    }

    #[tokio::test]
    async fn test_publish_surfaces_graph_error_message() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v19.0/12345/feed");
            then.status(400).json_body(serde_json::json!({
                "error": {"message": "Invalid OAuth access token.", "code": 190}
            }));
        });

        let err = publisher(&server).publish("Hej").await.unwrap_err();

        match err {
            RelayError::PublishError { status, message } => {
                assert_eq!(status, Some(400));
                assert!(message.contains("Invalid OAuth access token."));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_success_without_id_is_failure() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v19.0/12345/feed");
            then.status(200).json_body(serde_json::json!({"success": true}));
        });

        assert!(publisher(&server).publish("Hej").await.is_err());
    }

    #[test]
    fn test_debug_redacts_token() {
        let publisher = FacebookPublisher::new(
            DEFAULT_GRAPH_URL,
            "v19.0",
            "12345",
            "secret-token",
            Duration::from_secs(5),
        )
        .unwrap();

        assert!(!format!("{:?}", publisher).contains("secret-token"));
    }

    #[tokio::test]
    async fn test_dry_run_numbers_posts() {
        let publisher = DryRunPublisher::new();

        assert_eq!(publisher.publish("a").await.unwrap().post_id, "dry-run-1");
        assert_eq!(publisher.publish("b").await.unwrap().post_id, "dry-run-2");
    }
}
