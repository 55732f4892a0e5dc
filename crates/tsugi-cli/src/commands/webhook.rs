use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use anime_track_core::{AlertSink, NotifyError};

const DELIVERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Episode alerts over a Discord-compatible webhook.
///
/// Direct notifications are rendered as user mentions on the webhook
/// channel; broadcasts optionally lead with a role mention.
pub struct WebhookSink {
    client: Client,
    webhook_url: String,
    mention_role_id: Option<u64>,
}

impl WebhookSink {
    pub fn new(webhook_url: String, mention_role_id: Option<u64>) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(DELIVERY_TIMEOUT)
            .build()
            .map_err(|e| NotifyError::Delivery(e.to_string()))?;
        Ok(Self {
            client,
            webhook_url,
            mention_role_id,
        })
    }

    async fn post(&self, content: String) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(&self.webhook_url)
            .json(&json!({ "content": content }))
            .send()
            .await
            .map_err(|e| NotifyError::Delivery(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(NotifyError::Delivery(format!("HTTP {}", response.status())))
        }
    }
}

#[async_trait]
impl AlertSink for WebhookSink {
    async fn notify_user(&self, user_id: i64, text: &str) -> Result<(), NotifyError> {
        self.post(format!("<@{}> {}", user_id, text)).await
    }

    async fn broadcast(&self, text: &str) -> Result<(), NotifyError> {
        let content = match self.mention_role_id {
            Some(role) => format!("<@&{}> {}", role, text),
            None => text.to_string(),
        };
        self.post(content).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_notify_user_mentions_target() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .and(body_partial_json(json!({ "content": "<@42> hello" })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let sink = WebhookSink::new(format!("{}/hook", server.uri()), None).expect("sink");
        sink.notify_user(42, "hello").await.expect("delivery");
    }

    #[tokio::test]
    async fn test_broadcast_prepends_role_mention() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "content": "<@&7> aired" })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let sink = WebhookSink::new(server.uri(), Some(7)).expect("sink");
        sink.broadcast("aired").await.expect("delivery");
    }

    #[tokio::test]
    async fn test_http_failure_surfaces_as_delivery_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let sink = WebhookSink::new(server.uri(), None).expect("sink");
        assert!(sink.broadcast("aired").await.is_err());
    }
}
