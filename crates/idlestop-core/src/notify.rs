//! Notification delivery
//!
//! Delivery is fire-and-forget: a failed post is logged and otherwise
//! ignored, it never aborts the workflow.

use async_trait::async_trait;
use idlestop_config::NotificationSettings;
use serde_json::{Value, json};
use std::sync::{Mutex, PoisonError};

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, message: &str);
}

/// Webhook flavour, which decides the payload shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookKind {
    Slack,
    Discord,
}

impl WebhookKind {
    pub fn payload(&self, message: &str) -> Value {
        match self {
            WebhookKind::Slack => json!({ "text": message }),
            WebhookKind::Discord => json!({ "content": message }),
        }
    }
}

impl std::fmt::Display for WebhookKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WebhookKind::Slack => write!(f, "slack"),
            WebhookKind::Discord => write!(f, "discord"),
        }
    }
}

#[derive(Debug, Clone)]
struct Webhook {
    kind: WebhookKind,
    url: String,
}

/// Posts each message to every enabled webhook
pub struct WebhookNotifier {
    client: reqwest::Client,
    webhooks: Vec<Webhook>,
}

impl WebhookNotifier {
    pub fn from_settings(settings: &NotificationSettings) -> Self {
        let mut webhooks = Vec::new();
        for (kind, webhook) in [
            (WebhookKind::Slack, &settings.slack),
            (WebhookKind::Discord, &settings.discord),
        ] {
            if webhook.enabled {
                webhooks.push(Webhook {
                    kind,
                    url: webhook.url.clone(),
                });
            }
        }

        Self {
            client: reqwest::Client::new(),
            webhooks,
        }
    }

    /// Enabled channels, in delivery order
    pub fn channels(&self) -> Vec<WebhookKind> {
        self.webhooks.iter().map(|w| w.kind).collect()
    }

    async fn post(&self, webhook: &Webhook, message: &str) {
        let result = self
            .client
            .post(&webhook.url)
            .json(&webhook.kind.payload(message))
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                tracing::debug!("Sent {} notification", webhook.kind);
            }
            Ok(response) => {
                tracing::warn!(
                    "{} webhook returned {}; notification dropped",
                    webhook.kind,
                    response.status()
                );
            }
            Err(e) => {
                tracing::warn!("{} webhook failed: {}; notification dropped", webhook.kind, e);
            }
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, message: &str) {
        if self.webhooks.is_empty() {
            tracing::debug!("No notification channel enabled: {}", message);
            return;
        }
        for webhook in &self.webhooks {
            self.post(webhook, message).await;
        }
    }
}

/// Collects messages instead of delivering them
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, message: &str) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
    }
}
