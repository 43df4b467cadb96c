use anyhow::{Context, Result};
use async_trait::async_trait;
use brock_types::TimeOfDay;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    ChatMessage,
    AccountUpdate,
    ProactiveCheckin,
    GoalReminder,
    System,
}

impl NotificationType {
    /// Delivery priority, 1 is highest
    pub fn priority(&self) -> u8 {
        match self {
            Self::ChatMessage => 2,
            Self::ProactiveCheckin | Self::GoalReminder => 3,
            Self::AccountUpdate => 4,
            Self::System => 5,
        }
    }
}

/// What to show on the device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub title: String,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
    pub priority: u8,
    pub data: Value,
}

impl Notification {
    pub fn new(
        notification_type: NotificationType,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            notification_type,
            title: title.into(),
            body: body.into(),
            thread_id: None,
            priority: notification_type.priority(),
            data: json!({}),
        }
    }

    pub fn with_thread(mut self, thread_id: impl Into<String>) -> Self {
        self.thread_id = Some(thread_id.into());
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }

    pub fn proactive_checkin(thread_id: &str, message: &str, time_of_day: TimeOfDay) -> Self {
        let title = match time_of_day {
            TimeOfDay::Morning => "🌅 Morning Check-in",
            TimeOfDay::Afternoon => "🌇 Afternoon Check-in",
        };
        Self::new(NotificationType::ProactiveCheckin, title, message)
            .with_thread(thread_id)
            .with_data(json!({ "timeOfDay": time_of_day.as_str() }))
    }
}

/// Delivers notifications to registered devices
#[async_trait]
pub trait PushSender: Send + Sync {
    /// Returns how many devices accepted the notification
    async fn send(&self, notification: &Notification, device_tokens: &[String]) -> Result<usize>;
}

/// Logs notifications without delivering them
#[derive(Debug, Default, Clone)]
pub struct LogPushSender;

#[async_trait]
impl PushSender for LogPushSender {
    async fn send(&self, notification: &Notification, device_tokens: &[String]) -> Result<usize> {
        info!(
            notification_type = ?notification.notification_type,
            title = %notification.title,
            devices = device_tokens.len(),
            "Push delivery not configured, notification logged only"
        );
        Ok(0)
    }
}

/// Posts one request per device token to a push gateway
#[derive(Debug, Clone)]
pub struct HttpPushSender {
    http_client: reqwest::Client,
    gateway_url: String,
}

impl HttpPushSender {
    pub fn new(gateway_url: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            gateway_url: gateway_url.into(),
        }
    }

    async fn send_one(&self, notification: &Notification, device_token: &str) -> Result<()> {
        let response = self
            .http_client
            .post(&self.gateway_url)
            .json(&json!({
                "deviceToken": device_token,
                "notification": notification,
            }))
            .send()
            .await
            .context("Failed to reach push gateway")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Push gateway error ({}): {}", status, error_text);
        }

        Ok(())
    }
}

#[async_trait]
impl PushSender for HttpPushSender {
    async fn send(&self, notification: &Notification, device_tokens: &[String]) -> Result<usize> {
        let mut delivered = 0;
        for token in device_tokens {
            match self.send_one(notification, token).await {
                Ok(()) => delivered += 1,
                Err(e) => warn!(error = %e, "Push delivery failed for one device"),
            }
        }
        info!(delivered, total = device_tokens.len(), "Push notifications sent");
        Ok(delivered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proactive_checkin_titles() {
        let morning = Notification::proactive_checkin("t1", "Rise and grind", TimeOfDay::Morning);
        assert_eq!(morning.title, "🌅 Morning Check-in");
        assert_eq!(morning.priority, 3);
        assert_eq!(morning.thread_id.as_deref(), Some("t1"));

        let afternoon = Notification::proactive_checkin("t1", "How was it?", TimeOfDay::Afternoon);
        assert_eq!(afternoon.title, "🌇 Afternoon Check-in");
        assert_eq!(afternoon.data["timeOfDay"], "afternoon");
    }

    #[test]
    fn test_notification_wire_shape() {
        let value = serde_json::to_value(
            Notification::new(NotificationType::GoalReminder, "Goal", "Due soon").with_thread("t9"),
        )
        .unwrap();
        assert_eq!(value["type"], "goal_reminder");
        assert_eq!(value["threadId"], "t9");
    }

    #[tokio::test]
    async fn test_http_sender_counts_successes() {
        let mut server = mockito::Server::new_async().await;
        let ok = server
            .mock("POST", "/push")
            .match_body(mockito::Matcher::PartialJson(json!({"deviceToken": "good"})))
            .with_status(200)
            .create_async()
            .await;
        let rejected = server
            .mock("POST", "/push")
            .match_body(mockito::Matcher::PartialJson(json!({"deviceToken": "stale"})))
            .with_status(410)
            .with_body("unregistered")
            .create_async()
            .await;

        let sender = HttpPushSender::new(format!("{}/push", server.url()));
        let notification = Notification::proactive_checkin("t1", "hi", TimeOfDay::Morning);
        let delivered = sender
            .send(&notification, &["good".to_string(), "stale".to_string()])
            .await
            .unwrap();

        assert_eq!(delivered, 1);
        ok.assert_async().await;
        rejected.assert_async().await;
    }

    #[tokio::test]
    async fn test_log_sender_delivers_nothing() {
        let notification = Notification::new(NotificationType::System, "Maintenance", "Tonight");
        let delivered = LogPushSender.send(&notification, &["a".to_string()]).await.unwrap();
        assert_eq!(delivered, 0);
    }
}
