use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use brock_context::{render_template, ContextAssembler};
use brock_llm::{ChatClient, ChatRequest, Message};
use brock_persist::{
    Activity, ActivityQuery, DBMessage, Goal, GoalQuery, MessageMetadata, PersistenceClient,
};
use brock_types::{ProactiveConfig, TimeOfDay};

use crate::error::{ChatError, Result};
use crate::push::{Notification, PushSender};
use crate::templates::{AFTERNOON_CONTEXT, MORNING_CONTEXT, PROACTIVE_PROMPT_TEMPLATE};
use crate::threads::find_or_create_general_checkin_thread;

/// A check-in that was generated and stored
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProactiveMessage {
    pub thread_id: String,
    pub time_of_day: TimeOfDay,
    pub content: String,
    /// Devices that accepted the push notification
    pub notifications_delivered: usize,
}

/// Writes unprompted morning and afternoon check-ins into the general
/// check-in thread.
pub struct ProactiveGenerator {
    llm: Arc<dyn ChatClient>,
    store: Arc<dyn PersistenceClient>,
    context: Arc<ContextAssembler>,
    push: Arc<dyn PushSender>,
    config: ProactiveConfig,
}

impl ProactiveGenerator {
    pub fn new(
        llm: Arc<dyn ChatClient>,
        store: Arc<dyn PersistenceClient>,
        context: Arc<ContextAssembler>,
        push: Arc<dyn PushSender>,
        config: ProactiveConfig,
    ) -> Self {
        Self {
            llm,
            store,
            context,
            push,
            config,
        }
    }

    pub async fn generate(&self, time_of_day: TimeOfDay) -> Result<ProactiveMessage> {
        info!(time_of_day = %time_of_day, "Generating proactive check-in");

        let thread = find_or_create_general_checkin_thread(self.store.as_ref()).await?;

        let (activities, goals) = tokio::join!(
            self.store.list_activities(ActivityQuery::recent(self.config.activity_limit)),
            self.store.list_goals(GoalQuery::active(self.config.goal_limit)),
        );
        let activities = activities.unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load recent activities for check-in");
            Vec::new()
        });
        let goals = goals.unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load active goals for check-in");
            Vec::new()
        });

        let prompt = self.build_prompt(time_of_day, &activities, &goals);
        let request = ChatRequest::new(
            self.config.llm.model.clone(),
            vec![
                Message::system(prompt),
                Message::human(format!("Generate a {} check-in message", time_of_day)),
            ],
        )
        .with_options(self.config.llm.options());

        let response = self.llm.chat(request).await?;
        let content = response
            .text()
            .ok_or(ChatError::EmptyOutput("check-in message"))?
            .to_string();

        let message = DBMessage::assistant(&thread.id, &content).with_metadata(
            MessageMetadata::ProactiveCheckin {
                time_of_day,
                generated_at: Utc::now(),
            },
        );
        self.store.save_message(message).await?;
        self.store.touch_thread(&thread.id).await?;

        let notifications_delivered = self.notify(&thread.id, &content, time_of_day).await;

        info!(
            thread_id = %thread.id,
            time_of_day = %time_of_day,
            notifications_delivered,
            "Proactive check-in stored"
        );

        Ok(ProactiveMessage {
            thread_id: thread.id,
            time_of_day,
            content,
            notifications_delivered,
        })
    }

    /// Push failures are logged; the stored message stands either way.
    async fn notify(&self, thread_id: &str, content: &str, time_of_day: TimeOfDay) -> usize {
        let tokens = match self.store.list_device_tokens().await {
            Ok(tokens) => tokens,
            Err(e) => {
                warn!(error = %e, "Failed to load device tokens");
                return 0;
            }
        };

        let notification = Notification::proactive_checkin(thread_id, content, time_of_day);
        match self.push.send(&notification, &tokens).await {
            Ok(delivered) => delivered,
            Err(e) => {
                warn!(error = %e, "Failed to send check-in notification");
                0
            }
        }
    }

    fn build_prompt(&self, time_of_day: TimeOfDay, activities: &[Activity], goals: &[Goal]) -> String {
        let time_context = match time_of_day {
            TimeOfDay::Morning => MORNING_CONTEXT,
            TimeOfDay::Afternoon => AFTERNOON_CONTEXT,
        };

        let activities = if activities.is_empty() {
            "No recent activities logged".to_string()
        } else {
            let listed: Vec<String> = activities
                .iter()
                .map(|a| format!("{} ({})", a.title, a.activity_type))
                .collect();
            format!("Recent activities: {}", listed.join(", "))
        };

        let goals = if goals.is_empty() {
            "No active goals set".to_string()
        } else {
            let listed: Vec<&str> = goals.iter().map(|g| g.name.as_str()).collect();
            format!("Active goals: {}", listed.join(", "))
        };

        let profile = serde_json::to_string(self.context.profile()).unwrap_or_default();

        render_template(
            PROACTIVE_PROMPT_TEMPLATE,
            &[
                ("time_context", time_context),
                ("activities", &activities),
                ("goals", &goals),
                ("time_of_day", time_of_day.as_str()),
                ("profile", &profile),
            ],
        )
    }
}
