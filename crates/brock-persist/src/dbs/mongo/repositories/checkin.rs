use bson::{doc, Document};
use chrono::{NaiveDate, Utc};
use futures::TryStreamExt;
use mongodb::{Client, Collection};

use crate::dbs::mongo::models::{MongoCheckinSchedule, MongoDeviceToken};
use crate::error::Result;

/// Check-in schedules and push device tokens
#[derive(Clone)]
pub struct MongoCheckinRepository {
    schedules: Collection<MongoCheckinSchedule>,
    device_tokens: Collection<MongoDeviceToken>,
}

impl MongoCheckinRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let db = client.database(db_name);
        Self {
            schedules: db.collection("checkin_schedules"),
            device_tokens: db.collection("device_tokens"),
        }
    }

    pub async fn get_schedule(&self, date: NaiveDate) -> Result<Option<MongoCheckinSchedule>> {
        Ok(self.schedules.find_one(doc! { "_id": date.to_string() }).await?)
    }

    pub async fn save_schedule(&self, schedule: &MongoCheckinSchedule) -> Result<()> {
        self.schedules
            .replace_one(doc! { "_id": schedule.date.to_string() }, schedule)
            .upsert(true)
            .await?;
        Ok(())
    }

    /// Returns false when no schedule exists for `date`
    pub async fn set_sent(&self, date: NaiveDate, field: &str) -> Result<bool> {
        let mut set = Document::new();
        set.insert(field, true);
        let result = self
            .schedules
            .update_one(doc! { "_id": date.to_string() }, doc! { "$set": set })
            .await?;
        Ok(result.matched_count > 0)
    }

    pub async fn list_tokens(&self) -> Result<Vec<String>> {
        let tokens: Vec<MongoDeviceToken> = self.device_tokens.find(doc! {}).await?.try_collect().await?;
        Ok(tokens.into_iter().map(|t| t.token).collect())
    }

    pub async fn register_token(&self, token: &str) -> Result<()> {
        let record = MongoDeviceToken {
            token: token.to_string(),
            registered_at: Utc::now(),
        };
        self.device_tokens
            .replace_one(doc! { "_id": token }, &record)
            .upsert(true)
            .await?;
        Ok(())
    }
}
