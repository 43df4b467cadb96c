use bson::{doc, Document};
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::options::ReturnDocument;
use mongodb::{Client, Collection};
use serde_json::Value;

use crate::dbs::mongo::models::MongoThread;
use crate::error::Result;
use crate::models::ThreadUpdate;

#[derive(Clone)]
pub struct MongoThreadRepository {
    collection: Collection<MongoThread>,
}

impl MongoThreadRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection("threads");
        Self { collection }
    }

    pub async fn insert(&self, thread: &MongoThread) -> Result<()> {
        self.collection.insert_one(thread).await?;
        Ok(())
    }

    pub async fn get(&self, thread_id: &str) -> Result<Option<MongoThread>> {
        Ok(self.collection.find_one(doc! { "_id": thread_id }).await?)
    }

    /// Most recently updated first
    pub async fn list(&self, limit: Option<u32>) -> Result<Vec<MongoThread>> {
        let mut find = self.collection.find(doc! {}).sort(doc! { "updated_at": -1 });
        if let Some(limit) = limit {
            find = find.limit(i64::from(limit));
        }
        Ok(find.await?.try_collect().await?)
    }

    /// Apply `$set` for the provided fields; returns the updated document
    pub async fn update(&self, thread_id: &str, update: ThreadUpdate) -> Result<Option<MongoThread>> {
        let mut set = Document::new();
        if let Some(title) = update.title {
            set.insert("title", title);
        }
        if let Some(topic) = update.topic {
            set.insert("topic", topic);
        }
        if let Some(summary) = update.summary {
            set.insert("summary", summary);
        }
        if let Some(flags) = update.flags {
            set.insert("flags", bson::to_bson(&flags)?);
        }
        set.insert("updated_at", bson::DateTime::from_chrono(Utc::now()));

        Ok(self
            .collection
            .find_one_and_update(doc! { "_id": thread_id }, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await?)
    }

    pub async fn find_by_flag(&self, key: &str, value: &Value) -> Result<Vec<MongoThread>> {
        let mut filter = Document::new();
        filter.insert(format!("flags.{}", key), bson::to_bson(value)?);
        Ok(self.collection.find(filter).await?.try_collect().await?)
    }
}
