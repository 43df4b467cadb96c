use bson::doc;
use futures::TryStreamExt;
use mongodb::{Client, Collection};

use crate::dbs::mongo::models::MongoMessage;
use crate::error::Result;
use crate::models::{MessageQuery, SortOrder};

#[derive(Clone)]
pub struct MongoMessageRepository {
    collection: Collection<MongoMessage>,
}

impl MongoMessageRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection("messages");
        Self { collection }
    }

    pub async fn insert(&self, message: &MongoMessage) -> Result<()> {
        self.collection.insert_one(message).await?;
        Ok(())
    }

    pub async fn list(&self, thread_id: &str, query: MessageQuery) -> Result<Vec<MongoMessage>> {
        let direction = match query.order {
            SortOrder::Ascending => 1,
            SortOrder::Descending => -1,
        };

        let mut find = self
            .collection
            .find(doc! { "thread_id": thread_id })
            .sort(doc! { "created_at": direction })
            .skip(u64::from(query.offset));
        if let Some(limit) = query.limit {
            find = find.limit(i64::from(limit));
        }

        Ok(find.await?.try_collect().await?)
    }
}
