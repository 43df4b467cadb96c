use bson::{doc, Document};
use futures::TryStreamExt;
use mongodb::{Client, Collection};

use crate::dbs::mongo::models::{MongoActivity, MongoDailyNutrition, MongoGoal};
use crate::error::Result;
use crate::models::{ActivityQuery, GoalQuery, NutritionQuery};

/// Goals, activities and daily nutrition totals
#[derive(Clone)]
pub struct MongoRecordRepository {
    goals: Collection<MongoGoal>,
    activities: Collection<MongoActivity>,
    nutrition: Collection<MongoDailyNutrition>,
}

impl MongoRecordRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let db = client.database(db_name);
        Self {
            goals: db.collection("goals"),
            activities: db.collection("activities"),
            nutrition: db.collection("daily_nutrition"),
        }
    }

    pub async fn list_goals(&self, query: GoalQuery) -> Result<Vec<MongoGoal>> {
        let filter = if query.active_only {
            doc! { "is_manually_completed": { "$ne": true } }
        } else {
            doc! {}
        };
        Ok(self
            .goals
            .find(filter)
            .sort(doc! { "created_at": -1 })
            .limit(i64::from(query.limit))
            .await?
            .try_collect()
            .await?)
    }

    pub async fn insert_goal(&self, goal: &MongoGoal) -> Result<()> {
        self.goals.insert_one(goal).await?;
        Ok(())
    }

    pub async fn goal_exists(&self, goal_id: &str) -> Result<bool> {
        Ok(self.goals.count_documents(doc! { "_id": goal_id }).await? > 0)
    }

    pub async fn list_activities(&self, query: ActivityQuery) -> Result<Vec<MongoActivity>> {
        let mut filter = Document::new();
        if let Some(goal_id) = query.goal_id {
            filter.insert("goal_id", goal_id);
        }
        if let Some(activity_type) = query.activity_type {
            filter.insert("activity_type", activity_type);
        }
        Ok(self
            .activities
            .find(filter)
            .sort(doc! { "created_at": -1 })
            .limit(i64::from(query.limit))
            .await?
            .try_collect()
            .await?)
    }

    pub async fn insert_activity(&self, activity: &MongoActivity) -> Result<()> {
        self.activities.insert_one(activity).await?;
        Ok(())
    }

    pub async fn list_nutrition(&self, query: NutritionQuery) -> Result<Vec<MongoDailyNutrition>> {
        let find = match query {
            NutritionQuery::Day(day) => self
                .nutrition
                .find(doc! { "_id": day.to_string() })
                .limit(1),
            NutritionQuery::Recent { limit } => self
                .nutrition
                .find(doc! {})
                .sort(doc! { "_id": -1 })
                .limit(i64::from(limit)),
        };
        Ok(find.await?.try_collect().await?)
    }

    pub async fn upsert_nutrition(&self, day: &MongoDailyNutrition) -> Result<()> {
        self.nutrition
            .replace_one(doc! { "_id": day.day.to_string() }, day)
            .upsert(true)
            .await?;
        Ok(())
    }
}
