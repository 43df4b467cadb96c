use brock_persist::{
    ActivityQuery, CheckinSchedule, DBMessage, DailyNutrition, GoalQuery, MemoryPersistenceClient,
    MessageQuery, NewActivity, NewGoal, NewThread, NutritionQuery, PersistError,
    PersistenceClient, Sender, ThreadUpdate, GENERAL_CHECKIN_FLAG,
};
use brock_types::TimeOfDay;
use chrono::{NaiveDate, NaiveTime};
use serde_json::json;

fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn goal(name: &str) -> NewGoal {
    NewGoal {
        name: name.to_string(),
        milestone_description: "milestone".to_string(),
        start_date: day("2024-01-01"),
        milestone_date: day("2024-06-01"),
        reason: None,
        image_system_name: "target".to_string(),
    }
}

fn activity(title: &str, goal_id: Option<String>, kind: &str) -> NewActivity {
    NewActivity {
        title: title.to_string(),
        icon_name: "figure.run".to_string(),
        goal_id,
        activity_type: kind.to_string(),
        data: json!({}),
    }
}

#[tokio::test]
async fn test_messages_latest_and_page() {
    let store = MemoryPersistenceClient::new();
    let thread = store.create_thread(NewThread::titled("Chat")).await.unwrap();

    for i in 0..5 {
        store
            .save_message(DBMessage::user(&thread.id, format!("m{i}")))
            .await
            .unwrap();
    }
    store
        .save_message(DBMessage::user("other-thread", "elsewhere"))
        .await
        .unwrap();

    let latest = store.list_messages(&thread.id, MessageQuery::latest(2)).await.unwrap();
    let contents: Vec<_> = latest.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["m4", "m3"]);

    let page = store.list_messages(&thread.id, MessageQuery::page(2, 1)).await.unwrap();
    let contents: Vec<_> = page.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["m1", "m2"]);

    assert!(store.has_messages(&thread.id).await.unwrap());
    assert!(!store.has_messages("missing").await.unwrap());
}

#[tokio::test]
async fn test_update_thread_touches_and_merges() {
    let store = MemoryPersistenceClient::new();
    let thread = store
        .create_thread(NewThread::titled("New Conversation").with_topic("training"))
        .await
        .unwrap();

    let updated = store
        .update_thread(&thread.id, ThreadUpdate::title("Leg Day"))
        .await
        .unwrap();

    assert_eq!(updated.title, "Leg Day");
    assert_eq!(updated.topic.as_deref(), Some("training"));
    assert!(updated.updated_at >= thread.updated_at);

    let err = store.touch_thread("nope").await.unwrap_err();
    assert!(matches!(err, PersistError::ThreadNotFound(_)));
}

#[tokio::test]
async fn test_find_threads_by_flag() {
    let store = MemoryPersistenceClient::new();
    store.create_thread(NewThread::titled("plain")).await.unwrap();
    let flagged = store
        .create_thread(NewThread::titled("Daily Check-ins").with_flag(GENERAL_CHECKIN_FLAG, true))
        .await
        .unwrap();

    let found = store
        .find_threads_by_flag(GENERAL_CHECKIN_FLAG, &json!(true))
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, flagged.id);
    assert!(found[0].is_general_checkin());
}

#[tokio::test]
async fn test_goals_newest_first_and_active_filter() {
    let store = MemoryPersistenceClient::new();
    store.create_goal(goal("first")).await.unwrap();
    store.create_goal(goal("second")).await.unwrap();

    let goals = store.list_goals(GoalQuery::recent(10)).await.unwrap();
    assert_eq!(goals[0].name, "second");
    assert_eq!(goals[1].name, "first");
    assert!(goals.iter().all(|g| g.is_active()));

    let limited = store.list_goals(GoalQuery::active(1)).await.unwrap();
    assert_eq!(limited.len(), 1);
}

#[tokio::test]
async fn test_activity_filters_and_goal_check() {
    let store = MemoryPersistenceClient::new();
    let g = store.create_goal(goal("5k")).await.unwrap();

    store.create_activity(activity("run", Some(g.id.clone()), "cardio")).await.unwrap();
    store.create_activity(activity("lift", None, "strength")).await.unwrap();

    let by_goal = store
        .list_activities(ActivityQuery { goal_id: Some(g.id.clone()), activity_type: None, limit: 20 })
        .await
        .unwrap();
    assert_eq!(by_goal.len(), 1);
    assert_eq!(by_goal[0].title, "run");

    let by_type = store
        .list_activities(ActivityQuery { goal_id: None, activity_type: Some("strength".into()), limit: 20 })
        .await
        .unwrap();
    assert_eq!(by_type[0].title, "lift");

    let err = store
        .create_activity(activity("ghost", Some("missing".into()), "general"))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_nutrition_by_day_and_recent() {
    let store = MemoryPersistenceClient::new();
    for (d, kcal) in [("2024-03-01", 2000.0), ("2024-03-03", 2200.0), ("2024-03-02", 1900.0)] {
        store
            .upsert_daily_nutrition(DailyNutrition {
                day: day(d),
                calories_kcal: kcal,
                protein_g: 150.0,
                carbs_g: 200.0,
                fat_g: 70.0,
            })
            .await
            .unwrap();
    }

    let recent = store
        .list_daily_nutrition(NutritionQuery::Recent { limit: 2 })
        .await
        .unwrap();
    assert_eq!(recent.iter().map(|n| n.day).collect::<Vec<_>>(), vec![day("2024-03-03"), day("2024-03-02")]);

    let one = store
        .list_daily_nutrition(NutritionQuery::Day(day("2024-03-01")))
        .await
        .unwrap();
    assert_eq!(one[0].calories_kcal, 2000.0);

    let none = store
        .list_daily_nutrition(NutritionQuery::Day(day("2023-01-01")))
        .await
        .unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn test_schedule_mark_sent() {
    let store = MemoryPersistenceClient::new();
    let date = day("2024-04-10");
    let schedule = CheckinSchedule::new(
        date,
        NaiveTime::from_hms_opt(8, 15, 0).unwrap(),
        NaiveTime::from_hms_opt(17, 40, 0).unwrap(),
    );
    store.save_checkin_schedule(schedule).await.unwrap();
    store.mark_checkin_sent(date, TimeOfDay::Morning).await.unwrap();

    let stored = store.get_checkin_schedule(date).await.unwrap().unwrap();
    assert!(stored.morning_sent);
    assert!(!stored.afternoon_sent);

    let err = store
        .mark_checkin_sent(day("2024-04-11"), TimeOfDay::Afternoon)
        .await
        .unwrap_err();
    assert!(matches!(err, PersistError::ScheduleNotFound(_)));
}

#[tokio::test]
async fn test_device_tokens_deduplicate() {
    let store = MemoryPersistenceClient::new();
    store.register_device_token("abc").await.unwrap();
    store.register_device_token("abc").await.unwrap();
    store.register_device_token("def").await.unwrap();

    assert_eq!(store.list_device_tokens().await.unwrap(), vec!["abc", "def"]);
}

#[tokio::test]
async fn test_offline_store_fails() {
    let store = MemoryPersistenceClient::new();
    store.set_offline(true);

    let err = store.save_message(DBMessage::new("t", Sender::User, "hi")).await.unwrap_err();
    assert!(matches!(err, PersistError::Connection(_)));

    store.set_offline(false);
    assert!(store.list_threads(None).await.unwrap().is_empty());
}
