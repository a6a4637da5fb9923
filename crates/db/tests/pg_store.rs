//! PostgreSQL-backed store tests. Run with `DATABASE_URL` set and `--ignored`.

use chrono::{NaiveDate, TimeZone, Utc};
use promptcademy_core::gamification::BADGE_HIGH_SCORER;
use promptcademy_core::progress::{ProgressStatus, ProgressSummary};
use promptcademy_core::rotation::DailyRotation;
use promptcademy_db::models::lesson::CreateLesson;
use promptcademy_db::models::user::CreateUser;
use promptcademy_db::seed::seed_starter_lessons;
use promptcademy_db::store::{
    LessonStore, PgStore, ProgressStore, StatsStore, Store, StoreError, UserStore,
};
use sqlx::PgPool;

fn learner(email: &str) -> CreateUser {
    CreateUser {
        name: "Grace".to_string(),
        email: email.to_string(),
        password_hash: "hash".to_string(),
        role: "learner".to_string(),
    }
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_seed_and_rotation(pool: PgPool) {
    let store = PgStore::new(pool);
    assert_eq!(seed_starter_lessons(&store).await.unwrap(), 4);

    let rotation = DailyRotation::default();
    let now = Utc.with_ymd_and_hms(2024, 1, 2, 15, 0, 0).unwrap();
    let first = rotation.today_lesson(&store, now).await.unwrap();
    let again = rotation.today_lesson(&store, now).await.unwrap();
    assert_eq!(first.lesson_id, again.lesson_id);
    assert!(!again.advanced);

    let forced = rotation.force_rotate(&store, now).await.unwrap();
    assert_ne!(forced.lesson_id, first.lesson_id);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_progress_upsert_keeps_completed_at(pool: PgPool) {
    let store = PgStore::new(pool);
    let lesson = store
        .insert_lesson(&CreateLesson {
            title: "One".to_string(),
            track: "general".to_string(),
            content: String::new(),
            prompt_template: String::new(),
            sort_order: None,
            is_active: None,
        })
        .await
        .unwrap();
    let user = store.create_user(&learner("grace@example.com")).await.unwrap();

    let done_at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
    let summary = store
        .record_progress(user.id, lesson.id, ProgressStatus::Completed, done_at)
        .await
        .unwrap();
    assert_eq!(summary, ProgressSummary { completed: 1, total: 1 });

    let later = Utc.with_ymd_and_hms(2024, 5, 2, 9, 0, 0).unwrap();
    store
        .record_progress(user.id, lesson.id, ProgressStatus::InProgress, later)
        .await
        .unwrap();
    let items = store.list_progress(user.id).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].status, "in_progress");
    assert_eq!(items[0].completed_at, Some(done_at));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_duplicate_email_is_unique_violation(pool: PgPool) {
    let store = PgStore::new(pool);
    store.create_user(&learner("Grace@Example.com")).await.unwrap();

    let err = store
        .create_user(&learner("grace@example.com"))
        .await
        .unwrap_err();
    match err {
        StoreError::Database(sqlx::Error::Database(db)) => {
            assert_eq!(db.code().as_deref(), Some("23505"));
            assert_eq!(db.constraint(), Some("uq_users_email_lower"));
        }
        other => panic!("expected unique violation, got {other:?}"),
    }
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_stats_and_badges(pool: PgPool) {
    let store = PgStore::new(pool);
    let user = store.create_user(&learner("g@example.com")).await.unwrap();

    assert_eq!(store.learner_stats(user.id).await.unwrap().xp, 0);
    store.add_xp(user.id, 150).await.unwrap();
    let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
    let stats = store.save_check_in(user.id, 3, day).await.unwrap();
    assert_eq!(stats.xp, 150);
    assert_eq!(stats.streak, 3);
    assert_eq!(stats.last_check_in, Some(day));

    let now = Utc::now();
    assert!(store.award_badge(user.id, &BADGE_HIGH_SCORER, now).await.unwrap());
    assert!(!store.award_badge(user.id, &BADGE_HIGH_SCORER, now).await.unwrap());
    assert_eq!(store.list_badges(user.id).await.unwrap().len(), 1);
}
