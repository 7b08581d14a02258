//! Integration tests for the task, folder, and user repositories.

use chrono::NaiveDate;
use sqlx::PgPool;
use taskboard_db::models::task::{NewInstance, TaskListParams, TaskScope};
use taskboard_db::models::user::CreateUser;
use taskboard_db::repositories::{FolderRepo, TaskRepo, UserRepo};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

async fn new_user(pool: &PgPool, username: &str) -> i64 {
    UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            notification_email: None,
        },
    )
    .await
    .unwrap()
    .id
}

/// Create a template row the way the engine leaves it after configuration.
async fn new_template(pool: &PgPool, user_id: i64, title: &str) -> i64 {
    let mut task = TaskRepo::create(pool, user_id, title, None).await.unwrap();
    task.is_recurring = true;
    task.recurrence_type = Some("weekly".into());
    TaskRepo::update(pool, &task).await.unwrap().id
}

fn instance(user_id: i64, template_id: i64, due: Option<NaiveDate>) -> NewInstance {
    NewInstance {
        user_id,
        folder_id: None,
        title: "Water plants".into(),
        priority: 3,
        due_date: due,
        due_time: None,
        parent_task_id: template_id,
    }
}

async fn folder_of(pool: &PgPool, task_id: i64) -> Option<i64> {
    TaskRepo::find_by_id(pool, task_id).await.unwrap().unwrap().folder_id
}

// ---------------------------------------------------------------------------
// Create / read
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn quick_add_uses_defaults(pool: PgPool) {
    let user_id = new_user(&pool, "quick").await;
    let task = TaskRepo::create(&pool, user_id, "Buy milk", None).await.unwrap();

    assert_eq!(task.priority, 5);
    assert_eq!(task.status_id, 0);
    assert!(!task.archived);
    assert!(!task.is_recurring);
    assert!(task.parent_task_id.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn find_for_user_hides_other_users_tasks(pool: PgPool) {
    let owner = new_user(&pool, "owner").await;
    let other = new_user(&pool, "other").await;
    let task = TaskRepo::create(&pool, owner, "Private", None).await.unwrap();

    assert!(TaskRepo::find_for_user(&pool, owner, task.id).await.unwrap().is_some());
    assert!(TaskRepo::find_for_user(&pool, other, task.id).await.unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Instances
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn latest_pending_instance_prefers_latest_due_date(pool: PgPool) {
    let user_id = new_user(&pool, "latest").await;
    let template_id = new_template(&pool, user_id, "Water plants").await;

    let early = TaskRepo::create_instance(&pool, &instance(user_id, template_id, Some(date(2024, 3, 1))))
        .await
        .unwrap();
    // Complete the early one so a second pending instance may exist.
    let mut done = early.clone();
    done.status_id = 1;
    TaskRepo::update(&pool, &done).await.unwrap();

    let late = TaskRepo::create_instance(&pool, &instance(user_id, template_id, Some(date(2024, 3, 8))))
        .await
        .unwrap();

    let found = TaskRepo::latest_pending_instance(&pool, template_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, late.id);

    assert!(TaskRepo::has_pending_instance(&pool, template_id, None).await.unwrap());
    assert!(!TaskRepo::has_pending_instance(&pool, template_id, Some(late.id)).await.unwrap());
}

#[sqlx::test(migrations = "./migrations")]
async fn second_pending_instance_violates_unique_index(pool: PgPool) {
    let user_id = new_user(&pool, "unique").await;
    let template_id = new_template(&pool, user_id, "Water plants").await;

    TaskRepo::create_instance(&pool, &instance(user_id, template_id, None))
        .await
        .unwrap();
    let err = TaskRepo::create_instance(&pool, &instance(user_id, template_id, None))
        .await
        .unwrap_err();

    match err {
        sqlx::Error::Database(db_err) => {
            assert_eq!(db_err.constraint(), Some("uq_tasks_one_pending_instance"));
        }
        other => panic!("expected database error, got {other:?}"),
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn archive_pending_instances_keeps_the_given_one(pool: PgPool) {
    let user_id = new_user(&pool, "archive").await;
    let template_id = new_template(&pool, user_id, "Water plants").await;

    let first = TaskRepo::create_instance(&pool, &instance(user_id, template_id, None))
        .await
        .unwrap();
    let mut done = first.clone();
    done.status_id = 1;
    TaskRepo::update(&pool, &done).await.unwrap();
    let second = TaskRepo::create_instance(&pool, &instance(user_id, template_id, None))
        .await
        .unwrap();

    let archived = TaskRepo::archive_pending_instances(&pool, template_id, first.id)
        .await
        .unwrap();
    assert_eq!(archived, vec![second.id]);

    let reloaded = TaskRepo::find_by_id(&pool, second.id).await.unwrap().unwrap();
    assert!(reloaded.archived);
}

#[sqlx::test(migrations = "./migrations")]
async fn deleting_template_detaches_instances(pool: PgPool) {
    let user_id = new_user(&pool, "detach").await;
    let template_id = new_template(&pool, user_id, "Water plants").await;
    let inst = TaskRepo::create_instance(&pool, &instance(user_id, template_id, None))
        .await
        .unwrap();

    assert!(TaskRepo::delete_for_user(&pool, user_id, template_id).await.unwrap());

    let reloaded = TaskRepo::find_by_id(&pool, inst.id).await.unwrap().unwrap();
    assert!(reloaded.parent_task_id.is_none());
}

// ---------------------------------------------------------------------------
// Lists and bulk operations
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn list_excludes_templates_and_respects_scope(pool: PgPool) {
    let user_id = new_user(&pool, "lister").await;
    let folder = FolderRepo::create(&pool, user_id, "Home").await.unwrap();

    TaskRepo::create(&pool, user_id, "Unfiled", None).await.unwrap();
    TaskRepo::create(&pool, user_id, "Filed", Some(folder.id)).await.unwrap();
    new_template(&pool, user_id, "Template").await;

    let unfiled = TaskListParams::default();
    let tasks = TaskRepo::list_for_user(&pool, user_id, &unfiled, 20, 0).await.unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].title, "Unfiled");

    let in_folder = TaskListParams {
        folder_id: Some(folder.id),
        ..Default::default()
    };
    let tasks = TaskRepo::list_for_user(&pool, user_id, &in_folder, 20, 0).await.unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].title, "Filed");

    let everything = TaskListParams {
        all: true,
        ..Default::default()
    };
    assert_eq!(TaskRepo::count_for_user(&pool, user_id, &everything).await.unwrap(), 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn archive_and_delete_completed(pool: PgPool) {
    let user_id = new_user(&pool, "bulk").await;
    let mut done = TaskRepo::create(&pool, user_id, "Done", None).await.unwrap();
    done.status_id = 1;
    TaskRepo::update(&pool, &done).await.unwrap();
    TaskRepo::create(&pool, user_id, "Open", None).await.unwrap();

    assert_eq!(TaskRepo::archive_completed(&pool, user_id, TaskScope::All).await.unwrap(), 1);
    assert!(TaskRepo::find_by_id(&pool, done.id).await.unwrap().unwrap().archived);

    assert_eq!(TaskRepo::delete_completed(&pool, user_id, TaskScope::Unfiled).await.unwrap(), 1);
    assert!(TaskRepo::find_by_id(&pool, done.id).await.unwrap().is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn move_completed_skips_open_and_archived_tasks(pool: PgPool) {
    let user_id = new_user(&pool, "mover").await;
    let folder = FolderRepo::create(&pool, user_id, "Done").await.unwrap();

    let mut done = TaskRepo::create(&pool, user_id, "Done", None).await.unwrap();
    done.status_id = 1;
    TaskRepo::update(&pool, &done).await.unwrap();
    let mut hidden = TaskRepo::create(&pool, user_id, "Hidden", None).await.unwrap();
    hidden.status_id = 1;
    hidden.archived = true;
    TaskRepo::update(&pool, &hidden).await.unwrap();
    let open = TaskRepo::create(&pool, user_id, "Open", None).await.unwrap();

    let moved = TaskRepo::move_completed(&pool, user_id, TaskScope::Unfiled, Some(folder.id))
        .await
        .unwrap();
    assert_eq!(moved, 1);
    assert_eq!(folder_of(&pool, done.id).await, Some(folder.id));
    assert_eq!(folder_of(&pool, hidden.id).await, None);
    assert_eq!(folder_of(&pool, open.id).await, None);

    let moved = TaskRepo::move_completed(&pool, user_id, TaskScope::Folder(folder.id), None)
        .await
        .unwrap();
    assert_eq!(moved, 1);
    assert_eq!(folder_of(&pool, done.id).await, None);
}

#[sqlx::test(migrations = "./migrations")]
async fn list_ids_with_status_skips_templates(pool: PgPool) {
    let user_id = new_user(&pool, "ids").await;
    let template_id = new_template(&pool, user_id, "Water plants").await;
    let first = TaskRepo::create(&pool, user_id, "First", None).await.unwrap();
    let second = TaskRepo::create(&pool, user_id, "Second", None).await.unwrap();
    let mut done = TaskRepo::create(&pool, user_id, "Done", None).await.unwrap();
    done.status_id = 1;
    TaskRepo::update(&pool, &done).await.unwrap();

    let pending = TaskRepo::list_ids_with_status(&pool, user_id, TaskScope::All, 0)
        .await
        .unwrap();
    assert_eq!(pending, vec![first.id, second.id]);
    assert!(!pending.contains(&template_id));

    let completed = TaskRepo::list_ids_with_status(&pool, user_id, TaskScope::Unfiled, 1)
        .await
        .unwrap();
    assert_eq!(completed, vec![done.id]);
}

#[sqlx::test(migrations = "./migrations")]
async fn past_due_lists_only_overdue_pending_tasks(pool: PgPool) {
    let user_id = new_user(&pool, "pastdue").await;
    let folder = FolderRepo::create(&pool, user_id, "Work").await.unwrap();

    let mut overdue = TaskRepo::create(&pool, user_id, "Overdue", Some(folder.id)).await.unwrap();
    overdue.due_date = Some(date(2024, 3, 1));
    TaskRepo::update(&pool, &overdue).await.unwrap();

    let mut future = TaskRepo::create(&pool, user_id, "Future", None).await.unwrap();
    future.due_date = Some(date(2024, 4, 1));
    TaskRepo::update(&pool, &future).await.unwrap();

    let rows = TaskRepo::list_past_due(&pool, user_id, date(2024, 3, 10)).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].title, "Overdue");
    assert_eq!(rows[0].folder_name.as_deref(), Some("Work"));
}

#[sqlx::test(migrations = "./migrations")]
async fn update_priority_is_scoped_to_owner(pool: PgPool) {
    let owner = new_user(&pool, "prio").await;
    let other = new_user(&pool, "notprio").await;
    let task = TaskRepo::create(&pool, owner, "Task", None).await.unwrap();

    assert!(TaskRepo::update_priority(&pool, other, task.id, 9).await.unwrap().is_none());
    let updated = TaskRepo::update_priority(&pool, owner, task.id, 9).await.unwrap().unwrap();
    assert_eq!(updated.priority, 9);
}

#[sqlx::test(migrations = "./migrations")]
async fn deleting_folder_unfiles_its_tasks(pool: PgPool) {
    let user_id = new_user(&pool, "folders").await;
    let folder = FolderRepo::create(&pool, user_id, "Errands").await.unwrap();
    let task = TaskRepo::create(&pool, user_id, "Post office", Some(folder.id)).await.unwrap();

    assert_eq!(FolderRepo::list_for_user(&pool, user_id).await.unwrap().len(), 1);
    assert!(FolderRepo::delete(&pool, user_id, folder.id).await.unwrap());

    let reloaded = TaskRepo::find_by_id(&pool, task.id).await.unwrap().unwrap();
    assert!(reloaded.folder_id.is_none());
}
