//! Integration tests for authorised task operations.

use super::helpers::{TestApp, test_config};
use eyre::{Result, ensure};
use rstest::rstest;
use taskboard::{
    api::HttpError,
    identity::domain::Role,
    notification::adapters::MockEmailSender,
    task::{
        domain::{Task, TaskFilter, TaskId, TaskStatus},
        services::{NewTaskRequest, PageQuery, TaskLifecycleError, UpdateTaskRequest},
    },
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn task_walks_the_full_workflow() -> Result<()> {
    let app = TestApp::start()?;
    let manager = app.session("mona", Role::Manager).await?;
    let developer = app.session("dan", Role::Developer).await?;

    let task = app
        .tasks
        .create_task(
            manager.token()?,
            NewTaskRequest::new("Release 1.0").with_responsible_user(developer.user_id),
        )
        .await?;
    for status in [
        TaskStatus::InProgress,
        TaskStatus::Blocked,
        TaskStatus::InProgress,
        TaskStatus::Done,
    ] {
        let updated = app
            .tasks
            .change_task_status(developer.token()?, task.id(), status)
            .await?;
        assert_eq!(updated.status(), status);
    }

    let reopen = app
        .tasks
        .change_task_status(manager.token()?, task.id(), TaskStatus::InProgress)
        .await;
    ensure!(reopen.as_ref().err().is_some_and(|error| error.status_code() == 409));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn forbidden_status_change_leaves_task_untouched() -> Result<()> {
    let app = TestApp::start()?;
    let manager = app.session("mona", Role::Manager).await?;
    let owner = app.session("dan", Role::Developer).await?;
    let intruder = app.session("eve", Role::Developer).await?;
    let task = app
        .tasks
        .create_task(
            manager.token()?,
            NewTaskRequest::new("Guarded").with_responsible_user(owner.user_id),
        )
        .await?;

    let result = app
        .tasks
        .change_task_status(intruder.token()?, task.id(), TaskStatus::Cancelled)
        .await;

    assert_eq!(result, Err(TaskLifecycleError::Forbidden));
    let stored = app.tasks.get_task(owner.token()?, task.id()).await?;
    assert_eq!(stored, task);
    let (sender, stats) = app.shutdown().await;
    ensure!(sender.sent().is_empty());
    assert_eq!(stats.enqueued, 0);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn racing_status_changes_admit_exactly_one() -> Result<()> {
    let app = TestApp::start()?;
    let admin = app.session("ada", Role::Admin).await?;
    let task = app
        .tasks
        .create_task(admin.token()?, NewTaskRequest::new("Contended"))
        .await?;

    let handles: Vec<_> = [TaskStatus::InProgress; 4]
        .into_iter()
        .map(|status| {
            let tasks = app.tasks.clone();
            let owned_token = admin.token().map(str::to_owned);
            let id = task.id();
            tokio::spawn(async move {
                let token = owned_token?;
                Ok::<_, eyre::Report>(tasks.change_task_status(&token, id, status).await)
            })
        })
        .collect();

    let mut successes = 0;
    for handle in handles {
        match handle.await?? {
            Ok(_) => successes += 1,
            Err(TaskLifecycleError::Conflict(_)) => {}
            Err(other) => eyre::bail!("unexpected error: {other}"),
        }
    }
    assert_eq!(successes, 1);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn listing_walks_pages_without_gaps() -> Result<()> {
    let app = TestApp::start()?;
    let manager = app.session("mona", Role::Manager).await?;
    let mut created: Vec<TaskId> = Vec::new();
    for index in 0..7 {
        let task = app
            .tasks
            .create_task(manager.token()?, NewTaskRequest::new(format!("Item {index}")))
            .await?;
        created.push(task.id());
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    }

    let mut seen: Vec<TaskId> = Vec::new();
    let mut offset = 0;
    loop {
        let page = app
            .tasks
            .list_tasks(
                manager.token()?,
                TaskFilter::new(),
                PageQuery::Offset {
                    limit: Some(3),
                    offset,
                },
            )
            .await?;
        seen.extend(page.items().iter().map(Task::id));
        if !page.has_more() {
            break;
        }
        offset += 3;
    }

    assert_eq!(seen, created);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn filters_narrow_listing() -> Result<()> {
    let app = TestApp::start()?;
    let manager = app.session("mona", Role::Manager).await?;
    let developer = app.session("dan", Role::Developer).await?;
    let mine = app
        .tasks
        .create_task(
            manager.token()?,
            NewTaskRequest::new("Mine").with_responsible_user(developer.user_id),
        )
        .await?;
    app.tasks
        .create_task(manager.token()?, NewTaskRequest::new("Not mine"))
        .await?;
    app.tasks
        .change_task_status(developer.token()?, mine.id(), TaskStatus::InProgress)
        .await?;

    let by_owner = app
        .tasks
        .list_tasks(
            developer.token()?,
            TaskFilter::new().with_responsible_user(developer.user_id),
            PageQuery::default(),
        )
        .await?;
    let open = app
        .tasks
        .list_tasks(
            developer.token()?,
            TaskFilter::new().with_status(TaskStatus::Open),
            PageQuery::default(),
        )
        .await?;

    assert_eq!(by_owner.items().len(), 1);
    assert_eq!(by_owner.items().first().map(Task::id), Some(mine.id()));
    assert_eq!(open.items().len(), 1);
    ensure!(open.items().iter().all(|task| task.title().as_str() == "Not mine"));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn page_size_is_capped_by_configuration() -> Result<()> {
    let mut config = test_config();
    config.pagination.default_page_size = 2;
    config.pagination.max_page_size = 3;
    let app = TestApp::build(&config, MockEmailSender::new())?;
    let manager = app.session("mona", Role::Manager).await?;
    for index in 0..5 {
        app.tasks
            .create_task(manager.token()?, NewTaskRequest::new(format!("Row {index}")))
            .await?;
    }

    let default_page = app
        .tasks
        .list_tasks(manager.token()?, TaskFilter::new(), PageQuery::default())
        .await?;
    let capped = app
        .tasks
        .list_tasks(
            manager.token()?,
            TaskFilter::new(),
            PageQuery::Offset {
                limit: Some(50),
                offset: 0,
            },
        )
        .await?;

    assert_eq!(default_page.items().len(), 2);
    assert_eq!(capped.items().len(), 3);
    assert_eq!(capped.limit(), 3);
    ensure!(capped.has_more());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn admin_may_do_everything_a_developer_may_not() -> Result<()> {
    let app = TestApp::start()?;
    let admin = app.session("ada", Role::Admin).await?;
    let developer = app.session("dan", Role::Developer).await?;
    let task = app
        .tasks
        .create_task(admin.token()?, NewTaskRequest::new("Admin owned"))
        .await?;

    let edit = app
        .tasks
        .update_task(
            developer.token()?,
            task.id(),
            UpdateTaskRequest::new().with_priority(1),
        )
        .await;
    let delete = app.tasks.delete_task(developer.token()?, task.id()).await;
    ensure!(matches!(edit, Err(TaskLifecycleError::Forbidden)));
    ensure!(matches!(delete, Err(TaskLifecycleError::Forbidden)));

    app.tasks
        .update_task(
            admin.token()?,
            task.id(),
            UpdateTaskRequest::new().with_responsible_user(Some(developer.user_id)),
        )
        .await?;
    let reassigned = app
        .tasks
        .update_task(
            developer.token()?,
            task.id(),
            UpdateTaskRequest::new().with_description(Some("picked up".to_owned())),
        )
        .await?;
    assert_eq!(reassigned.description(), Some("picked up"));

    app.tasks.delete_task(admin.token()?, task.id()).await?;
    let gone = app.tasks.get_task(admin.token()?, task.id()).await;
    ensure!(gone.err().is_some_and(|error| error.status_code() == 404));
    Ok(())
}
