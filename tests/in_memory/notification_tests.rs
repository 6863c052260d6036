//! Integration tests for status-change notifications.

use super::helpers::{TestApp, test_config};
use eyre::{Result, bail, ensure};
use rstest::rstest;
use std::time::Duration;
use taskboard::{
    identity::domain::Role,
    notification::adapters::MockEmailSender,
    task::{domain::TaskStatus, services::NewTaskRequest},
};

const WAIT: Duration = Duration::from_secs(5);

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn responsible_user_is_emailed_about_each_change() -> Result<()> {
    let app = TestApp::start()?;
    let manager = app.session("mona", Role::Manager).await?;
    let developer = app.session("dan", Role::Developer).await?;
    let task = app
        .tasks
        .create_task(
            manager.token()?,
            NewTaskRequest::new("Migrate DB").with_responsible_user(developer.user_id),
        )
        .await?;

    app.tasks
        .change_task_status(manager.token()?, task.id(), TaskStatus::InProgress)
        .await?;
    app.tasks
        .change_task_status(developer.token()?, task.id(), TaskStatus::Done)
        .await?;
    let (sender, _) = app.shutdown().await;

    let sent = sender.sent();
    ensure!(sent.len() == 2, "expected two emails, got {}", sent.len());
    ensure!(sent.iter().all(|email| email.recipient == developer.user_id));
    ensure!(sent.iter().all(|email| email.to == "dan@example.com"));
    let mut bodies: Vec<&str> = sent.iter().map(|email| email.message.body.as_str()).collect();
    bodies.sort_unstable();
    assert_eq!(
        bodies,
        [
            "Dear dan,\n\nThe status of the task 'Migrate DB' has been changed from in_progress to done.",
            "Dear dan,\n\nThe status of the task 'Migrate DB' has been changed from open to in_progress.",
        ]
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn email_arrives_without_shutting_down() -> Result<()> {
    let app = TestApp::start()?;
    let admin = app.session("ada", Role::Admin).await?;
    let task = app
        .tasks
        .create_task(
            admin.token()?,
            NewTaskRequest::new("Quick one").with_responsible_user(admin.user_id),
        )
        .await?;

    app.tasks
        .change_task_status(admin.token()?, task.id(), TaskStatus::Cancelled)
        .await?;

    let sent = app.sender.wait_for(1, WAIT).await;
    let Some(email) = sent.first() else {
        bail!("no email was delivered");
    };
    assert_eq!(email.message.subject, "Task 'Quick one' status updated");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unowned_task_sends_nothing() -> Result<()> {
    let app = TestApp::start()?;
    let manager = app.session("mona", Role::Manager).await?;
    let task = app
        .tasks
        .create_task(manager.token()?, NewTaskRequest::new("Floating"))
        .await?;

    app.tasks
        .change_task_status(manager.token()?, task.id(), TaskStatus::InProgress)
        .await?;
    let (sender, stats) = app.shutdown().await;

    assert_eq!(stats.enqueued, 0);
    ensure!(sender.sent().is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failing_sender_never_fails_the_request() -> Result<()> {
    let app = TestApp::build(&test_config(), MockEmailSender::failing())?;
    let manager = app.session("mona", Role::Manager).await?;
    let developer = app.session("dan", Role::Developer).await?;
    let task = app
        .tasks
        .create_task(
            manager.token()?,
            NewTaskRequest::new("Flaky mail").with_responsible_user(developer.user_id),
        )
        .await?;

    let updated = app
        .tasks
        .change_task_status(developer.token()?, task.id(), TaskStatus::InProgress)
        .await?;
    let (sender, stats) = app.shutdown().await;

    assert_eq!(updated.status(), TaskStatus::InProgress);
    ensure!(sender.sent().is_empty());
    assert_eq!(stats.failed, 1);
    Ok(())
}
