//! Integration tests for sign-up, login, and bearer authentication.

use super::helpers::{PASSWORD, TestApp, test_config};
use eyre::{Result, ensure};
use rstest::rstest;
use taskboard::{
    api::HttpError,
    identity::{
        domain::Role,
        services::{AccountError, SignUpRequest},
    },
    notification::adapters::MockEmailSender,
    task::{
        domain::TaskFilter,
        services::{PageQuery, TaskLifecycleError},
    },
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn login_token_authenticates_task_requests() -> Result<()> {
    let app = TestApp::start()?;
    let session = app.session("erin", Role::Developer).await?;

    let page = app
        .tasks
        .list_tasks(session.token()?, TaskFilter::new(), PageQuery::default())
        .await?;

    ensure!(page.items().is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn duplicate_sign_up_is_a_conflict() -> Result<()> {
    let app = TestApp::start()?;
    app.session("frank", Role::Manager).await?;

    let Err(error) = app
        .accounts
        .sign_up(SignUpRequest::new("frank", PASSWORD, Role::Admin))
        .await
    else {
        eyre::bail!("second sign-up with the same username succeeded");
    };

    assert_eq!(error.status_code(), 409);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn wrong_password_is_unauthorized() -> Result<()> {
    let app = TestApp::start()?;
    app.session("grace", Role::Admin).await?;

    let result = app.accounts.login("grace", "not-the-password").await;

    ensure!(matches!(&result, Err(AccountError::InvalidCredentials)));
    ensure!(result.err().is_some_and(|error| error.status_code() == 401));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn short_password_is_a_bad_request() -> Result<()> {
    let app = TestApp::start()?;

    let result = app
        .accounts
        .sign_up(SignUpRequest::new("heidi", "short", Role::Developer))
        .await;

    ensure!(result.err().is_some_and(|error| error.status_code() == 400));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn token_from_another_deployment_is_rejected() -> Result<()> {
    let app = TestApp::start()?;
    let mut other_config = test_config();
    other_config.auth.token_secret = "another-deployment-secret-that-is-long".to_owned();
    let other = TestApp::build(&other_config, MockEmailSender::new())?;
    let foreign = other.session("ivan", Role::Admin).await?;

    let result = app
        .tasks
        .list_tasks(foreign.token()?, TaskFilter::new(), PageQuery::default())
        .await;

    assert_eq!(result.map(|page| page.items().len()), Err(TaskLifecycleError::Unauthorized));
    Ok(())
}
