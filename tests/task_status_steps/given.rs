//! Given steps for task status change BDD scenarios.

use super::world::{Account, PASSWORD, TaskStatusWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use taskboard::{
    identity::{domain::Role, services::SignUpRequest},
    task::services::NewTaskRequest,
};

#[given(r#"a {role_name} named "{username}""#)]
fn registered_user(
    world: &mut TaskStatusWorld,
    role_name: String,
    username: String,
) -> Result<(), eyre::Report> {
    let role = Role::try_from(role_name.as_str())
        .map_err(|err| eyre::eyre!("invalid role in scenario: {err}"))?;
    let app = world.app()?;

    let user = run_async(
        app.accounts
            .sign_up(SignUpRequest::new(username.as_str(), PASSWORD, role)),
    )
    .wrap_err("sign up scenario user")?;
    let access = run_async(app.accounts.login(&username, PASSWORD))
        .wrap_err("log in scenario user")?;

    world.accounts.insert(
        username,
        Account {
            user_id: user.id(),
            token: access.access_token,
        },
    );
    Ok(())
}

#[given(r#""{author}" created a task "{title}" for "{owner}""#)]
fn created_owned_task(
    world: &mut TaskStatusWorld,
    author: String,
    title: String,
    owner: String,
) -> Result<(), eyre::Report> {
    let owner_id = world.account(&owner)?.user_id;
    create_task(
        world,
        author,
        NewTaskRequest::new(title).with_responsible_user(owner_id),
    )
}

#[given(r#""{author}" created an unowned task "{title}""#)]
fn created_unowned_task(
    world: &mut TaskStatusWorld,
    author: String,
    title: String,
) -> Result<(), eyre::Report> {
    create_task(world, author, NewTaskRequest::new(title))
}

fn create_task(
    world: &mut TaskStatusWorld,
    author: String,
    request: NewTaskRequest,
) -> Result<(), eyre::Report> {
    let token = world.account(&author)?.token;
    let app = world.app()?;
    let task = run_async(app.tasks.create_task(&token, request))
        .wrap_err("create task for status scenario")?;
    world.task_id = Some(task.id());
    world.task_author = Some(author);
    Ok(())
}
