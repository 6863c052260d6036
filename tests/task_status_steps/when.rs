//! When steps for task status change BDD scenarios.

use super::world::{TaskStatusWorld, run_async};
use rstest_bdd_macros::when;
use taskboard::task::domain::TaskStatus;

#[when(r#""{username}" moves the task to "{status}""#)]
fn move_task(
    world: &mut TaskStatusWorld,
    username: String,
    status: String,
) -> Result<(), eyre::Report> {
    let requested = TaskStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid status in scenario: {err}"))?;
    let token = world.account(&username)?.token;
    let task_id = world.task_id()?;
    let app = world.app()?;

    let result = run_async(app.tasks.change_task_status(&token, task_id, requested));
    world.last_result = Some(result);
    Ok(())
}
