//! Shared world state for task status change BDD scenarios.

use std::collections::HashMap;
use std::sync::Arc;

use eyre::{Result, eyre};
use mockable::DefaultClock;
use rstest::fixture;
use taskboard::{
    config::AppConfig,
    identity::{
        adapters::memory::InMemoryUserRepository,
        domain::UserId,
        services::{AccountService, TokenService},
    },
    notification::{adapters::MockEmailSender, services::NotificationDispatcher},
    task::{
        adapters::memory::InMemoryTaskRepository,
        domain::{Task, TaskId},
        services::{TaskLifecycleError, TaskLifecycleService},
    },
};

/// Password used for every scenario account.
pub const PASSWORD: &str = "scenario-password";

/// Task service type used by the BDD world.
pub type ScenarioTasks =
    TaskLifecycleService<InMemoryTaskRepository, InMemoryUserRepository, DefaultClock>;

/// Services wired over in-memory adapters.
pub struct ScenarioApp {
    pub accounts: AccountService<InMemoryUserRepository, DefaultClock>,
    pub tasks: ScenarioTasks,
    pub sender: Arc<MockEmailSender>,
}

impl ScenarioApp {
    fn start() -> Result<Self> {
        let mut config = AppConfig::default();
        config.auth.token_secret = "scenario-signing-secret-with-enough-bytes".to_owned();
        config.validate()?;

        let clock = Arc::new(DefaultClock);
        let users = Arc::new(InMemoryUserRepository::new());
        let tokens = Arc::new(TokenService::new(&config.auth, Arc::clone(&clock))?);
        let sender = Arc::new(MockEmailSender::new());
        // Workers stop once the last dispatcher handle is dropped with the world.
        let (dispatcher, _workers) =
            NotificationDispatcher::start(Arc::clone(&sender), &config.notifications);

        Ok(Self {
            accounts: AccountService::new(Arc::clone(&users), Arc::clone(&tokens), Arc::clone(&clock)),
            tasks: TaskLifecycleService::new(
                Arc::new(InMemoryTaskRepository::new()),
                users,
                tokens,
                dispatcher,
                clock,
            ),
            sender,
        })
    }
}

/// Registered scenario user.
#[derive(Debug, Clone)]
pub struct Account {
    pub user_id: UserId,
    pub token: String,
}

/// Scenario world for task status behaviour tests.
#[derive(Default)]
pub struct TaskStatusWorld {
    app: Option<Arc<ScenarioApp>>,
    pub accounts: HashMap<String, Account>,
    pub task_id: Option<TaskId>,
    pub task_author: Option<String>,
    pub last_result: Option<Result<Task, TaskLifecycleError>>,
}

impl TaskStatusWorld {
    /// Returns the wired services, starting them on first use.
    ///
    /// Steps run inside the scenario's tokio runtime, which the dispatcher
    /// workers need.
    pub fn app(&mut self) -> Result<Arc<ScenarioApp>> {
        if let Some(app) = &self.app {
            return Ok(Arc::clone(app));
        }
        let app = Arc::new(ScenarioApp::start()?);
        self.app = Some(Arc::clone(&app));
        Ok(app)
    }

    /// Looks up a registered account by username.
    pub fn account(&self, username: &str) -> Result<Account> {
        self.accounts
            .get(username)
            .cloned()
            .ok_or_else(|| eyre!("no account named {username} in scenario world"))
    }

    /// Returns the task created by the scenario.
    pub fn task_id(&self) -> Result<TaskId> {
        self.task_id
            .ok_or_else(|| eyre!("missing created task in scenario world"))
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> TaskStatusWorld {
    TaskStatusWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
