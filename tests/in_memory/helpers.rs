//! Shared wiring for in-memory integration tests.

use std::sync::Arc;

use eyre::Result;
use mockable::DefaultClock;
use taskboard::{
    config::AppConfig,
    identity::{
        adapters::memory::InMemoryUserRepository,
        domain::{Role, UserId},
        services::{AccountService, SignUpRequest, TokenService, extract_bearer_token},
    },
    notification::{
        adapters::MockEmailSender,
        services::{DispatchStats, DispatcherWorkers, NotificationDispatcher},
    },
    task::{adapters::memory::InMemoryTaskRepository, services::TaskLifecycleService},
};

/// Password shared by every account the helpers register.
pub const PASSWORD: &str = "integration-password";

/// Account service wired to in-memory adapters.
pub type Accounts = AccountService<InMemoryUserRepository, DefaultClock>;

/// Task service wired to in-memory adapters.
pub type Tasks = TaskLifecycleService<InMemoryTaskRepository, InMemoryUserRepository, DefaultClock>;

/// Configuration with a valid signing secret and small queues.
#[must_use]
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.auth.token_secret = "integration-test-secret-with-enough-bytes".to_owned();
    config.notifications.queue_capacity = 32;
    config.notifications.workers = 2;
    config
}

/// Fully wired application over in-memory adapters.
pub struct TestApp {
    pub accounts: Accounts,
    pub tasks: Tasks,
    pub sender: Arc<MockEmailSender>,
    pub workers: DispatcherWorkers,
}

/// A registered user and the header value that authenticates them.
pub struct Session {
    pub user_id: UserId,
    pub authorization: String,
}

impl Session {
    /// Returns the raw token from the `Authorization` header value.
    ///
    /// # Errors
    ///
    /// Returns an error if the header is not a bearer credential.
    pub fn token(&self) -> Result<&str> {
        Ok(extract_bearer_token(&self.authorization)?)
    }
}

impl TestApp {
    /// Builds the application. Must run inside a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is rejected.
    pub fn build(config: &AppConfig, email: MockEmailSender) -> Result<Self> {
        config.validate()?;
        let clock = Arc::new(DefaultClock);
        let users = Arc::new(InMemoryUserRepository::new());
        let tokens = Arc::new(TokenService::new(&config.auth, Arc::clone(&clock))?);
        let sender = Arc::new(email);
        let (dispatcher, workers) =
            NotificationDispatcher::start(Arc::clone(&sender), &config.notifications);

        let accounts = AccountService::new(Arc::clone(&users), Arc::clone(&tokens), Arc::clone(&clock));
        let tasks = TaskLifecycleService::new(
            Arc::new(InMemoryTaskRepository::new()),
            users,
            tokens,
            dispatcher,
            clock,
        )
        .with_page_limits(config.pagination.limits());

        Ok(Self {
            accounts,
            tasks,
            sender,
            workers,
        })
    }

    /// Builds the application with the default test configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is rejected.
    pub fn start() -> Result<Self> {
        Self::build(&test_config(), MockEmailSender::new())
    }

    /// Registers a user and logs them in.
    ///
    /// # Errors
    ///
    /// Returns an error if sign-up or login fails.
    pub async fn session(&self, username: &str, role: Role) -> Result<Session> {
        let user = self
            .accounts
            .sign_up(SignUpRequest::new(username, PASSWORD, role))
            .await?;
        let access = self.accounts.login(username, PASSWORD).await?;
        Ok(Session {
            user_id: user.id(),
            authorization: format!("Bearer {}", access.access_token),
        })
    }

    /// Drops every dispatcher handle, waits for queued notifications, and
    /// returns the sender with the final dispatch counters.
    pub async fn shutdown(self) -> (Arc<MockEmailSender>, DispatchStats) {
        let Self {
            tasks,
            sender,
            workers,
            ..
        } = self;
        drop(tasks);
        let stats = workers.join().await;
        (sender, stats)
    }
}
