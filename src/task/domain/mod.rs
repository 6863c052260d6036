//! Domain model for tasks, their status lifecycle, and listings.
//!
//! Everything here is a value computation: transitions return new task
//! values and notification events, and paging works over plain slices.
//! Persistence stays behind the [`ports`](crate::task::ports) boundary.

mod error;
mod event;
mod ids;
mod page;
mod status;
mod task;

pub use error::{ParseTaskStatusError, TaskDomainError};
pub use event::{NotificationEvent, StatusTransition};
pub use ids::{TaskId, TaskTitle};
pub use page::{Page, PageError, PageLimits, PageRequest, TaskFilter, listing_order, paginate};
pub use status::{ALLOWED_TRANSITIONS, TaskStatus};
pub use task::{NewTask, PersistedTaskData, Task, TaskChanges};
