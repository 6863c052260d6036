//! Application services for task operations.

mod lifecycle;

pub use lifecycle::{
    NewTaskRequest, PageQuery, TaskLifecycleError, TaskLifecycleResult, TaskLifecycleService,
    UpdateTaskRequest,
};
