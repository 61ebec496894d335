//! Application services for task lifecycle orchestration.

mod lifecycle;

pub use lifecycle::{
    CreateTaskRequest, TaskPolicy, TaskService, TaskServiceError, TaskServiceResult,
    UpdateTaskRequest,
};
