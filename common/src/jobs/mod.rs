use serde::{Deserialize, Serialize};

/// Lifecycle of a background debug task, as reported by `GET /api/tasks/{task_id}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl TaskStatus {
    /// `completed` and `failed` end polling.
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TaskState {
    pub task_id: String,
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TaskState {
    pub fn pending(task_id: &str) -> Self {
        Self {
            task_id: task_id.to_string(),
            status: TaskStatus::Pending,
            result: None,
            error: None,
        }
    }

    pub fn completed(task_id: &str, result: String) -> Self {
        Self {
            status: TaskStatus::Completed,
            result: Some(result),
            ..Self::pending(task_id)
        }
    }

    pub fn failed(task_id: &str, error: String) -> Self {
        Self {
            status: TaskStatus::Failed,
            error: Some(error),
            ..Self::pending(task_id)
        }
    }
}
