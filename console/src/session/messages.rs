use common::jobs::TaskState;

/// Events fed to `update` by the chat and api drivers.
#[derive(Clone, Debug, PartialEq)]
pub enum Msg {
    /// The user sent a message; `text` is what the dialog rendered for it.
    Send(String),
    /// One streamed content chunk.
    Chunk(String),
    /// The stream closed or delivered its `[DONE]` sentinel.
    StreamEnd,
    /// The api endpoint answered synchronously with a result.
    ApiResult(String),
    /// The api endpoint scheduled a background task.
    TaskStarted(String),
    /// The api endpoint scheduled a task whose result goes to a notify URL.
    TaskDelegated { task_id: String, notify_url: String },
    /// Polling observed the task's final state.
    TaskFinished(TaskState),
    Failed(String),
    /// Clears the conversation and returns to `Idle`.
    Reset,
}
