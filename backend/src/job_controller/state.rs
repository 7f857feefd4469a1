//! Manages the state of background debug tasks.
//!
//! `POST /api/debug/api` renders prompts outside the request/response cycle.
//! The caller gets a task ID right away and either polls
//! `GET /api/tasks/{task_id}` or, when it supplied a notification URL, waits
//! for the final state to be delivered to it.
//!
//! The main components are:
//! - `TasksState`: a clonable, thread-safe handle on every known task, shared
//!   with the Actix application as `web::Data`.
//! - `TaskUpdate`: a message carrying a task's new state from a worker to the
//!   updater.
//! - `start_task_updater`: a long-running task that applies `TaskUpdate`s to
//!   the shared map and prunes finished tasks once their retention expired.

use common::jobs::TaskState;
use std::time::Duration;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{mpsc, RwLock};
use tokio::time::Instant;

/// How long a finished task stays readable unless configured otherwise.
pub const DEFAULT_RETENTION: Duration = Duration::from_secs(600);

const MAX_PRUNE_PERIOD: Duration = Duration::from_secs(60);
const MIN_PRUNE_PERIOD: Duration = Duration::from_millis(10);

/// One entry of the task map.
#[derive(Debug, Clone)]
pub struct TrackedTask {
    pub state: TaskState,
    /// When the task reached `completed` or `failed`.
    pub finished_at: Option<Instant>,
}

impl TrackedTask {
    fn new(state: TaskState) -> Self {
        let finished_at = state.status.is_terminal().then(Instant::now);
        Self { state, finished_at }
    }

    fn expired(&self, now: Instant, retention: Duration) -> bool {
        self.finished_at
            .is_some_and(|finished| now.duration_since(finished) >= retention)
    }
}

/// A thread-safe, shareable container for the state of all background tasks.
#[derive(Clone)]
pub struct TasksState {
    /// Task ID to its latest state. Reads come from the status endpoint,
    /// writes from `register` and the updater task.
    pub tasks: Arc<RwLock<HashMap<String, TrackedTask>>>,

    /// Sender side of the update channel. Workers push `TaskUpdate`s here
    /// instead of writing to `tasks` directly.
    pub tx: mpsc::Sender<TaskUpdate>,

    /// Finished tasks older than this are removed by the updater.
    pub retention: Duration,
}

/// A status update for one background task.
#[derive(Debug)]
pub struct TaskUpdate {
    pub(crate) task_id: String,
    pub(crate) state: TaskState,
}

impl TasksState {
    /// Creates the shared state with the default retention.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(capacity: usize) -> Self {
        Self::start_with_retention(capacity, DEFAULT_RETENTION)
    }

    /// Creates the shared state and spawns the updater consuming its channel.
    pub fn start_with_retention(capacity: usize, retention: Duration) -> Self {
        let (tx, rx) = mpsc::channel(capacity);
        let state = TasksState {
            tasks: Arc::new(RwLock::new(HashMap::new())),
            tx,
            retention,
        };
        let updater_state = state.clone();
        tokio::spawn(async move {
            start_task_updater(updater_state, rx).await;
        });
        state
    }

    /// Registers a new task as `pending` and returns its ID.
    pub async fn register(&self) -> String {
        let task_id = uuid::Uuid::new_v4().to_string();
        self.tasks.write().await.insert(
            task_id.clone(),
            TrackedTask::new(TaskState::pending(&task_id)),
        );
        task_id
    }

    pub async fn get(&self, task_id: &str) -> Option<TaskState> {
        self.tasks
            .read()
            .await
            .get(task_id)
            .map(|task| task.state.clone())
    }

    /// Queues a state change for the updater.
    pub async fn report(&self, state: TaskState) {
        let update = TaskUpdate {
            task_id: state.task_id.clone(),
            state,
        };
        if let Err(err) = self.tx.send(update).await {
            log::error!("task updater is gone, dropping update: {}", err);
        }
    }

    /// Removes finished tasks whose retention has passed; returns how many.
    pub async fn prune(&self) -> usize {
        let now = Instant::now();
        let mut tasks = self.tasks.write().await;
        let before = tasks.len();
        tasks.retain(|_, task| !task.expired(now, self.retention));
        before - tasks.len()
    }
}

/// Applies every `TaskUpdate` received on `rx` to the shared map and
/// periodically prunes expired tasks.
///
/// Spawned once by [`TasksState::start_with_retention`].
pub async fn start_task_updater(state: TasksState, mut rx: mpsc::Receiver<TaskUpdate>) {
    let period = state.retention.clamp(MIN_PRUNE_PERIOD, MAX_PRUNE_PERIOD);
    let mut prune_tick = tokio::time::interval(period);

    loop {
        tokio::select! {
            update = rx.recv() => {
                let Some(update) = update else { break };
                log::debug!("task {} is now {:?}", update.task_id, update.state.status);
                let mut tasks = state.tasks.write().await;
                tasks.insert(update.task_id, TrackedTask::new(update.state));
            }
            _ = prune_tick.tick() => {
                let removed = state.prune().await;
                if removed > 0 {
                    log::debug!("pruned {} finished task(s)", removed);
                }
            }
        }
    }
}
