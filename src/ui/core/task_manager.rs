use crate::api::ApiOutcome;
use std::collections::HashMap;
use std::future::Future;
use tokio::task::JoinHandle;

pub type TaskId = u64;

#[derive(Debug)]
pub struct BackgroundTask {
    pub id: TaskId,
    pub handle: JoinHandle<ApiOutcome>,
    pub description: String,
    pub started_at: std::time::Instant,
}

/// Tracks API requests running in the background.
///
/// Requests are never aborted: one that outlives the view still delivers its
/// terminal event to the store.
pub struct TaskManager {
    tasks: HashMap<TaskId, BackgroundTask>,
    next_task_id: TaskId,
}

impl TaskManager {
    pub fn new() -> Self {
        Self {
            tasks: HashMap::new(),
            next_task_id: 1,
        }
    }

    /// Spawn a request as an independent task
    pub fn spawn_request<Fut>(&mut self, description: String, request: Fut) -> TaskId
    where
        Fut: Future<Output = ApiOutcome> + Send + 'static,
    {
        let task_id = self.next_task_id;
        self.next_task_id += 1;

        log::debug!("Task {}: {}", task_id, description);
        let task = BackgroundTask {
            id: task_id,
            handle: tokio::spawn(request),
            description,
            started_at: std::time::Instant::now(),
        };

        self.tasks.insert(task_id, task);
        task_id
    }

    /// Forget finished tasks and report what they were
    pub fn cleanup_finished_tasks(&mut self) -> Vec<(TaskId, String)> {
        let finished: Vec<TaskId> = self
            .tasks
            .iter()
            .filter(|(_, task)| task.handle.is_finished())
            .map(|(id, _)| *id)
            .collect();

        finished
            .into_iter()
            .filter_map(|id| self.tasks.remove(&id))
            .map(|task| {
                log::debug!(
                    "Task {} finished after {:?}: {}",
                    task.id,
                    task.started_at.elapsed(),
                    task.description
                );
                (task.id, task.description)
            })
            .collect()
    }

    /// Get the number of active tasks
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }
}

impl Default for TaskManager {
    fn default() -> Self {
        Self::new()
    }
}
