//! Priority-ordered reminder queue with optimistic inserts.


use stride_core::{
    links::LinkResolver,
    model::{InverseAction, Priority, QueueSnapshot, ReminderTask, TaskId},
};
use tracing::debug;

/// Reminders ordered by priority, highest first. Equal priorities keep
/// insertion order.
///
/// Tasks inserted locally stay `Pending` until [`ReminderQueue::confirm`]
/// is called; pending tasks survive a [`ReminderQueue::merge`].
#[derive(Debug, Default)]
pub struct ReminderQueue {
    tasks: Vec<ReminderTask>,
    next_id: u64,
}

impl ReminderQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out the next session-local task id.
    pub fn allocate_id(&mut self) -> TaskId {
        self.next_id += 1;
        TaskId(self.next_id)
    }

    /// Insert keeping the order invariant. Returns the ordered view.
    pub fn insert(&mut self, task: ReminderTask) -> &[ReminderTask] {
        // First slot holding a strictly lower priority: the new task lands
        // after every existing task of the same priority.
        let pos = self
            .tasks
            .iter()
            .position(|t| t.priority() < task.priority())
            .unwrap_or(self.tasks.len());
        self.tasks.insert(pos, task);
        &self.tasks
    }

    /// Replace contents with the authoritative snapshot, then re-apply every
    /// still-pending local task on top. Returns how many were re-applied.
    pub fn merge(&mut self, snapshot: &QueueSnapshot, links: &LinkResolver) -> usize {
        let pending: Vec<ReminderTask> = self
            .tasks
            .drain(..)
            .filter(ReminderTask::is_pending)
            .collect();

        for (priority, text) in snapshot.entries() {
            let id = self.allocate_id();
            self.tasks
                .push(ReminderTask::confirmed(id, *priority, text, links));
        }
        // Snapshot rows arrive sorted; a stable sort guards against a store
        // that does not honour that.
        self.tasks.sort_by(|a, b| b.priority().cmp(&a.priority()));

        let reapplied = pending.len();
        for task in pending {
            self.insert(task);
        }
        debug!(
            "queue merge: {} remote, {} pending re-applied",
            snapshot.len(),
            reapplied
        );
        reapplied
    }

    /// Mark a pending task as acknowledged by the remote store.
    pub fn confirm(&mut self, id: TaskId) -> bool {
        match self.tasks.iter_mut().find(|t| t.id() == id) {
            Some(task) => {
                task.mark_confirmed();
                true
            }
            None => false,
        }
    }

    /// Remove a task by id. Used to roll back a failed optimistic insert.
    pub fn remove(&mut self, id: TaskId) -> Option<ReminderTask> {
        let pos = self.tasks.iter().position(|t| t.id() == id)?;
        Some(self.tasks.remove(pos))
    }

    /// Find the task an [`InverseAction`] would remove. Among identical
    /// reminders the latest in queue order wins, as it is the most recently
    /// added one.
    pub fn locate(&self, inverse: &InverseAction) -> Option<&ReminderTask> {
        match inverse {
            InverseAction::RemoveReminder { priority, text } => self
                .tasks
                .iter()
                .rev()
                .find(|t| t.priority() == *priority && t.text() == text),
        }
    }

    pub fn get(&self, id: TaskId) -> Option<&ReminderTask> {
        self.tasks.iter().find(|t| t.id() == id)
    }

    /// Most urgent task.
    pub fn peek(&self) -> Option<&ReminderTask> {
        self.tasks.first()
    }

    pub fn view(&self) -> &[ReminderTask] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.is_pending()).count()
    }

    /// `(priority, text)` pairs in view order.
    pub fn rows(&self) -> Vec<(Priority, String)> {
        self.tasks
            .iter()
            .map(|t| (t.priority(), t.text().to_string()))
            .collect()
    }
}
