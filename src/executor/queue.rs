//! Priority Batch Queue
//!
//! A min-heap of `ScheduledTask`s behind a single lock. Heap operations are not independently
//! composable, so `push`, `peek` and `pop` all take the same mutex.
//!
//! Ordering is strict priority first, then enqueue time, then push order. There is no
//! starvation avoidance: a steady stream of HIGH tasks keeps LOW tasks waiting indefinitely.

use super::types::ScheduledTask;

use parking_lot::Mutex;
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::time::Duration;
use tokio::sync::Notify;

#[derive(Default)]
struct QueueState {
    heap: BinaryHeap<Reverse<ScheduledTask>>,
    next_sequence: u64,
}

#[derive(Default)]
pub struct BatchQueue {
    state: Mutex<QueueState>,
    /// Signalled on every push so an idle worker wakes before its poll interval runs out.
    pushed: Notify,
}

impl BatchQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a task in O(log n). The queue stamps it with the next sequence number.
    pub fn push(&self, mut task: ScheduledTask) {
        {
            let mut state = self.state.lock();
            task.sequence = state.next_sequence;
            state.next_sequence += 1;

            tracing::trace!(
                "Queued batch {} (rank {}, seq {})",
                task.batch_id,
                task.priority_rank,
                task.sequence
            );
            state.heap.push(Reverse(task));
        }

        self.pushed.notify_one();
    }

    /// Pushes several tasks under one lock acquisition, preserving the given order.
    pub fn push_all<I>(&self, tasks: I)
    where
        I: IntoIterator<Item = ScheduledTask>,
    {
        {
            let mut state = self.state.lock();
            for mut task in tasks {
                task.sequence = state.next_sequence;
                state.next_sequence += 1;
                state.heap.push(Reverse(task));
            }
        }

        self.pushed.notify_one();
    }

    /// Returns the head task without removing it.
    pub fn peek(&self) -> Option<ScheduledTask> {
        self.state.lock().heap.peek().map(|Reverse(task)| task.clone())
    }

    /// Removes and returns the head task.
    pub fn pop(&self) -> Option<ScheduledTask> {
        self.state.lock().heap.pop().map(|Reverse(task)| task)
    }

    /// Removes exactly `task`, wherever it sits in the heap.
    ///
    /// The worker pops the task it processed through this, since a higher-priority push
    /// during processing may have replaced it at the head.
    pub fn remove(&self, task: &ScheduledTask) -> bool {
        let mut state = self.state.lock();

        if state.heap.peek().is_some_and(|Reverse(head)| head == task) {
            state.heap.pop();
            return true;
        }

        let before = state.heap.len();
        state.heap.retain(|Reverse(queued)| queued != task);
        state.heap.len() != before
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().heap.is_empty()
    }

    pub fn len(&self) -> usize {
        self.state.lock().heap.len()
    }

    /// Waits until something is pushed or `timeout` elapses, whichever comes first.
    pub async fn wait_for_push(&self, timeout: Duration) {
        let _ = tokio::time::timeout(timeout, self.pushed.notified()).await;
    }
}
