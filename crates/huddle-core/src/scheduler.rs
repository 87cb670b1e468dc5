//! Deferred work. Send-later deliveries and standup finishes run as
//! spawned tasks; each is keyed so it can be cancelled when its subject
//! disappears (a removed DM aborts the deliveries scheduled into it).

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::AbortHandle;
use tracing::debug;

use huddle_types::models::{ChannelId, ChatRef, MessageId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKey {
    /// A send-later delivery, keyed by the id reserved at scheduling time.
    Message { chat: ChatRef, id: MessageId },
    /// A standup finish. At most one per channel can be live.
    Standup { channel: ChannelId },
}

/// Registry of pending deferred tasks.
#[derive(Default)]
pub struct Scheduler {
    tasks: Mutex<HashMap<TaskKey, AbortHandle>>,
}

impl Scheduler {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Runs `work` after `delay`, replacing (and aborting) any task already
    /// registered under the same key.
    pub fn schedule<F>(self: &Arc<Self>, key: TaskKey, delay: Duration, work: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let scheduler = Arc::clone(self);
        // The delay is anchored here, not at the task's first poll, so the
        // deadline is fixed the moment the caller schedules the work.
        let deadline = tokio::time::Instant::now() + delay;
        // The registry lock is held across spawn + insert, so a zero-delay
        // task cannot run its cleanup before its handle is registered. The
        // cleanup only evicts the task's own handle; the key may have been
        // rescheduled since.
        let mut tasks = self.tasks.lock().unwrap();
        let handle = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            work.await;
            let mut tasks = scheduler.tasks.lock().unwrap();
            if tasks.get(&key).is_some_and(|h| h.id() == tokio::task::id()) {
                tasks.remove(&key);
            }
        });
        if let Some(prior) = tasks.insert(key, handle.abort_handle()) {
            debug!(?key, "replacing pending task");
            prior.abort();
        }
    }

    pub fn cancel(&self, key: TaskKey) {
        if let Some(handle) = self.tasks.lock().unwrap().remove(&key) {
            handle.abort();
        }
    }

    /// Aborts every task tied to a chat: its pending deliveries and, for a
    /// channel, its standup finish.
    pub fn cancel_chat(&self, chat: ChatRef) {
        let mut tasks = self.tasks.lock().unwrap();
        tasks.retain(|key, handle| {
            let doomed = match *key {
                TaskKey::Message { chat: task_chat, .. } => task_chat == chat,
                TaskKey::Standup { channel } => chat == ChatRef::Channel(channel),
            };
            if doomed {
                handle.abort();
            }
            !doomed
        });
    }

    /// Aborts everything. Used when the store is reset.
    pub fn clear(&self) {
        let mut tasks = self.tasks.lock().unwrap();
        for handle in tasks.values() {
            handle.abort();
        }
        tasks.clear();
    }

    pub fn pending(&self) -> usize {
        self.tasks.lock().unwrap().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn bump_after(counter: &Arc<AtomicUsize>) -> impl Future<Output = ()> + Send + 'static {
        let counter = Arc::clone(counter);
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    }

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn task_runs_after_delay() {
        let scheduler = Scheduler::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let key = TaskKey::Message { chat: ChatRef::Dm(1), id: 7 };
        scheduler.schedule(key, Duration::from_secs(5), bump_after(&counter));

        tokio::time::advance(Duration::from_secs(4)).await;
        settle().await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert_eq!(scheduler.pending(), 1);

        tokio::time::advance(Duration::from_secs(2)).await;
        settle().await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_prevents_the_run() {
        let scheduler = Scheduler::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let key = TaskKey::Standup { channel: 3 };
        scheduler.schedule(key, Duration::from_secs(5), bump_after(&counter));
        scheduler.cancel(key);

        tokio::time::advance(Duration::from_secs(10)).await;
        settle().await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert_eq!(scheduler.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_chat_aborts_only_that_chat() {
        let scheduler = Scheduler::new();
        let counter = Arc::new(AtomicUsize::new(0));
        scheduler.schedule(
            TaskKey::Message { chat: ChatRef::Dm(1), id: 10 },
            Duration::from_secs(5),
            bump_after(&counter),
        );
        scheduler.schedule(
            TaskKey::Message { chat: ChatRef::Dm(1), id: 11 },
            Duration::from_secs(5),
            bump_after(&counter),
        );
        scheduler.schedule(
            TaskKey::Message { chat: ChatRef::Channel(1), id: 12 },
            Duration::from_secs(5),
            bump_after(&counter),
        );

        scheduler.cancel_chat(ChatRef::Dm(1));
        assert_eq!(scheduler.pending(), 1);

        tokio::time::advance(Duration::from_secs(6)).await;
        settle().await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn rescheduling_a_key_replaces_the_task() {
        let scheduler = Scheduler::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let key = TaskKey::Standup { channel: 9 };
        scheduler.schedule(key, Duration::from_secs(5), bump_after(&counter));
        scheduler.schedule(key, Duration::from_secs(20), bump_after(&counter));

        tokio::time::advance(Duration::from_secs(10)).await;
        settle().await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        tokio::time::advance(Duration::from_secs(15)).await;
        settle().await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    // Real multi-thread runtime: a zero-delay task may finish while
    // `schedule` is still registering it. Its handle must not be left
    // behind in the registry.
    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn zero_delay_task_leaves_no_stale_handle() {
        let scheduler = Scheduler::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let key = TaskKey::Message { chat: ChatRef::Dm(2), id: 1 };
        scheduler.schedule(key, Duration::ZERO, bump_after(&counter));

        for _ in 0..200 {
            if counter.load(Ordering::SeqCst) == 1 && scheduler.pending() == 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn rescheduling_after_completion_registers_a_fresh_task() {
        let scheduler = Scheduler::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let key = TaskKey::Standup { channel: 4 };
        scheduler.schedule(key, Duration::from_secs(1), bump_after(&counter));

        tokio::time::advance(Duration::from_secs(2)).await;
        settle().await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.pending(), 0);

        // The finished task's cleanup must not have poisoned the key.
        scheduler.schedule(key, Duration::from_secs(5), bump_after(&counter));
        assert_eq!(scheduler.pending(), 1);

        tokio::time::advance(Duration::from_secs(6)).await;
        settle().await;
        assert_eq!(counter.load(Ordering::SeqCst), 2);
        assert_eq!(scheduler.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn clear_aborts_everything() {
        let scheduler = Scheduler::new();
        let counter = Arc::new(AtomicUsize::new(0));
        for id in 0..4 {
            scheduler.schedule(
                TaskKey::Message { chat: ChatRef::Channel(1), id },
                Duration::from_secs(5),
                bump_after(&counter),
            );
        }
        scheduler.clear();

        tokio::time::advance(Duration::from_secs(10)).await;
        settle().await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }
}
