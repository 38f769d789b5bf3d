//! Handles for background work started by computes and commands.
//!
//! A compute that hands work to another thread keeps the [`TaskHandle`] of
//! the latest run. Starting a newer run cancels the previous token so the
//! superseded work can skip publishing. The token is advisory: results must
//! still be checked against their [`TaskId::generation`] when applied.

use std::any::TypeId;

use tokio_util::sync::CancellationToken;

/// Which compute/command started the work, and for which input generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId {
    type_id: TypeId,
    generation: u64,
}

impl TaskId {
    pub fn new(type_id: TypeId, generation: u64) -> Self {
        Self { type_id, generation }
    }

    pub fn of<T: 'static>(generation: u64) -> Self {
        Self::new(TypeId::of::<T>(), generation)
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Higher generations were started later.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// A [`TaskId`] paired with the token used to ask the work to stand down.
#[derive(Debug, Clone)]
pub struct TaskHandle {
    id: TaskId,
    cancel_token: CancellationToken,
}

impl TaskHandle {
    pub fn new(id: TaskId, cancel_token: CancellationToken) -> Self {
        Self { id, cancel_token }
    }

    /// Fresh handle with its own token.
    pub fn start(id: TaskId) -> Self {
        Self::new(id, CancellationToken::new())
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }
}

/// Runs blocking `work` off the calling thread.
///
/// Uses the ambient tokio runtime's blocking pool. Without a runtime (plain
/// `#[test]`s, tools) the work runs inline, which keeps results ordered but
/// blocks the caller.
pub fn spawn_work<F>(name: &'static str, work: F)
where
    F: FnOnce() + Send + 'static,
{
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            log::trace!(target: "shareasqr::states", "spawning blocking task {name}");
            drop(handle.spawn_blocking(work));
        }
        Err(_) => {
            log::debug!(target: "shareasqr::states", "no tokio runtime, running {name} inline");
            work();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    };

    use super::*;

    #[test]
    fn task_id_orders_by_generation_within_a_type() {
        let older = TaskId::of::<String>(1);
        let newer = TaskId::of::<String>(2);

        assert_eq!(older.type_id(), newer.type_id());
        assert!(newer.generation() > older.generation());
        assert_ne!(older, newer);
        assert_ne!(TaskId::of::<u8>(1), older);
    }

    #[test]
    fn cancelling_a_clone_cancels_the_original() {
        let handle = TaskHandle::start(TaskId::of::<String>(7));
        let token = handle.cancellation_token();
        let clone = handle.clone();

        assert!(!handle.is_cancelled());
        clone.cancel();

        assert!(handle.is_cancelled());
        assert!(token.is_cancelled());
        assert_eq!(handle.id().generation(), 7);
    }

    #[test]
    fn spawn_work_runs_inline_without_runtime() {
        let ran = Arc::new(AtomicBool::new(false));
        let flag = ran.clone();

        spawn_work("inline", move || flag.store(true, Ordering::SeqCst));

        assert!(ran.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn spawn_work_uses_blocking_pool_inside_runtime() {
        let (send, recv) = flume::bounded(1);

        spawn_work("pooled", move || {
            send.send(std::thread::current().id()).ok();
        });

        let worker = recv.recv_async().await.expect("work should report back");
        assert_ne!(worker, std::thread::current().id());
    }
}
