use std::future::Future;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Holds at most one background task; replacing or clearing it cancels the
/// previous one.
#[derive(Debug, Default)]
pub(crate) struct TaskSlot {
    active: Option<(CancellationToken, JoinHandle<()>)>,
}

impl TaskSlot {
    pub(crate) fn replace<F, Fut>(&mut self, runtime: &Handle, make: F)
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.clear();
        let cancel = CancellationToken::new();
        let task = runtime.spawn(make(cancel.clone()));
        self.active = Some((cancel, task));
    }

    /// Idempotent.
    pub(crate) fn clear(&mut self) -> bool {
        match self.active.take() {
            Some((cancel, task)) => {
                cancel.cancel();
                task.abort();
                true
            }
            None => false,
        }
    }

    pub(crate) fn is_live(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|(_, task)| !task.is_finished())
    }
}
