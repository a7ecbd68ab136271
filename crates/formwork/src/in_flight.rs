//! The one async validation pass a node may have running.

use std::cell::RefCell;

use formwork_core::TaskSubscription;

/// Slot for a node's in-flight async pass.
///
/// Storing a new pass cancels the previous one; dropping the slot cancels
/// whatever is still running.
#[derive(Debug, Default)]
pub(crate) struct InFlight {
    task: RefCell<Option<TaskSubscription>>,
}

impl InFlight {
    pub(crate) fn store(&self, subscription: TaskSubscription) {
        if let Some(previous) = self.task.replace(Some(subscription)) {
            previous.unsubscribe_and_cancel();
        }
    }

    pub(crate) fn cancel(&self, node: &str) {
        if let Some(task) = self.task.take() {
            if !task.is_finished() {
                tracing::debug!(node, "async validation cancelled");
            }
            task.unsubscribe_and_cancel();
        }
    }

    /// Forget the pass that is delivering its result right now.
    pub(crate) fn finish(&self) {
        drop(self.task.take());
    }

    pub(crate) fn is_active(&self) -> bool {
        self.task
            .borrow()
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if let Some(task) = self.task.get_mut().take() {
            task.unsubscribe_and_cancel();
        }
    }
}
