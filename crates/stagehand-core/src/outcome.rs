use std::sync::atomic::{AtomicBool, Ordering};

/// Build-wide success flag fed by task finish events.
///
/// Starts as success and flips to failure permanently on the first failed
/// task. Safe to share between the tasks reporting into it.
#[derive(Debug, Default)]
pub struct BuildOutcome {
    failed: AtomicBool,
}

impl BuildOutcome {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `task` finished. Returns `true` if this event flipped the
    /// outcome to failure.
    pub fn record(&self, task: &str, succeeded: bool) -> bool {
        if succeeded {
            tracing::trace!("task {task} finished");
            return false;
        }
        let was_failed = self.failed.swap(true, Ordering::SeqCst);
        if !was_failed {
            tracing::info!("Build marked as failed by task {task}");
        }
        !was_failed
    }

    pub fn is_failure(&self) -> bool {
        self.failed.load(Ordering::SeqCst)
    }
}
