//! Progress protocol for the investigation loop.
//!
//! The loop publishes full [`CopilotState`] snapshots, never diffs. Anything
//! that wants to watch implements [`SnapshotObserver`]: closures and unbounded
//! channel senders already do.

use tokio::sync::mpsc;

use crate::incident::CopilotState;

/// Receives every snapshot the loop emits, in emission order.
///
/// Called inline on the loop's task, so implementations should return quickly.
pub trait SnapshotObserver: Send + Sync {
    fn on_snapshot(&self, state: &CopilotState);
}

impl<F> SnapshotObserver for F
where
    F: Fn(&CopilotState) + Send + Sync,
{
    fn on_snapshot(&self, state: &CopilotState) {
        self(state)
    }
}

impl SnapshotObserver for mpsc::UnboundedSender<CopilotState> {
    fn on_snapshot(&self, state: &CopilotState) {
        // A dropped receiver just means nobody is watching anymore
        let _ = self.send(state.clone());
    }
}

/// Where the loop currently is. Transitions only move forward.
#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    /// Tool-calling turns; `iteration` counts resolved requests so far
    Exploring { iteration: usize },
    /// One schema-constrained call for the report
    Synthesizing,
    /// Decoded report awaiting finalization
    Complete(Box<CopilotState>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn closures_observe_in_order() {
        let seen = Mutex::new(Vec::new());
        let observer = |state: &CopilotState| seen.lock().unwrap().push(state.summary.clone());

        for summary in ["one", "two"] {
            observer.on_snapshot(&CopilotState {
                summary: summary.into(),
                ..Default::default()
            });
        }
        assert_eq!(*seen.lock().unwrap(), vec!["one", "two"]);
    }

    #[test]
    fn channel_observer_survives_dropped_receiver() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        tx.on_snapshot(&CopilotState::default());
        assert!(rx.try_recv().is_ok());

        drop(rx);
        tx.on_snapshot(&CopilotState::default());
    }
}
