//! # Fallback Notifications

use std::sync::Mutex;

/// A fallback event: one pattern was handed to the backtracking delegate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackEvent {
    /// The pattern source.
    pub pattern: String,

    /// Why the linear-time engine refused the pattern.
    pub reason: String,
}

/// Hook for fallback notifications.
///
/// Called synchronously, on the compiling thread.
pub trait FallbackNotifier: Send + Sync {
    /// Observe a fallback event.
    fn notify(
        &self,
        event: &FallbackEvent,
    );
}

impl<F> FallbackNotifier for F
where
    F: Fn(&FallbackEvent) + Send + Sync,
{
    fn notify(
        &self,
        event: &FallbackEvent,
    ) {
        self(event)
    }
}

/// A [`FallbackNotifier`] which records every event.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<FallbackEvent>>,
}

impl RecordingNotifier {
    /// Snapshot of the recorded events.
    pub fn events(&self) -> Vec<FallbackEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Number of recorded events.
    pub fn len(&self) -> usize {
        self.events().len()
    }

    /// Has nothing been recorded?
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FallbackNotifier for RecordingNotifier {
    fn notify(
        &self,
        event: &FallbackEvent,
    ) {
        let mut events = match self.events.lock() {
            Ok(events) => events,
            Err(poisoned) => poisoned.into_inner(),
        };
        events.push(event.clone());
    }
}
