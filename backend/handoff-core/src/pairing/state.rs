use std::fmt::{Display, Formatter, Result as FormatResult};
use std::sync::{Mutex, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    Created,
    Listening,
    Accepted,
    Cancelled,
    Failed,
    Closed,
}

impl ListenerState {
    /// No further accept can happen in this state.
    pub fn is_finished(self) -> bool {
        matches!(
            self,
            ListenerState::Accepted
                | ListenerState::Cancelled
                | ListenerState::Failed
                | ListenerState::Closed
        )
    }
}

impl Display for ListenerState {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        let name = match self {
            ListenerState::Created => "created",
            ListenerState::Listening => "listening",
            ListenerState::Accepted => "accepted",
            ListenerState::Cancelled => "cancelled",
            ListenerState::Failed => "failed",
            ListenerState::Closed => "closed",
        };
        formatter.write_str(name)
    }
}

#[derive(Debug)]
struct Inner {
    current: ListenerState,
    outcome: Option<ListenerState>,
}

/// Shared listener state. All transitions are compare-and-set so the
/// accept worker and `cancel()` can never both win.
#[derive(Debug)]
pub(crate) struct SharedState {
    inner: Mutex<Inner>,
}

impl SharedState {
    pub(crate) fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                current: ListenerState::Created,
                outcome: None,
            }),
        }
    }

    pub(crate) fn get(&self) -> ListenerState {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .current
    }

    /// How the listening phase ended: `Accepted`, `Cancelled` or `Failed`.
    pub(crate) fn outcome(&self) -> Option<ListenerState> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .outcome
    }

    /// Move to `to` only if currently in `from`.
    pub(crate) fn transition(&self, from: ListenerState, to: ListenerState) -> bool {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if inner.current != from {
            return false;
        }

        inner.current = to;
        if matches!(
            to,
            ListenerState::Accepted | ListenerState::Cancelled | ListenerState::Failed
        ) {
            inner.outcome = Some(to);
        }
        true
    }

    /// Final transition; any state becomes `Closed`. Returns the previous state.
    pub(crate) fn close(&self) -> ListenerState {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut inner.current, ListenerState::Closed)
    }
}
