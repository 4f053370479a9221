//! Per-request state and its lifecycle.
//!
//! Every operation moves its inputs and the user callback into a
//! [`Request`], which then moves into the provider's completion. The phase
//! starts at `Created` and moves to `Submitted` or `Rejected` depending on
//! what the provider answers, then to `Completed` when the completion runs.
//! The state is handed out at most once and the request is released exactly
//! once, when the completion that owns it is consumed or dropped.

use std::cell::Cell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, trace};

use crate::provider::Completion;
use crate::{VfsError, VfsResult};

static NEXT_REQUEST_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum RequestPhase {
    Created,
    Submitted,
    Rejected,
    Completed,
}

pub(crate) struct Request<S> {
    id: u64,
    op: &'static str,
    phase: Rc<Cell<RequestPhase>>,
    state: Option<S>,
}

impl<S> Request<S> {
    pub(crate) fn new(op: &'static str, state: S) -> Self {
        Self {
            id: NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed),
            op,
            phase: Rc::new(Cell::new(RequestPhase::Created)),
            state: Some(state),
        }
    }

    /// Handle for recording the provider's answer once the request has
    /// moved into its completion.
    pub(crate) fn phase_mark(&self) -> PhaseMark {
        PhaseMark {
            id: self.id,
            op: self.op,
            phase: Rc::clone(&self.phase),
        }
    }

    /// Hand out the state for the completion. Returns `None` if it was
    /// already taken.
    pub(crate) fn complete(&mut self) -> Option<S> {
        let state = self.state.take()?;
        self.phase.set(RequestPhase::Completed);
        trace!(request = self.id, op = self.op, "completed");
        Some(state)
    }
}

impl<S> Drop for Request<S> {
    fn drop(&mut self) {
        match self.phase.get() {
            RequestPhase::Completed => trace!(request = self.id, op = self.op, "released"),
            RequestPhase::Rejected => {
                trace!(request = self.id, op = self.op, "released after rejection")
            }
            phase => debug!(
                request = self.id,
                op = self.op,
                ?phase,
                "released without completion"
            ),
        }
    }
}

/// Records whether the provider accepted a request. Only a request still in
/// `Created` moves; a completion that already ran keeps `Completed`.
pub(crate) struct PhaseMark {
    id: u64,
    op: &'static str,
    phase: Rc<Cell<RequestPhase>>,
}

impl PhaseMark {
    pub(crate) fn submitted(&self) {
        self.advance(RequestPhase::Submitted, "submitted");
    }

    pub(crate) fn rejected(&self) {
        self.advance(RequestPhase::Rejected, "rejected");
    }

    fn advance(&self, to: RequestPhase, message: &'static str) {
        if self.phase.get() == RequestPhase::Created {
            self.phase.set(to);
            trace!(request = self.id, op = self.op, "{message}");
        }
    }
}

/// A completion paired with the phase of the request it owns.
pub(crate) struct Submission {
    pub(crate) completion: Completion,
    pub(crate) mark: PhaseMark,
}

/// Turn a provider result into a value or an error: negative results carry
/// a negated errno.
pub(crate) fn translate(result: i64, context: &'static str) -> VfsResult<u64> {
    if result >= 0 {
        return Ok(result as u64);
    }
    let errno = result
        .checked_neg()
        .and_then(|code| i32::try_from(code).ok())
        .unwrap_or(libc::EIO);
    Err(VfsError::from_errno(errno, context))
}
