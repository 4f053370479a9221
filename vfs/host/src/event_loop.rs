use std::cell::RefCell;
use std::fmt;

use crossbeam_channel::{Receiver, Sender};
use slab::Slab;
use tokio::runtime::{Builder, Runtime};
use tracing::{debug, trace, warn};
use vfs_core::{
    Completion, FsOp, IoProvider, RawCompletion, Rejection, VfsError, VfsErrorKind, VfsResult,
};

use crate::HostLoopConfig;
use crate::platform;

/// How far [`HostLoop::run`] drives the loop before returning.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunMode {
    /// Until no request is in flight, including follow-ups submitted by
    /// completions.
    Default,
    /// Block until at least one completion is delivered, then deliver
    /// whatever else is already finished. Returns at once when nothing is in
    /// flight.
    Once,
    /// Deliver finished completions without blocking.
    NoWait,
}

struct Finished {
    token: usize,
    completion: RawCompletion,
}

/// Event loop for host filesystem calls.
///
/// Native calls run on tokio's blocking pool. Their results come back over a
/// channel and are matched to the waiting completion by token; completions
/// only ever run inside [`HostLoop::run`], on the calling thread.
pub struct HostLoop {
    // Only `None` once dropped.
    runtime: Option<Runtime>,
    sender: Sender<Finished>,
    receiver: Receiver<Finished>,
    tokens: RefCell<Slab<Completion>>,
    max_in_flight: usize,
}

impl HostLoop {
    pub fn new(config: HostLoopConfig) -> VfsResult<Self> {
        config.validate()?;
        let runtime = Builder::new_current_thread()
            .max_blocking_threads(config.worker_threads)
            .thread_name(config.thread_name.clone())
            .build()
            .map_err(|err| VfsError::from_io(&err, "host.runtime"))?;
        let (sender, receiver) = crossbeam_channel::unbounded();
        debug!(
            worker_threads = config.worker_threads,
            max_in_flight = config.max_in_flight,
            "host loop started"
        );
        Ok(Self {
            runtime: Some(runtime),
            sender,
            receiver,
            tokens: RefCell::new(Slab::with_capacity(config.max_in_flight.min(64))),
            max_in_flight: config.max_in_flight,
        })
    }

    /// Requests submitted and not yet delivered.
    pub fn pending(&self) -> usize {
        self.tokens.borrow().len()
    }

    /// Deliver completions according to `mode`. Returns how many were
    /// delivered.
    pub fn run(&self, mode: RunMode) -> usize {
        let mut delivered = 0;
        loop {
            let block = match mode {
                RunMode::Default => true,
                RunMode::Once => delivered == 0,
                RunMode::NoWait => false,
            };
            let finished = if block {
                if self.pending() == 0 {
                    break;
                }
                match self.receiver.recv() {
                    Ok(finished) => finished,
                    Err(_) => break,
                }
            } else {
                match self.receiver.try_recv() {
                    Ok(finished) => finished,
                    Err(_) => break,
                }
            };
            if self.deliver(finished) {
                delivered += 1;
            }
        }
        delivered
    }

    fn deliver(&self, finished: Finished) -> bool {
        let Finished { token, completion } = finished;
        // The borrow must end before the completion runs: it may submit.
        let entry = {
            let mut tokens = self.tokens.borrow_mut();
            tokens.contains(token).then(|| tokens.remove(token))
        };
        match entry {
            Some(callback) => {
                trace!(token, result = completion.result, "delivering");
                callback(completion);
                true
            }
            None => {
                debug!(token, "completion for unknown token");
                false
            }
        }
    }

    fn reject(
        &self,
        kind: VfsErrorKind,
        context: &'static str,
        op: FsOp,
        completion: Completion,
    ) -> Rejection {
        debug!(op = op.name(), %kind, context, "refusing submission");
        Rejection::new(VfsError::new(kind, context), op, completion)
    }
}

impl IoProvider for HostLoop {
    fn submit(&self, op: FsOp, completion: Completion) -> Result<(), Rejection> {
        if op.paths().any(|path| path.as_str().contains('\0')) {
            return Err(self.reject(
                VfsErrorKind::InvalidInput,
                "host.submit.nul_path",
                op,
                completion,
            ));
        }
        let Some(runtime) = self.runtime.as_ref() else {
            return Err(self.reject(
                VfsErrorKind::Io,
                "host.submit.shut_down",
                op,
                completion,
            ));
        };
        if self.pending() >= self.max_in_flight {
            return Err(self.reject(
                VfsErrorKind::WouldBlock,
                "host.submit.capacity",
                op,
                completion,
            ));
        }

        let token = self.tokens.borrow_mut().insert(completion);
        trace!(token, op = op.name(), "queued");
        let sender = self.sender.clone();
        runtime.spawn_blocking(move || {
            let completion = platform::execute(op);
            if sender.send(Finished { token, completion }).is_err() {
                debug!(token, "host loop gone, result discarded");
            }
        });
        Ok(())
    }
}

impl Drop for HostLoop {
    fn drop(&mut self) {
        let orphaned = std::mem::take(self.tokens.get_mut());
        if !orphaned.is_empty() {
            warn!(
                pending = orphaned.len(),
                "host loop dropped with requests in flight, releasing them undelivered"
            );
        }
        drop(orphaned);
        // Dropping a runtime blocks on its workers, which panics inside an
        // async context. Calls still running finish into a closed channel.
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

impl fmt::Debug for HostLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostLoop")
            .field("pending", &self.pending())
            .field("max_in_flight", &self.max_in_flight)
            .finish_non_exhaustive()
    }
}
