#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use vfs_core::{Completion, FsOp, IoProvider, RawCompletion, Rejection, VfsError, VfsErrorKind};

/// A provider that queues submissions until the test completes them by
/// hand, in any order.
#[derive(Default)]
pub struct ManualProvider {
    queue: RefCell<VecDeque<(FsOp, Completion)>>,
    rejections: RefCell<VecDeque<VfsErrorKind>>,
    submitted: Cell<usize>,
}

impl ManualProvider {
    /// Refuse the next submission with `kind`.
    pub fn reject_next(&self, kind: VfsErrorKind) {
        self.rejections.borrow_mut().push_back(kind);
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    pub fn submitted(&self) -> usize {
        self.submitted.get()
    }

    pub fn pending_ops(&self) -> Vec<&'static str> {
        self.queue.borrow().iter().map(|(op, _)| op.name()).collect()
    }

    /// Inspect the oldest pending operation.
    pub fn with_front<R>(&self, f: impl FnOnce(&FsOp) -> R) -> R {
        let queue = self.queue.borrow();
        let (op, _) = queue.front().expect("no pending operation");
        f(op)
    }

    pub fn complete_front(&self, f: impl FnOnce(FsOp) -> RawCompletion) {
        let entry = self.queue.borrow_mut().pop_front();
        let (op, completion) = entry.expect("no pending operation");
        completion(f(op));
    }

    pub fn complete_back(&self, f: impl FnOnce(FsOp) -> RawCompletion) {
        let entry = self.queue.borrow_mut().pop_back();
        let (op, completion) = entry.expect("no pending operation");
        completion(f(op));
    }

    /// Complete the oldest operation with a plain result, handing any buffer
    /// straight back.
    pub fn complete_front_with(&self, result: i64) {
        self.complete_front(|op| RawCompletion::new(result).with_buffer(op.into_buffer()));
    }

    /// Forget every pending operation without completing it.
    pub fn drop_pending(&self) {
        let drained: Vec<_> = self.queue.borrow_mut().drain(..).collect();
        drop(drained);
    }
}

impl IoProvider for ManualProvider {
    fn submit(&self, op: FsOp, completion: Completion) -> Result<(), Rejection> {
        let rejection = self.rejections.borrow_mut().pop_front();
        if let Some(kind) = rejection {
            return Err(Rejection::new(
                VfsError::new(kind, "manual.submit"),
                op,
                completion,
            ));
        }
        self.submitted.set(self.submitted.get() + 1);
        self.queue.borrow_mut().push_back((op, completion));
        Ok(())
    }
}

/// Counts how many times it has been dropped. Capture one in a callback to
/// observe when the request owning the callback is released.
pub struct DropProbe(Rc<Cell<usize>>);

impl DropProbe {
    pub fn new() -> (Self, Rc<Cell<usize>>) {
        let count = Rc::new(Cell::new(0));
        (Self(count.clone()), count)
    }
}

impl Drop for DropProbe {
    fn drop(&mut self) {
        self.0.set(self.0.get() + 1);
    }
}

pub fn errno(code: i32) -> i64 {
    -i64::from(code)
}
