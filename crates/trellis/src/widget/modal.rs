//! Modal scope management.
//!
//! A modal scope restricts input to one widget subtree until the scope
//! finishes. Scopes nest: [`ModalStack`] keeps them as explicit records
//! (root, captured background, completion handle) so that a single
//! non-recursive loop can drive whichever scope is on top. Closing an inner
//! scope leaves the outer one, and its background snapshot, exactly as it
//! was.
//!
//! Cancellation is cooperative. A scope stops only when its
//! [`ModalHandle`] is finished, either by the dialog itself or by a quit
//! request, which rejects every open scope.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use trellis_core::ObjectId;
use trellis_render::ImageId;

/// How a modal scope finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogCode {
    Accepted,
    Rejected,
}

#[derive(Debug)]
struct ModalState {
    running: AtomicBool,
    code: Mutex<Option<DialogCode>>,
}

/// A clonable completion token for one modal scope.
///
/// The dialog keeps a clone and calls [`accept`](Self::accept) or
/// [`reject`](Self::reject) when it is done. Finishing twice keeps the first
/// result.
#[derive(Debug, Clone)]
pub struct ModalHandle {
    state: Arc<ModalState>,
}

impl Default for ModalHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl ModalHandle {
    pub fn new() -> Self {
        Self {
            state: Arc::new(ModalState {
                running: AtomicBool::new(true),
                code: Mutex::new(None),
            }),
        }
    }

    /// Whether the scope is still running.
    pub fn is_running(&self) -> bool {
        self.state.running.load(Ordering::Acquire)
    }

    /// Finish the scope with `code`. Returns `false` if it had already
    /// finished.
    pub fn finish(&self, code: DialogCode) -> bool {
        let mut slot = self.state.code.lock();
        if slot.is_some() {
            return false;
        }
        *slot = Some(code);
        self.state.running.store(false, Ordering::Release);
        true
    }

    pub fn accept(&self) -> bool {
        self.finish(DialogCode::Accepted)
    }

    pub fn reject(&self) -> bool {
        self.finish(DialogCode::Rejected)
    }

    /// The result, once finished.
    pub fn code(&self) -> Option<DialogCode> {
        *self.state.code.lock()
    }

    pub fn same_as(&self, other: &ModalHandle) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }
}

/// One open modal scope.
#[derive(Debug, Clone)]
pub struct ModalScope {
    /// Root of the subtree that receives input.
    pub root: ObjectId,
    /// Snapshot of the window taken when the scope opened. `None` when the
    /// backend could not capture; the full stack is repainted instead.
    pub background: Option<ImageId>,
    pub handle: ModalHandle,
    /// Focus to restore when the scope closes.
    pub(crate) focus_before: Option<ObjectId>,
}

/// The stack of open modal scopes, innermost last.
#[derive(Debug, Default)]
pub struct ModalStack {
    scopes: Vec<ModalScope>,
}

impl ModalStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a scope and return its handle.
    pub fn push(&mut self, root: ObjectId, background: Option<ImageId>) -> ModalHandle {
        let handle = ModalHandle::new();
        self.push_with_handle(root, background, handle.clone(), None);
        handle
    }

    pub(crate) fn push_with_handle(
        &mut self,
        root: ObjectId,
        background: Option<ImageId>,
        handle: ModalHandle,
        focus_before: Option<ObjectId>,
    ) {
        tracing::debug!(
            target: "trellis::modal",
            ?root,
            depth = self.scopes.len() + 1,
            has_background = background.is_some(),
            "modal scope opened"
        );
        self.scopes.push(ModalScope {
            root,
            background,
            handle,
            focus_before,
        });
    }

    /// The innermost scope.
    pub fn top(&self) -> Option<&ModalScope> {
        self.scopes.last()
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    pub fn scopes(&self) -> &[ModalScope] {
        &self.scopes
    }

    /// Pop finished scopes from the top.
    ///
    /// A finished scope below a running one stays until everything above it
    /// has closed.
    pub fn pop_finished(&mut self) -> Vec<ModalScope> {
        let mut popped = Vec::new();
        while self.scopes.last().is_some_and(|s| !s.handle.is_running()) {
            if let Some(scope) = self.scopes.pop() {
                tracing::debug!(
                    target: "trellis::modal",
                    root = ?scope.root,
                    code = ?scope.handle.code(),
                    depth = self.scopes.len(),
                    "modal scope closed"
                );
                popped.push(scope);
            }
        }
        popped
    }

    /// Reject every open scope.
    pub fn cancel_all(&mut self) {
        for scope in &self.scopes {
            scope.handle.reject();
        }
    }

    /// Drop the scope rooted at `root`, if any, marking it rejected.
    pub(crate) fn forget(&mut self, root: ObjectId) {
        for scope in self.scopes.iter().filter(|s| s.root == root) {
            scope.handle.reject();
        }
    }
}

static_assertions::assert_impl_all!(ModalHandle: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;

    fn make_id(n: u64) -> ObjectId {
        ObjectId::from_raw(n)
    }

    #[test]
    fn test_handle_first_finish_wins() {
        let handle = ModalHandle::new();
        let clone = handle.clone();
        assert!(handle.is_running());
        assert!(clone.accept());
        assert!(!handle.reject());
        assert!(!handle.is_running());
        assert_eq!(handle.code(), Some(DialogCode::Accepted));
    }

    #[test]
    fn test_nested_scopes_keep_outer_snapshot() {
        let mut stack = ModalStack::new();
        let outer = stack.push(make_id(1), Some(ImageId(10)));
        let inner = stack.push(make_id(2), Some(ImageId(11)));
        assert_eq!(stack.depth(), 2);

        inner.accept();
        let popped = stack.pop_finished();
        assert_eq!(popped.len(), 1);
        assert_eq!(stack.top().map(|s| s.background), Some(Some(ImageId(10))));
        assert!(outer.is_running());
    }

    #[test]
    fn test_finished_outer_waits_for_inner() {
        let mut stack = ModalStack::new();
        let outer = stack.push(make_id(1), None);
        let inner = stack.push(make_id(2), None);

        outer.reject();
        assert!(stack.pop_finished().is_empty());
        inner.accept();
        assert_eq!(stack.pop_finished().len(), 2);
        assert!(stack.is_empty());
    }

    #[test]
    fn test_cancel_all_rejects() {
        let mut stack = ModalStack::new();
        let a = stack.push(make_id(1), None);
        let b = stack.push(make_id(2), None);
        stack.cancel_all();
        assert_eq!(a.code(), Some(DialogCode::Rejected));
        assert_eq!(b.code(), Some(DialogCode::Rejected));
        assert_eq!(stack.pop_finished().len(), 2);
    }
}
