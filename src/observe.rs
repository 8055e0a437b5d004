use std::cell::{Cell, RefCell};
use std::rc::Rc;

// ---------------------------------------------------------------------------
// Synchronous change notification
// ---------------------------------------------------------------------------

/// Handle returned by [`Observers::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

/// Callbacks keyed by subscription, invoked in registration order on the
/// calling thread.
///
/// The callback list is snapshotted before dispatch, so a callback may
/// subscribe or unsubscribe without invalidating the iteration.
pub struct Observers<E> {
    next_id: Cell<u64>,
    callbacks: RefCell<Vec<(Subscription, Rc<dyn Fn(&E)>)>>,
}

impl<E> Default for Observers<E> {
    fn default() -> Self {
        Observers {
            next_id: Cell::new(0),
            callbacks: RefCell::new(Vec::new()),
        }
    }
}

impl<E> std::fmt::Debug for Observers<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("subscribers", &self.callbacks.borrow().len())
            .finish()
    }
}

impl<E> Observers<E> {
    pub fn subscribe(&self, callback: impl Fn(&E) + 'static) -> Subscription {
        let id = Subscription(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.callbacks.borrow_mut().push((id, Rc::new(callback)));
        id
    }

    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        let mut callbacks = self.callbacks.borrow_mut();
        let before = callbacks.len();
        callbacks.retain(|(id, _)| *id != subscription);
        callbacks.len() != before
    }

    pub fn emit(&self, event: &E) {
        let snapshot: Vec<Rc<dyn Fn(&E)>> = self
            .callbacks
            .borrow()
            .iter()
            .map(|(_, cb)| Rc::clone(cb))
            .collect();
        for callback in snapshot {
            callback(event);
        }
    }

    pub fn len(&self) -> usize {
        self.callbacks.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.borrow().is_empty()
    }
}
