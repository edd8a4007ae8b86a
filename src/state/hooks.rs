//! Hook Store - per-fiber state cells for component render functions.
//!
//! A component calls hooks in a fixed order during each render. Hook `i` of
//! a fiber picks up the committed state of hook `i` on the fiber's alternate,
//! applies any actions queued by setters since, and records the result on
//! the new fiber.
//!
//! # Pending actions
//!
//! Every hook position owns one action queue, shared by all generations of
//! that position. Rendering reads the queue without draining it and remembers
//! how many actions it applied (`consumed`); the commit then drops exactly
//! that many. A build that is superseded or fails therefore loses nothing,
//! and a setter captured by an old render still reaches the live hook.
//!
//! # Example
//!
//! ```ignore
//! let counter = Component::new("Counter", |hooks, _props, _children| {
//!     let (count, set_count) = hooks.use_state(0)?;
//!     let on_click = Callback::new(move |_| set_count.update(|c| c + 1));
//!     Ok(element!("button", props! { "onClick" => on_click }, count)?)
//! });
//! ```

use std::any::{Any, type_name};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use tracing::trace;

use crate::error::HookError;

type ActionQueue = Rc<RefCell<VecDeque<Rc<dyn Any>>>>;

// =============================================================================
// Update Requests
// =============================================================================

/// A request for a new build, sent by a state setter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateRequest {
    StateChanged { component: &'static str },
}

/// Single-threaded queue of pending build requests.
///
/// Setters push, the render session drains. Several requests queued before
/// the session looks are served by one build.
#[derive(Debug, Clone, Default)]
pub struct UpdateQueue(Rc<RefCell<VecDeque<UpdateRequest>>>);

impl UpdateQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, request: UpdateRequest) {
        self.0.borrow_mut().push_back(request);
    }

    /// Take every queued request, oldest first.
    pub fn drain(&self) -> Vec<UpdateRequest> {
        self.0.borrow_mut().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }
}

// =============================================================================
// Hook Record
// =============================================================================

enum StateAction<T> {
    Replace(T),
    Update(Rc<dyn Fn(&T) -> T>),
}

/// One state cell on a component fiber.
#[derive(Clone)]
pub struct HookRecord {
    state: Rc<dyn Any>,
    queue: ActionQueue,
    consumed: usize,
}

impl HookRecord {
    /// Read the state if it has type `T`.
    pub fn state<T: 'static>(&self) -> Option<&T> {
        self.state.downcast_ref()
    }

    /// Actions queued on this hook position and not yet committed.
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Drop the actions this record's render applied. Called once the fiber
    /// holding the record is committed.
    pub(crate) fn acknowledge(&self) {
        let mut queue = self.queue.borrow_mut();
        let n = self.consumed.min(queue.len());
        queue.drain(..n);
    }
}

impl fmt::Debug for HookRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookRecord")
            .field("pending", &self.pending())
            .field("consumed", &self.consumed)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Hooks
// =============================================================================

/// Hook access bound to the component fiber being rendered.
pub struct Hooks {
    component: &'static str,
    previous: Vec<HookRecord>,
    records: Vec<HookRecord>,
    updates: UpdateQueue,
}

impl Hooks {
    /// `previous` are the hooks of the fiber's alternate (empty on mount).
    pub(crate) fn new(component: &'static str, previous: Vec<HookRecord>, updates: UpdateQueue) -> Self {
        Self {
            component,
            previous,
            records: Vec::new(),
            updates,
        }
    }

    pub(crate) fn into_records(self) -> Vec<HookRecord> {
        self.records
    }

    /// Declare a state cell.
    ///
    /// Returns the current state and a setter. On the first render the state
    /// is `initial`; later renders start from the committed state and apply
    /// queued actions in the order they were made.
    ///
    /// # Errors
    ///
    /// [`HookError::TypeMismatch`] if the hook at this position held a
    /// different type last render, which means the call order changed.
    pub fn use_state<T: Clone + 'static>(&mut self, initial: T) -> Result<(T, StateSetter<T>), HookError> {
        let index = self.records.len();
        let mismatch = || HookError::TypeMismatch {
            index,
            expected: type_name::<T>(),
        };

        let (mut state, queue) = match self.previous.get(index) {
            Some(prev) => {
                let base = prev.state.downcast_ref::<T>().ok_or_else(mismatch)?.clone();
                (base, prev.queue.clone())
            }
            None => (initial, ActionQueue::default()),
        };

        let consumed = {
            let pending = queue.borrow();
            for action in pending.iter() {
                let action = action.downcast_ref::<StateAction<T>>().ok_or_else(mismatch)?;
                state = match action {
                    StateAction::Replace(value) => value.clone(),
                    StateAction::Update(f) => f(&state),
                };
            }
            pending.len()
        };

        if consumed > 0 {
            trace!(
                target: "spark_fiber::hooks",
                component = self.component,
                index,
                consumed,
                "applied queued state actions"
            );
        }

        self.records.push(HookRecord {
            state: Rc::new(state.clone()),
            queue: queue.clone(),
            consumed,
        });

        let setter = StateSetter {
            queue,
            updates: self.updates.clone(),
            component: self.component,
            _marker: PhantomData,
        };
        Ok((state, setter))
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("component", &self.component)
            .field("declared", &self.records.len())
            .field("previous", &self.previous.len())
            .finish()
    }
}

// =============================================================================
// State Setter
// =============================================================================

/// Queues state changes for a hook and requests a new build.
///
/// Changes take effect on the next render of the owning component, in call
/// order.
pub struct StateSetter<T> {
    queue: ActionQueue,
    updates: UpdateQueue,
    component: &'static str,
    _marker: PhantomData<fn(T)>,
}

impl<T: Clone + 'static> StateSetter<T> {
    /// Replace the state.
    pub fn set(&self, value: T) {
        self.enqueue(StateAction::Replace(value));
    }

    /// Derive the next state from the previous one.
    pub fn update(&self, f: impl Fn(&T) -> T + 'static) {
        self.enqueue(StateAction::Update(Rc::new(f)));
    }

    fn enqueue(&self, action: StateAction<T>) {
        self.queue.borrow_mut().push_back(Rc::new(action));
        self.updates.push(UpdateRequest::StateChanged {
            component: self.component,
        });
    }
}

impl<T> Clone for StateSetter<T> {
    fn clone(&self) -> Self {
        Self {
            queue: self.queue.clone(),
            updates: self.updates.clone(),
            component: self.component,
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for StateSetter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateSetter")
            .field("component", &self.component)
            .field("pending", &self.queue.borrow().len())
            .finish()
    }
}
