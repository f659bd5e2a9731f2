//! Observable selection state.
//!
//! [`SelectionModel`] is the single source of truth for which region is
//! selected and which is hovered. It is a cheap cloneable handle; every clone
//! observes and mutates the same state. Listeners are notified synchronously,
//! in subscription order. A `select`/`hover` issued from inside a listener is
//! queued and runs after the current fan-out has reached every listener.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::region::RegionId;

/// The observable pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SelectionState {
    pub selected: Option<RegionId>,
    pub hovered: Option<RegionId>,
}

impl SelectionState {
    pub fn new(selected: Option<RegionId>, hovered: Option<RegionId>) -> Self {
        Self { selected, hovered }
    }
}

/// One notification. Each real transition produces exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionChange {
    Selected {
        previous: Option<RegionId>,
        current: Option<RegionId>,
    },
    Hovered {
        previous: Option<RegionId>,
        current: Option<RegionId>,
    },
}

/// Handle returned by [`SelectionModel::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&SelectionChange, &SelectionState)>;

#[derive(Debug, Clone, Copy)]
enum Command {
    Select(Option<RegionId>),
    Hover(Option<RegionId>),
}

#[derive(Default)]
struct Inner {
    state: SelectionState,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u64,
    queue: VecDeque<Command>,
    dispatching: bool,
    /// Listeners removed while the listener list was checked out for a fan-out.
    removed_during_dispatch: Vec<ListenerId>,
}

impl Inner {
    fn apply(&mut self, command: Command) -> Option<SelectionChange> {
        match command {
            Command::Select(id) => {
                let previous = self.state.selected;
                (previous != id).then(|| {
                    self.state.selected = id;
                    SelectionChange::Selected {
                        previous,
                        current: id,
                    }
                })
            }
            Command::Hover(id) => {
                let previous = self.state.hovered;
                (previous != id).then(|| {
                    self.state.hovered = id;
                    SelectionChange::Hovered {
                        previous,
                        current: id,
                    }
                })
            }
        }
    }
}

/// Shared selection state with synchronous change notification.
#[derive(Clone, Default)]
pub struct SelectionModel {
    inner: Rc<RefCell<Inner>>,
}

impl std::fmt::Debug for SelectionModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("SelectionModel")
            .field("state", &inner.state)
            .field("listeners", &inner.listeners.len())
            .finish()
    }
}

impl SelectionModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> SelectionState {
        self.inner.borrow().state
    }

    pub fn selected(&self) -> Option<RegionId> {
        self.state().selected
    }

    pub fn hovered(&self) -> Option<RegionId> {
        self.state().hovered
    }

    /// Select a region, or clear the selection with `None`.
    pub fn select(&self, id: Option<RegionId>) {
        self.submit(Command::Select(id));
    }

    /// Set the transient hover target.
    pub fn hover(&self, id: Option<RegionId>) {
        self.submit(Command::Hover(id));
    }

    /// Reset to no selection and no hover.
    pub fn clear(&self) {
        self.select(None);
        self.hover(None);
    }

    /// Register a listener; it receives the change and the state right after it.
    pub fn subscribe(
        &self,
        listener: impl FnMut(&SelectionChange, &SelectionState) + 'static,
    ) -> ListenerId {
        let mut inner = self.inner.borrow_mut();
        let id = ListenerId(inner.next_listener);
        inner.next_listener += 1;
        inner.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut inner = self.inner.borrow_mut();
        if let Some(pos) = inner.listeners.iter().position(|(lid, _)| *lid == id) {
            inner.listeners.remove(pos);
            return true;
        }
        let checked_out = inner.dispatching && id.0 < inner.next_listener;
        if checked_out && !inner.removed_during_dispatch.contains(&id) {
            inner.removed_during_dispatch.push(id);
            return true;
        }
        false
    }

    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    fn submit(&self, command: Command) {
        {
            let mut inner = self.inner.borrow_mut();
            inner.queue.push_back(command);
            if inner.dispatching {
                log::trace!("Queued re-entrant selection command {:?}", command);
                return;
            }
            inner.dispatching = true;
        }

        loop {
            let (change, state) = {
                let mut inner = self.inner.borrow_mut();
                let Some(command) = inner.queue.pop_front() else {
                    inner.dispatching = false;
                    break;
                };
                (inner.apply(command), inner.state)
            };
            if let Some(change) = change {
                self.notify(&change, &state);
            }
        }
    }

    fn notify(&self, change: &SelectionChange, state: &SelectionState) {
        log::debug!("Selection change: {:?}", change);
        let mut listeners = std::mem::take(&mut self.inner.borrow_mut().listeners);

        for (id, listener) in listeners.iter_mut() {
            if self.inner.borrow().removed_during_dispatch.contains(id) {
                continue;
            }
            listener(change, state);
        }

        let mut inner = self.inner.borrow_mut();
        // Listeners subscribed during the fan-out go after the existing ones
        let added = std::mem::take(&mut inner.listeners);
        listeners.extend(added);
        let removed = std::mem::take(&mut inner.removed_during_dispatch);
        listeners.retain(|(id, _)| !removed.contains(id));
        inner.listeners = listeners;
    }
}
