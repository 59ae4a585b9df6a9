//! Action listener registry with stable unsubscribe handles

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use tracing::trace;

/// Callback receiving the intensity of a triggered action
pub type ActionCallback = Arc<dyn Fn(f32) + Send + Sync>;

/// Identifier of one registered listener, never reused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct ListenerEntry {
    id: ListenerId,
    callback: ActionCallback,
}

#[derive(Default)]
struct ListenerTable {
    next_id: u64,
    by_action: HashMap<String, Vec<ListenerEntry>>,
}

impl ListenerTable {
    fn contains(&self, action: &str, id: ListenerId) -> bool {
        self.by_action
            .get(action)
            .is_some_and(|entries| entries.iter().any(|e| e.id == id))
    }
}

/// Listeners per action, notified in registration order
///
/// Cheap to clone; clones share the same table.
#[derive(Clone, Default)]
pub struct ActionListeners {
    table: Arc<RwLock<ListenerTable>>,
}

impl ActionListeners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for an action
    ///
    /// # Returns
    /// Handle that removes exactly this listener
    pub fn subscribe<F>(&self, action: &str, callback: F) -> Unsubscribe
    where
        F: Fn(f32) + Send + Sync + 'static,
    {
        let mut table = self.table.write();
        let id = ListenerId(table.next_id);
        table.next_id += 1;
        table
            .by_action
            .entry(action.to_string())
            .or_default()
            .push(ListenerEntry {
                id,
                callback: Arc::new(callback),
            });

        Unsubscribe {
            table: Arc::downgrade(&self.table),
            action: action.to_string(),
            id,
        }
    }

    /// Number of listeners currently registered for an action
    pub fn listener_count(&self, action: &str) -> usize {
        self.table.read().by_action.get(action).map_or(0, Vec::len)
    }

    /// Notify every listener of `action`
    ///
    /// Iterates over a snapshot so listeners may subscribe or unsubscribe
    /// during dispatch. A listener removed by an earlier one in the same
    /// dispatch is skipped.
    ///
    /// # Returns
    /// Number of listeners invoked
    pub fn dispatch(&self, action: &str, intensity: f32) -> usize {
        let snapshot: Vec<(ListenerId, ActionCallback)> = {
            let table = self.table.read();
            match table.by_action.get(action) {
                Some(entries) => entries.iter().map(|e| (e.id, e.callback.clone())).collect(),
                None => return 0,
            }
        };

        let mut invoked = 0;
        for (id, callback) in snapshot {
            if !self.table.read().contains(action, id) {
                continue;
            }
            callback(intensity);
            invoked += 1;
        }

        trace!("Dispatched {} = {:.3} to {} listener(s)", action, intensity, invoked);
        invoked
    }
}

fn remove_from(table: &RwLock<ListenerTable>, action: &str, id: ListenerId) -> bool {
    let mut table = table.write();
    let Some(entries) = table.by_action.get_mut(action) else {
        return false;
    };
    let before = entries.len();
    entries.retain(|e| e.id != id);
    let removed = entries.len() != before;
    if entries.is_empty() {
        table.by_action.remove(action);
    }
    removed
}

/// Handle returned by [`ActionListeners::subscribe`]
///
/// Dropping the handle keeps the listener registered.
#[derive(Debug, Clone)]
pub struct Unsubscribe {
    table: Weak<RwLock<ListenerTable>>,
    action: String,
    id: ListenerId,
}

impl Unsubscribe {
    /// Remove the listener. Safe to call more than once.
    pub fn unsubscribe(&self) {
        if let Some(table) = self.table.upgrade() {
            remove_from(&table, &self.action, self.id);
        }
    }
}
