//! Registry of live windows
//!
//! Membership is added exactly once on creation and removed exactly once on
//! destruction, so removing an id that is not a member is a no-op. Iteration
//! follows creation order.

use crate::foundation::collections::RegistryList;
use crate::window::{Window, WindowId};

/// The set of windows currently alive in a session
#[derive(Debug, Default)]
pub struct WindowRegistry {
    windows: RegistryList<WindowId, Window>,
}

impl WindowRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert_with(&mut self, f: impl FnOnce(WindowId) -> Window) -> WindowId {
        self.windows.append_with_key(f)
    }

    pub(crate) fn remove(&mut self, id: WindowId) -> Option<Window> {
        self.windows.remove(id)
    }

    /// Look up a window
    pub fn get(&self, id: WindowId) -> Option<&Window> {
        self.windows.get(id)
    }

    /// Look up a window mutably
    pub fn get_mut(&mut self, id: WindowId) -> Option<&mut Window> {
        self.windows.get_mut(id)
    }

    /// Whether `id` is a live member
    pub fn contains(&self, id: WindowId) -> bool {
        self.windows.contains_key(id)
    }

    /// Number of live windows
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    /// Whether no windows are alive
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Ids in creation order, copied so the registry can change while they are used
    pub fn ids(&self) -> Vec<WindowId> {
        self.windows.keys().collect()
    }

    /// Windows in creation order
    pub fn iter(&self) -> impl Iterator<Item = &Window> + '_ {
        self.windows.iter().map(|(_, window)| window)
    }

    /// Find the first window matching `pred`
    pub fn find(&self, pred: impl FnMut(&Window) -> bool) -> Option<&Window> {
        self.windows.find(pred)
    }

    pub(crate) fn free_all(&mut self, destructor: impl FnMut(WindowId, Window)) {
        self.windows.free_all(destructor);
    }
}
