// Headless UI adapter - Records global UI side effects instead of touching a window

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::ports::*;

#[derive(Debug)]
struct UiState {
    cursor: CursorStyle,
    text_selection: bool,
    next_id: u64,
    listeners: HashMap<ListenerId, ListenerScope>,
}

/// UI surface with no window behind it, used by the CLI and tests.
#[derive(Debug)]
pub struct HeadlessUi {
    state: Mutex<UiState>,
}

impl Default for HeadlessUi {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessUi {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(UiState {
                cursor: CursorStyle::Default,
                text_selection: true,
                next_id: 1,
                listeners: HashMap::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, UiState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn cursor(&self) -> CursorStyle {
        self.lock().cursor
    }

    pub fn text_selection_enabled(&self) -> bool {
        self.lock().text_selection
    }

    /// Number of listeners currently attached in `scope`
    pub fn active_listeners(&self, scope: ListenerScope) -> usize {
        self.lock().listeners.values().filter(|s| **s == scope).count()
    }

    pub fn total_listeners(&self) -> usize {
        self.lock().listeners.len()
    }
}

impl UiSurfacePort for HeadlessUi {
    fn set_cursor(&self, cursor: CursorStyle) {
        self.lock().cursor = cursor;
    }

    fn set_text_selection(&self, enabled: bool) {
        self.lock().text_selection = enabled;
    }

    fn add_listener(&self, scope: ListenerScope) -> ListenerId {
        let mut state = self.lock();
        let id = ListenerId(state.next_id);
        state.next_id += 1;
        state.listeners.insert(id, scope);
        id
    }

    fn remove_listener(&self, id: ListenerId) {
        self.lock().listeners.remove(&id);
    }
}
