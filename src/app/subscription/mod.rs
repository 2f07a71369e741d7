//! Scoped listener subscriptions.

use std::sync::Arc;

use tracing::trace;

use crate::ports::{ListenerId, ListenerScope, UiSurfacePort};

/// A listener attached through the UI surface, detached when dropped.
pub struct Subscription {
    ui: Arc<dyn UiSurfacePort>,
    id: ListenerId,
    scope: ListenerScope,
}

impl Subscription {
    pub fn attach(ui: Arc<dyn UiSurfacePort>, scope: ListenerScope) -> Self {
        let id = ui.add_listener(scope);
        trace!(?scope, id = id.0, "Listener attached");
        Self { ui, id, scope }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.ui.remove_listener(self.id);
        trace!(scope = ?self.scope, id = self.id.0, "Listener detached");
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("scope", &self.scope)
            .finish()
    }
}
