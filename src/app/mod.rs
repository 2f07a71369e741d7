// Application layer - Editor session, interaction controllers and wiring

pub mod container;
pub mod drag_controller;
pub mod editor_interactor;
pub mod playback;
pub mod shortcuts;
pub mod subscription;

// Re-export interactors
pub use container::{AppContainer, DefaultAppContainer};
pub use drag_controller::{DragController, DragOutcome, PointerEvent};
pub use editor_interactor::{EditorPorts, TrimEditor};
pub use playback::PlaybackController;
pub use shortcuts::{KeyEvent, KeyboardShortcuts, ShortcutAction};
