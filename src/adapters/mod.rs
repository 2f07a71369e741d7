// Adapters - External system implementations

pub mod frame_clock;
pub mod headless_ui;
pub mod raw_video;
pub mod toml_config;

// Re-export adapters
pub use frame_clock::TickerFrameClock;
pub use headless_ui::HeadlessUi;
pub use raw_video::{RawVideoEncoder, RawVideoPlayback};
pub use toml_config::TomlConfigAdapter;
