//! Configuration section definitions.

mod preview;
mod watch;

pub use preview::PreviewConfig;
pub use watch::WatchConfig;
