//! Explorer State
//!
//! Per-window session state around the filesystem engine:
//! - `session`: clipboard-mediated paste, entry actions, event reporting
//! - `settings`: persisted user preferences
//! - `pinned`: shortcut folders from the host environment
//! - `logging`: tracing subscriber setup

pub mod logging;
pub mod pinned;
pub mod session;
pub mod settings;

pub use logging::LogGuard;
pub use pinned::{default_pinned, pinned_locations};
pub use session::{Activation, EventLog, EventSink, ExplorerEvent, ExplorerSession, Opener, SystemOpener, TextClipboard};
pub use settings::{ExplorerSettings, PinnedEntry};
