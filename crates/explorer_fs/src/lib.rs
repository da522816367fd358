//! Explorer Filesystem Engine
//!
//! Navigation and transfer core for a file manager: location resolution,
//! back/forward history, recursive search, clipboard-mediated copy and move
//! with conflict resolution, and trash-first deletion.
//!
//! Rendering, dialogs and the OS trash are collaborators reached through
//! traits ([`ConflictResolver`], [`TrashCapability`]).

pub mod clipboard;
pub mod error;
pub mod listing;
pub mod location;
pub mod navigation;
pub mod properties;
pub mod search;
pub mod transfer;
pub mod utils;

pub use clipboard::{ClipboardChange, ClipboardMode, ClipboardStore};
pub use error::{NavigationError, TransferError, TransferResult};
pub use listing::{list_directory, FileItem, FileType, ListingOptions, SortBy, SortOrder};
pub use location::{
    entry_kind, is_volume_root, normalize, volumes, EntryAction, EntryKind, Location, PathResolver,
    COLLECTION_ROOT_LABEL, DEFAULT_ROOT_ALIASES,
};
pub use navigation::{NavState, NavigationController, PinnedLocation};
pub use properties::EntryProperties;
pub use search::{SearchEngine, SearchIter, SearchOptions, SearchResult};
pub use transfer::{
    Always, BatchHandle, BatchKind, BatchReport, Conflict, ConflictChoice, ConflictResolver, ItemOutcome, NoOp,
    Outcome, TransferEngine, TransferJob, TransferMode, TransferPlan, TransferWorker, TrashCapability,
};
