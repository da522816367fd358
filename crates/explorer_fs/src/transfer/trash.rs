//! Trash capability
//!
//! The engine only relies on a yes/no answer. Absence of the capability or a
//! `false` answer selects permanent removal.

use std::path::Path;

pub trait TrashCapability: Send + Sync {
    /// Moves `path` into a recoverable trash. Returns false on any failure.
    fn move_to_trash(&self, path: &Path) -> bool;
}

impl<F> TrashCapability for F
where
    F: Fn(&Path) -> bool + Send + Sync,
{
    fn move_to_trash(&self, path: &Path) -> bool {
        self(path)
    }
}

/// The platform recycle bin.
#[cfg(feature = "system-trash")]
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTrash;

#[cfg(feature = "system-trash")]
impl TrashCapability for SystemTrash {
    fn move_to_trash(&self, path: &Path) -> bool {
        match trash::delete(path) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to move {:?} to trash: {}", path, e);
                false
            }
        }
    }
}

/// The default capability for this build, if any.
pub fn system_trash() -> Option<std::sync::Arc<dyn TrashCapability>> {
    #[cfg(feature = "system-trash")]
    {
        Some(std::sync::Arc::new(SystemTrash))
    }
    #[cfg(not(feature = "system-trash"))]
    {
        None
    }
}
