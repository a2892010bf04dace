//! Convenience re-exports for library consumers.
//!
//! ```rust,no_run
//! use brick_purge::prelude::*;
//! ```

// Core
pub use crate::core::config::Config;
pub use crate::core::errors::{PurgeError, Result};
pub use crate::core::paths::{normalize_root, resolve_entry};

// Purge
pub use crate::purge::brick::{BrickFs, ChildEntry, EntryKind, LocalBrick};
pub use crate::purge::gfid::{Gfid, gfid_link_path};
pub use crate::purge::identity::{GfidLookup, lookup_gfid};
pub use crate::purge::purger::{PurgeConfig, Purger};
pub use crate::purge::report::{MemoryReporter, PurgeSummary, Reporter, StdoutReporter};

// Logging
pub use crate::logger::jsonl::JsonlWriter;
