#![forbid(unsafe_code)]

//! brick-purge: remove split-brain entries from a GlusterFS brick.
//!
//! When replicas disagree, files and directories can become impossible to
//! delete through the FUSE mount ("Directory not empty", "No such file or
//! directory"). This crate removes them directly from a brick's backing
//! directory, together with the GFID links GlusterFS keeps for each entry
//! under `<brick>/.glusterfs`.
//!
//! # Library usage
//!
//! ```rust,no_run
//! use brick_purge::prelude::*;
//!
//! let root = normalize_root("/data/brick1/")?;
//! let config = PurgeConfig::new(root).with_dry_run(true);
//! let mut purger = Purger::new(config, LocalBrick::new(), StdoutReporter);
//! let summary = purger.run(["dir_a", "dir_a/file1.txt"])?;
//! println!("{} objects would be removed", summary.total_removed());
//! # Ok::<(), PurgeError>(())
//! ```

pub mod prelude;

pub mod core;
pub mod logger;
pub mod purge;
