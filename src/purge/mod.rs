//! Brick purging: GFID lookup, `.glusterfs` link derivation, and the
//! bottom-up removal walk.

pub mod brick;
pub mod gfid;
pub mod identity;
pub mod purger;
pub mod report;
