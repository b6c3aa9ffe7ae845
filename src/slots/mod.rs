//! Placement slots: the tab area, the tab sequence that drives eviction,
//! and the set of detached windows.

mod tab_sequence;
mod tabs;
mod windows;

pub use tab_sequence::TabSequence;
pub use tabs::{TabArea, TabSlot};
pub use windows::{WindowSet, WindowSlot};
