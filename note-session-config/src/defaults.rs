//! Default values for coordinator preferences.

pub fn max_tabs() -> usize {
    5
}

pub fn expunge_empty_new_notes() -> bool {
    true
}

pub fn save_timeout_ms() -> u64 {
    5000
}

pub fn expunge_timeout_ms() -> u64 {
    2000
}

/// Lower bound applied to both blocking deadlines.
pub fn min_blocking_timeout_ms() -> u64 {
    100
}

pub fn geometry_debounce_ms() -> u64 {
    3000
}

pub fn source_application() -> String {
    "note-session".to_string()
}

pub fn track_last_focused_tab() -> bool {
    true
}
