//! The UI host seam.
//!
//! The host owns actual widgets: a tab container, top-level windows, and the
//! editor widgets placed in them. The coordinator refers to widgets only by
//! generation-tagged handles and asks the host whether a handle is still
//! alive before trusting it, since the toolkit may destroy a widget behind
//! the coordinator's back.

use note_session_config::{GeometryBlob, NoteId};
use std::fmt;

/// Where a note may be placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotKind {
    Tab,
    Window,
}

impl fmt::Display for SlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotKind::Tab => f.write_str("tab"),
            SlotKind::Window => f.write_str("window"),
        }
    }
}

/// Placement requested by the caller of `open`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpenIn {
    Tab,
    Window,
    /// Keep an existing placement, or use a tab for a note not yet open.
    #[default]
    Any,
}

impl From<SlotKind> for OpenIn {
    fn from(kind: SlotKind) -> Self {
        match kind {
            SlotKind::Tab => OpenIn::Tab,
            SlotKind::Window => OpenIn::Window,
        }
    }
}

/// Handle to a host widget.
///
/// The host may reuse `index` after a widget is destroyed; `generation`
/// distinguishes the reuse, so a stale handle never aliases a new widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WidgetHandle {
    pub index: u32,
    pub generation: u32,
}

impl WidgetHandle {
    pub fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }
}

impl fmt::Display for WidgetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}.{}", self.index, self.generation)
    }
}

/// Widget and window management primitives supplied by the UI layer.
///
/// All calls happen on the control thread.
pub trait UiHost {
    /// Create an editor widget showing `note_id`, or a blank editor for `None`.
    fn create_editor(&mut self, note_id: Option<&NoteId>) -> WidgetHandle;

    /// Point an existing editor at another note (or at nothing, making it blank).
    fn bind_editor(&mut self, widget: WidgetHandle, note_id: Option<&NoteId>);

    fn is_alive(&self, widget: WidgetHandle) -> bool;

    /// Whether the widget is an editor widget at all.
    fn is_editor(&self, widget: WidgetHandle) -> bool;

    fn destroy_widget(&mut self, widget: WidgetHandle);

    /// Append the widget to the tab container.
    fn insert_tab(&mut self, widget: WidgetHandle, title: &str);

    /// Take the widget out of the tab container without destroying it.
    fn remove_tab(&mut self, widget: WidgetHandle);

    fn set_current_tab(&mut self, widget: WidgetHandle);

    /// Show the widget in its own top-level window.
    fn show_window(&mut self, widget: WidgetHandle, title: &str);

    /// Close the top-level window around the widget without destroying it.
    fn detach_window(&mut self, widget: WidgetHandle);

    fn raise_window(&mut self, widget: WidgetHandle);

    fn set_title(&mut self, widget: WidgetHandle, title: &str);

    /// Start delivering close/resize/focus-loss events for the widget.
    fn install_event_filter(&mut self, widget: WidgetHandle);

    fn remove_event_filter(&mut self, widget: WidgetHandle);

    /// Current geometry of the window hosting the widget.
    fn window_geometry(&self, widget: WidgetHandle) -> Option<GeometryBlob>;

    /// Apply saved geometry; `false` when the blob is malformed.
    fn restore_window_geometry(&mut self, widget: WidgetHandle, blob: &GeometryBlob) -> bool;
}
