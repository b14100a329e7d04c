//! Raw events as the host delivers them

use bitflags::bitflags;

use super::NativeWindowId;

bitflags! {
    /// Modifier keys held when an input event was generated
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ModifierMask: u32 {
        /// Shift
        const SHIFT = 1 << 0;
        /// Caps lock
        const LOCK = 1 << 1;
        /// Control
        const CONTROL = 1 << 2;
        /// Alt (Mod1)
        const ALT = 1 << 3;
        /// Super / logo key (Mod4)
        const SUPER = 1 << 6;
    }
}

/// One event from the host queue, tagged with the native window it targets
#[derive(Debug, Clone, PartialEq)]
pub struct HostEvent {
    /// Target native window
    pub window: NativeWindowId,
    /// What happened
    pub kind: HostEventKind,
}

impl HostEvent {
    /// Create an event for `window`
    pub const fn new(window: NativeWindowId, kind: HostEventKind) -> Self {
        Self { window, kind }
    }
}

/// Host event kinds the window manager understands
#[derive(Debug, Clone, PartialEq)]
pub enum HostEventKind {
    /// Part of the window needs repainting
    Expose,
    /// Key pressed, already translated to a keysym
    KeyPress {
        /// Keysym code
        keysym: u32,
    },
    /// Key released
    KeyRelease {
        /// Keysym code
        keysym: u32,
    },
    /// Pointer entered the window
    Enter,
    /// Pointer left the window
    Leave,
    /// Pointer moved inside the window
    Motion {
        /// Window-local x
        x: i32,
        /// Window-local y
        y: i32,
    },
    /// Pointer button pressed
    ButtonPress {
        /// One-based host button number
        button: u32,
        /// Modifiers held
        state: ModifierMask,
        /// Window-local x
        x: i32,
        /// Window-local y
        y: i32,
    },
    /// Pointer button released
    ButtonRelease {
        /// One-based host button number
        button: u32,
        /// Modifiers held
        state: ModifierMask,
        /// Window-local x
        x: i32,
        /// Window-local y
        y: i32,
    },
    /// The user asked to close the window
    CloseRequest,
    /// Window moved or resized
    Configure {
        /// New left edge
        x: i32,
        /// New top edge
        y: i32,
        /// New width
        width: u32,
        /// New height
        height: u32,
    },
    /// Anything else; ignored by the dispatcher
    Other,
}
