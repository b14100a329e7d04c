//! Callback slots and the payloads passed to callbacks
//!
//! Each window has one slot per event kind. A slot holds the *name* of a
//! callback; the event loop resolves names to callables at dispatch time.
//! Registering into a slot overwrites it, and registering `None` clears it.

use std::fmt;

use crate::host::ModifierMask;

/// Event kinds a window can have a callback for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallbackSlot {
    /// Window contents need drawing
    Paint,
    /// Window size changed
    Reshape,
    /// Nothing else to do
    Idle,
    /// Key pressed
    KeyDown,
    /// Key released
    KeyUp,
    /// Pointer entered
    Enter,
    /// Pointer left
    Leave,
    /// Pointer moved
    Motion,
    /// Pointer button pressed
    ButtonDown,
    /// Pointer button released
    ButtonUp,
    /// Close requested
    Close,
}

impl CallbackSlot {
    /// Every slot, in declaration order
    pub const ALL: [Self; 11] = [
        Self::Paint,
        Self::Reshape,
        Self::Idle,
        Self::KeyDown,
        Self::KeyUp,
        Self::Enter,
        Self::Leave,
        Self::Motion,
        Self::ButtonDown,
        Self::ButtonUp,
        Self::Close,
    ];

    /// Short lowercase name used in logs and errors
    pub const fn name(self) -> &'static str {
        match self {
            Self::Paint => "paint",
            Self::Reshape => "reshape",
            Self::Idle => "idle",
            Self::KeyDown => "key-down",
            Self::KeyUp => "key-up",
            Self::Enter => "enter",
            Self::Leave => "leave",
            Self::Motion => "motion",
            Self::ButtonDown => "button-down",
            Self::ButtonUp => "button-up",
            Self::Close => "close",
        }
    }
}

impl fmt::Display for CallbackSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-window callback registrations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackSlots {
    paint: Option<String>,
    reshape: Option<String>,
    idle: Option<String>,
    key_down: Option<String>,
    key_up: Option<String>,
    enter: Option<String>,
    leave: Option<String>,
    motion: Option<String>,
    button_down: Option<String>,
    button_up: Option<String>,
    close: Option<String>,
}

impl CallbackSlots {
    fn slot_mut(&mut self, slot: CallbackSlot) -> &mut Option<String> {
        match slot {
            CallbackSlot::Paint => &mut self.paint,
            CallbackSlot::Reshape => &mut self.reshape,
            CallbackSlot::Idle => &mut self.idle,
            CallbackSlot::KeyDown => &mut self.key_down,
            CallbackSlot::KeyUp => &mut self.key_up,
            CallbackSlot::Enter => &mut self.enter,
            CallbackSlot::Leave => &mut self.leave,
            CallbackSlot::Motion => &mut self.motion,
            CallbackSlot::ButtonDown => &mut self.button_down,
            CallbackSlot::ButtonUp => &mut self.button_up,
            CallbackSlot::Close => &mut self.close,
        }
    }

    /// Name registered in `slot`, if any
    pub fn get(&self, slot: CallbackSlot) -> Option<&str> {
        let name = match slot {
            CallbackSlot::Paint => &self.paint,
            CallbackSlot::Reshape => &self.reshape,
            CallbackSlot::Idle => &self.idle,
            CallbackSlot::KeyDown => &self.key_down,
            CallbackSlot::KeyUp => &self.key_up,
            CallbackSlot::Enter => &self.enter,
            CallbackSlot::Leave => &self.leave,
            CallbackSlot::Motion => &self.motion,
            CallbackSlot::ButtonDown => &self.button_down,
            CallbackSlot::ButtonUp => &self.button_up,
            CallbackSlot::Close => &self.close,
        };
        name.as_deref()
    }

    /// Overwrite `slot`, returning the previous registration
    pub fn set(&mut self, slot: CallbackSlot, name: Option<String>) -> Option<String> {
        std::mem::replace(self.slot_mut(slot), name)
    }

    /// Whether any slot is registered
    pub fn any(&self) -> bool {
        CallbackSlot::ALL.iter().any(|slot| self.get(*slot).is_some())
    }
}

/// Modifier reported with button events
///
/// Only one modifier is reported even when several are held; see
/// [`Modifier::from_mask`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Modifier {
    /// No recognised modifier held
    #[default]
    None,
    /// Shift
    Shift,
    /// Control
    Control,
    /// Alt
    Alt,
    /// Super / logo
    Super,
}

impl Modifier {
    /// Pick the first held modifier in the order shift, control, alt, super
    pub fn from_mask(mask: ModifierMask) -> Self {
        if mask.contains(ModifierMask::SHIFT) {
            Self::Shift
        } else if mask.contains(ModifierMask::CONTROL) {
            Self::Control
        } else if mask.contains(ModifierMask::ALT) {
            Self::Alt
        } else if mask.contains(ModifierMask::SUPER) {
            Self::Super
        } else {
            Self::None
        }
    }
}

/// Arguments handed to a callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackEvent {
    /// Draw the window
    Paint,
    /// Window resized
    Reshape {
        /// New width
        width: u32,
        /// New height
        height: u32,
    },
    /// No pending events
    Idle,
    /// Key pressed; pointer position queried at dispatch time
    KeyDown {
        /// Keysym code
        key: u32,
        /// Pointer x
        x: i32,
        /// Pointer y
        y: i32,
    },
    /// Key released; pointer position queried at dispatch time
    KeyUp {
        /// Keysym code
        key: u32,
        /// Pointer x
        x: i32,
        /// Pointer y
        y: i32,
    },
    /// Pointer entered
    Enter,
    /// Pointer left
    Leave,
    /// Pointer moved
    Motion {
        /// Window-local x
        x: i32,
        /// Window-local y
        y: i32,
    },
    /// Button pressed
    ButtonDown {
        /// Zero-based button index
        button: u32,
        /// Held modifier
        modifier: Modifier,
        /// Window-local x
        x: i32,
        /// Window-local y
        y: i32,
    },
    /// Button released
    ButtonUp {
        /// Zero-based button index
        button: u32,
        /// Held modifier
        modifier: Modifier,
        /// Window-local x
        x: i32,
        /// Window-local y
        y: i32,
    },
    /// Close requested
    Close,
}

impl CallbackEvent {
    /// Slot this event is dispatched to
    pub const fn slot(&self) -> CallbackSlot {
        match self {
            Self::Paint => CallbackSlot::Paint,
            Self::Reshape { .. } => CallbackSlot::Reshape,
            Self::Idle => CallbackSlot::Idle,
            Self::KeyDown { .. } => CallbackSlot::KeyDown,
            Self::KeyUp { .. } => CallbackSlot::KeyUp,
            Self::Enter => CallbackSlot::Enter,
            Self::Leave => CallbackSlot::Leave,
            Self::Motion { .. } => CallbackSlot::Motion,
            Self::ButtonDown { .. } => CallbackSlot::ButtonDown,
            Self::ButtonUp { .. } => CallbackSlot::ButtonUp,
            Self::Close => CallbackSlot::Close,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_registration_wins() {
        let mut slots = CallbackSlots::default();
        assert_eq!(slots.set(CallbackSlot::Paint, Some("first".into())), None);
        assert_eq!(slots.set(CallbackSlot::Paint, Some("second".into())), Some("first".into()));
        assert_eq!(slots.get(CallbackSlot::Paint), Some("second"));
        assert_eq!(slots.get(CallbackSlot::Idle), None);
    }

    #[test]
    fn test_none_clears_slot() {
        let mut slots = CallbackSlots::default();
        slots.set(CallbackSlot::Close, Some("on_close".into()));
        assert!(slots.any());
        slots.set(CallbackSlot::Close, None);
        assert!(!slots.any());
    }

    #[test]
    fn test_slots_are_independent() {
        let mut slots = CallbackSlots::default();
        for (i, slot) in CallbackSlot::ALL.iter().enumerate() {
            slots.set(*slot, Some(format!("cb{i}")));
        }
        for (i, slot) in CallbackSlot::ALL.iter().enumerate() {
            assert_eq!(slots.get(*slot), Some(format!("cb{i}").as_str()));
        }
    }

    #[test]
    fn test_modifier_first_match() {
        let both = ModifierMask::SHIFT | ModifierMask::CONTROL;
        assert_eq!(Modifier::from_mask(both), Modifier::Shift);
        assert_eq!(Modifier::from_mask(ModifierMask::CONTROL | ModifierMask::ALT), Modifier::Control);
        assert_eq!(Modifier::from_mask(ModifierMask::ALT | ModifierMask::SUPER), Modifier::Alt);
        assert_eq!(Modifier::from_mask(ModifierMask::SUPER), Modifier::Super);
        assert_eq!(Modifier::from_mask(ModifierMask::LOCK), Modifier::None);
        assert_eq!(Modifier::from_mask(ModifierMask::empty()), Modifier::None);
    }

    #[test]
    fn test_event_slot_mapping() {
        let event = CallbackEvent::ButtonUp { button: 0, modifier: Modifier::None, x: 1, y: 2 };
        assert_eq!(event.slot(), CallbackSlot::ButtonUp);
        assert_eq!(CallbackEvent::Reshape { width: 1, height: 1 }.slot(), CallbackSlot::Reshape);
        assert_eq!(CallbackSlot::KeyDown.to_string(), "key-down");
    }
}
