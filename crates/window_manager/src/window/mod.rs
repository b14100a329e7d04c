//! Window entities
//!
//! A [`Window`] is created by `Session::create_window` and lives in the
//! session registry until `Session::destroy_window`. It caches its geometry,
//! owns the native resources the host allocated for it, and carries the
//! callback names registered for each event kind.

pub mod callbacks;

pub use callbacks::{CallbackEvent, CallbackSlot, CallbackSlots, Modifier};

use std::any::Any;
use std::fmt;

use crate::host::{ColormapId, ContextId, Geometry, NativeWindowId, PixelFormat};

slotmap::new_key_type! {
    /// Stable identity of a window within a session
    ///
    /// Ids of destroyed windows are never handed out again.
    pub struct WindowId;
}

/// Host resources that exist exactly as long as the window does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeResources {
    /// Native window handle
    pub window: NativeWindowId,
    /// Rendering context bound to the window
    pub context: ContextId,
    /// Colormap, when the pixel format needed one
    pub colormap: Option<ColormapId>,
    /// Negotiated pixel format
    pub pixel_format: PixelFormat,
}

/// A managed top-level window
pub struct Window {
    id: WindowId,
    title: String,
    geometry: Geometry,
    resources: NativeResources,
    user_data: Option<Box<dyn Any>>,
    close_state: bool,
    pub(crate) callbacks: CallbackSlots,
}

impl Window {
    pub(crate) fn new(id: WindowId, title: String, geometry: Geometry, resources: NativeResources) -> Self {
        Self {
            id,
            title,
            geometry,
            resources,
            user_data: None,
            close_state: false,
            callbacks: CallbackSlots::default(),
        }
    }

    /// Registry identity
    pub fn id(&self) -> WindowId {
        self.id
    }

    /// Last title set through the window manager
    pub fn title(&self) -> &str {
        &self.title
    }

    pub(crate) fn set_title(&mut self, title: &str) {
        title.clone_into(&mut self.title);
    }

    /// Cached geometry
    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    pub(crate) fn geometry_mut(&mut self) -> &mut Geometry {
        &mut self.geometry
    }

    /// Cached left edge
    pub fn x(&self) -> i32 {
        self.geometry.x
    }

    /// Cached top edge
    pub fn y(&self) -> i32 {
        self.geometry.y
    }

    /// Cached width
    pub fn width(&self) -> u32 {
        self.geometry.width
    }

    /// Cached height
    pub fn height(&self) -> u32 {
        self.geometry.height
    }

    /// Native handles owned by this window
    pub fn resources(&self) -> &NativeResources {
        &self.resources
    }

    /// Native window handle
    pub fn native_window(&self) -> NativeWindowId {
        self.resources.window
    }

    /// Rendering context handle
    pub fn context(&self) -> ContextId {
        self.resources.context
    }

    /// Whether the negotiated pixel format is double-buffered
    pub fn is_double_buffered(&self) -> bool {
        self.resources.pixel_format.double_buffered
    }

    /// Caller-owned data attached to the window
    pub fn user_data(&self) -> Option<&dyn Any> {
        self.user_data.as_deref()
    }

    /// Mutable access to the caller-owned data
    pub fn user_data_mut(&mut self) -> Option<&mut (dyn Any + 'static)> {
        self.user_data.as_deref_mut()
    }

    /// Replace the caller-owned data, returning the previous value
    pub fn set_user_data(&mut self, data: Option<Box<dyn Any>>) -> Option<Box<dyn Any>> {
        std::mem::replace(&mut self.user_data, data)
    }

    /// Close-request flag, raised when the host delivers a close request
    pub fn close_state(&self) -> bool {
        self.close_state
    }

    /// Set the close-request flag
    pub fn set_close_state(&mut self, close: bool) {
        self.close_state = close;
    }

    /// Callback names registered on this window
    pub fn callbacks(&self) -> &CallbackSlots {
        &self.callbacks
    }
}

impl fmt::Debug for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Window")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("geometry", &self.geometry)
            .field("resources", &self.resources)
            .field("has_user_data", &self.user_data.is_some())
            .field("close_state", &self.close_state)
            .field("callbacks", &self.callbacks)
            .finish()
    }
}
