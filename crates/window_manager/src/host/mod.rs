//! Host windowing boundary
//!
//! The window manager never talks to a display server directly. Everything it
//! needs from the host (connection, native windows, pixel formats, rendering
//! contexts, the event queue) goes through the [`HostBackend`] trait.
//!
//! ```text
//! ┌─────────────────────────────────┐
//! │     Session / EventLoop         │
//! └─────────────┬───────────────────┘
//!               │ Uses
//!      ┌────────▼────────┐
//!      │ HostBackend     │ ← Trait (this module)
//!      └────────┬────────┘
//!               │ Implemented by
//!   ┌───────────▼───────────┐
//!   │ headless::HeadlessHost│ ← In-memory host (tests, demo fallback)
//!   │ glfw_host::GlfwHost   │ ← Native host (feature `glfw`)
//!   └───────────────────────┘
//! ```

pub mod event;
pub mod headless;
#[cfg(feature = "glfw")]
pub mod glfw_host;

pub use event::{HostEvent, HostEventKind, ModifierMask};
pub use headless::{HeadlessConnection, HeadlessHost, HostCall};
#[cfg(feature = "glfw")]
pub use glfw_host::{GlfwConnector, GlfwHost};

use thiserror::Error;

/// Host boundary errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// Connection to the display could not be opened
    #[error("connection failed: {0}")]
    OpenFailed(String),

    /// The host rejected a request
    #[error("request rejected: {0}")]
    Rejected(String),
}

/// Result alias for host calls
pub type HostResult<T> = Result<T, HostError>;

/// Opaque host identifier for a native window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NativeWindowId(pub u64);

/// Opaque host identifier for a rendering context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextId(pub u64);

/// Opaque host identifier for a colormap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColormapId(pub u64);

/// Buffer layout requested from the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelFormatRequest {
    /// Front and back buffer
    pub double_buffered: bool,
    /// RGBA (as opposed to color-index) mode
    pub rgba: bool,
    /// Minimum bits for each of red, green and blue
    pub min_channel_bits: u8,
}

impl PixelFormatRequest {
    /// Double-buffered RGBA
    pub const DOUBLE_RGBA: Self = Self {
        double_buffered: true,
        rgba: true,
        min_channel_bits: 1,
    };

    /// Single-buffered RGBA
    pub const SINGLE_RGBA: Self = Self {
        double_buffered: false,
        rgba: true,
        min_channel_bits: 1,
    };

    /// Requests in preference order. The first one the host accepts wins.
    pub const PREFERENCE: [Self; 2] = [Self::DOUBLE_RGBA, Self::SINGLE_RGBA];
}

/// Pixel format the host agreed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelFormat {
    /// Host identifier for the format (visual id, config id, ...)
    pub id: u64,
    /// Whether swaps exchange a back buffer
    pub double_buffered: bool,
    /// Color depth in bits
    pub depth: u8,
    /// Bits for each of red, green and blue
    pub channel_bits: u8,
    /// Whether windows with this format need their own colormap
    pub needs_colormap: bool,
}

/// Native window position and size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Geometry {
    /// Left edge
    pub x: i32,
    /// Top edge
    pub y: i32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Geometry {
    /// Create a geometry
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }
}

/// Operations the window manager needs from the host windowing service
///
/// Implementations queue commands; nothing is guaranteed host-visible until
/// [`HostBackend::flush`] returns.
pub trait HostBackend {
    /// Find a pixel format satisfying `request`, if the host has one
    fn choose_pixel_format(&mut self, request: &PixelFormatRequest) -> Option<PixelFormat>;

    /// Allocate a colormap for `format`
    fn create_colormap(&mut self, format: &PixelFormat) -> HostResult<ColormapId>;

    /// Release a colormap
    fn free_colormap(&mut self, colormap: ColormapId);

    /// Create an unmapped native window
    fn create_window(
        &mut self,
        geometry: &Geometry,
        title: &str,
        format: &PixelFormat,
        colormap: Option<ColormapId>,
    ) -> HostResult<NativeWindowId>;

    /// Ask the host to deliver close requests as events instead of killing the client
    fn register_close_protocol(&mut self, window: NativeWindowId);

    /// Create a rendering context for a window
    fn create_context(&mut self, window: NativeWindowId, format: &PixelFormat) -> HostResult<ContextId>;

    /// Bind a context to a window for subsequent drawing
    fn make_current(&mut self, window: NativeWindowId, context: ContextId) -> bool;

    /// Present the back buffer
    fn swap_buffers(&mut self, window: NativeWindowId);

    /// Destroy a rendering context
    fn destroy_context(&mut self, context: ContextId);

    /// Destroy a native window
    fn destroy_window(&mut self, window: NativeWindowId);

    /// Make a window visible
    fn map_window(&mut self, window: NativeWindowId);

    /// Hide a window
    fn unmap_window(&mut self, window: NativeWindowId);

    /// Change a window's title
    fn set_title(&mut self, window: NativeWindowId, title: &str);

    /// Move a window
    fn move_window(&mut self, window: NativeWindowId, x: i32, y: i32);

    /// Resize a window
    fn resize_window(&mut self, window: NativeWindowId, width: u32, height: u32);

    /// Whether at least one event is waiting. Never blocks.
    fn pending(&mut self) -> bool;

    /// Dequeue one event
    fn next_event(&mut self) -> Option<HostEvent>;

    /// Current pointer position relative to `window`
    fn query_pointer(&mut self, window: NativeWindowId) -> (i32, i32);

    /// Push buffered commands to the host
    fn flush(&mut self);
}

/// Opens connections to a host windowing service
pub trait HostConnector {
    /// Connect to `display`, or to the host default when `None`
    fn open(&mut self, display: Option<&str>) -> HostResult<Box<dyn HostBackend>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preference_prefers_double_buffering() {
        assert!(PixelFormatRequest::PREFERENCE[0].double_buffered);
        assert!(!PixelFormatRequest::PREFERENCE[1].double_buffered);
        assert!(PixelFormatRequest::PREFERENCE.iter().all(|r| r.rgba && r.min_channel_bits >= 1));
    }
}
