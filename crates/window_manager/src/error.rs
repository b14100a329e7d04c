//! Error types for the window manager
//!
//! Lifecycle failures ([`WindowManagerError`]) are returned to the caller of
//! the failing operation. Dispatch failures ([`DispatchError`]) are fatal to
//! the main loop. Events for unknown native windows are not errors at all;
//! they are logged and dropped.

use thiserror::Error;

use crate::config::ConfigError;
use crate::host::HostError;
use crate::window::{CallbackSlot, WindowId};

/// Error returned by a user callback
pub type CallbackError = Box<dyn std::error::Error + 'static>;

/// Lifecycle operation errors
#[derive(Error, Debug)]
pub enum WindowManagerError {
    /// The host display connection could not be opened
    #[error("cannot open display {display}: {source}")]
    Connection {
        /// Display target that was tried
        display: String,
        /// Host failure
        #[source]
        source: HostError,
    },

    /// Neither the double- nor the single-buffered pixel format is available
    #[error("no usable pixel format (tried double- and single-buffered RGBA)")]
    NoPixelFormat,

    /// The host refused to create the native window
    #[error("window creation failed: {0}")]
    WindowCreation(#[source] HostError),

    /// The host refused to create the rendering context
    #[error("rendering context creation failed: {0}")]
    ContextCreation(#[source] HostError),

    /// Configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Fatal errors raised while dispatching events to callbacks
#[derive(Error, Debug)]
pub enum DispatchError {
    /// A registered callback name has no callable behind it
    #[error("undefined callback `{name}` registered as {slot} handler for window {window:?}")]
    UnresolvedCallback {
        /// Registered name
        name: String,
        /// Slot the name was registered in
        slot: CallbackSlot,
        /// Window being dispatched to
        window: WindowId,
    },

    /// A callback ran and reported failure
    #[error("callback `{name}` ({slot} handler) failed: {source}")]
    CallbackFailed {
        /// Registered name
        name: String,
        /// Slot the name was registered in
        slot: CallbackSlot,
        /// Error reported by the callback
        #[source]
        source: CallbackError,
    },
}

/// Result alias for lifecycle operations
pub type WmResult<T> = Result<T, WindowManagerError>;
