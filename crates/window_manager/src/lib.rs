//! # Window Manager
//!
//! A minimal native window manager: top-level windows with a rendering
//! context each, and a single cooperative event loop that routes host events
//! to per-window callbacks.
//!
//! ## Features
//!
//! - **Session**: one host connection, created by `init` and closed by `terminate`
//! - **Windows**: all-or-nothing creation, double-buffered when the host allows it
//! - **Callbacks**: one named slot per event kind, resolved at dispatch time
//! - **Event loop**: busy-polling `main_iteration` / `main_loop`
//! - **Backends**: in-memory headless host, GLFW host behind the `glfw` feature
//!
//! ## Quick Start
//!
//! ```rust
//! use window_manager::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut host = HeadlessHost::new();
//!     let config = WindowManagerConfig::default();
//!     let mut session = Session::init(&mut host, &["demo"], |_| None, &config)?;
//!
//!     let window = session.create_window("Hello")?;
//!     session.register_idle_func(window, Some("quit"));
//!
//!     let mut callbacks = CallbackTable::new();
//!     callbacks.define("quit", |session: &mut Session, _, _: &CallbackEvent| {
//!         session.exit_main_loop();
//!         Ok(())
//!     });
//!
//!     let mut event_loop = EventLoop::new(callbacks);
//!     assert_eq!(event_loop.main_loop(&mut session)?, LoopExit::ExitRequested);
//!
//!     session.terminate();
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;
pub mod config;
pub mod error;
pub mod host;
pub mod window;
pub mod registry;
pub mod session;
pub mod event_loop;

#[cfg(test)]
mod tests;

pub use error::{CallbackError, DispatchError, WindowManagerError, WmResult};
pub use event_loop::{Callback, CallbackResolver, CallbackTable, EventLoop, Iteration, LoopExit};
pub use session::Session;
pub use window::{CallbackEvent, CallbackSlot, Modifier, Window, WindowId};

/// Common imports for window manager users
pub mod prelude {
    pub use crate::{
        Callback, CallbackError, CallbackEvent, CallbackResolver, CallbackSlot, CallbackTable,
        DispatchError, EventLoop, Iteration, LoopExit, Modifier, Session, Window, WindowId,
        WindowManagerError,
        config::{Config, WindowManagerConfig},
        host::{HeadlessHost, HostConnector},
    };
}
