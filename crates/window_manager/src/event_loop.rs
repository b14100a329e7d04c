//! Cooperative event loop
//!
//! [`EventLoop::main_iteration`] does one unit of work: if the host has an
//! event pending it dequeues exactly one and dispatches it to the owning
//! window; otherwise it sweeps every registered window, calling `paint` then
//! `idle`. [`EventLoop::main_loop`] repeats that until an exit is requested or
//! the last window is gone.
//!
//! The loop never blocks waiting for events. With idle callbacks registered
//! and no input it spins at full speed unless an idle sleep is configured.
//!
//! Callbacks are registered by name. Names are turned into callables by the
//! [`CallbackResolver`] the loop was built with, at the moment an event needs
//! them. A name that does not resolve stops the loop with
//! [`DispatchError::UnresolvedCallback`]; an event for an unknown native
//! window is dropped silently.
//!
//! Callbacks run on the loop's stack with mutable access to the [`Session`],
//! so they may create or destroy windows (including their own) and request an
//! exit. Calling `main_loop` from inside a callback is not supported.

use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use crate::config::EventLoopConfig;
use crate::error::{CallbackError, DispatchError};
use crate::host::{Geometry, HostEvent, HostEventKind};
use crate::session::Session;
use crate::window::{CallbackEvent, Modifier, WindowId};

/// A resolved callback
pub type Callback = Rc<dyn Fn(&mut Session, WindowId, &CallbackEvent) -> Result<(), CallbackError>>;

/// Turns registered callback names into callables
pub trait CallbackResolver {
    /// Look up `name`; `None` means the name is undefined
    fn resolve(&self, name: &str) -> Option<Callback>;
}

impl<F> CallbackResolver for F
where
    F: Fn(&str) -> Option<Callback>,
{
    fn resolve(&self, name: &str) -> Option<Callback> {
        self(name)
    }
}

/// Name-to-callable map
#[derive(Clone, Default)]
pub struct CallbackTable {
    callbacks: HashMap<String, Callback>,
}

impl CallbackTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Define `name`, replacing any previous definition
    pub fn define<F>(&mut self, name: impl Into<String>, callback: F) -> &mut Self
    where
        F: Fn(&mut Session, WindowId, &CallbackEvent) -> Result<(), CallbackError> + 'static,
    {
        self.callbacks.insert(name.into(), Rc::new(callback));
        self
    }

    /// Remove the definition of `name`
    pub fn undefine(&mut self, name: &str) -> bool {
        self.callbacks.remove(name).is_some()
    }

    /// Whether `name` is defined
    pub fn is_defined(&self, name: &str) -> bool {
        self.callbacks.contains_key(name)
    }
}

impl CallbackResolver for CallbackTable {
    fn resolve(&self, name: &str) -> Option<Callback> {
        self.callbacks.get(name).cloned()
    }
}

impl std::fmt::Debug for CallbackTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.callbacks.keys().collect();
        names.sort();
        f.debug_struct("CallbackTable").field("names", &names).finish()
    }
}

/// What a single iteration did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Iteration {
    /// An event was routed to a live window
    Dispatched,
    /// An event was dequeued but no window owns its native handle
    Dropped,
    /// An event reached its window but has no meaning for the dispatcher
    Ignored,
    /// No event was pending; this many windows were swept
    Swept(usize),
}

/// Why the main loop returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// [`Session::exit_main_loop`] was called
    ExitRequested,
    /// The last window was destroyed
    NoWindows,
}

/// Drives dispatch for a session
pub struct EventLoop<R> {
    resolver: R,
    idle_sleep: Option<Duration>,
}

impl<R: CallbackResolver> EventLoop<R> {
    /// Create a busy-polling loop
    pub fn new(resolver: R) -> Self {
        Self {
            resolver,
            idle_sleep: None,
        }
    }

    /// Create a loop with scheduling taken from configuration
    pub fn from_config(resolver: R, config: &EventLoopConfig) -> Self {
        Self::new(resolver).with_idle_sleep(config.idle_sleep())
    }

    /// Sleep this long after each no-event sweep
    #[must_use]
    pub fn with_idle_sleep(mut self, idle_sleep: Option<Duration>) -> Self {
        self.idle_sleep = idle_sleep;
        self
    }

    /// The resolver callbacks are looked up in
    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Mutable access to the resolver
    pub fn resolver_mut(&mut self) -> &mut R {
        &mut self.resolver
    }

    /// Run until an exit is requested or no windows remain
    pub fn main_loop(&mut self, session: &mut Session) -> Result<LoopExit, DispatchError> {
        session.reset_exit();
        log::info!("Entering main loop with {} windows", session.window_count());

        loop {
            if session.exit_requested() {
                log::info!("Main loop exiting on request");
                return Ok(LoopExit::ExitRequested);
            }
            if session.window_count() == 0 {
                log::info!("Main loop exiting: no windows left");
                return Ok(LoopExit::NoWindows);
            }
            if let Err(e) = self.main_iteration(session) {
                log::error!("Main loop stopped: {e}");
                return Err(e);
            }
        }
    }

    /// Handle one pending event, or sweep every window if none is pending
    pub fn main_iteration(&mut self, session: &mut Session) -> Result<Iteration, DispatchError> {
        if session.host_mut().pending() {
            return match session.host_mut().next_event() {
                Some(event) => self.handle_event(session, event),
                None => Ok(Iteration::Dropped),
            };
        }
        self.sweep(session)
    }

    fn handle_event(&self, session: &mut Session, event: HostEvent) -> Result<Iteration, DispatchError> {
        let Some(id) = session.lookup_native(event.window) else {
            log::debug!("Dropping {:?} for unknown native window {:?}", event.kind, event.window);
            return Ok(Iteration::Dropped);
        };

        match event.kind {
            HostEventKind::Expose => {
                self.dispatch(session, id, CallbackEvent::Paint)?;
            }
            HostEventKind::KeyPress { keysym } => {
                let (x, y) = session.host_mut().query_pointer(event.window);
                self.dispatch(session, id, CallbackEvent::KeyDown { key: keysym, x, y })?;
            }
            HostEventKind::KeyRelease { keysym } => {
                let (x, y) = session.host_mut().query_pointer(event.window);
                self.dispatch(session, id, CallbackEvent::KeyUp { key: keysym, x, y })?;
            }
            HostEventKind::Enter => {
                self.dispatch(session, id, CallbackEvent::Enter)?;
            }
            HostEventKind::Leave => {
                self.dispatch(session, id, CallbackEvent::Leave)?;
            }
            HostEventKind::Motion { x, y } => {
                self.dispatch(session, id, CallbackEvent::Motion { x, y })?;
            }
            HostEventKind::ButtonPress { button, state, x, y } => {
                let event = CallbackEvent::ButtonDown {
                    button: button.saturating_sub(1),
                    modifier: Modifier::from_mask(state),
                    x,
                    y,
                };
                self.dispatch(session, id, event)?;
            }
            HostEventKind::ButtonRelease { button, state, x, y } => {
                let event = CallbackEvent::ButtonUp {
                    button: button.saturating_sub(1),
                    modifier: Modifier::from_mask(state),
                    x,
                    y,
                };
                self.dispatch(session, id, event)?;
            }
            HostEventKind::CloseRequest => {
                if let Some(window) = session.window_mut(id) {
                    window.set_close_state(true);
                }
                self.dispatch(session, id, CallbackEvent::Close)?;
            }
            HostEventKind::Configure { x, y, width, height } => {
                let Some(window) = session.window_mut(id) else {
                    return Ok(Iteration::Dropped);
                };
                let geometry = window.geometry_mut();
                let updated = Geometry::new(x, y, width, height);
                if *geometry != updated {
                    log::debug!("{id:?} configured {geometry:?} -> {updated:?}");
                    *geometry = updated;
                }
                self.dispatch(session, id, CallbackEvent::Reshape { width, height })?;
                self.dispatch(session, id, CallbackEvent::Paint)?;
            }
            HostEventKind::Other => {
                log::trace!("Ignoring unhandled host event for {id:?}");
                return Ok(Iteration::Ignored);
            }
        }

        session.host_mut().flush();
        Ok(Iteration::Dispatched)
    }

    fn sweep(&self, session: &mut Session) -> Result<Iteration, DispatchError> {
        let ids = session.window_ids();
        let mut visited = 0;
        for id in ids {
            // An earlier callback in this sweep may have destroyed it
            if !session.registry().contains(id) {
                continue;
            }
            self.dispatch(session, id, CallbackEvent::Paint)?;
            self.dispatch(session, id, CallbackEvent::Idle)?;
            session.host_mut().flush();
            visited += 1;
        }

        if let Some(idle_sleep) = self.idle_sleep {
            std::thread::sleep(idle_sleep);
        }
        Ok(Iteration::Swept(visited))
    }

    /// Invoke the callback registered for `event` on `id`, if any
    ///
    /// Returns whether a callback ran. A window destroyed earlier in the same
    /// dispatch simply has no callbacks left.
    fn dispatch(&self, session: &mut Session, id: WindowId, event: CallbackEvent) -> Result<bool, DispatchError> {
        let slot = event.slot();
        let Some(name) = session
            .window(id)
            .and_then(|window| window.callbacks().get(slot))
            .map(str::to_string)
        else {
            return Ok(false);
        };

        let callback = self
            .resolver
            .resolve(&name)
            .ok_or_else(|| DispatchError::UnresolvedCallback {
                name: name.clone(),
                slot,
                window: id,
            })?;

        log::trace!("{slot} -> `{name}` for {id:?}");
        (*callback)(session, id, &event)
            .map_err(|source| DispatchError::CallbackFailed { name, slot, source })?;
        Ok(true)
    }
}

impl<R: std::fmt::Debug> std::fmt::Debug for EventLoop<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventLoop")
            .field("resolver", &self.resolver)
            .field("idle_sleep", &self.idle_sleep)
            .finish()
    }
}
