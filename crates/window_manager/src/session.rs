//! Display session
//!
//! A [`Session`] owns the host connection, the registry of live windows and
//! the native-handle lookup table the event loop uses to route events. It is
//! created by [`Session::init`] and torn down by [`Session::terminate`] (or by
//! dropping it), so no window operation can run without an open connection.
//!
//! Every operation that touches the host ends with a flush, making its effect
//! visible to whatever runs next.

use std::any::Any;
use std::collections::HashMap;
use std::time::Duration;

use crate::config::{DisplayTarget, WindowDefaults, WindowManagerConfig};
use crate::error::{WindowManagerError, WmResult};
use crate::foundation::time::MonotonicClock;
use crate::host::{
    Geometry, HostBackend, HostConnector, NativeWindowId, PixelFormat, PixelFormatRequest,
};
use crate::registry::WindowRegistry;
use crate::window::{CallbackSlot, NativeResources, Window, WindowId};

/// Live connection to the host windowing service plus the windows created on it
pub struct Session {
    host: Box<dyn HostBackend>,
    display: DisplayTarget,
    lookup: HashMap<NativeWindowId, WindowId>,
    registry: WindowRegistry,
    defaults: WindowDefaults,
    clock: MonotonicClock,
    exit_requested: bool,
}

impl Session {
    /// Open a session
    ///
    /// The display target comes from `--display`/`-display` in `args`, else
    /// from `DISPLAY` as returned by `env`, else from the config file. A
    /// connection failure is returned as-is; there is no retry.
    pub fn init<C, S, F>(
        connector: &mut C,
        args: &[S],
        env: F,
        config: &WindowManagerConfig,
    ) -> WmResult<Self>
    where
        C: HostConnector + ?Sized,
        S: AsRef<str>,
        F: Fn(&str) -> Option<String>,
    {
        let display = DisplayTarget::resolve(args, env, config.display.as_deref());
        log::info!("Opening display {display}");

        let host = connector
            .open(display.name())
            .map_err(|source| WindowManagerError::Connection {
                display: display.to_string(),
                source,
            })?;

        Ok(Self {
            host,
            display,
            lookup: HashMap::new(),
            registry: WindowRegistry::new(),
            defaults: config.window.clone(),
            clock: MonotonicClock::new(),
            exit_requested: false,
        })
    }

    /// Open a session using the process arguments and environment
    pub fn init_from_process<C>(connector: &mut C, config: &WindowManagerConfig) -> WmResult<Self>
    where
        C: HostConnector + ?Sized,
    {
        let args: Vec<String> = std::env::args().collect();
        Self::init(connector, &args, |key| std::env::var(key).ok(), config)
    }

    /// Destroy every window and close the connection
    pub fn terminate(self) {
        log::info!("Terminating session on {} ({} windows)", self.display, self.registry.len());
        drop(self);
    }

    /// Display the session is connected to
    pub fn display(&self) -> &DisplayTarget {
        &self.display
    }

    /// Time since the session opened, from a monotonic clock
    pub fn time(&self) -> Duration {
        self.clock.elapsed()
    }

    /// Milliseconds since the session opened
    pub fn time_millis(&self) -> u64 {
        self.clock.millis()
    }

    // ---- window lifecycle ----

    /// Create a window with the default geometry
    ///
    /// Either every native resource is allocated and the window is registered,
    /// or an error is returned and nothing is left behind on the host. A host
    /// that offers a double-buffered format but then refuses the window gets a
    /// second attempt with the single-buffered format.
    pub fn create_window(&mut self, title: &str) -> WmResult<WindowId> {
        let geometry = Geometry::new(
            self.defaults.x,
            self.defaults.y,
            self.defaults.width,
            self.defaults.height,
        );

        let resources = allocate_preferred(self.host.as_mut(), &geometry, title)?;
        self.host.flush();

        let id = self
            .registry
            .insert_with(|id| Window::new(id, title.to_string(), geometry, resources));
        self.lookup.insert(resources.window, id);

        log::info!(
            "Created window {id:?} '{title}' (native {:?}, {}-buffered)",
            resources.window,
            if resources.pixel_format.double_buffered { "double" } else { "single" }
        );
        Ok(id)
    }

    /// Destroy a window
    ///
    /// Returns `false` and does nothing if `id` is not a live window, so
    /// destroying twice is harmless.
    pub fn destroy_window(&mut self, id: WindowId) -> bool {
        let Some(window) = self.registry.remove(id) else {
            log::debug!("destroy_window: {id:?} is not registered");
            return false;
        };
        self.lookup.remove(&window.native_window());
        release_native(self.host.as_mut(), window.resources());
        self.host.flush();
        log::info!("Destroyed window {id:?} '{}'", window.title());
        true
    }

    /// Map a window
    pub fn show_window(&mut self, id: WindowId) -> bool {
        self.with_native(id, |host, native| host.map_window(native))
    }

    /// Unmap a window
    pub fn hide_window(&mut self, id: WindowId) -> bool {
        self.with_native(id, |host, native| host.unmap_window(native))
    }

    /// Change a window's title
    pub fn set_window_title(&mut self, id: WindowId, title: &str) -> bool {
        let Some(window) = self.registry.get_mut(id) else {
            return false;
        };
        window.set_title(title);
        let native = window.native_window();
        self.host.set_title(native, title);
        self.host.flush();
        true
    }

    /// Move a window; the cached position updates immediately
    pub fn set_window_pos(&mut self, id: WindowId, x: i32, y: i32) -> bool {
        let Some(window) = self.registry.get_mut(id) else {
            return false;
        };
        let geometry = window.geometry_mut();
        geometry.x = x;
        geometry.y = y;
        let native = window.native_window();
        self.host.move_window(native, x, y);
        self.host.flush();
        true
    }

    /// Resize a window; the cached size updates immediately
    pub fn set_window_size(&mut self, id: WindowId, width: u32, height: u32) -> bool {
        let Some(window) = self.registry.get_mut(id) else {
            return false;
        };
        let geometry = window.geometry_mut();
        geometry.width = width;
        geometry.height = height;
        let native = window.native_window();
        self.host.resize_window(native, width, height);
        self.host.flush();
        true
    }

    /// Bind the window's rendering context for drawing
    pub fn make_current(&mut self, id: WindowId) -> bool {
        let Some(window) = self.registry.get(id) else {
            return false;
        };
        let resources = *window.resources();
        let bound = self.host.make_current(resources.window, resources.context);
        if !bound {
            log::warn!("make_current failed for window {id:?}");
        }
        bound
    }

    /// Present the window's back buffer
    pub fn swap_buffers(&mut self, id: WindowId) -> bool {
        self.with_native(id, |host, native| host.swap_buffers(native))
    }

    fn with_native(&mut self, id: WindowId, f: impl FnOnce(&mut dyn HostBackend, NativeWindowId)) -> bool {
        let Some(window) = self.registry.get(id) else {
            log::debug!("ignoring request for unknown window {id:?}");
            return false;
        };
        let native = window.native_window();
        f(self.host.as_mut(), native);
        self.host.flush();
        true
    }

    // ---- callback registration ----

    /// Register `name` in `slot`, replacing any previous registration
    ///
    /// `None` clears the slot. Returns `false` if `id` is not a live window.
    /// Nothing is sent to the host: every window already takes part in the
    /// close protocol from creation on.
    pub fn register_callback(&mut self, id: WindowId, slot: CallbackSlot, name: Option<&str>) -> bool {
        let Some(window) = self.registry.get_mut(id) else {
            return false;
        };
        window.callbacks.set(slot, name.map(str::to_string));
        true
    }

    /// Register the paint callback
    pub fn register_paint_func(&mut self, id: WindowId, name: Option<&str>) -> bool {
        self.register_callback(id, CallbackSlot::Paint, name)
    }

    /// Register the reshape callback
    pub fn register_reshape_func(&mut self, id: WindowId, name: Option<&str>) -> bool {
        self.register_callback(id, CallbackSlot::Reshape, name)
    }

    /// Register the idle callback
    pub fn register_idle_func(&mut self, id: WindowId, name: Option<&str>) -> bool {
        self.register_callback(id, CallbackSlot::Idle, name)
    }

    /// Register the key-down callback
    pub fn register_key_down_func(&mut self, id: WindowId, name: Option<&str>) -> bool {
        self.register_callback(id, CallbackSlot::KeyDown, name)
    }

    /// Register the key-up callback
    pub fn register_key_up_func(&mut self, id: WindowId, name: Option<&str>) -> bool {
        self.register_callback(id, CallbackSlot::KeyUp, name)
    }

    /// Register the pointer-enter callback
    pub fn register_enter_func(&mut self, id: WindowId, name: Option<&str>) -> bool {
        self.register_callback(id, CallbackSlot::Enter, name)
    }

    /// Register the pointer-leave callback
    pub fn register_leave_func(&mut self, id: WindowId, name: Option<&str>) -> bool {
        self.register_callback(id, CallbackSlot::Leave, name)
    }

    /// Register the pointer-motion callback
    pub fn register_motion_func(&mut self, id: WindowId, name: Option<&str>) -> bool {
        self.register_callback(id, CallbackSlot::Motion, name)
    }

    /// Register the button-down callback
    pub fn register_button_down_func(&mut self, id: WindowId, name: Option<&str>) -> bool {
        self.register_callback(id, CallbackSlot::ButtonDown, name)
    }

    /// Register the button-up callback
    pub fn register_button_up_func(&mut self, id: WindowId, name: Option<&str>) -> bool {
        self.register_callback(id, CallbackSlot::ButtonUp, name)
    }

    /// Register the close callback
    pub fn register_close_func(&mut self, id: WindowId, name: Option<&str>) -> bool {
        self.register_callback(id, CallbackSlot::Close, name)
    }

    // ---- loop control ----

    /// Ask the running main loop to stop before its next iteration
    pub fn exit_main_loop(&mut self) {
        log::debug!("Main loop exit requested");
        self.exit_requested = true;
    }

    /// Whether an exit has been requested since the loop started
    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    pub(crate) fn reset_exit(&mut self) {
        self.exit_requested = false;
    }

    // ---- queries ----

    /// Look up a live window
    pub fn window(&self, id: WindowId) -> Option<&Window> {
        self.registry.get(id)
    }

    /// Look up a live window mutably
    pub fn window_mut(&mut self, id: WindowId) -> Option<&mut Window> {
        self.registry.get_mut(id)
    }

    /// Live window ids in creation order
    pub fn window_ids(&self) -> Vec<WindowId> {
        self.registry.ids()
    }

    /// Number of live windows
    pub fn window_count(&self) -> usize {
        self.registry.len()
    }

    /// The registry of live windows
    pub fn registry(&self) -> &WindowRegistry {
        &self.registry
    }

    /// Resolve a native handle to the window that owns it
    pub fn lookup_native(&self, native: NativeWindowId) -> Option<WindowId> {
        self.lookup.get(&native).copied()
    }

    /// Attach caller-owned data to a window, returning the previous value
    pub fn set_user_data(&mut self, id: WindowId, data: Box<dyn Any>) -> Option<Box<dyn Any>> {
        self.registry.get_mut(id)?.set_user_data(Some(data))
    }

    /// Caller-owned data attached to a window
    pub fn user_data<T: Any>(&self, id: WindowId) -> Option<&T> {
        self.registry.get(id)?.user_data()?.downcast_ref()
    }

    /// Close-request flag of a window
    pub fn close_state(&self, id: WindowId) -> Option<bool> {
        self.registry.get(id).map(Window::close_state)
    }

    /// Set or clear the close-request flag; `false` if `id` is not live
    pub fn set_close_state(&mut self, id: WindowId, close: bool) -> bool {
        let Some(window) = self.registry.get_mut(id) else {
            return false;
        };
        window.set_close_state(close);
        true
    }

    pub(crate) fn host_mut(&mut self) -> &mut dyn HostBackend {
        self.host.as_mut()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        let host = self.host.as_mut();
        let mut freed = 0usize;
        self.registry.free_all(|_, window| {
            release_native(host, window.resources());
            freed += 1;
        });
        self.lookup.clear();
        host.flush();
        if freed > 0 {
            log::debug!("Released {freed} windows at session teardown");
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("display", &self.display)
            .field("windows", &self.registry.len())
            .field("exit_requested", &self.exit_requested)
            .finish_non_exhaustive()
    }
}

/// Allocate a window with the first format in [`PixelFormatRequest::PREFERENCE`]
/// the host both offers and accepts a window for
///
/// Only a refused window moves on to the next format. Context failures and
/// running out of formats end the search.
fn allocate_preferred(host: &mut dyn HostBackend, geometry: &Geometry, title: &str) -> WmResult<NativeResources> {
    let mut last_error = WindowManagerError::NoPixelFormat;
    for request in &PixelFormatRequest::PREFERENCE {
        let buffering = if request.double_buffered { "double" } else { "single" };
        let Some(format) = host.choose_pixel_format(request) else {
            log::warn!("No {buffering}-buffered RGBA pixel format available");
            continue;
        };
        match allocate_native(host, geometry, title, format) {
            Ok(resources) => return Ok(resources),
            Err(WindowManagerError::WindowCreation(source)) => {
                log::warn!("Host refused a {buffering}-buffered window: {source}");
                last_error = WindowManagerError::WindowCreation(source);
            }
            Err(e) => return Err(e),
        }
    }
    Err(last_error)
}

/// Allocate colormap, window and context, rolling back on partial failure
fn allocate_native(
    host: &mut dyn HostBackend,
    geometry: &Geometry,
    title: &str,
    format: PixelFormat,
) -> WmResult<NativeResources> {
    let colormap = if format.needs_colormap {
        Some(host.create_colormap(&format).map_err(WindowManagerError::WindowCreation)?)
    } else {
        None
    };

    let window = match host.create_window(geometry, title, &format, colormap) {
        Ok(window) => window,
        Err(e) => {
            if let Some(colormap) = colormap {
                host.free_colormap(colormap);
            }
            host.flush();
            return Err(WindowManagerError::WindowCreation(e));
        }
    };
    host.register_close_protocol(window);

    let context = match host.create_context(window, &format) {
        Ok(context) => context,
        Err(e) => {
            host.destroy_window(window);
            if let Some(colormap) = colormap {
                host.free_colormap(colormap);
            }
            host.flush();
            return Err(WindowManagerError::ContextCreation(e));
        }
    };
    if !host.make_current(window, context) {
        log::warn!("Could not bind new context to native window {window:?}");
    }

    Ok(NativeResources {
        window,
        context,
        colormap,
        pixel_format: format,
    })
}

/// Context first, then the window, then the colormap
fn release_native(host: &mut dyn HostBackend, resources: &NativeResources) {
    host.destroy_context(resources.context);
    host.destroy_window(resources.window);
    if let Some(colormap) = resources.colormap {
        host.free_colormap(colormap);
    }
}
