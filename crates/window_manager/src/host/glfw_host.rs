//! Native host backed by GLFW
//!
//! GLFW creates a window and its OpenGL context in one call, so the pixel
//! format chosen up front is only remembered here and turned into window
//! hints at creation time. A refused double-buffered request therefore shows
//! up as a failed `create_window`, not as a missing format; the session then
//! retries with the next format in preference order.
//!
//! GLFW delivers events per window through channels. [`GlfwHost::pending`]
//! polls once and merges every channel into a single queue so the event loop
//! sees one stream tagged by native window.

use std::collections::{HashMap, VecDeque};

use ::glfw::{Action, Context, Modifiers, WindowEvent, WindowHint, WindowMode};

use super::{
    ColormapId, ContextId, Geometry, HostBackend, HostConnector, HostError, HostEvent, HostEventKind,
    HostResult, ModifierMask, NativeWindowId, PixelFormat, PixelFormatRequest,
};

const XK_BACKSPACE: u32 = 0xff08;
const XK_TAB: u32 = 0xff09;
const XK_RETURN: u32 = 0xff0d;
const XK_ESCAPE: u32 = 0xff1b;
const XK_LEFT: u32 = 0xff51;
const XK_UP: u32 = 0xff52;
const XK_RIGHT: u32 = 0xff53;
const XK_DOWN: u32 = 0xff54;
const XK_DELETE: u32 = 0xffff;

/// Connector that initializes GLFW against a display
#[derive(Debug, Default)]
pub struct GlfwConnector;

impl HostConnector for GlfwConnector {
    fn open(&mut self, display: Option<&str>) -> HostResult<Box<dyn HostBackend>> {
        if let Some(name) = display {
            // GLFW's X11 platform reads the display name from the environment
            std::env::set_var(crate::config::display::DISPLAY_ENV_KEY, name);
        }
        let glfw = ::glfw::init(|error: ::glfw::Error, description: String| {
            log::error!("GLFW error {error:?}: {description}");
        })
        .map_err(|e| HostError::OpenFailed(format!("{e:?}")))?;
        log::info!("GLFW {} initialized", ::glfw::get_version_string());
        Ok(Box::new(GlfwHost::new(glfw)))
    }
}

struct GlfwWindow {
    window: ::glfw::PWindow,
    events: ::glfw::GlfwReceiver<(f64, WindowEvent)>,
}

/// GLFW-backed host connection
pub struct GlfwHost {
    glfw: ::glfw::Glfw,
    windows: HashMap<NativeWindowId, GlfwWindow>,
    queue: VecDeque<HostEvent>,
    next_id: u64,
}

impl GlfwHost {
    fn new(glfw: ::glfw::Glfw) -> Self {
        Self {
            glfw,
            windows: HashMap::new(),
            queue: VecDeque::new(),
            next_id: 0,
        }
    }

    fn collect_events(&mut self) {
        self.glfw.poll_events();
        for (id, native) in &mut self.windows {
            for (_, event) in ::glfw::flush_messages(&native.events) {
                if let Some(kind) = translate_event(&mut native.window, event) {
                    self.queue.push_back(HostEvent::new(*id, kind));
                }
            }
        }
    }
}

fn translate_event(window: &mut ::glfw::PWindow, event: WindowEvent) -> Option<HostEventKind> {
    let kind = match event {
        WindowEvent::Refresh => HostEventKind::Expose,
        WindowEvent::Key(key, _, Action::Press | Action::Repeat, mods) => HostEventKind::KeyPress {
            keysym: keysym(key, mods)?,
        },
        WindowEvent::Key(key, _, Action::Release, mods) => HostEventKind::KeyRelease {
            keysym: keysym(key, mods)?,
        },
        WindowEvent::CursorEnter(true) => HostEventKind::Enter,
        WindowEvent::CursorEnter(false) => HostEventKind::Leave,
        WindowEvent::CursorPos(x, y) => HostEventKind::Motion {
            x: x as i32,
            y: y as i32,
        },
        WindowEvent::MouseButton(button, action, mods) => {
            let (x, y) = window.get_cursor_pos();
            let button = button as u32 + 1;
            let state = modifier_mask(mods);
            let (x, y) = (x as i32, y as i32);
            if action == Action::Release {
                HostEventKind::ButtonRelease { button, state, x, y }
            } else {
                HostEventKind::ButtonPress { button, state, x, y }
            }
        }
        WindowEvent::Close => {
            // Destruction is up to the application
            window.set_should_close(false);
            HostEventKind::CloseRequest
        }
        WindowEvent::Size(..) | WindowEvent::Pos(..) => {
            let (x, y) = window.get_pos();
            let (width, height) = window.get_size();
            HostEventKind::Configure {
                x,
                y,
                width: u32::try_from(width).unwrap_or(0),
                height: u32::try_from(height).unwrap_or(0),
            }
        }
        _ => HostEventKind::Other,
    };
    Some(kind)
}

fn modifier_mask(mods: Modifiers) -> ModifierMask {
    let mut mask = ModifierMask::empty();
    mask.set(ModifierMask::SHIFT, mods.contains(Modifiers::Shift));
    mask.set(ModifierMask::CONTROL, mods.contains(Modifiers::Control));
    mask.set(ModifierMask::ALT, mods.contains(Modifiers::Alt));
    mask.set(ModifierMask::SUPER, mods.contains(Modifiers::Super));
    mask.set(ModifierMask::LOCK, mods.contains(Modifiers::CapsLock));
    mask
}

/// Translate a GLFW key into an X-style keysym
fn keysym(key: ::glfw::Key, mods: Modifiers) -> Option<u32> {
    use ::glfw::Key;

    let named = match key {
        Key::Unknown => return None,
        Key::Escape => XK_ESCAPE,
        Key::Enter | Key::KpEnter => XK_RETURN,
        Key::Tab => XK_TAB,
        Key::Backspace => XK_BACKSPACE,
        Key::Delete => XK_DELETE,
        Key::Left => XK_LEFT,
        Key::Right => XK_RIGHT,
        Key::Up => XK_UP,
        Key::Down => XK_DOWN,
        _ => 0,
    };
    if named != 0 {
        return Some(named);
    }

    let code = u32::try_from(key as i32).ok()?;
    let upper = mods.contains(Modifiers::Shift) != mods.contains(Modifiers::CapsLock);
    if (u32::from(b'A')..=u32::from(b'Z')).contains(&code) && !upper {
        // GLFW reports letters as uppercase ASCII; keysyms distinguish case
        return Some(code + 0x20);
    }
    Some(code)
}

impl HostBackend for GlfwHost {
    fn choose_pixel_format(&mut self, request: &PixelFormatRequest) -> Option<PixelFormat> {
        request.rgba.then(|| PixelFormat {
            id: u64::from(request.double_buffered),
            double_buffered: request.double_buffered,
            depth: request.min_channel_bits.max(8).saturating_mul(3),
            channel_bits: request.min_channel_bits,
            needs_colormap: false,
        })
    }

    fn create_colormap(&mut self, _format: &PixelFormat) -> HostResult<ColormapId> {
        Err(HostError::Rejected("GLFW windows manage their own colormap".to_string()))
    }

    fn free_colormap(&mut self, _colormap: ColormapId) {}

    fn create_window(
        &mut self,
        geometry: &Geometry,
        title: &str,
        format: &PixelFormat,
        _colormap: Option<ColormapId>,
    ) -> HostResult<NativeWindowId> {
        let bits = Some(u32::from(format.channel_bits));
        self.glfw.window_hint(WindowHint::DoubleBuffer(format.double_buffered));
        self.glfw.window_hint(WindowHint::RedBits(bits));
        self.glfw.window_hint(WindowHint::GreenBits(bits));
        self.glfw.window_hint(WindowHint::BlueBits(bits));
        self.glfw.window_hint(WindowHint::Visible(false));

        let (mut window, events) = self
            .glfw
            .create_window(geometry.width, geometry.height, title, WindowMode::Windowed)
            .ok_or_else(|| HostError::Rejected(format!("GLFW refused window '{title}'")))?;
        window.set_pos(geometry.x, geometry.y);

        window.set_refresh_polling(true);
        window.set_key_polling(true);
        window.set_cursor_enter_polling(true);
        window.set_cursor_pos_polling(true);
        window.set_mouse_button_polling(true);
        window.set_size_polling(true);
        window.set_pos_polling(true);

        self.next_id += 1;
        let id = NativeWindowId(self.next_id);
        self.windows.insert(id, GlfwWindow { window, events });
        Ok(id)
    }

    fn register_close_protocol(&mut self, window: NativeWindowId) {
        if let Some(native) = self.windows.get_mut(&window) {
            native.window.set_close_polling(true);
        }
    }

    fn create_context(&mut self, window: NativeWindowId, _format: &PixelFormat) -> HostResult<ContextId> {
        // The context was created together with the window
        if self.windows.contains_key(&window) {
            Ok(ContextId(window.0))
        } else {
            Err(HostError::Rejected(format!("no native window {window:?}")))
        }
    }

    fn make_current(&mut self, window: NativeWindowId, _context: ContextId) -> bool {
        match self.windows.get_mut(&window) {
            Some(native) => {
                native.window.make_current();
                true
            }
            None => false,
        }
    }

    fn swap_buffers(&mut self, window: NativeWindowId) {
        if let Some(native) = self.windows.get_mut(&window) {
            native.window.swap_buffers();
        }
    }

    fn destroy_context(&mut self, _context: ContextId) {}

    fn destroy_window(&mut self, window: NativeWindowId) {
        // Dropping the PWindow destroys the window and its context
        self.windows.remove(&window);
        self.queue.retain(|event| event.window != window);
    }

    fn map_window(&mut self, window: NativeWindowId) {
        if let Some(native) = self.windows.get_mut(&window) {
            native.window.show();
        }
    }

    fn unmap_window(&mut self, window: NativeWindowId) {
        if let Some(native) = self.windows.get_mut(&window) {
            native.window.hide();
        }
    }

    fn set_title(&mut self, window: NativeWindowId, title: &str) {
        if let Some(native) = self.windows.get_mut(&window) {
            native.window.set_title(title);
        }
    }

    fn move_window(&mut self, window: NativeWindowId, x: i32, y: i32) {
        if let Some(native) = self.windows.get_mut(&window) {
            native.window.set_pos(x, y);
        }
    }

    fn resize_window(&mut self, window: NativeWindowId, width: u32, height: u32) {
        if let Some(native) = self.windows.get_mut(&window) {
            let width = i32::try_from(width).unwrap_or(i32::MAX);
            let height = i32::try_from(height).unwrap_or(i32::MAX);
            native.window.set_size(width, height);
        }
    }

    fn pending(&mut self) -> bool {
        if self.queue.is_empty() {
            self.collect_events();
        }
        !self.queue.is_empty()
    }

    fn next_event(&mut self) -> Option<HostEvent> {
        self.queue.pop_front()
    }

    fn query_pointer(&mut self, window: NativeWindowId) -> (i32, i32) {
        self.windows.get(&window).map_or((0, 0), |native| {
            let (x, y) = native.window.get_cursor_pos();
            (x as i32, y as i32)
        })
    }

    fn flush(&mut self) {
        // GLFW submits requests immediately
    }
}
