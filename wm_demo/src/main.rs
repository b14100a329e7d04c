//! Window manager demo
//!
//! Opens one window, wires named callbacks to it and runs the main loop.
//! Built with the `glfw` feature it talks to the real display; otherwise it
//! runs against the headless host with a short scripted event queue and
//! stops after a fixed number of frames.
//!
//! ```text
//! wm_demo [--config <file.toml|file.ron>] [--frames <n>] [-display <name>]
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use window_manager::foundation::logging;
use window_manager::foundation::time::FrameCounter;
use window_manager::host::{HostEvent, HostEventKind, ModifierMask, NativeWindowId};
use window_manager::prelude::*;

const KEY_ESCAPE: u32 = 0xff1b;
const DEFAULT_HEADLESS_FRAMES: u64 = 120;

#[derive(Debug, thiserror::Error)]
enum DemoError {
    #[error("missing value for {0}")]
    MissingValue(&'static str),
    #[error("invalid frame count `{0}`")]
    InvalidFrames(String),
}

#[derive(Debug, Default)]
struct Options {
    config_path: Option<String>,
    frames: Option<u64>,
}

impl Options {
    fn parse(args: &[String]) -> Result<Self, DemoError> {
        let mut options = Self::default();
        let mut iter = args.iter().skip(1);
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--config" => {
                    options.config_path = Some(iter.next().ok_or(DemoError::MissingValue("--config"))?.clone());
                }
                "--frames" => {
                    let value = iter.next().ok_or(DemoError::MissingValue("--frames"))?;
                    let frames = value.parse().map_err(|_| DemoError::InvalidFrames(value.clone()))?;
                    options.frames = Some(frames);
                }
                // Display selection is handled by the session
                _ => {}
            }
        }
        Ok(options)
    }
}

fn load_config(options: &Options) -> Result<WindowManagerConfig, Box<dyn std::error::Error>> {
    match &options.config_path {
        Some(path) => Ok(WindowManagerConfig::load_from_file(path)?),
        None => Ok(WindowManagerConfig::default()),
    }
}

/// Host the demo runs against
struct Backend {
    connector: Box<dyn HostConnector>,
    headless: Option<HeadlessHost>,
}

impl Backend {
    #[cfg(feature = "glfw")]
    fn new() -> Self {
        Self {
            connector: Box::new(window_manager::host::GlfwConnector),
            headless: None,
        }
    }

    #[cfg(not(feature = "glfw"))]
    fn new() -> Self {
        let host = HeadlessHost::new();
        Self {
            connector: Box::new(host.clone()),
            headless: Some(host),
        }
    }

    /// Queue a short burst of input for `window` when running headless
    fn script_input(&self, native: NativeWindowId) {
        let Some(host) = &self.headless else {
            return;
        };
        host.set_pointer(native, 120, 80);
        for kind in [
            HostEventKind::Configure { x: 0, y: 0, width: 800, height: 600 },
            HostEventKind::Enter,
            HostEventKind::ButtonPress { button: 1, state: ModifierMask::SHIFT, x: 120, y: 80 },
            HostEventKind::KeyPress { keysym: u32::from(b'a') },
            HostEventKind::Expose,
        ] {
            host.push_event(HostEvent::new(native, kind));
        }
    }
}

fn build_callbacks(frames: Rc<RefCell<FrameCounter>>, frame_limit: Option<u64>) -> CallbackTable {
    let mut callbacks = CallbackTable::new();

    callbacks.define("paint", |session: &mut Session, window, _: &CallbackEvent| {
        session.make_current(window);
        session.swap_buffers(window);
        Ok(())
    });

    callbacks.define("reshape", |_: &mut Session, window, event: &CallbackEvent| {
        if let CallbackEvent::Reshape { width, height } = event {
            log::info!("{window:?} resized to {width}x{height}");
        }
        Ok(())
    });

    callbacks.define("idle", move |session: &mut Session, _, _: &CallbackEvent| {
        let mut frames = frames.borrow_mut();
        frames.tick();
        if frame_limit.is_some_and(|limit| frames.frame_count() >= limit) {
            log::info!("Frame limit reached after {:.2}s", session.time().as_secs_f64());
            session.exit_main_loop();
        }
        Ok(())
    });

    callbacks.define("key", |session: &mut Session, window, event: &CallbackEvent| {
        if let CallbackEvent::KeyDown { key, x, y } = *event {
            log::debug!("key {key:#x} at ({x}, {y})");
            if key == KEY_ESCAPE {
                session.destroy_window(window);
            }
        }
        Ok(())
    });

    callbacks.define("button", |_: &mut Session, _, event: &CallbackEvent| {
        if let CallbackEvent::ButtonDown { button, modifier, x, y } = *event {
            log::info!("button {button} ({modifier:?}) at ({x}, {y})");
        }
        Ok(())
    });

    callbacks.define("close", |session: &mut Session, window, _: &CallbackEvent| {
        log::info!("Close requested for {window:?}");
        session.destroy_window(window);
        Ok(())
    });

    callbacks
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();
    let options = Options::parse(&args)?;
    let config = load_config(&options)?;
    logging::init(&config.log_level);

    log::info!("Starting window manager demo");

    let mut backend = Backend::new();
    let mut session = Session::init_from_process(backend.connector.as_mut(), &config)?;

    let window = session.create_window("Window Manager Demo")?;
    session.register_paint_func(window, Some("paint"));
    session.register_reshape_func(window, Some("reshape"));
    session.register_idle_func(window, Some("idle"));
    session.register_key_down_func(window, Some("key"));
    session.register_button_down_func(window, Some("button"));
    session.register_close_func(window, Some("close"));
    session.show_window(window);
    if let Some(native) = session.window(window).map(Window::native_window) {
        backend.script_input(native);
    }

    let frames = Rc::new(RefCell::new(FrameCounter::new()));
    let default_limit = backend.headless.is_some().then_some(DEFAULT_HEADLESS_FRAMES);
    let frame_limit = options.frames.or(default_limit);
    let callbacks = build_callbacks(Rc::clone(&frames), frame_limit);
    let mut event_loop = EventLoop::from_config(callbacks, &config.event_loop);

    let exit = event_loop.main_loop(&mut session)?;
    let frames = frames.borrow();
    log::info!(
        "Main loop finished ({exit:?}): {} frames, {:.1} fps",
        frames.frame_count(),
        frames.average_fps()
    );

    session.terminate();
    Ok(())
}
