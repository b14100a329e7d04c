//! In-memory host
//!
//! [`HeadlessHost`] stands in for a display server. It hands out native ids,
//! keeps an event queue the caller fills by hand, can be told to refuse
//! specific requests, and records every call it receives so tests can assert
//! on ordering. The handle is cheap to clone; all clones share state with the
//! connections they open.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use super::{
    ColormapId, ContextId, Geometry, HostBackend, HostConnector, HostError, HostEvent, HostResult,
    NativeWindowId, PixelFormat, PixelFormatRequest,
};

const DOUBLE_BUFFERED_FORMAT: u64 = 0x21;
const SINGLE_BUFFERED_FORMAT: u64 = 0x22;

/// A call received by the headless host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    /// Connection opened
    Open(Option<String>),
    /// Pixel format lookup and whether it succeeded
    ChoosePixelFormat {
        /// Requested buffering
        double_buffered: bool,
        /// Whether a format was returned
        accepted: bool,
    },
    /// Colormap allocated
    CreateColormap(ColormapId),
    /// Colormap released
    FreeColormap(ColormapId),
    /// Native window created
    CreateWindow(NativeWindowId),
    /// Close protocol registered
    RegisterCloseProtocol(NativeWindowId),
    /// Context created
    CreateContext(ContextId),
    /// Context bound
    MakeCurrent(NativeWindowId, ContextId),
    /// Buffers swapped
    SwapBuffers(NativeWindowId),
    /// Context destroyed
    DestroyContext(ContextId),
    /// Native window destroyed
    DestroyWindow(NativeWindowId),
    /// Window mapped
    Map(NativeWindowId),
    /// Window unmapped
    Unmap(NativeWindowId),
    /// Title changed
    SetTitle(NativeWindowId, String),
    /// Window moved
    Move(NativeWindowId, i32, i32),
    /// Window resized
    Resize(NativeWindowId, u32, u32),
    /// Pointer queried
    QueryPointer(NativeWindowId),
    /// Command buffer flushed
    Flush,
    /// Connection closed
    Close,
}

#[derive(Debug, Clone)]
struct NativeWindow {
    geometry: Geometry,
    title: String,
    mapped: bool,
    close_protocol: bool,
}

#[derive(Debug, Default)]
struct HeadlessState {
    next_id: u64,
    connected: bool,
    fail_connection: bool,
    reject_double_buffered: bool,
    reject_single_buffered: bool,
    fail_window_creation: bool,
    refuse_double_buffered_windows: bool,
    fail_context_creation: bool,
    windows: HashMap<NativeWindowId, NativeWindow>,
    contexts: HashMap<ContextId, NativeWindowId>,
    colormaps: Vec<ColormapId>,
    pointer: HashMap<NativeWindowId, (i32, i32)>,
    queue: VecDeque<HostEvent>,
    calls: Vec<HostCall>,
}

impl HeadlessState {
    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Handle to an in-memory host
#[derive(Debug, Clone, Default)]
pub struct HeadlessHost {
    state: Rc<RefCell<HeadlessState>>,
}

impl HeadlessHost {
    /// Create a host that accepts every request
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `open` fail
    pub fn fail_connection(&self, fail: bool) {
        self.state.borrow_mut().fail_connection = fail;
    }

    /// Refuse double-buffered pixel formats
    pub fn reject_double_buffered(&self, reject: bool) {
        self.state.borrow_mut().reject_double_buffered = reject;
    }

    /// Refuse single-buffered pixel formats
    pub fn reject_single_buffered(&self, reject: bool) {
        self.state.borrow_mut().reject_single_buffered = reject;
    }

    /// Offer double-buffered formats but refuse windows created with them
    pub fn refuse_double_buffered_windows(&self, refuse: bool) {
        self.state.borrow_mut().refuse_double_buffered_windows = refuse;
    }

    /// Refuse native window creation
    pub fn fail_window_creation(&self, fail: bool) {
        self.state.borrow_mut().fail_window_creation = fail;
    }

    /// Refuse rendering context creation
    pub fn fail_context_creation(&self, fail: bool) {
        self.state.borrow_mut().fail_context_creation = fail;
    }

    /// Queue an event for delivery
    pub fn push_event(&self, event: HostEvent) {
        self.state.borrow_mut().queue.push_back(event);
    }

    /// Number of undelivered events
    pub fn queued_events(&self) -> usize {
        self.state.borrow().queue.len()
    }

    /// Set the pointer position reported for `window`
    pub fn set_pointer(&self, window: NativeWindowId, x: i32, y: i32) {
        self.state.borrow_mut().pointer.insert(window, (x, y));
    }

    /// Every call received so far
    pub fn calls(&self) -> Vec<HostCall> {
        self.state.borrow().calls.clone()
    }

    /// Forget recorded calls
    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    /// Whether a connection is currently open
    pub fn is_connected(&self) -> bool {
        self.state.borrow().connected
    }

    /// Native windows that exist on the host
    pub fn live_windows(&self) -> Vec<NativeWindowId> {
        let mut windows: Vec<_> = self.state.borrow().windows.keys().copied().collect();
        windows.sort();
        windows
    }

    /// Number of live rendering contexts
    pub fn live_contexts(&self) -> usize {
        self.state.borrow().contexts.len()
    }

    /// Number of live colormaps
    pub fn live_colormaps(&self) -> usize {
        self.state.borrow().colormaps.len()
    }

    /// Whether `window` is mapped
    pub fn is_mapped(&self, window: NativeWindowId) -> bool {
        self.state.borrow().windows.get(&window).is_some_and(|w| w.mapped)
    }

    /// Whether close requests for `window` are delivered as events
    pub fn has_close_protocol(&self, window: NativeWindowId) -> bool {
        self.state.borrow().windows.get(&window).is_some_and(|w| w.close_protocol)
    }

    /// Host-side title of `window`
    pub fn title(&self, window: NativeWindowId) -> Option<String> {
        self.state.borrow().windows.get(&window).map(|w| w.title.clone())
    }

    /// Host-side geometry of `window`
    pub fn geometry(&self, window: NativeWindowId) -> Option<Geometry> {
        self.state.borrow().windows.get(&window).map(|w| w.geometry)
    }
}

impl HostConnector for HeadlessHost {
    fn open(&mut self, display: Option<&str>) -> HostResult<Box<dyn HostBackend>> {
        let mut state = self.state.borrow_mut();
        if state.fail_connection {
            return Err(HostError::OpenFailed(format!(
                "headless host refused display {}",
                display.unwrap_or("<default>")
            )));
        }
        state.connected = true;
        state.calls.push(HostCall::Open(display.map(str::to_string)));
        drop(state);

        Ok(Box::new(HeadlessConnection {
            state: Rc::clone(&self.state),
        }))
    }
}

/// An open connection to a [`HeadlessHost`]
///
/// Dropping the connection closes it.
#[derive(Debug)]
pub struct HeadlessConnection {
    state: Rc<RefCell<HeadlessState>>,
}

impl HeadlessConnection {
    fn record(&self, call: HostCall) {
        self.state.borrow_mut().calls.push(call);
    }

    fn with_window(&self, window: NativeWindowId, f: impl FnOnce(&mut NativeWindow)) {
        if let Some(native) = self.state.borrow_mut().windows.get_mut(&window) {
            f(native);
        }
    }
}

impl HostBackend for HeadlessConnection {
    fn choose_pixel_format(&mut self, request: &PixelFormatRequest) -> Option<PixelFormat> {
        let mut state = self.state.borrow_mut();
        let rejected = if request.double_buffered {
            state.reject_double_buffered
        } else {
            state.reject_single_buffered
        };
        let format = (!rejected && request.rgba).then(|| PixelFormat {
            id: if request.double_buffered { DOUBLE_BUFFERED_FORMAT } else { SINGLE_BUFFERED_FORMAT },
            double_buffered: request.double_buffered,
            depth: 24,
            channel_bits: request.min_channel_bits.max(8),
            needs_colormap: true,
        });
        state.calls.push(HostCall::ChoosePixelFormat {
            double_buffered: request.double_buffered,
            accepted: format.is_some(),
        });
        format
    }

    fn create_colormap(&mut self, _format: &PixelFormat) -> HostResult<ColormapId> {
        let mut state = self.state.borrow_mut();
        let colormap = ColormapId(state.allocate_id());
        state.colormaps.push(colormap);
        state.calls.push(HostCall::CreateColormap(colormap));
        Ok(colormap)
    }

    fn free_colormap(&mut self, colormap: ColormapId) {
        let mut state = self.state.borrow_mut();
        state.colormaps.retain(|c| *c != colormap);
        state.calls.push(HostCall::FreeColormap(colormap));
    }

    fn create_window(
        &mut self,
        geometry: &Geometry,
        title: &str,
        format: &PixelFormat,
        _colormap: Option<ColormapId>,
    ) -> HostResult<NativeWindowId> {
        let mut state = self.state.borrow_mut();
        if state.fail_window_creation {
            return Err(HostError::Rejected("headless host refused window".to_string()));
        }
        if format.double_buffered && state.refuse_double_buffered_windows {
            return Err(HostError::Rejected("no double-buffered visual".to_string()));
        }
        let window = NativeWindowId(state.allocate_id());
        state.windows.insert(
            window,
            NativeWindow {
                geometry: *geometry,
                title: title.to_string(),
                mapped: false,
                close_protocol: false,
            },
        );
        state.calls.push(HostCall::CreateWindow(window));
        Ok(window)
    }

    fn register_close_protocol(&mut self, window: NativeWindowId) {
        self.with_window(window, |w| w.close_protocol = true);
        self.record(HostCall::RegisterCloseProtocol(window));
    }

    fn create_context(&mut self, window: NativeWindowId, _format: &PixelFormat) -> HostResult<ContextId> {
        let mut state = self.state.borrow_mut();
        if state.fail_context_creation {
            return Err(HostError::Rejected("headless host refused context".to_string()));
        }
        let context = ContextId(state.allocate_id());
        state.contexts.insert(context, window);
        state.calls.push(HostCall::CreateContext(context));
        Ok(context)
    }

    fn make_current(&mut self, window: NativeWindowId, context: ContextId) -> bool {
        self.record(HostCall::MakeCurrent(window, context));
        self.state.borrow().contexts.get(&context) == Some(&window)
    }

    fn swap_buffers(&mut self, window: NativeWindowId) {
        self.record(HostCall::SwapBuffers(window));
    }

    fn destroy_context(&mut self, context: ContextId) {
        self.state.borrow_mut().contexts.remove(&context);
        self.record(HostCall::DestroyContext(context));
    }

    fn destroy_window(&mut self, window: NativeWindowId) {
        let mut state = self.state.borrow_mut();
        state.windows.remove(&window);
        state.pointer.remove(&window);
        state.calls.push(HostCall::DestroyWindow(window));
    }

    fn map_window(&mut self, window: NativeWindowId) {
        self.with_window(window, |w| w.mapped = true);
        self.record(HostCall::Map(window));
    }

    fn unmap_window(&mut self, window: NativeWindowId) {
        self.with_window(window, |w| w.mapped = false);
        self.record(HostCall::Unmap(window));
    }

    fn set_title(&mut self, window: NativeWindowId, title: &str) {
        self.with_window(window, |w| w.title = title.to_string());
        self.record(HostCall::SetTitle(window, title.to_string()));
    }

    fn move_window(&mut self, window: NativeWindowId, x: i32, y: i32) {
        self.with_window(window, |w| {
            w.geometry.x = x;
            w.geometry.y = y;
        });
        self.record(HostCall::Move(window, x, y));
    }

    fn resize_window(&mut self, window: NativeWindowId, width: u32, height: u32) {
        self.with_window(window, |w| {
            w.geometry.width = width;
            w.geometry.height = height;
        });
        self.record(HostCall::Resize(window, width, height));
    }

    fn pending(&mut self) -> bool {
        !self.state.borrow().queue.is_empty()
    }

    fn next_event(&mut self) -> Option<HostEvent> {
        self.state.borrow_mut().queue.pop_front()
    }

    fn query_pointer(&mut self, window: NativeWindowId) -> (i32, i32) {
        self.record(HostCall::QueryPointer(window));
        self.state.borrow().pointer.get(&window).copied().unwrap_or((0, 0))
    }

    fn flush(&mut self) {
        self.record(HostCall::Flush);
    }
}

impl Drop for HeadlessConnection {
    fn drop(&mut self) {
        let mut state = self.state.borrow_mut();
        state.connected = false;
        state.calls.push(HostCall::Close);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::HostEventKind;

    #[test]
    fn test_open_and_close_are_recorded() {
        let mut host = HeadlessHost::new();
        let connection = host.open(Some(":3")).unwrap();
        assert!(host.is_connected());
        drop(connection);
        assert!(!host.is_connected());
        assert_eq!(host.calls(), vec![HostCall::Open(Some(":3".to_string())), HostCall::Close]);
    }

    #[test]
    fn test_refused_connection() {
        let mut host = HeadlessHost::new();
        host.fail_connection(true);
        assert!(matches!(host.open(None), Err(HostError::OpenFailed(_))));
        assert!(!host.is_connected());
    }

    #[test]
    fn test_pixel_format_rejection() {
        let mut host = HeadlessHost::new();
        host.reject_double_buffered(true);
        let mut connection = host.open(None).unwrap();

        assert_eq!(connection.choose_pixel_format(&PixelFormatRequest::DOUBLE_RGBA), None);
        let single = connection.choose_pixel_format(&PixelFormatRequest::SINGLE_RGBA).unwrap();
        assert!(!single.double_buffered);
    }

    #[test]
    fn test_event_queue_is_fifo() {
        let mut host = HeadlessHost::new();
        let mut connection = host.open(None).unwrap();
        assert!(!connection.pending());

        host.push_event(HostEvent::new(NativeWindowId(1), HostEventKind::Expose));
        host.push_event(HostEvent::new(NativeWindowId(2), HostEventKind::Enter));
        assert!(connection.pending());

        assert_eq!(connection.next_event().unwrap().window, NativeWindowId(1));
        assert_eq!(connection.next_event().unwrap().window, NativeWindowId(2));
        assert!(!connection.pending());
        assert_eq!(connection.next_event(), None);
    }
}
