use super::*;
use crate::error::{CallbackError, DispatchError};
use crate::event_loop::{EventLoop, Iteration};
use crate::host::{HostCall, HostEvent, HostEventKind, ModifierMask, NativeWindowId};
use crate::window::{CallbackSlot, Modifier};

fn native(session: &Session, id: WindowId) -> NativeWindowId {
    session.window(id).unwrap().native_window()
}

#[test]
fn test_event_for_unknown_window_is_dropped() {
    let host = HeadlessHost::new();
    let mut session = open_session(&host);
    let id = session.create_window("known").unwrap();
    session.register_paint_func(id, Some("paint"));
    let (table, log) = recording_table(&["paint"]);
    let mut event_loop = EventLoop::new(table);

    host.push_event(HostEvent::new(NativeWindowId(9999), HostEventKind::Expose));
    let result = event_loop.main_iteration(&mut session).unwrap();

    assert_eq!(result, Iteration::Dropped);
    assert!(log.borrow().is_empty());
    assert_eq!(host.queued_events(), 0);
}

#[test]
fn test_one_event_per_iteration() {
    let host = HeadlessHost::new();
    let mut session = open_session(&host);
    let id = session.create_window("w").unwrap();
    let window = native(&session, id);
    session.register_enter_func(id, Some("enter"));
    session.register_leave_func(id, Some("leave"));
    let (table, log) = recording_table(&["enter", "leave"]);
    let mut event_loop = EventLoop::new(table);

    host.push_event(HostEvent::new(window, HostEventKind::Enter));
    host.push_event(HostEvent::new(window, HostEventKind::Leave));

    assert_eq!(event_loop.main_iteration(&mut session).unwrap(), Iteration::Dispatched);
    assert_eq!(names(&log), vec!["enter"]);
    assert_eq!(host.queued_events(), 1);

    assert_eq!(event_loop.main_iteration(&mut session).unwrap(), Iteration::Dispatched);
    assert_eq!(names(&log), vec!["enter", "leave"]);
}

#[test]
fn test_configure_runs_reshape_before_paint() {
    let host = HeadlessHost::new();
    let mut session = open_session(&host);
    let id = session.create_window("w").unwrap();
    let window = native(&session, id);
    session.register_paint_func(id, Some("paint"));
    session.register_reshape_func(id, Some("reshape"));
    let (table, log) = recording_table(&["paint", "reshape"]);
    let mut event_loop = EventLoop::new(table);

    host.push_event(HostEvent::new(
        window,
        HostEventKind::Configure { x: 5, y: 6, width: 800, height: 600 },
    ));
    event_loop.main_iteration(&mut session).unwrap();

    let log = log.borrow();
    assert_eq!(log.len(), 2);
    assert_eq!(log[0].event, CallbackEvent::Reshape { width: 800, height: 600 });
    assert_eq!(log[1].event, CallbackEvent::Paint);

    let geometry = session.window(id).unwrap().geometry();
    assert_eq!((geometry.x, geometry.y, geometry.width, geometry.height), (5, 6, 800, 600));
}

#[test]
fn test_configure_without_callbacks_only_updates_geometry() {
    let host = HeadlessHost::new();
    let mut session = open_session(&host);
    let id = session.create_window("w").unwrap();
    let window = native(&session, id);
    session.register_idle_func(id, Some("idle"));
    let (table, log) = recording_table(&["idle"]);
    let mut event_loop = EventLoop::new(table);

    host.push_event(HostEvent::new(
        window,
        HostEventKind::Configure { x: 0, y: 0, width: 320, height: 240 },
    ));
    assert_eq!(event_loop.main_iteration(&mut session).unwrap(), Iteration::Dispatched);

    assert!(log.borrow().is_empty());
    assert_eq!(session.window(id).unwrap().width(), 320);
    assert_eq!(session.window(id).unwrap().height(), 240);
}

#[test]
fn test_key_event_queries_pointer_at_dispatch() {
    let host = HeadlessHost::new();
    let mut session = open_session(&host);
    let id = session.create_window("w").unwrap();
    let window = native(&session, id);
    session.register_key_down_func(id, Some("key"));
    let (table, log) = recording_table(&["key"]);
    let mut event_loop = EventLoop::new(table);

    host.set_pointer(window, 1, 1);
    host.push_event(HostEvent::new(window, HostEventKind::KeyPress { keysym: 0x61 }));
    // Pointer moves after the key was queued
    host.set_pointer(window, 42, 17);
    host.clear_calls();

    event_loop.main_iteration(&mut session).unwrap();

    assert_eq!(log.borrow()[0].event, CallbackEvent::KeyDown { key: 0x61, x: 42, y: 17 });
    assert_eq!(host.calls()[0], HostCall::QueryPointer(window));
}

#[test]
fn test_key_release_reports_key_up() {
    let host = HeadlessHost::new();
    let mut session = open_session(&host);
    let id = session.create_window("w").unwrap();
    let window = native(&session, id);
    session.register_key_up_func(id, Some("key-up"));
    let (table, log) = recording_table(&["key-up"]);
    let mut event_loop = EventLoop::new(table);

    host.set_pointer(window, 3, 4);
    host.push_event(HostEvent::new(window, HostEventKind::KeyRelease { keysym: 0xff1b }));
    event_loop.main_iteration(&mut session).unwrap();

    assert_eq!(log.borrow()[0].event, CallbackEvent::KeyUp { key: 0xff1b, x: 3, y: 4 });
}

#[test]
fn test_button_index_is_zero_based_and_modifier_prefers_shift() {
    let host = HeadlessHost::new();
    let mut session = open_session(&host);
    let id = session.create_window("w").unwrap();
    let window = native(&session, id);
    session.register_button_down_func(id, Some("down"));
    session.register_button_up_func(id, Some("up"));
    let (table, log) = recording_table(&["down", "up"]);
    let mut event_loop = EventLoop::new(table);

    host.push_event(HostEvent::new(
        window,
        HostEventKind::ButtonPress {
            button: 1,
            state: ModifierMask::SHIFT | ModifierMask::CONTROL,
            x: 10,
            y: 20,
        },
    ));
    host.push_event(HostEvent::new(
        window,
        HostEventKind::ButtonRelease { button: 3, state: ModifierMask::LOCK, x: 11, y: 21 },
    ));
    event_loop.main_iteration(&mut session).unwrap();
    event_loop.main_iteration(&mut session).unwrap();

    let log = log.borrow();
    assert_eq!(
        log[0].event,
        CallbackEvent::ButtonDown { button: 0, modifier: Modifier::Shift, x: 10, y: 20 }
    );
    assert_eq!(
        log[1].event,
        CallbackEvent::ButtonUp { button: 2, modifier: Modifier::None, x: 11, y: 21 }
    );
}

#[test]
fn test_motion_reports_event_coordinates() {
    let host = HeadlessHost::new();
    let mut session = open_session(&host);
    let id = session.create_window("w").unwrap();
    let window = native(&session, id);
    session.register_motion_func(id, Some("motion"));
    let (table, log) = recording_table(&["motion"]);
    let mut event_loop = EventLoop::new(table);

    host.set_pointer(window, 0, 0);
    host.push_event(HostEvent::new(window, HostEventKind::Motion { x: 7, y: 9 }));
    event_loop.main_iteration(&mut session).unwrap();

    assert_eq!(log.borrow()[0].event, CallbackEvent::Motion { x: 7, y: 9 });
}

#[test]
fn test_close_request_sets_close_state_and_keeps_window() {
    let host = HeadlessHost::new();
    let mut session = open_session(&host);
    let id = session.create_window("w").unwrap();
    let window = native(&session, id);
    session.register_close_func(id, Some("close"));
    let (table, log) = recording_table(&["close"]);
    let mut event_loop = EventLoop::new(table);

    host.push_event(HostEvent::new(window, HostEventKind::CloseRequest));
    event_loop.main_iteration(&mut session).unwrap();

    assert_eq!(names(&log), vec!["close"]);
    assert_eq!(session.close_state(id), Some(true));
    assert_eq!(session.window_count(), 1);
}

#[test]
fn test_close_request_without_callback_still_sets_state() {
    let host = HeadlessHost::new();
    let mut session = open_session(&host);
    let id = session.create_window("w").unwrap();
    let window = native(&session, id);
    let mut event_loop = EventLoop::new(CallbackTable::new());

    host.push_event(HostEvent::new(window, HostEventKind::CloseRequest));
    event_loop.main_iteration(&mut session).unwrap();

    assert_eq!(session.close_state(id), Some(true));
}

#[test]
fn test_close_state_can_be_cleared() {
    let host = HeadlessHost::new();
    let mut session = open_session(&host);
    let id = session.create_window("w").unwrap();
    let window = native(&session, id);
    let mut event_loop = EventLoop::new(CallbackTable::new());

    host.push_event(HostEvent::new(window, HostEventKind::CloseRequest));
    event_loop.main_iteration(&mut session).unwrap();
    assert!(session.set_close_state(id, false));

    assert_eq!(session.close_state(id), Some(false));
    session.destroy_window(id);
    assert!(!session.set_close_state(id, true));
}

#[test]
fn test_other_events_are_ignored() {
    let host = HeadlessHost::new();
    let mut session = open_session(&host);
    let id = session.create_window("w").unwrap();
    let window = native(&session, id);
    let mut event_loop = EventLoop::new(CallbackTable::new());

    host.push_event(HostEvent::new(window, HostEventKind::Other));
    assert_eq!(event_loop.main_iteration(&mut session).unwrap(), Iteration::Ignored);
}

#[test]
fn test_unregistered_slot_does_nothing() {
    let host = HeadlessHost::new();
    let mut session = open_session(&host);
    let id = session.create_window("w").unwrap();
    let window = native(&session, id);
    session.register_paint_func(id, Some("paint"));
    session.register_paint_func(id, None);
    // Undefined in the table, but never looked up once cleared
    let mut event_loop = EventLoop::new(CallbackTable::new());

    host.push_event(HostEvent::new(window, HostEventKind::Expose));
    assert_eq!(event_loop.main_iteration(&mut session).unwrap(), Iteration::Dispatched);
}

#[test]
fn test_unresolved_name_is_fatal() {
    let host = HeadlessHost::new();
    let mut session = open_session(&host);
    let id = session.create_window("w").unwrap();
    let window = native(&session, id);
    session.register_paint_func(id, Some("missing"));
    let mut event_loop = EventLoop::new(CallbackTable::new());

    host.push_event(HostEvent::new(window, HostEventKind::Expose));
    let err = event_loop.main_iteration(&mut session).unwrap_err();

    match err {
        DispatchError::UnresolvedCallback { name, slot, window } => {
            assert_eq!(name, "missing");
            assert_eq!(slot, CallbackSlot::Paint);
            assert_eq!(window, id);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_callback_error_propagates() {
    let host = HeadlessHost::new();
    let mut session = open_session(&host);
    let id = session.create_window("w").unwrap();
    let window = native(&session, id);
    session.register_enter_func(id, Some("fails"));

    let mut table = CallbackTable::new();
    table.define("fails", |_: &mut Session, _, _: &CallbackEvent| Err("boom".into()));
    let mut event_loop = EventLoop::new(table);

    host.push_event(HostEvent::new(window, HostEventKind::Enter));
    let err = event_loop.main_iteration(&mut session).unwrap_err();

    assert!(matches!(
        err,
        DispatchError::CallbackFailed { ref name, slot: CallbackSlot::Enter, .. } if name == "fails"
    ));
    assert_eq!(std::error::Error::source(&err).unwrap().to_string(), "boom");
}

#[test]
fn test_closure_resolver() {
    let host = HeadlessHost::new();
    let mut session = open_session(&host);
    let id = session.create_window("w").unwrap();
    let window = native(&session, id);
    session.register_leave_func(id, Some("leave"));

    let hits = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&hits);
    let resolver = move |name: &str| -> Option<crate::event_loop::Callback> {
        (name == "leave").then(|| {
            let counter = Rc::clone(&counter);
            let callback: crate::event_loop::Callback =
                Rc::new(move |_: &mut Session, _: WindowId, _: &CallbackEvent| -> Result<(), CallbackError> {
                    *counter.borrow_mut() += 1;
                    Ok(())
                });
            callback
        })
    };
    let mut event_loop = EventLoop::new(resolver);

    host.push_event(HostEvent::new(window, HostEventKind::Leave));
    event_loop.main_iteration(&mut session).unwrap();

    assert_eq!(*hits.borrow(), 1);
}

#[test]
fn test_names_resolve_at_dispatch_time() {
    let host = HeadlessHost::new();
    let mut session = open_session(&host);
    let id = session.create_window("w").unwrap();
    let window = native(&session, id);
    session.register_enter_func(id, Some("late"));
    let mut event_loop = EventLoop::new(CallbackTable::new());

    let log = InvocationLog::default();
    let recorder = Rc::clone(&log);
    event_loop
        .resolver_mut()
        .define("late", move |_: &mut Session, window, event: &CallbackEvent| {
            recorder.borrow_mut().push(Invocation { name: "late", window, event: *event });
            Ok(())
        });

    host.push_event(HostEvent::new(window, HostEventKind::Enter));
    event_loop.main_iteration(&mut session).unwrap();

    assert_eq!(names(&log), vec!["late"]);
    assert_eq!(log.borrow()[0].window, id);
}

#[test]
fn test_dispatch_flushes() {
    let host = HeadlessHost::new();
    let mut session = open_session(&host);
    let id = session.create_window("w").unwrap();
    let window = native(&session, id);
    let mut event_loop = EventLoop::new(CallbackTable::new());
    host.clear_calls();

    host.push_event(HostEvent::new(window, HostEventKind::Expose));
    event_loop.main_iteration(&mut session).unwrap();

    assert_eq!(host.calls().last(), Some(&HostCall::Flush));
}
