//! Cross-module tests for session lifecycle and event dispatch
//!
//! Everything here runs against the headless host.

mod dispatch;

use std::cell::RefCell;
use std::rc::Rc;

use crate::config::WindowManagerConfig;
use crate::event_loop::CallbackTable;
use crate::host::HeadlessHost;
use crate::session::Session;
use crate::window::{CallbackEvent, WindowId};

/// One recorded callback invocation
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Invocation {
    pub name: &'static str,
    pub window: WindowId,
    pub event: CallbackEvent,
}

/// Shared log of callback invocations
pub(crate) type InvocationLog = Rc<RefCell<Vec<Invocation>>>;

pub(crate) fn open_session(host: &HeadlessHost) -> Session {
    crate::foundation::logging::init_for_tests();
    let mut connector = host.clone();
    Session::init(&mut connector, &["wm-test"], |_| None, &WindowManagerConfig::default())
        .expect("headless session opens")
}

/// A table whose callbacks named `names` only record that they ran
pub(crate) fn recording_table(names: &[&'static str]) -> (CallbackTable, InvocationLog) {
    let log = InvocationLog::default();
    let mut table = CallbackTable::new();
    for &name in names {
        let log = Rc::clone(&log);
        table.define(name, move |_: &mut Session, window, event: &CallbackEvent| {
            log.borrow_mut().push(Invocation { name, window, event: *event });
            Ok(())
        });
    }
    (table, log)
}

pub(crate) fn names(log: &InvocationLog) -> Vec<&'static str> {
    log.borrow().iter().map(|invocation| invocation.name).collect()
}
