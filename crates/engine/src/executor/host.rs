//! Collaborators the host application provides to run actions.
//!
//! Engines never talk to the desktop directly. Notifications, alert sounds, and timers go
//! through these traits so hosts can plug in a GUI toolkit, a terminal, or test doubles.

use std::rc::Rc;

/// Callback invoked when a scheduled timer fires.
pub type TimerCallback = Box<dyn FnOnce()>;

/// Displays system notifications.
pub trait NotificationSink {
    /// Shows a notification. `body` is `None` when the action has no description.
    fn send(&self, title: &str, body: Option<&str>);
}

/// Plays the platform alert sound.
pub trait AlertSink {
    fn beep(&self);
}

/// Schedules callbacks on the host's event loop.
pub trait TimerService {
    /// Invokes `callback` once `seconds` have elapsed. Must not invoke it synchronously.
    fn schedule(&self, seconds: u64, callback: TimerCallback);
}

/// Bundle of host collaborators shared by every action in a run.
#[derive(Clone)]
pub struct ActionHost {
    pub notifications: Rc<dyn NotificationSink>,
    pub alerts: Rc<dyn AlertSink>,
    pub timer: Rc<dyn TimerService>,
}

impl ActionHost {
    pub fn new(notifications: Rc<dyn NotificationSink>, alerts: Rc<dyn AlertSink>, timer: Rc<dyn TimerService>) -> Self {
        Self {
            notifications,
            alerts,
            timer,
        }
    }
}
