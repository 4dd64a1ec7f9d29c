//! In-memory sinks that record what actions did. Useful for previews and tests.

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use super::{
    host::{ActionHost, AlertSink, NotificationSink, TimerService},
    timer::ManualTimer,
};

/// Notification captured by [`RecordingNotifications`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentNotification {
    pub title: String,
    pub body: Option<String>,
}

#[derive(Debug, Default)]
pub struct RecordingNotifications {
    sent: RefCell<Vec<SentNotification>>,
}

impl RecordingNotifications {
    pub fn sent(&self) -> Vec<SentNotification> {
        self.sent.borrow().clone()
    }
}

impl NotificationSink for RecordingNotifications {
    fn send(&self, title: &str, body: Option<&str>) {
        self.sent.borrow_mut().push(SentNotification {
            title: title.to_string(),
            body: body.map(str::to_string),
        });
    }
}

#[derive(Debug, Default)]
pub struct RecordingAlerts {
    beeps: Cell<usize>,
}

impl RecordingAlerts {
    pub fn beeps(&self) -> usize {
        self.beeps.get()
    }
}

impl AlertSink for RecordingAlerts {
    fn beep(&self) {
        self.beeps.set(self.beeps.get() + 1);
    }
}

/// Host wired entirely to recording sinks and a [`ManualTimer`].
pub struct RecordingHost {
    pub notifications: Rc<RecordingNotifications>,
    pub alerts: Rc<RecordingAlerts>,
    pub timer: Rc<ManualTimer>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self {
            notifications: Rc::new(RecordingNotifications::default()),
            alerts: Rc::new(RecordingAlerts::default()),
            timer: Rc::new(ManualTimer::new()),
        }
    }

    /// Builds the [`ActionHost`] handed to a run.
    pub fn host(&self) -> Rc<ActionHost> {
        Rc::new(ActionHost::new(
            Rc::clone(&self.notifications) as Rc<dyn NotificationSink>,
            Rc::clone(&self.alerts) as Rc<dyn AlertSink>,
            Rc::clone(&self.timer) as Rc<dyn TimerService>,
        ))
    }
}

impl Default for RecordingHost {
    fn default() -> Self {
        Self::new()
    }
}
