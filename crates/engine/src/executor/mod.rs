//! Behavior execution.
//!
//! Each variant kind maps to one side effect performed through the [`ActionHost`]. Behaviors
//! report completion through a [`Completion`] callback rather than a return value because the
//! wait behavior finishes on a later turn of the host's event loop.

pub mod host;
pub mod recording;
pub mod timer;
pub mod types;

use actions_types::{PropertyValue, VariantKind};
use tracing::{debug, info};

pub use host::{ActionHost, AlertSink, NotificationSink, TimerCallback, TimerService};
pub use recording::{RecordingAlerts, RecordingHost, RecordingNotifications, SentNotification};
pub use timer::ManualTimer;
pub use types::{Completion, Outcome, PreparedAction};

use crate::registry::MAX_WAIT_SECONDS;

/// Title used when a notification's title is empty.
pub const FALLBACK_NOTIFICATION_TITLE: &str = "Notification";

/// Performs the behavior of `action` and reports through `done`.
///
/// Every kind except `Wait` calls `done` before returning.
pub fn execute_action(action: &PreparedAction, host: &ActionHost, done: Completion) {
    debug!(index = action.index, instance = %action.instance, kind = ?action.kind, "executing action");
    match action.kind {
        VariantKind::Notification => {
            let title = match action.text("title") {
                "" => FALLBACK_NOTIFICATION_TITLE,
                title => title,
            };
            let body = Some(action.text("body")).filter(|body| !body.is_empty());
            host.notifications.send(title, body);
            done(Outcome::Finished(None));
        }
        VariantKind::RingBell => {
            host.alerts.beep();
            done(Outcome::Finished(None));
        }
        VariantKind::Wait => {
            let seconds = wait_seconds(action.number("seconds"));
            debug!(seconds, "scheduling wait");
            host.timer.schedule(
                seconds,
                Box::new(move || done(Outcome::Finished(Some(PropertyValue::Number(seconds as f64))))),
            );
        }
        VariantKind::End => {
            info!(index = action.index, "workflow ended by action");
            done(Outcome::Halted);
        }
        VariantKind::Number => {
            let value = PropertyValue::Number(action.number("value"));
            done(Outcome::Finished(Some(value)));
        }
        VariantKind::Text => {
            let value = PropertyValue::Text(action.text("string").to_string());
            done(Outcome::Finished(Some(value)));
        }
    }
}

fn wait_seconds(requested: f64) -> u64 {
    if requested.is_finite() {
        requested.clamp(0.0, MAX_WAIT_SECONDS).round() as u64
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use indexmap::IndexMap;

    use super::*;
    use crate::registry::ActionRegistry;

    fn prepared(kind: VariantKind, values: &[(&str, PropertyValue)]) -> PreparedAction {
        let registry = ActionRegistry::builtin();
        let instance = registry.instantiate("end").expect("end variant");
        PreparedAction {
            index: 0,
            instance: instance.id(),
            kind,
            values: values
                .iter()
                .map(|(name, value)| (name.to_string(), value.clone()))
                .collect::<IndexMap<_, _>>(),
        }
    }

    fn capture() -> (Rc<RefCell<Vec<Outcome>>>, Completion) {
        let outcomes = Rc::new(RefCell::new(Vec::<Outcome>::new()));
        let sink = Rc::clone(&outcomes);
        let done: Completion = Box::new(move |outcome: Outcome| sink.borrow_mut().push(outcome));
        (outcomes, done)
    }

    #[test]
    fn notification_falls_back_to_default_title_and_omits_empty_body() {
        let recording = RecordingHost::new();
        let host = recording.host();
        let action = prepared(
            VariantKind::Notification,
            &[("title", PropertyValue::from("")), ("body", PropertyValue::from(""))],
        );
        let (outcomes, done) = capture();

        execute_action(&action, &host, done);

        assert_eq!(
            recording.notifications.sent(),
            vec![SentNotification {
                title: FALLBACK_NOTIFICATION_TITLE.into(),
                body: None
            }]
        );
        assert_eq!(*outcomes.borrow(), vec![Outcome::Finished(None)]);
    }

    #[test]
    fn blank_notification_title_is_sent_as_is() {
        let recording = RecordingHost::new();
        let action = prepared(
            VariantKind::Notification,
            &[("title", PropertyValue::from("  ")), ("body", PropertyValue::from("x"))],
        );
        let (_, done) = capture();

        execute_action(&action, &recording.host(), done);

        assert_eq!(recording.notifications.sent()[0].title, "  ");
    }

    #[test]
    fn ring_bell_beeps_once() {
        let recording = RecordingHost::new();
        let (outcomes, done) = capture();

        execute_action(&prepared(VariantKind::RingBell, &[]), &recording.host(), done);

        assert_eq!(recording.alerts.beeps(), 1);
        assert_eq!(outcomes.borrow().len(), 1);
    }

    #[test]
    fn wait_completes_only_after_the_timer_fires() {
        let recording = RecordingHost::new();
        let (outcomes, done) = capture();

        execute_action(&prepared(VariantKind::Wait, &[("seconds", PropertyValue::Number(3.0))]), &recording.host(), done);

        assert!(outcomes.borrow().is_empty());
        recording.timer.advance(2);
        assert!(outcomes.borrow().is_empty());
        recording.timer.advance(1);
        assert_eq!(*outcomes.borrow(), vec![Outcome::Finished(Some(PropertyValue::Number(3.0)))]);
    }

    #[test]
    fn end_halts_and_variables_return_literals() {
        let recording = RecordingHost::new();
        let host = recording.host();

        let (outcomes, done) = capture();
        execute_action(&prepared(VariantKind::End, &[]), &host, done);
        assert_eq!(*outcomes.borrow(), vec![Outcome::Halted]);

        let (outcomes, done) = capture();
        execute_action(&prepared(VariantKind::Number, &[("value", PropertyValue::Number(42.0))]), &host, done);
        assert_eq!(*outcomes.borrow(), vec![Outcome::Finished(Some(PropertyValue::Number(42.0)))]);

        let (outcomes, done) = capture();
        execute_action(&prepared(VariantKind::Text, &[("string", PropertyValue::from("hi"))]), &host, done);
        assert_eq!(*outcomes.borrow(), vec![Outcome::Finished(Some(PropertyValue::from("hi")))]);
    }

    #[test]
    fn wait_seconds_are_clamped_and_rounded() {
        assert_eq!(wait_seconds(-5.0), 0);
        assert_eq!(wait_seconds(2.5), 3);
        assert_eq!(wait_seconds(1e9), 86_400);
        assert_eq!(wait_seconds(f64::NAN), 0);
    }
}
