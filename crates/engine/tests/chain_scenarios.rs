use actions_engine::{ActionError, ActionRegistry, ChainEvent, InstancePhase, RecordingHost, RunStatus, SentNotification, WorkflowChain};
use actions_types::{PropertyValue, ValueType};
use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};

fn drain(receiver: &mut UnboundedReceiver<ChainEvent>) -> Vec<ChainEvent> {
    let mut events = Vec::new();
    while let Ok(event) = receiver.try_recv() {
        events.push(event);
    }
    events
}

/// Compact trace of start/finish events: `("start", index)` and `("finish", index)`.
fn trace(events: &[ChainEvent]) -> Vec<(&'static str, usize)> {
    events
        .iter()
        .filter_map(|event| match event {
            ChainEvent::InstanceStarted { index, .. } => Some(("start", *index)),
            ChainEvent::InstanceFinished { index, .. } => Some(("finish", *index)),
            ChainEvent::RunHalted { index, .. } => Some(("halt", *index)),
            ChainEvent::RunCompleted { .. } => Some(("done", usize::MAX)),
            ChainEvent::RunStarted { .. } => None,
        })
        .collect()
}

#[test]
fn empty_chain_run_is_a_no_op() {
    let chain = WorkflowChain::new();
    let recording = RecordingHost::new();
    let (sender, mut receiver) = unbounded_channel();
    chain.set_event_sender(Some(sender));

    chain.run(recording.host()).expect("run empty chain");

    assert_eq!(chain.status(), RunStatus::Idle);
    assert!(drain(&mut receiver).is_empty());
    assert!(recording.notifications.sent().is_empty());
    assert_eq!(recording.alerts.beeps(), 0);
    assert_eq!(recording.timer.pending(), 0);
}

#[test]
fn each_action_finishes_before_the_next_starts() {
    let registry = ActionRegistry::builtin();
    let chain = WorkflowChain::new();
    let recording = RecordingHost::new();
    let (sender, mut receiver) = unbounded_channel();
    chain.set_event_sender(Some(sender));

    let first_wait = chain.append(registry.instantiate("wait").expect("wait")).expect("append");
    chain.configure(first_wait, "seconds", PropertyValue::Number(2.0)).expect("seconds");
    chain.append(registry.instantiate("ring-bell").expect("ring-bell")).expect("append");
    let second_wait = chain.append(registry.instantiate("wait").expect("wait")).expect("append");
    chain.configure(second_wait, "seconds", PropertyValue::Number(3.0)).expect("seconds");
    chain.append(registry.instantiate("notification").expect("notification")).expect("append");

    chain.run(recording.host()).expect("run");
    assert_eq!(trace(&drain(&mut receiver)), vec![("start", 0)]);
    assert_eq!(recording.alerts.beeps(), 0);

    recording.timer.advance(2);
    assert_eq!(trace(&drain(&mut receiver)), vec![("finish", 0), ("start", 1), ("finish", 1), ("start", 2)]);
    assert_eq!(recording.alerts.beeps(), 1);
    assert!(recording.notifications.sent().is_empty());

    recording.timer.advance(2);
    assert!(drain(&mut receiver).is_empty());

    recording.timer.advance(1);
    assert_eq!(
        trace(&drain(&mut receiver)),
        vec![("finish", 2), ("start", 3), ("finish", 3), ("done", usize::MAX)]
    );
    assert_eq!(recording.notifications.sent().len(), 1);
    assert_eq!(chain.status(), RunStatus::Completed);
    assert!(chain.instances().iter().all(|instance| instance.phase() == InstancePhase::Done));
}

#[test]
fn number_cannot_feed_a_text_property() {
    let registry = ActionRegistry::builtin();
    let chain = WorkflowChain::new();

    let number = chain.append(registry.instantiate("number").expect("number")).expect("append");
    chain.configure(number, "value", PropertyValue::Number(42.0)).expect("value");
    let text = chain.append(registry.instantiate("text").expect("text")).expect("append");

    let error = chain.bind(text, "string", number).unwrap_err();
    assert_eq!(
        error,
        ActionError::TypeMismatch {
            property: "string".into(),
            expected: ValueType::Text,
            found: ValueType::Number
        }
    );
    assert_eq!(chain.instance(text).expect("text").property("string").expect("string").binding(), None);
}

#[test]
fn zero_second_wait_then_notification() {
    let registry = ActionRegistry::builtin();
    let chain = WorkflowChain::new();
    let recording = RecordingHost::new();

    let wait = chain.append(registry.instantiate("wait").expect("wait")).expect("append");
    chain.configure(wait, "seconds", PropertyValue::Number(0.0)).expect("seconds");
    let notification = chain.append(registry.instantiate("notification").expect("notification")).expect("append");
    chain.configure(notification, "body", PropertyValue::from("done")).expect("body");
    let later = chain.append(registry.instantiate("number").expect("number")).expect("append");
    chain.bind(later, "value", wait).expect("wait returns a number");

    chain.run(recording.host()).expect("run");
    assert_eq!(chain.status(), RunStatus::Running);
    recording.timer.advance(0);

    assert_eq!(chain.status(), RunStatus::Completed);
    assert_eq!(chain.return_value(wait), Some(PropertyValue::Number(0.0)));
    assert_eq!(chain.return_value(later), Some(PropertyValue::Number(0.0)));
    assert_eq!(
        recording.notifications.sent(),
        vec![SentNotification {
            title: "Hello World!".into(),
            body: Some("done".into())
        }]
    );
}

#[test]
fn end_halts_the_run_permanently() {
    let registry = ActionRegistry::builtin();
    let chain = WorkflowChain::new();
    let recording = RecordingHost::new();
    let (sender, mut receiver) = unbounded_channel();
    chain.set_event_sender(Some(sender));

    chain.append(registry.instantiate("end").expect("end")).expect("append");
    chain.append(registry.instantiate("ring-bell").expect("ring-bell")).expect("append");

    chain.run(recording.host()).expect("run");
    recording.timer.advance(60);

    assert_eq!(trace(&drain(&mut receiver)), vec![("start", 0), ("finish", 0), ("halt", 0)]);
    assert_eq!(recording.alerts.beeps(), 0);
    assert_eq!(chain.status(), RunStatus::Running);
    assert_eq!(chain.run(recording.host()).unwrap_err(), ActionError::AlreadyRunning);
}

#[test]
fn bound_values_flow_forward_and_clamp() {
    let registry = ActionRegistry::builtin();
    let chain = WorkflowChain::new();
    let recording = RecordingHost::new();

    let greeting = chain.append(registry.instantiate("text").expect("text")).expect("append");
    chain.configure(greeting, "string", PropertyValue::from("Coffee is ready")).expect("string");
    let delay = chain.append(registry.instantiate("number").expect("number")).expect("append");
    chain.configure(delay, "value", PropertyValue::Number(100_000.0)).expect("value");
    let wait = chain.append(registry.instantiate("wait").expect("wait")).expect("append");
    chain.bind(wait, "seconds", delay).expect("bind seconds");
    let notification = chain.append(registry.instantiate("notification").expect("notification")).expect("append");
    chain.bind(notification, "title", greeting).expect("bind title");

    chain.run(recording.host()).expect("run");
    assert_eq!(
        chain.instance(wait).expect("wait").value("seconds"),
        Some(&PropertyValue::Number(86_400.0))
    );

    recording.timer.advance(86_399);
    assert!(recording.notifications.sent().is_empty());
    recording.timer.advance(1);

    assert_eq!(recording.notifications.sent()[0].title, "Coffee is ready");
    assert_eq!(chain.return_value(wait), Some(PropertyValue::Number(86_400.0)));
}

#[test]
fn rerun_picks_up_edits_and_executes_each_action_once() {
    let registry = ActionRegistry::builtin();
    let chain = WorkflowChain::new();
    let recording = RecordingHost::new();

    let source = chain.append(registry.instantiate("text").expect("text")).expect("append");
    chain.configure(source, "string", PropertyValue::from("first")).expect("string");
    let notification = chain.append(registry.instantiate("notification").expect("notification")).expect("append");
    chain.bind(notification, "body", source).expect("bind body");

    chain.run(recording.host()).expect("first run");
    chain.configure(source, "string", PropertyValue::from("second")).expect("edit between runs");
    chain.append(registry.instantiate("ring-bell").expect("ring-bell")).expect("append between runs");
    chain.run(recording.host()).expect("second run");

    let bodies: Vec<_> = recording.notifications.sent().into_iter().map(|sent| sent.body).collect();
    assert_eq!(bodies, vec![Some("first".to_string()), Some("second".to_string())]);
    assert_eq!(recording.alerts.beeps(), 1);
}

#[test]
fn clearing_a_binding_reverts_to_the_literal() {
    let registry = ActionRegistry::builtin();
    let chain = WorkflowChain::new();
    let recording = RecordingHost::new();

    let source = chain.append(registry.instantiate("text").expect("text")).expect("append");
    chain.configure(source, "string", PropertyValue::from("bound")).expect("string");
    let notification = chain.append(registry.instantiate("notification").expect("notification")).expect("append");
    chain.configure(notification, "title", PropertyValue::from("literal")).expect("title");
    chain.bind(notification, "title", source).expect("bind");
    assert_eq!(chain.clear_binding(notification, "title").expect("clear"), Some(source));

    chain.run(recording.host()).expect("run");
    assert_eq!(recording.notifications.sent()[0].title, "literal");
}

fn chain_of(registry: &ActionRegistry, identifiers: impl IntoIterator<Item = &'static str>) -> WorkflowChain {
    let chain = WorkflowChain::new();
    for identifier in identifiers {
        chain.append(registry.instantiate(identifier).expect("builtin variant")).expect("append");
    }
    chain
}

#[test]
fn long_chain_of_immediate_actions_completes() {
    let registry = ActionRegistry::builtin();
    let chain = chain_of(&registry, std::iter::repeat_n("ring-bell", 20_000));
    let recording = RecordingHost::new();

    chain.run(recording.host()).expect("run");

    assert_eq!(chain.status(), RunStatus::Completed);
    assert_eq!(recording.alerts.beeps(), 20_000);
}

#[test]
fn long_chain_resumed_by_a_timer_completes() {
    let registry = ActionRegistry::builtin();
    let steps = std::iter::once("wait").chain(std::iter::repeat_n("ring-bell", 20_000));
    let chain = chain_of(&registry, steps);
    let recording = RecordingHost::new();

    chain.run(recording.host()).expect("run");
    assert_eq!(recording.alerts.beeps(), 0);
    recording.timer.advance(5);

    assert_eq!(chain.status(), RunStatus::Completed);
    assert_eq!(recording.alerts.beeps(), 20_000);
}

#[test]
fn halting_early_in_a_long_chain_drops_the_rest() {
    let registry = ActionRegistry::builtin();
    let steps = ["ring-bell", "end"].into_iter().chain(std::iter::repeat_n("ring-bell", 20_000));
    let chain = chain_of(&registry, steps);
    let recording = RecordingHost::new();

    chain.run(recording.host()).expect("run");

    assert_eq!(recording.alerts.beeps(), 1);
    assert_eq!(chain.status(), RunStatus::Running);
    assert_eq!(chain.instances()[2].phase(), InstancePhase::Idle);
}
