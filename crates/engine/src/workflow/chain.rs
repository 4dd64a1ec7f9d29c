//! The ordered action chain and its execution protocol.
//!
//! Execution is single-threaded and cooperative. `run` wires one continuation per instance
//! into a [`RunQueue`], starting from the last, then asks the queue to advance. Each
//! continuation resolves and executes its instance, and only the completion callback asks the
//! queue to advance again. Instance `i` therefore finishes entirely, timer delays included,
//! before instance `i + 1` resolves its variables. The queue pops continuations from a loop, so
//! actions that finish immediately never nest on the call stack.

use std::{
    cell::{Cell, Ref, RefCell},
    rc::Rc,
};

use actions_types::PropertyValue;
use chrono::Utc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use crate::{
    error::ActionError,
    executor::{ActionHost, Outcome, PreparedAction, execute_action},
    instance::{ActionInstance, InstanceId},
    workflow::{
        selection::PendingSelection,
        state::{ChainEvent, EventEmitter, RunStatus},
    },
};

type Continuation = Box<dyn FnOnce(&Rc<RunQueue>)>;

/// Continuations of one run, stored last-to-first so `pop` yields the next one.
///
/// Continuations never own the queue; pending completion callbacks do. A halted or abandoned
/// run drops its remaining continuations once the last callback is gone.
#[derive(Default)]
struct RunQueue {
    pending: RefCell<Vec<Continuation>>,
    draining: Cell<bool>,
    advance_requested: Cell<bool>,
}

impl RunQueue {
    fn new(continuations: Vec<Continuation>) -> Rc<Self> {
        Rc::new(Self {
            pending: RefCell::new(continuations),
            ..Self::default()
        })
    }

    /// Runs the next continuation. Called from inside a continuation, only records the request;
    /// the loop already draining the queue picks it up once that continuation returns.
    fn advance(self: &Rc<Self>) {
        self.advance_requested.set(true);
        if self.draining.replace(true) {
            return;
        }
        while self.advance_requested.replace(false) {
            let next = self.pending.borrow_mut().pop();
            let Some(next) = next else {
                break;
            };
            next(self);
        }
        self.draining.set(false);
    }
}

/// Mutable chain state shared between the chain handle and in-flight continuations.
#[derive(Debug, Default)]
pub(super) struct ChainState {
    pub(super) instances: Vec<ActionInstance>,
    pub(super) status: RunStatus,
    pub(super) selection: Option<PendingSelection>,
    events: EventEmitter,
}

impl ChainState {
    pub(super) fn position(&self, id: InstanceId) -> Option<usize> {
        self.instances.iter().position(|instance| instance.id() == id)
    }

    pub(super) fn index_of(&self, id: InstanceId) -> Result<usize, ActionError> {
        self.position(id).ok_or(ActionError::UnknownInstance(id))
    }

    pub(super) fn ensure_not_running(&self) -> Result<(), ActionError> {
        match self.status {
            RunStatus::Running => Err(ActionError::AlreadyRunning),
            RunStatus::Idle | RunStatus::Completed => Ok(()),
        }
    }

    /// Structural edits and runs need an idle chain that is not waiting on a selection.
    pub(super) fn ensure_structure_editable(&self) -> Result<(), ActionError> {
        self.ensure_not_running()?;
        if self.selection.is_some() {
            return Err(ActionError::ChainFrozen);
        }
        Ok(())
    }

    pub(super) fn bind(&mut self, target: InstanceId, property: &str, source: InstanceId) -> Result<(), ActionError> {
        self.ensure_not_running()?;
        let target_index = self.index_of(target)?;
        let expected = self.instances[target_index].spec(property)?.value_type;

        let invalid_reference = || ActionError::InvalidReference {
            property: property.to_string(),
            source_id: source,
        };
        let source_index = self.position(source).ok_or_else(invalid_reference)?;
        if source_index >= target_index {
            return Err(invalid_reference());
        }

        let found = self.instances[source_index].return_type();
        if found != expected {
            return Err(ActionError::TypeMismatch {
                property: property.to_string(),
                expected,
                found,
            });
        }

        self.instances[target_index].set_binding(property, source);
        debug!(instance = %target, property, source = %source, "bound property to variable");
        Ok(())
    }

    fn begin_run(&mut self) {
        self.status = RunStatus::Running;
        for instance in &mut self.instances {
            instance.reset();
        }
        self.events.emit(ChainEvent::RunStarted {
            at: Utc::now(),
            actions: self.instances.len(),
        });
    }

    fn prepare(&mut self, index: usize) -> Option<PreparedAction> {
        if index >= self.instances.len() {
            return None;
        }
        let (preceding, rest) = self.instances.split_at_mut(index);
        let instance = rest.first_mut()?;
        let values = instance.resolve(preceding);
        instance.start();

        self.events.emit(ChainEvent::InstanceStarted {
            index,
            instance: instance.id(),
            variant: instance.variant().identifier.clone(),
            at: Utc::now(),
        });

        Some(PreparedAction {
            index,
            instance: instance.id(),
            kind: instance.variant().kind,
            values,
        })
    }

    /// Records the outcome of instance `index`. Returns true when the run should advance.
    fn finish_instance(&mut self, index: usize, outcome: Outcome) -> bool {
        let Some(instance) = self.instances.get_mut(index) else {
            return false;
        };
        let (return_value, advance) = match outcome {
            Outcome::Finished(value) => (value, true),
            Outcome::Halted => (None, false),
        };
        instance.finish(return_value.clone());
        debug!(index, instance = %instance.id(), ?return_value, "action finished");

        self.events.emit(ChainEvent::InstanceFinished {
            index,
            instance: instance.id(),
            return_value,
            at: Utc::now(),
        });
        if !advance {
            self.events.emit(ChainEvent::RunHalted { index, at: Utc::now() });
        }
        advance
    }

    fn complete_run(&mut self) {
        self.status = RunStatus::Completed;
        info!(actions = self.instances.len(), "workflow completed");
        self.events.emit(ChainEvent::RunCompleted { finished_at: Utc::now() });
    }
}

/// Ordered collection of action instances executed as one run.
///
/// Continuations scheduled by a run keep the underlying state alive until they fire.
#[derive(Debug, Default)]
pub struct WorkflowChain {
    pub(super) state: Rc<RefCell<ChainState>>,
}

impl WorkflowChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes run events to `sender`. Pass `None` to stop reporting.
    pub fn set_event_sender(&self, sender: Option<UnboundedSender<ChainEvent>>) {
        self.state.borrow_mut().events.set(sender);
    }

    pub fn len(&self) -> usize {
        self.state.borrow().instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.borrow().instances.is_empty()
    }

    pub fn status(&self) -> RunStatus {
        self.state.borrow().status
    }

    /// Instances in execution order.
    pub fn instances(&self) -> Ref<'_, [ActionInstance]> {
        Ref::map(self.state.borrow(), |state| state.instances.as_slice())
    }

    pub fn instance(&self, id: InstanceId) -> Option<Ref<'_, ActionInstance>> {
        Ref::filter_map(self.state.borrow(), |state| state.instances.iter().find(|instance| instance.id() == id)).ok()
    }

    /// Instance ids in execution order.
    pub fn ids(&self) -> Vec<InstanceId> {
        self.state.borrow().instances.iter().map(ActionInstance::id).collect()
    }

    pub fn position(&self, id: InstanceId) -> Option<usize> {
        self.state.borrow().position(id)
    }

    /// Value written to `id`'s return slot by the current or last run.
    pub fn return_value(&self, id: InstanceId) -> Option<PropertyValue> {
        self.instance(id).and_then(|instance| instance.return_value().cloned())
    }

    /// Adds `instance` to the end of the chain. The chain takes ownership, so an instance can
    /// appear at most once.
    pub fn append(&self, instance: ActionInstance) -> Result<InstanceId, ActionError> {
        let mut state = self.state.borrow_mut();
        state.ensure_structure_editable()?;
        let id = instance.id();
        debug!(instance = %id, variant = %instance.variant().identifier, "appending action");
        state.instances.push(instance);
        Ok(id)
    }

    /// Removes `id` and clears every binding that reads from it.
    pub fn remove(&self, id: InstanceId) -> Result<ActionInstance, ActionError> {
        let mut state = self.state.borrow_mut();
        state.ensure_structure_editable()?;
        let index = state.index_of(id)?;
        let removed = state.instances.remove(index);

        for dependent in &mut state.instances {
            for property in dependent.unbind_from(id) {
                debug!(instance = %dependent.id(), property, source = %id, "cleared binding to removed action");
            }
        }
        Ok(removed)
    }

    /// Sets a literal property value on `id`.
    pub fn configure(&self, id: InstanceId, property: &str, value: PropertyValue) -> Result<(), ActionError> {
        let mut state = self.state.borrow_mut();
        state.ensure_not_running()?;
        let index = state.index_of(id)?;
        state.instances[index].configure(property, value)
    }

    /// Binds `property` on `target` to the return value of `source`, which must run earlier
    /// and return the property's type. A refused binding changes nothing.
    pub fn bind(&self, target: InstanceId, property: &str, source: InstanceId) -> Result<(), ActionError> {
        self.state.borrow_mut().bind(target, property, source)
    }

    /// Reverts `property` on `target` to its literal value.
    pub fn clear_binding(&self, target: InstanceId, property: &str) -> Result<Option<InstanceId>, ActionError> {
        let mut state = self.state.borrow_mut();
        state.ensure_not_running()?;
        let index = state.index_of(target)?;
        state.instances[index].clear_binding(property)
    }

    /// Executes every instance in order.
    ///
    /// Returns as soon as the first action that cannot finish synchronously is waiting on the
    /// host; the remaining actions run from completion callbacks. An empty chain is a no-op.
    pub fn run(&self, host: Rc<ActionHost>) -> Result<(), ActionError> {
        let count = {
            let mut state = self.state.borrow_mut();
            state.ensure_structure_editable()?;
            if state.instances.is_empty() {
                debug!("workflow is empty; nothing to run");
                return Ok(());
            }
            state.begin_run();
            state.instances.len()
        };
        info!(actions = count, "running workflow");

        let mut continuations: Vec<Continuation> = Vec::with_capacity(count + 1);
        let terminal = Rc::clone(&self.state);
        continuations.push(Box::new(move |_: &Rc<RunQueue>| terminal.borrow_mut().complete_run()));
        for index in (0..count).rev() {
            let state = Rc::clone(&self.state);
            let host = Rc::clone(&host);
            continuations.push(Box::new(move |queue: &Rc<RunQueue>| run_instance(&state, &host, index, queue)));
        }
        RunQueue::new(continuations).advance();
        Ok(())
    }
}

fn run_instance(state: &Rc<RefCell<ChainState>>, host: &ActionHost, index: usize, queue: &Rc<RunQueue>) {
    let prepared = state.borrow_mut().prepare(index);
    let Some(prepared) = prepared else {
        warn!(index, "action disappeared from running workflow");
        return;
    };

    let completion_state = Rc::clone(state);
    let queue = Rc::clone(queue);
    execute_action(
        &prepared,
        host,
        Box::new(move |outcome| {
            let advance = completion_state.borrow_mut().finish_instance(index, outcome);
            if advance {
                queue.advance();
            }
        }),
    );
}
