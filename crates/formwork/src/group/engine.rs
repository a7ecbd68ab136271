//! Two-phase group evaluation.
//!
//! Every member commit first updates the value and validity reducers. If the
//! reduced validity is not Valid the group stops there and reports the
//! reduction. Only a fully valid reduction runs the group's own suite.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;

use formwork_core::errors::{ensure_name, ensure_unique_names};
use formwork_core::{
    CancelableDelayedTask, CombinedValidationResult, CombinedValidatorSuite, Member,
    MemberCallback, MemberState, Nameable, Result, Snapshot, StateCallback, StateContainer,
    Subscription, SubscriptionSet, SuiteConfig, ValidationResult, Validity, ValidityReducer,
    ValiditySource, ValueReducer,
};

use super::state::{GroupState, GroupValue};
use crate::in_flight::InFlight;

type GroupTask = CancelableDelayedTask<ValidationResult<GroupValue>>;

struct GroupInner {
    name: String,
    suite: CombinedValidatorSuite<GroupValue>,
    values: RefCell<ValueReducer>,
    validities: RefCell<ValidityReducer>,
    container: StateContainer<GroupState>,
    in_flight: InFlight,
    upstream: RefCell<SubscriptionSet>,
}

impl Drop for GroupInner {
    fn drop(&mut self) {
        self.upstream.get_mut().unsubscribe_all();
    }
}

pub(crate) struct GroupCore {
    inner: Rc<GroupInner>,
}

impl Clone for GroupCore {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl GroupCore {
    pub(crate) fn new(
        name: String,
        members: &[Rc<dyn Member>],
        validation: SuiteConfig<GroupValue>,
    ) -> Result<Self> {
        ensure_name(&name)?;
        ensure_unique_names(&name, members.iter().map(|member| member.name()))?;
        let suite = CombinedValidatorSuite::new(validation)?;

        let states: Vec<(String, MemberState)> = members
            .iter()
            .map(|member| (member.name().to_string(), member.member_state()))
            .collect();
        let values = ValueReducer::new(states.iter().map(|(name, state)| (name.as_str(), state)));
        let validities = ValidityReducer::with_members(states);

        let (initial, task) = evaluate(&suite, &values, validities.validity());
        let core = Self {
            inner: Rc::new(GroupInner {
                name,
                suite,
                values: RefCell::new(values),
                validities: RefCell::new(validities),
                container: StateContainer::new(initial),
                in_flight: InFlight::default(),
                upstream: RefCell::new(SubscriptionSet::new()),
            }),
        };
        if let Some(task) = task {
            core.schedule(task);
        }

        for member in members {
            let weak = Rc::downgrade(&core.inner);
            let member_name = member.name().to_string();
            let subscription = member.subscribe_to_member_state(Box::new(move |state| {
                if let Some(inner) = weak.upgrade() {
                    GroupCore { inner }.on_member_update(&member_name, state);
                }
            }));
            core.inner.upstream.borrow_mut().push(subscription);
        }

        Ok(core)
    }

    pub(crate) fn name(&self) -> &str {
        &self.inner.name
    }

    pub(crate) fn state(&self) -> GroupState {
        self.inner.container.state()
    }

    pub(crate) fn snapshot(&self) -> Snapshot<GroupState> {
        self.inner.container.snapshot()
    }

    pub(crate) fn subscribe_to_state(&self, callback: StateCallback<GroupState>) -> Subscription {
        self.inner.container.subscribe_to_state(callback)
    }

    pub(crate) fn member_state(&self) -> MemberState {
        self.inner.container.with_state(member_view)
    }

    pub(crate) fn subscribe_to_member_state(&self, callback: MemberCallback) -> Subscription {
        self.inner
            .container
            .subscribe_to_state(move |snapshot| callback(&member_view(snapshot)))
    }

    pub(crate) fn is_validating(&self) -> bool {
        self.inner.in_flight.is_active()
    }

    pub(crate) fn dispose(&self) {
        self.inner.in_flight.cancel(&self.inner.name);
        self.inner.upstream.borrow_mut().unsubscribe_all();
    }

    fn on_member_update(&self, member: &str, state: &MemberState) {
        self.inner
            .values
            .borrow_mut()
            .process_member_state_update(member, state);
        self.inner
            .validities
            .borrow_mut()
            .process_member_state_update(member.to_string(), state);
        self.recompute();
    }

    fn recompute(&self) {
        self.inner.in_flight.cancel(&self.inner.name);
        let validity = self.inner.validities.borrow().validity();
        let (next, task) = evaluate(&self.inner.suite, &self.inner.values.borrow(), validity);
        if let Some(task) = task {
            self.schedule(task);
        }
        self.commit(next);
    }

    fn schedule(&self, task: GroupTask) {
        tracing::debug!(
            group = %self.inner.name,
            delay = ?task.delay(),
            "async validation scheduled"
        );
        let weak = Rc::downgrade(&self.inner);
        let subscription = task.subscribe(move |result| {
            if let Some(inner) = weak.upgrade() {
                GroupCore { inner }.commit_async(result);
            }
        });
        self.inner.in_flight.store(subscription);
    }

    fn commit_async(&self, result: ValidationResult<GroupValue>) {
        self.inner.in_flight.finish();
        tracing::debug!(
            group = %self.inner.name,
            validity = %result.validity,
            "async validation committed"
        );
        let mut next = self.state();
        next.validity = result.validity;
        next.messages = result.messages;
        next.validity_source = ValiditySource::Validation;
        self.commit(next);
    }

    fn commit(&self, next: GroupState) {
        tracing::trace!(
            group = %self.inner.name,
            validity = %next.validity,
            source = ?next.validity_source,
            "group commit"
        );
        self.inner.container.set_state(next);
    }
}

/// Reduction first; the group's suite only runs on a valid reduction.
fn evaluate(
    suite: &CombinedValidatorSuite<GroupValue>,
    values: &ValueReducer,
    reduced: Validity,
) -> (GroupState, Option<GroupTask>) {
    let value = values.value().clone();
    let included_member_names = values.included_names().map(str::to_string).collect();

    if !reduced.is_valid() {
        let state = GroupState {
            value,
            validity: reduced,
            messages: Vec::new(),
            validity_source: ValiditySource::Reduction,
            included_member_names,
        };
        return (state, None);
    }

    let CombinedValidationResult {
        sync_result,
        observable_result,
    } = suite.validate(&value);
    let state = GroupState {
        value: sync_result.value,
        validity: sync_result.validity,
        messages: sync_result.messages,
        validity_source: ValiditySource::Validation,
        included_member_names,
    };
    (state, observable_result)
}

fn member_view(state: &GroupState) -> MemberState {
    MemberState::new(Value::Object(state.value.clone()), state.validity, false)
}
