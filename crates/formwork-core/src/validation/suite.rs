//! Validator suites.
//!
//! [`CombinedValidatorSuite`] is the pipeline every validating node runs:
//! sync validators first, then (only if they all pass) async validators on a
//! delayed, cancelable task.

use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use futures::future::join_all;

use super::templates::{AsyncValidatorTemplate, ValidatorTemplate};
use super::validator::{AsyncValidator, Validator};
use crate::errors::Result;
use crate::task::{delay_from_millis, CancelableDelayedTask};
use crate::validity::{Message, Validity};

/// A value together with the verdict reached for it.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult<V> {
    pub value: V,
    pub validity: Validity,
    pub messages: Vec<Message>,
}

/// Validators and async settings for one node.
pub struct SuiteConfig<V> {
    pub validators: Vec<Validator<V>>,
    pub validator_templates: Vec<Box<dyn ValidatorTemplate<V>>>,
    pub async_validators: Vec<AsyncValidator<V>>,
    pub async_validator_templates: Vec<Box<dyn AsyncValidatorTemplate<V>>>,
    /// Message shown while async validators run
    pub pending_message: Option<String>,
    /// Debounce before async validators start, in milliseconds
    pub delay_async_validator_execution: Option<i64>,
}

impl<V> SuiteConfig<V> {
    pub fn new() -> Self {
        Self {
            validators: Vec::new(),
            validator_templates: Vec::new(),
            async_validators: Vec::new(),
            async_validator_templates: Vec::new(),
            pending_message: None,
            delay_async_validator_execution: None,
        }
    }

    #[must_use]
    pub fn with_validator(mut self, validator: Validator<V>) -> Self {
        self.validators.push(validator);
        self
    }

    #[must_use]
    pub fn with_validator_template(mut self, template: impl ValidatorTemplate<V> + 'static) -> Self {
        self.validator_templates.push(Box::new(template));
        self
    }

    #[must_use]
    pub fn with_async_validator(mut self, validator: AsyncValidator<V>) -> Self {
        self.async_validators.push(validator);
        self
    }

    #[must_use]
    pub fn with_async_validator_template(
        mut self,
        template: impl AsyncValidatorTemplate<V> + 'static,
    ) -> Self {
        self.async_validator_templates.push(Box::new(template));
        self
    }

    #[must_use]
    pub fn with_pending_message(mut self, message: impl Into<String>) -> Self {
        self.pending_message = Some(message.into());
        self
    }

    #[must_use]
    pub fn with_async_delay_ms(mut self, delay_ms: i64) -> Self {
        self.delay_async_validator_execution = Some(delay_ms);
        self
    }

    pub fn has_async_validators(&self) -> bool {
        !self.async_validators.is_empty() || !self.async_validator_templates.is_empty()
    }
}

impl<V> Default for SuiteConfig<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> fmt::Debug for SuiteConfig<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SuiteConfig")
            .field("validators", &self.validators.len())
            .field("validator_templates", &self.validator_templates.len())
            .field("async_validators", &self.async_validators.len())
            .field(
                "async_validator_templates",
                &self.async_validator_templates.len(),
            )
            .field("pending_message", &self.pending_message)
            .field(
                "delay_async_validator_execution",
                &self.delay_async_validator_execution,
            )
            .finish()
    }
}

/// Runs synchronous validators in order.
#[derive(Debug)]
pub struct ValidatorSuite<V> {
    validators: Vec<Validator<V>>,
}

impl<V: Clone + 'static> ValidatorSuite<V> {
    pub fn new(validators: Vec<Validator<V>>) -> Self {
        Self { validators }
    }

    /// Invalid if any validator fails, Valid otherwise. Every validator runs
    /// and contributes its message, if it has one for its outcome.
    pub fn validate(&self, value: &V) -> ValidationResult<V> {
        let mut validity = Validity::Valid;
        let mut messages = Vec::new();
        for validator in &self.validators {
            let result = validator.validate(value);
            validity = validity.combine(result.validity);
            messages.extend(result.message);
        }
        ValidationResult {
            value: value.clone(),
            validity,
            messages,
        }
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}

/// Runs async validators concurrently on a delayed task.
pub struct AsyncValidatorSuite<V> {
    validators: Rc<[AsyncValidator<V>]>,
    delay: Duration,
}

impl<V: Clone + 'static> AsyncValidatorSuite<V> {
    pub fn new(validators: Vec<AsyncValidator<V>>, delay: Duration) -> Self {
        Self {
            validators: validators.into(),
            delay,
        }
    }

    /// Build the task that validates `value` once started.
    ///
    /// The emitted messages are `sync_messages` (minus any pending message)
    /// followed by the async validators' messages in declaration order.
    pub fn schedule(
        &self,
        value: V,
        sync_messages: Vec<Message>,
    ) -> CancelableDelayedTask<ValidationResult<V>> {
        let validators = Rc::clone(&self.validators);
        CancelableDelayedTask::new(
            move || async move {
                let results = join_all(validators.iter().map(|v| v.validate(value.clone()))).await;

                let mut validity = Validity::Valid;
                let mut messages: Vec<Message> = sync_messages
                    .into_iter()
                    .filter(|message| !message.validity.is_pending())
                    .collect();
                for result in results {
                    validity = validity.combine(result.validity);
                    messages.extend(result.message);
                }
                ValidationResult {
                    value,
                    validity,
                    messages,
                }
            },
            self.delay,
        )
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}

impl<V> fmt::Debug for AsyncValidatorSuite<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncValidatorSuite")
            .field("validators", &self.validators.len())
            .field("delay", &self.delay)
            .finish()
    }
}

/// Output of [`CombinedValidatorSuite::validate`].
pub struct CombinedValidationResult<V> {
    /// Verdict available immediately
    pub sync_result: ValidationResult<V>,
    /// The async pass, present only when the sync pass succeeded and async
    /// validators are configured
    pub observable_result: Option<CancelableDelayedTask<ValidationResult<V>>>,
}

impl<V: fmt::Debug> fmt::Debug for CombinedValidationResult<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CombinedValidationResult")
            .field("sync_result", &self.sync_result)
            .field("observable_result", &self.observable_result)
            .finish()
    }
}

/// Sync validators followed by debounced async validators.
pub struct CombinedValidatorSuite<V> {
    sync: ValidatorSuite<V>,
    async_suite: Option<AsyncValidatorSuite<V>>,
    pending_message: Option<String>,
}

impl<V: Clone + 'static> CombinedValidatorSuite<V> {
    /// Instantiate every template and fix the async delay.
    ///
    /// Fails with [`crate::ConfigError::NegativeDelay`] for a negative delay.
    pub fn new(config: SuiteConfig<V>) -> Result<Self> {
        let delay = delay_from_millis(config.delay_async_validator_execution.unwrap_or(0))?;

        let mut validators = config.validators;
        validators.extend(config.validator_templates.iter().map(|t| t.instantiate()));

        let mut async_validators = config.async_validators;
        async_validators.extend(
            config
                .async_validator_templates
                .iter()
                .map(|t| t.instantiate()),
        );

        let async_suite = if async_validators.is_empty() {
            None
        } else {
            Some(AsyncValidatorSuite::new(async_validators, delay))
        };

        Ok(Self {
            sync: ValidatorSuite::new(validators),
            async_suite,
            pending_message: config.pending_message,
        })
    }

    /// A suite that accepts every value.
    pub fn empty() -> Self {
        Self {
            sync: ValidatorSuite::new(Vec::new()),
            async_suite: None,
            pending_message: None,
        }
    }

    pub fn validate(&self, value: &V) -> CombinedValidationResult<V> {
        let sync_result = self.sync.validate(value);
        if sync_result.validity.is_invalid() {
            return CombinedValidationResult {
                sync_result,
                observable_result: None,
            };
        }

        let Some(async_suite) = &self.async_suite else {
            return CombinedValidationResult {
                sync_result,
                observable_result: None,
            };
        };

        let task = async_suite.schedule(value.clone(), sync_result.messages.clone());
        let mut messages = sync_result.messages;
        if let Some(pending) = &self.pending_message {
            messages.push(Message::pending(pending.clone()));
        }
        CombinedValidationResult {
            sync_result: ValidationResult {
                value: sync_result.value,
                validity: Validity::Pending,
                messages,
            },
            observable_result: Some(task),
        }
    }

    pub fn has_async_validators(&self) -> bool {
        self.async_suite.is_some()
    }
}

impl<V> fmt::Debug for CombinedValidatorSuite<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CombinedValidatorSuite")
            .field("sync", &self.sync.validators.len())
            .field("async_suite", &self.async_suite)
            .field("pending_message", &self.pending_message)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ConfigError;
    use crate::validation::templates::MinLength;
    use std::cell::RefCell;
    use tokio::task::LocalSet;

    fn required() -> Validator<String> {
        Validator::new(|v: &String| !v.is_empty()).with_invalid_message("required")
    }

    fn uppercase() -> AsyncValidator<String> {
        AsyncValidator::new(|v: String| async move { v.chars().any(char::is_uppercase) })
            .with_invalid_message("needs an uppercase letter")
    }

    #[test]
    fn test_negative_delay_fails_fast() {
        let config = SuiteConfig::<String>::new()
            .with_async_validator(uppercase())
            .with_async_delay_ms(-10);
        assert_eq!(
            CombinedValidatorSuite::new(config).err().map(|e| e.to_string()),
            Some(ConfigError::negative_delay(-10).to_string())
        );
    }

    #[test]
    fn test_sync_failure_skips_async() {
        let suite = CombinedValidatorSuite::new(
            SuiteConfig::new()
                .with_validator(required())
                .with_async_validator(uppercase()),
        )
        .unwrap();

        let result = suite.validate(&String::new());
        assert_eq!(result.sync_result.validity, Validity::Invalid);
        assert_eq!(result.sync_result.messages, vec![Message::invalid("required")]);
        assert!(result.observable_result.is_none());
    }

    #[test]
    fn test_sync_only_pass_is_valid() {
        let suite = CombinedValidatorSuite::new(
            SuiteConfig::new()
                .with_validator(required())
                .with_validator_template(MinLength::new(2, "too short")),
        )
        .unwrap();

        let result = suite.validate(&"ab".to_string());
        assert_eq!(result.sync_result.validity, Validity::Valid);
        assert!(result.sync_result.messages.is_empty());
        assert!(result.observable_result.is_none());

        let result = suite.validate(&"a".to_string());
        assert_eq!(result.sync_result.messages, vec![Message::invalid("too short")]);
    }

    #[test]
    fn test_pending_message_appended() {
        let suite = CombinedValidatorSuite::new(
            SuiteConfig::new()
                .with_validator(required().with_valid_message("present"))
                .with_async_validator(uppercase())
                .with_pending_message("checking"),
        )
        .unwrap();

        let result = suite.validate(&"abc".to_string());
        assert_eq!(result.sync_result.validity, Validity::Pending);
        assert_eq!(
            result.sync_result.messages,
            vec![Message::valid("present"), Message::pending("checking")]
        );
        assert!(result.observable_result.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_async_pass_replaces_pending_message() {
        LocalSet::new()
            .run_until(async {
                let suite = CombinedValidatorSuite::new(
                    SuiteConfig::new()
                        .with_validator(required().with_valid_message("present"))
                        .with_async_validator(uppercase())
                        .with_pending_message("checking")
                        .with_async_delay_ms(200),
                )
                .unwrap();

                let received = Rc::new(RefCell::new(None));
                let sink = Rc::clone(&received);
                let task = suite.validate(&"abc".to_string()).observable_result.unwrap();
                assert_eq!(task.delay(), Duration::from_millis(200));
                let _sub = task.subscribe(move |result| *sink.borrow_mut() = Some(result));

                tokio::time::sleep(Duration::from_millis(250)).await;
                assert_eq!(
                    received.borrow_mut().take(),
                    Some(ValidationResult {
                        value: "abc".to_string(),
                        validity: Validity::Invalid,
                        messages: vec![
                            Message::valid("present"),
                            Message::invalid("needs an uppercase letter"),
                        ],
                    })
                );
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_async_validators_run_concurrently() {
        LocalSet::new()
            .run_until(async {
                let slow = |ms: u64| {
                    AsyncValidator::new(move |_: u32| async move {
                        tokio::time::sleep(Duration::from_millis(ms)).await;
                        true
                    })
                };
                let suite = AsyncValidatorSuite::new(vec![slow(100), slow(100)], Duration::ZERO);

                let received = Rc::new(RefCell::new(None));
                let sink = Rc::clone(&received);
                let _sub = suite
                    .schedule(1, Vec::new())
                    .subscribe(move |result| *sink.borrow_mut() = Some(result.validity));

                tokio::time::sleep(Duration::from_millis(150)).await;
                assert_eq!(*received.borrow(), Some(Validity::Valid));
            })
            .await;
    }
}
