//! Assertion types and builders for verifying step results.

use getset::{GetSet, PropertyResult, Value};

use crate::error::{ScenarioError, ScenarioResult};
use crate::recorder::Recorder;

/// A complete assertion for a step result.
#[derive(Default)]
pub struct Assertion {
    // Notification assertions
    pub changed: Option<usize>,
    pub rejected: Option<usize>,
    pub changes: Vec<String>,
    pub rejections: Vec<String>,
    pub silent: bool,

    // State assertions (dotted path + expected value)
    pub values: Vec<(String, Value)>,

    // Error assertions
    pub error: Option<String>,
    pub error_pattern: Option<String>,

    // Custom assertion function
    #[allow(clippy::type_complexity)]
    pub custom: Option<Box<dyn Fn(&GetSet) -> bool>>,
}

impl std::fmt::Debug for Assertion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Assertion")
            .field("changed", &self.changed)
            .field("rejected", &self.rejected)
            .field("changes", &self.changes)
            .field("rejections", &self.rejections)
            .field("silent", &self.silent)
            .field("values", &self.values)
            .field("error", &self.error)
            .field("error_pattern", &self.error_pattern)
            .field("custom", &self.custom.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

impl Assertion {
    /// Create a new empty assertion.
    pub fn new() -> Self {
        Self::default()
    }

    /// Verify the assertion against a step's result and what it notified.
    pub fn verify(
        &self,
        step: &str,
        gs: &GetSet,
        recorder: &Recorder,
        result: &PropertyResult<()>,
    ) -> ScenarioResult<()> {
        // Check error expectations first
        if let Some(ref expected_error) = self.error {
            match result {
                Err(err) if err.to_string().contains(expected_error) => {}
                Err(err) => {
                    return Err(ScenarioError::assertion_failed(
                        step,
                        format!("expected error containing '{}', got: {}", expected_error, err),
                    ))
                }
                Ok(()) => {
                    return Err(ScenarioError::assertion_failed(
                        step,
                        format!(
                            "expected error containing '{}', but step succeeded",
                            expected_error
                        ),
                    ))
                }
            }
        }

        if let Some(ref pattern) = self.error_pattern {
            let re = regex_lite::Regex::new(pattern).map_err(|e| {
                ScenarioError::assertion_failed(step, format!("invalid regex pattern: {}", e))
            })?;
            match result {
                Err(err) if re.is_match(&err.to_string()) => {}
                Err(err) => {
                    return Err(ScenarioError::assertion_failed(
                        step,
                        format!("expected error matching '{}', got: {}", pattern, err),
                    ))
                }
                Ok(()) => {
                    return Err(ScenarioError::assertion_failed(
                        step,
                        format!("expected error matching '{}', but step succeeded", pattern),
                    ))
                }
            }
        }

        // An unexpected error fails the step
        if self.error.is_none() && self.error_pattern.is_none() {
            if let Err(err) = result {
                return Err(ScenarioError::assertion_failed(
                    step,
                    format!("step failed: {}", err),
                ));
            }
        }

        self.verify_notifications(step, recorder)?;
        self.verify_values(step, gs)?;

        if let Some(ref custom) = self.custom {
            if !custom(gs) {
                return Err(ScenarioError::assertion_failed(
                    step,
                    "custom assertion failed",
                ));
            }
        }

        Ok(())
    }

    fn verify_notifications(&self, step: &str, recorder: &Recorder) -> ScenarioResult<()> {
        let changed = recorder.changed_names();
        let rejected = recorder.rejected_names();

        if self.silent && (!changed.is_empty() || !rejected.is_empty()) {
            return Err(ScenarioError::assertion_failed(
                step,
                format!(
                    "expected no notifications, got changes {:?} and rejections {:?}",
                    changed, rejected
                ),
            ));
        }

        if let Some(expected) = self.changed {
            if changed.len() != expected {
                return Err(ScenarioError::assertion_failed(
                    step,
                    format!("expected {} changes, got {}: {:?}", expected, changed.len(), changed),
                ));
            }
        }

        if let Some(expected) = self.rejected {
            if rejected.len() != expected {
                return Err(ScenarioError::assertion_failed(
                    step,
                    format!(
                        "expected {} rejections, got {}: {:?}",
                        expected,
                        rejected.len(),
                        rejected
                    ),
                ));
            }
        }

        for name in &self.changes {
            if !changed.contains(name) {
                return Err(ScenarioError::assertion_failed(
                    step,
                    format!("expected change of '{}', got {:?}", name, changed),
                ));
            }
        }

        for name in &self.rejections {
            if !rejected.contains(name) {
                return Err(ScenarioError::assertion_failed(
                    step,
                    format!("expected rejection of '{}', got {:?}", name, rejected),
                ));
            }
        }

        Ok(())
    }

    fn verify_values(&self, step: &str, gs: &GetSet) -> ScenarioResult<()> {
        for (path, expected) in &self.values {
            let actual = gs.get_path(path).map_err(|e| {
                ScenarioError::assertion_failed(step, format!("cannot read '{}': {}", path, e))
            })?;
            if &actual != expected {
                return Err(ScenarioError::assertion_failed(
                    step,
                    format!("expected '{}' to be {:?}, got {:?}", path, expected, actual),
                ));
            }
        }
        Ok(())
    }
}

/// Builder for creating assertions fluently.
#[derive(Debug, Default)]
pub struct AssertionBuilder {
    assertion: Assertion,
}

impl AssertionBuilder {
    /// Create a new assertion builder.
    pub fn new() -> Self {
        Self {
            assertion: Assertion::new(),
        }
    }

    /// Build the assertion.
    pub fn build(self) -> Assertion {
        self.assertion
    }

    // ========== Notification assertions ==========

    /// Assert that exactly N change notifications reached the root.
    pub fn changed(mut self, n: usize) -> Self {
        self.assertion.changed = Some(n);
        self
    }

    /// Assert that exactly N rejection notifications reached the root.
    pub fn rejected(mut self, n: usize) -> Self {
        self.assertion.rejected = Some(n);
        self
    }

    /// Assert that a change with this dotted name was delivered.
    pub fn change(mut self, name: &str) -> Self {
        self.assertion.changes.push(name.to_string());
        self
    }

    /// Assert that a rejection with this dotted name was delivered.
    pub fn rejection(mut self, name: &str) -> Self {
        self.assertion.rejections.push(name.to_string());
        self
    }

    /// Assert that nothing was notified.
    pub fn silent(mut self) -> Self {
        self.assertion.silent = true;
        self
    }

    // ========== State assertions ==========

    /// Assert the value at a dotted path after the step.
    ///
    /// # Example
    /// ```ignore
    /// .step("rename", |gs| gs.set_path("author.name", "Ada"), |a| a.value("author.name", "Ada"))
    /// ```
    pub fn value(mut self, path: &str, expected: impl Into<Value>) -> Self {
        self.assertion.values.push((path.to_string(), expected.into()));
        self
    }

    // ========== Error assertions ==========

    /// Assert that the step failed with an error containing this message.
    pub fn error(mut self, msg: &str) -> Self {
        self.assertion.error = Some(msg.to_string());
        self
    }

    /// Assert that the step failed with an error matching this regex pattern.
    pub fn error_pattern(mut self, pattern: &str) -> Self {
        self.assertion.error_pattern = Some(pattern.to_string());
        self
    }

    /// Assert that the step succeeded. This is the default.
    pub fn ok(mut self) -> Self {
        self.assertion.error = None;
        self.assertion.error_pattern = None;
        self
    }

    /// Add a custom check over the container after the step.
    pub fn custom(mut self, check: impl Fn(&GetSet) -> bool + 'static) -> Self {
        self.assertion.custom = Some(Box::new(check));
        self
    }
}
