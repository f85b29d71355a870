//! Recording of per-field drift decisions
//!
//! Reconciliation reports every field it decides to update through a
//! [`DriftRecorder`] supplied by the caller. Controllers log the decisions,
//! tests and the CLI collect them.
//!
//! Recording is infallible: a value that fails to serialize is recorded as
//! `null` and never interrupts reconciliation.

use serde::Serialize;
use serde_json::Value;
use tracing::info;

/// Receives one call per field that requires an update
pub trait DriftRecorder {
    /// Record that `field` changes from `from` (observed) to `to` (desired)
    fn record(&mut self, field: &str, from: &Value, to: &Value);
}

/// Serialize both sides of a change and hand them to the recorder
pub fn record_change<T: Serialize + ?Sized>(
    recorder: &mut dyn DriftRecorder,
    field: &str,
    from: &T,
    to: &T,
) {
    let from = serde_json::to_value(from).unwrap_or(Value::Null);
    let to = serde_json::to_value(to).unwrap_or(Value::Null);
    recorder.record(field, &from, &to);
}

/// Logs each change through `tracing`
pub struct TracingRecorder {
    kind: &'static str,
}

impl TracingRecorder {
    /// Create a recorder that tags every line with the given resource kind
    pub fn new(kind: &'static str) -> Self {
        Self { kind }
    }
}

impl Default for TracingRecorder {
    fn default() -> Self {
        Self::new("zookeeperCluster")
    }
}

impl DriftRecorder for TracingRecorder {
    fn record(&mut self, field: &str, from: &Value, to: &Value) {
        info!(
            kind = self.kind,
            field,
            from = %from,
            to = %to,
            "update required because field changed"
        );
    }
}

/// A single recorded change
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FieldChange {
    /// Path of the field, e.g. `spec.image.tag`
    pub field: String,
    /// Observed value
    pub from: Value,
    /// Desired value
    pub to: Value,
}

/// Collects changes in the order they were decided
#[derive(Clone, Debug, Default)]
pub struct ChangeLog {
    changes: Vec<FieldChange>,
}

impl ChangeLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded changes
    pub fn changes(&self) -> &[FieldChange] {
        &self.changes
    }

    /// Paths of the recorded fields, in order
    pub fn fields(&self) -> Vec<&str> {
        self.changes.iter().map(|c| c.field.as_str()).collect()
    }

    /// Whether `field` was recorded
    pub fn contains(&self, field: &str) -> bool {
        self.changes.iter().any(|c| c.field == field)
    }

    /// True if nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Consume the log
    pub fn into_changes(self) -> Vec<FieldChange> {
        self.changes
    }
}

impl DriftRecorder for ChangeLog {
    fn record(&mut self, field: &str, from: &Value, to: &Value) {
        self.changes.push(FieldChange {
            field: field.to_string(),
            from: from.clone(),
            to: to.clone(),
        });
    }
}

/// Discards every change
pub struct NoopRecorder;

impl DriftRecorder for NoopRecorder {
    fn record(&mut self, _field: &str, _from: &Value, _to: &Value) {}
}
