//! Identity edits: batched property/channel operations for one subscriber.
//!
//! An edit is an ordered list of operation objects in the platform's
//! identify schema (for example `{"$set": {"name": "Ada"}}`). The SDK
//! treats operations as opaque; it validates the subscriber id, wraps the
//! operations into one identify-channel wire record, and enforces the
//! tighter identity size ceiling.

use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    config::Config,
    error::{CoreError, Result},
    limits::RecordLimits,
    record::{finalize_payload, BulkRecord, ValidatedRecord},
};

/// A batch of identity operations for one subscriber.
#[derive(Debug, Clone, Serialize)]
pub struct IdentityEdit {
    /// Id uniquely identifying the subscriber in the caller's app.
    pub distinct_id: String,
    operations: Vec<Value>,
}

impl IdentityEdit {
    /// Creates an empty edit for the given subscriber.
    pub fn new(distinct_id: impl Into<String>) -> Self {
        Self { distinct_id: distinct_id.into(), operations: Vec::new() }
    }

    /// Appends one operation object in the platform's identify schema.
    ///
    /// Operations are applied server-side in the order appended.
    pub fn push_operation(&mut self, operation: Value) {
        self.operations.push(operation);
    }

    /// Builder-style variant of [`IdentityEdit::push_operation`].
    #[must_use]
    pub fn with_operation(mut self, operation: Value) -> Self {
        self.push_operation(operation);
        self
    }

    /// Operations appended so far, in order.
    pub fn operations(&self) -> &[Value] {
        &self.operations
    }
}

impl BulkRecord for IdentityEdit {
    const LIMITS: RecordLimits = RecordLimits::IDENTITY;

    fn validated(&self, config: &Config) -> Result<ValidatedRecord> {
        let distinct_id = self.distinct_id.trim();
        if distinct_id.is_empty() {
            return Err(CoreError::invalid_input(
                "distinct_id missing: an id which uniquely identifies a user in your app",
            ));
        }

        let mut warnings = Vec::new();
        if self.operations.is_empty() {
            warnings.push(format!(
                "[distinct_id: {distinct_id}] identity edit has no operations, nothing will change"
            ));
        }

        let payload = json!({
            "$schema": "2",
            "$insert_id": Uuid::new_v4().to_string(),
            "$time": Utc::now().timestamp_millis(),
            "env": config.workspace_key,
            "distinct_id": distinct_id,
            "$user_operations": self.operations,
            "properties": {"$sdk_version": config.user_agent},
        });

        Ok(finalize_payload(payload, &Self::LIMITS)?.with_warnings(warnings))
    }

    fn as_json(&self) -> Value {
        json!({
            "distinct_id": self.distinct_id,
            "$user_operations": self.operations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            workspace_key: "ws-key".to_string(),
            workspace_secret: "ws-secret".to_string(),
            ..Config::default()
        }
    }

    #[test]
    fn operations_preserved_in_order() {
        let edit = IdentityEdit::new("user-1")
            .with_operation(json!({"$set": {"name": "Ada"}}))
            .with_operation(json!({"$append": {"$email": "ada@example.com"}}));

        let record = edit.validated(&test_config()).unwrap();
        let ops = record.payload["$user_operations"].as_array().unwrap();
        assert_eq!(ops.len(), 2);
        assert!(ops[0].get("$set").is_some());
        assert!(ops[1].get("$append").is_some());
        assert_eq!(record.payload["$schema"], "2");
        assert!(record.warnings.is_empty());
    }

    #[test]
    fn empty_edit_validates_with_warning() {
        let edit = IdentityEdit::new("user-1");
        let record = edit.validated(&test_config()).unwrap();
        assert_eq!(record.warnings.len(), 1);
        assert!(record.warnings[0].contains("no operations"));
    }

    #[test]
    fn missing_distinct_id_rejected() {
        let edit = IdentityEdit::new("  ");
        assert!(edit.validated(&test_config()).is_err());
    }

    #[test]
    fn identity_ceiling_is_tighter_than_event_ceiling() {
        // 10KiB ceiling: a 20KiB operation must be rejected here even
        // though an event of the same size would pass.
        let edit =
            IdentityEdit::new("user-1").with_operation(json!({"$set": {"blob": "x".repeat(20 * 1024)}}));
        let err = edit.validated(&test_config()).unwrap_err();
        assert!(err.to_string().contains("record too big"));
    }
}
