//! Workflow triggers destined for the platform's `trigger/` API.

use serde::Serialize;
use serde_json::Value;

use crate::{
    config::Config,
    error::{CoreError, Result},
    limits::RecordLimits,
    record::{finalize_payload, BulkRecord, ValidatedRecord},
};

/// A request to run one platform workflow for a set of recipients.
///
/// The body is caller-constructed JSON matching the platform's workflow
/// trigger schema; the SDK only enforces that it is an object naming a
/// workflow, injects the optional control keys, and sizes it for packing.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowTrigger {
    /// Workflow trigger body as accepted by the platform API.
    pub body: Value,
    /// Opaque caller-supplied token enabling server-side dedup on retry.
    pub idempotency_key: Option<String>,
    /// Tenant to run the workflow under.
    pub tenant_id: Option<String>,
    /// Key that later cancellation requests can reference.
    pub cancellation_key: Option<String>,
}

impl WorkflowTrigger {
    /// Creates a workflow trigger from a caller-constructed body.
    pub fn new(body: Value) -> Self {
        Self { body, idempotency_key: None, tenant_id: None, cancellation_key: None }
    }

    /// Sets the idempotency key injected into the body.
    #[must_use]
    pub fn with_idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }

    /// Sets the tenant the workflow runs under.
    #[must_use]
    pub fn with_tenant_id(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    /// Sets the cancellation key injected into the body.
    #[must_use]
    pub fn with_cancellation_key(mut self, key: impl Into<String>) -> Self {
        self.cancellation_key = Some(key.into());
        self
    }

    /// Body with control keys injected, shared by validation and error
    /// reporting.
    fn body_with_control_keys(&self) -> Value {
        let mut body = self.body.clone();
        if let Some(obj) = body.as_object_mut() {
            if let Some(key) = &self.idempotency_key {
                obj.insert("$idempotency_key".to_string(), Value::String(key.clone()));
            }
            if let Some(tenant_id) = &self.tenant_id {
                obj.insert("tenant_id".to_string(), Value::String(tenant_id.clone()));
            }
            if let Some(key) = &self.cancellation_key {
                obj.insert("cancellation_key".to_string(), Value::String(key.clone()));
            }
        }
        body
    }
}

impl BulkRecord for WorkflowTrigger {
    const LIMITS: RecordLimits = RecordLimits::WORKFLOW;

    fn validated(&self, _config: &Config) -> Result<ValidatedRecord> {
        if !self.body.is_object() {
            return Err(CoreError::invalid_input("workflow trigger body must be a JSON object"));
        }
        let workflow_name = self.body.get("workflow").and_then(Value::as_str).unwrap_or("");
        if workflow_name.trim().is_empty() {
            return Err(CoreError::invalid_input(
                "workflow trigger body must carry a non-empty 'workflow' name",
            ));
        }

        finalize_payload(self.body_with_control_keys(), &Self::LIMITS)
    }

    fn as_json(&self) -> Value {
        self.body_with_control_keys()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn test_config() -> Config {
        Config {
            workspace_key: "ws-key".to_string(),
            workspace_secret: "ws-secret".to_string(),
            ..Config::default()
        }
    }

    #[test]
    fn control_keys_injected_into_body() {
        let trigger = WorkflowTrigger::new(json!({
            "workflow": "welcome-drip",
            "recipients": ["user-1"],
        }))
        .with_idempotency_key("idem-9")
        .with_tenant_id("acme")
        .with_cancellation_key("cancel-9");

        let record = trigger.validated(&test_config()).unwrap();
        assert_eq!(record.payload["workflow"], "welcome-drip");
        assert_eq!(record.payload["$idempotency_key"], "idem-9");
        assert_eq!(record.payload["tenant_id"], "acme");
        assert_eq!(record.payload["cancellation_key"], "cancel-9");
    }

    #[test]
    fn non_object_body_rejected() {
        let trigger = WorkflowTrigger::new(json!(["not", "an", "object"]));
        assert!(trigger.validated(&test_config()).is_err());
    }

    #[test]
    fn missing_workflow_name_rejected() {
        let trigger = WorkflowTrigger::new(json!({"recipients": ["user-1"]}));
        let err = trigger.validated(&test_config()).unwrap_err();
        assert!(err.to_string().contains("workflow"));
    }

    #[test]
    fn oversized_body_rejected() {
        let trigger = WorkflowTrigger::new(json!({
            "workflow": "big",
            "data": {"blob": "x".repeat(101 * 1024)},
        }));
        let err = trigger.validated(&test_config()).unwrap_err();
        assert!(err.to_string().contains("record too big"));
    }

    #[test]
    fn as_json_reports_body_even_when_invalid() {
        let trigger = WorkflowTrigger::new(json!({"recipients": []})).with_tenant_id("acme");
        let json = trigger.as_json();
        assert_eq!(json["tenant_id"], "acme");
    }
}
