//! Tracked events destined for the platform's `event/` ingestion API.

use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::{
    config::Config,
    error::{CoreError, Result},
    limits::RecordLimits,
    record::{finalize_payload, BulkRecord, ValidatedRecord},
};

/// Event names the platform itself emits; these bypass the reserved-prefix
/// check so internal SDK integrations can replay them.
pub const RESERVED_EVENT_NAMES: &[&str] = &[
    "$identify",
    "$notification_delivered",
    "$notification_dismiss",
    "$notification_clicked",
    "$app_launched",
    "$user_login",
    "$user_logout",
];

/// A tracked event for one subscriber.
///
/// Construction is infallible; all field validation happens when the bulk
/// pipeline (or a single-send caller) requests the final wire payload, so
/// an invalid event can still be appended to a batch and reported in the
/// aggregate response.
#[derive(Debug, Clone, Serialize)]
pub struct Event {
    /// Id uniquely identifying the subscriber in the caller's app.
    pub distinct_id: String,
    /// Event name. Names starting with `$` or `ss_` are reserved.
    pub event_name: String,
    /// Free-form event properties.
    pub properties: Map<String, Value>,
    /// Opaque caller-supplied token enabling server-side dedup on retry.
    pub idempotency_key: Option<String>,
    /// Tenant to attribute the event to.
    pub tenant_id: Option<String>,
}

impl Event {
    /// Creates an event with the given subscriber id and name.
    pub fn new(distinct_id: impl Into<String>, event_name: impl Into<String>) -> Self {
        Self {
            distinct_id: distinct_id.into(),
            event_name: event_name.into(),
            properties: Map::new(),
            idempotency_key: None,
            tenant_id: None,
        }
    }

    /// Sets one event property.
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    /// Replaces all event properties.
    #[must_use]
    pub fn with_properties(mut self, properties: Map<String, Value>) -> Self {
        self.properties = properties;
        self
    }

    /// Sets the idempotency key carried in the wire payload.
    #[must_use]
    pub fn with_idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }

    /// Sets the tenant the event is attributed to.
    #[must_use]
    pub fn with_tenant_id(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    fn validated_name(&self) -> Result<&str> {
        let name = self.event_name.trim();
        if name.is_empty() {
            return Err(CoreError::invalid_input("event_name missing"));
        }
        if !RESERVED_EVENT_NAMES.contains(&name) && has_reserved_prefix(name) {
            return Err(CoreError::invalid_input(
                "event names starting with [$, ss_] are reserved by the platform",
            ));
        }
        Ok(name)
    }
}

impl BulkRecord for Event {
    const LIMITS: RecordLimits = RecordLimits::EVENT;

    fn validated(&self, config: &Config) -> Result<ValidatedRecord> {
        let distinct_id = self.distinct_id.trim();
        if distinct_id.is_empty() {
            return Err(CoreError::invalid_input(
                "distinct_id missing: an id which uniquely identifies a user in your app",
            ));
        }
        let name = self.validated_name()?;

        let mut properties = self.properties.clone();
        properties.insert("$sdk_version".to_string(), Value::String(config.user_agent.clone()));

        let mut payload = json!({
            "$insert_id": Uuid::new_v4().to_string(),
            "$time": Utc::now().timestamp_millis(),
            "event": name,
            "env": config.workspace_key,
            "distinct_id": distinct_id,
            "properties": properties,
        });
        if let Some(key) = &self.idempotency_key {
            payload["$idempotency_key"] = Value::String(key.clone());
        }
        if let Some(tenant_id) = &self.tenant_id {
            payload["tenant_id"] = Value::String(tenant_id.clone());
        }

        finalize_payload(payload, &Self::LIMITS)
    }

    fn as_json(&self) -> Value {
        json!({
            "event": self.event_name,
            "distinct_id": self.distinct_id,
            "properties": self.properties,
        })
    }
}

/// Reserved prefixes are `$` and case-insensitive `ss_`.
fn has_reserved_prefix(name: &str) -> bool {
    name.starts_with('$') || name.to_lowercase().starts_with("ss_")
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
    fn valid_event_produces_wire_payload() {
        let event = Event::new("user-1", "order_shipped")
            .with_property("order_id", json!("ord-42"))
            .with_idempotency_key("idem-1");
        let record = event.validated(&test_config()).unwrap();

        assert_eq!(record.payload["event"], "order_shipped");
        assert_eq!(record.payload["distinct_id"], "user-1");
        assert_eq!(record.payload["env"], "ws-key");
        assert_eq!(record.payload["$idempotency_key"], "idem-1");
        assert_eq!(record.payload["properties"]["order_id"], "ord-42");
        assert!(record.payload["properties"]["$sdk_version"].is_string());
        assert!(record.payload.get("$insert_id").is_some());
        assert!(record.apparent_size_bytes > 200);
    }

    #[test]
    fn missing_distinct_id_rejected() {
        let event = Event::new("   ", "order_shipped");
        let err = event.validated(&test_config()).unwrap_err();
        assert!(err.to_string().contains("distinct_id missing"));
    }

    #[test]
    fn reserved_prefix_rejected() {
        for name in ["$custom", "ss_internal", "SS_internal"] {
            let event = Event::new("user-1", name);
            assert!(event.validated(&test_config()).is_err(), "{name} should be rejected");
        }
    }

    #[test]
    fn allowlisted_reserved_names_accepted() {
        let event = Event::new("user-1", "$user_login");
        assert!(event.validated(&test_config()).is_ok());
    }

    #[test]
    fn oversized_properties_rejected() {
        let event =
            Event::new("user-1", "big").with_property("blob", json!("x".repeat(101 * 1024)));
        let err = event.validated(&test_config()).unwrap_err();
        assert!(err.to_string().contains("record too big"));
    }

    #[test]
    fn as_json_works_for_invalid_event() {
        let event = Event::new("", "order_shipped");
        let json = event.as_json();
        assert_eq!(json["event"], "order_shipped");
        assert_eq!(json["distinct_id"], "");
    }
}
