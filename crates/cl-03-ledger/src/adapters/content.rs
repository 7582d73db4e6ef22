//! # Content Policy
//!
//! Default `DataValidator`: size, nesting and forbidden-key limits from
//! [`ContentPolicy`], plus string clean-up.

use crate::domain::config::ContentPolicy;
use crate::ports::outbound::DataValidator;
use serde_json::Value;
use shared_types::Payload;

/// Enforces a [`ContentPolicy`] on Page payloads.
#[derive(Debug, Clone, Default)]
pub struct PolicyDataValidator {
    policy: ContentPolicy,
}

impl PolicyDataValidator {
    pub fn new(policy: ContentPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ContentPolicy {
        &self.policy
    }

    fn forbidden_key<'a>(&self, value: &'a Value) -> Option<&'a str> {
        match value {
            Value::Object(map) => map.iter().find_map(|(key, nested)| {
                if self.policy.forbidden_keys.iter().any(|f| f.eq_ignore_ascii_case(key)) {
                    Some(key.as_str())
                } else {
                    self.forbidden_key(nested)
                }
            }),
            Value::Array(items) => items.iter().find_map(|item| self.forbidden_key(item)),
            _ => None,
        }
    }
}

impl DataValidator for PolicyDataValidator {
    fn validate(&self, payload: &Payload) -> Result<(), String> {
        let root = Value::Object(payload.clone());

        let size = serde_json::to_vec(&root).map_err(|e| e.to_string())?.len();
        if size > self.policy.max_payload_bytes {
            return Err(format!(
                "payload is {} bytes, limit is {}",
                size, self.policy.max_payload_bytes
            ));
        }

        let depth = depth(&root);
        if depth > self.policy.max_depth {
            return Err(format!(
                "payload nests {} levels deep, limit is {}",
                depth, self.policy.max_depth
            ));
        }

        if let Some(key) = self.forbidden_key(&root) {
            return Err(format!("field {:?} may not be stored on the ledger", key));
        }
        Ok(())
    }

    fn sanitize(&self, payload: Payload) -> Payload {
        payload
            .into_iter()
            .map(|(key, value)| (key, clean(value)))
            .collect()
    }
}

fn depth(value: &Value) -> usize {
    match value {
        Value::Object(map) => 1 + map.values().map(depth).max().unwrap_or(0),
        Value::Array(items) => 1 + items.iter().map(depth).max().unwrap_or(0),
        _ => 0,
    }
}

/// Trim strings and drop control characters other than newline and tab.
fn clean(value: Value) -> Value {
    match value {
        Value::String(text) => Value::String(
            text.trim()
                .chars()
                .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(clean).collect()),
        Value::Object(map) => Value::Object(map.into_iter().map(|(k, v)| (k, clean(v))).collect()),
        other => other,
    }
}
