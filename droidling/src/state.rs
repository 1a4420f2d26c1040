//! What survives the widget being destroyed and recreated

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Only rotation persists. Translation, freeform and animation state start over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedState {
    pub rotation: f64,
    /// Whatever the host's own state was; handed back untouched on restore
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<Value>,
}

impl SavedState {
    pub fn new(rotation: f64) -> Self {
        Self {
            rotation,
            parent: None,
        }
    }

    pub fn to_json(&self) -> Value {
        // A struct of a float and an optional Value always serializes
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// None for anything that isn't a saved state; the caller carries on with defaults
    pub fn from_json(value: &Value) -> Option<Self> {
        match serde_json::from_value::<SavedState>(value.clone()) {
            Ok(state) if state.rotation.is_finite() => Some(state),
            Ok(state) => {
                debug!("Ignoring saved state with rotation {}", state.rotation);
                None
            }
            Err(e) => {
                debug!("Ignoring unrecognized saved state: {e}");
                None
            }
        }
    }
}
