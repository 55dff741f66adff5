//! Replication payloads for dirty components

use serde::{Deserialize, Serialize};

use crate::core::types::EntityId;
use crate::ecs::component::ComponentKind;

/// Snapshot of one changed component, ready to send to observers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentDelta {
    pub entity: EntityId,
    pub kind: ComponentKind,
    pub payload: serde_json::Value,
}

impl ComponentDelta {
    /// Encode for the wire
    pub fn to_json(&self) -> crate::core::error::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
