use thiserror::Error;

use crate::ecs::component::ComponentKind;

#[derive(Error, Debug)]
pub enum LimbError {
    #[error("Entity not found: {0}")]
    EntityNotFound(crate::core::types::EntityId),

    #[error("Component {kind:?} not found for entity: {entity}")]
    ComponentNotFound {
        entity: crate::core::types::EntityId,
        kind: ComponentKind,
    },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LimbError>;
