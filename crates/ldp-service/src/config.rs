use serde::{Deserialize, Serialize};

use ldp_types::vocab::trellis;
use ldp_types::NamedNode;

use crate::error::ConfigError;

/// Runtime configuration of a [`crate::ResourceService`].
///
/// Every field has a default, so a TOML document only needs the keys it
/// changes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Agent recorded in audit activities when the caller names none.
    pub default_agent: String,
    /// Record PROV activities for every mutation.
    pub audit_enabled: bool,
    /// Deleting a container deletes everything beneath it. When `false`,
    /// deleting a non-empty container is a conflict.
    pub recursive_delete: bool,
    /// Idle per-identifier locks are pruned once the table reaches this size.
    pub lock_prune_threshold: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            default_agent: trellis::ANONYMOUS_AGENT.to_string(),
            audit_enabled: true,
            recursive_delete: true,
            lock_prune_threshold: 1024,
        }
    }
}

impl ServiceConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.default_agent()?;
        if self.lock_prune_threshold == 0 {
            return Err(ConfigError::InvalidPruneThreshold);
        }
        Ok(())
    }

    /// The default agent as an IRI.
    pub fn default_agent(&self) -> Result<NamedNode, ConfigError> {
        NamedNode::new(self.default_agent.clone()).map_err(|e| ConfigError::InvalidAgent {
            iri: self.default_agent.clone(),
            reason: e.to_string(),
        })
    }
}
