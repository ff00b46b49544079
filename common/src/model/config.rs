use crate::model::mapping::Mapping;
use crate::model::routing::{RoutingConfig, NONE_COLUMN};
use serde::{Deserialize, Serialize};

/// Flat, persisted form of the operator's merge settings.
///
/// This is the JSON document written by "save config" and read back by
/// "load config". Column references are stored verbatim, including ones the
/// current dataset does not have; unset routing columns hold `"-- None --"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    pub mapping: Mapping,
    pub subject: String,
    pub to: String,
    pub cc: String,
    pub bcc: String,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            mapping: Mapping::new(),
            subject: String::new(),
            to: NONE_COLUMN.to_string(),
            cc: NONE_COLUMN.to_string(),
            bcc: NONE_COLUMN.to_string(),
        }
    }
}

impl MergeConfig {
    pub fn from_parts(mapping: &Mapping, subject: &str, routing: &RoutingConfig) -> Self {
        Self {
            mapping: mapping.clone(),
            subject: subject.to_string(),
            to: RoutingConfig::column_to_persisted(routing.to.as_deref()),
            cc: RoutingConfig::column_to_persisted(routing.cc.as_deref()),
            bcc: RoutingConfig::column_to_persisted(routing.bcc.as_deref()),
        }
    }

    pub fn routing(&self) -> RoutingConfig {
        RoutingConfig {
            to: RoutingConfig::column_from_persisted(&self.to),
            cc: RoutingConfig::column_from_persisted(&self.cc),
            bcc: RoutingConfig::column_from_persisted(&self.bcc),
        }
    }
}
