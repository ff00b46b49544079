use serde::{Deserialize, Serialize};

/// Literal used by the persisted configuration for an unset column.
pub const NONE_COLUMN: &str = "-- None --";

/// Columns supplying the To/CC/BCC addresses of each message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingConfig {
    pub to: Option<String>,
    pub cc: Option<String>,
    pub bcc: Option<String>,
}

impl RoutingConfig {
    /// Reads a persisted column reference; the none sentinel and blanks unset it.
    pub fn column_from_persisted(value: &str) -> Option<String> {
        match value.trim() {
            "" | NONE_COLUMN => None,
            _ => Some(value.to_string()),
        }
    }

    pub fn column_to_persisted(column: Option<&str>) -> String {
        column.unwrap_or(NONE_COLUMN).to_string()
    }
}

/// Addresses resolved for one row. Empty `cc`/`bcc` means the field is omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipients {
    pub to: String,
    pub to_resolved: bool,
    pub cc: String,
    pub bcc: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_sentinel_round_trips() {
        assert_eq!(RoutingConfig::column_from_persisted(NONE_COLUMN), None);
        assert_eq!(RoutingConfig::column_from_persisted(""), None);
        assert_eq!(
            RoutingConfig::column_from_persisted("Email"),
            Some("Email".to_string())
        );
        assert_eq!(RoutingConfig::column_to_persisted(None), NONE_COLUMN);
        assert_eq!(RoutingConfig::column_to_persisted(Some("CC")), "CC");
    }
}
