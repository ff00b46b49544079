use serde::{Deserialize, Serialize};

/// Subject and body templates carrying `{{Name}}` placeholders.
///
/// The body is HTML produced from the loaded document; the subject is typed
/// by the operator (or restored from a saved configuration).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub subject: String,
    pub body: String,
}
