use serde::{Deserialize, Serialize};

/// One row rendered for display: bound templates, routing, and position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedRecord {
    pub subject: String,
    pub body: String,
    pub to: String,
    pub cc: String,
    pub bcc: String,
    /// 1-based position of the record.
    pub position: usize,
    pub total: usize,
}

impl RenderedRecord {
    /// "Record: N/M" label.
    pub fn label(&self) -> String {
        format!("Record: {}/{}", self.position, self.total)
    }

    /// Header block with the routing and subject, followed by the body.
    pub fn to_html(&self) -> String {
        let cc = if self.cc.is_empty() {
            String::new()
        } else {
            format!("<strong>CC:</strong> {}<br>", self.cc)
        };
        let bcc = if self.bcc.is_empty() {
            String::new()
        } else {
            format!("<strong>BCC:</strong> {}<br>", self.bcc)
        };
        format!(
            "<div style='font-family: Arial, sans-serif; margin-bottom: 20px; \
             border-bottom: 2px solid #ccc; padding-bottom: 10px;'>\
             <strong>TO:</strong> {}<br>{cc}{bcc}<strong>SUBJECT:</strong> {}</div>{}",
            self.to, self.subject, self.body
        )
    }
}
