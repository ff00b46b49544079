use crate::engine::placeholder::{extract, token};
use common::model::dataset::DataRow;
use common::model::mapping::Mapping;

/// Substitutes every mapped placeholder in `template` with the row's value.
///
/// Entries are applied in mapping order with plain text replacement. A null
/// cell binds to `""`. Placeholders without an entry, and entries naming a
/// column the row does not have, leave their token untouched.
pub fn bind(template: &str, mapping: &Mapping, row: DataRow<'_>) -> String {
    let mut out = template.to_string();
    for (placeholder, column) in mapping.iter() {
        if !row.has_column(column) {
            continue;
        }
        out = out.replace(&token(placeholder), row.text(column));
    }
    out
}

/// Binds a subject line.
///
/// After the mapping pass, any remaining `{{Name}}` whose name is itself a
/// column of the row is resolved directly from that column.
/// Bodies get no such pass, so a body placeholder must be mapped to bind.
pub fn bind_subject(template: &str, mapping: &Mapping, row: DataRow<'_>) -> String {
    let mut subject = bind(template, mapping, row);
    for name in extract(&subject) {
        if row.has_column(&name) {
            subject = subject.replace(&token(&name), row.text(&name));
        }
    }
    subject
}
