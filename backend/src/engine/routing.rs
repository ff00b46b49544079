use common::model::dataset::DataRow;
use common::model::routing::{Recipients, RoutingConfig};

/// To address shown when no To column is selected.
pub const NO_TO_COLUMN: &str = "No Email Column Mapped!";
/// To address used when the selected column is empty for a row.
pub const EMPTY_TO: &str = "Unknown/Empty";

/// Resolves the To/CC/BCC addresses of `row`.
///
/// Never fails: an unresolved To yields one of the sentinels above, and an
/// unset or blank CC/BCC yields `""`, meaning the field is omitted.
pub fn resolve(row: DataRow<'_>, routing: &RoutingConfig) -> Recipients {
    let (to, to_resolved) = match routing.to.as_deref() {
        None => (NO_TO_COLUMN.to_string(), false),
        Some(column) => match non_blank(row, column) {
            Some(address) => (address.to_string(), true),
            None => (EMPTY_TO.to_string(), false),
        },
    };
    Recipients {
        to,
        to_resolved,
        cc: optional(row, routing.cc.as_deref()),
        bcc: optional(row, routing.bcc.as_deref()),
    }
}

fn non_blank<'a>(row: DataRow<'a>, column: &str) -> Option<&'a str> {
    row.get(column).filter(|v| !v.trim().is_empty())
}

fn optional(row: DataRow<'_>, column: Option<&str>) -> String {
    column
        .and_then(|c| non_blank(row, c))
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::model::dataset::Dataset;

    fn dataset() -> Dataset {
        Dataset::new(
            vec!["Email".into(), "CC Email".into(), "Boss".into()],
            vec![
                vec![Some("a@x.com".into()), Some("billing@x.com".into()), None],
                vec![Some("  ".into()), None, Some("boss@x.com".into())],
            ],
        )
    }

    #[test]
    fn resolves_all_three_fields() {
        let ds = dataset();
        let routing = RoutingConfig {
            to: Some("Email".into()),
            cc: Some("CC Email".into()),
            bcc: Some("Boss".into()),
        };
        let r = resolve(ds.row(0).unwrap(), &routing);
        assert_eq!(r.to, "a@x.com");
        assert!(r.to_resolved);
        assert_eq!(r.cc, "billing@x.com");
        assert_eq!(r.bcc, "");
    }

    #[test]
    fn blank_to_gets_sentinel() {
        let ds = dataset();
        let routing = RoutingConfig {
            to: Some("Email".into()),
            ..Default::default()
        };
        let r = resolve(ds.row(1).unwrap(), &routing);
        assert_eq!(r.to, EMPTY_TO);
        assert!(!r.to_resolved);
        assert_eq!(r.cc, "");
    }

    #[test]
    fn unset_to_gets_sentinel() {
        let ds = dataset();
        let r = resolve(ds.row(0).unwrap(), &RoutingConfig::default());
        assert_eq!(r.to, NO_TO_COLUMN);
        assert!(!r.to_resolved);
    }

    #[test]
    fn column_missing_from_dataset_reads_as_empty() {
        let ds = dataset();
        let routing = RoutingConfig {
            to: Some("Mail".into()),
            cc: Some("Gone".into()),
            bcc: None,
        };
        let r = resolve(ds.row(0).unwrap(), &routing);
        assert_eq!(r.to, EMPTY_TO);
        assert_eq!(r.cc, "");
    }
}
