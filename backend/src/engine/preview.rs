use crate::engine::binder::{bind, bind_subject};
use crate::engine::routing::resolve;
use common::model::dataset::Dataset;
use common::model::mapping::Mapping;
use common::model::preview::RenderedRecord;
use common::model::routing::RoutingConfig;
use common::model::template::Template;

/// Zero-based position of the record being previewed.
///
/// Every movement saturates at `[0, len - 1]`; nothing here errors on an
/// out-of-range request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreviewCursor {
    index: usize,
}

impl PreviewCursor {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn advance(&mut self, step: isize, len: usize) -> usize {
        let target = if step.is_negative() {
            self.index.saturating_sub(step.unsigned_abs())
        } else {
            self.index.saturating_add(step.unsigned_abs())
        };
        self.jump_to(target, len)
    }

    pub fn jump_to(&mut self, index: usize, len: usize) -> usize {
        self.index = index.min(len.saturating_sub(1));
        self.index
    }

    pub fn reset(&mut self) {
        self.index = 0;
    }
}

/// Renders the record at `index` (clamped into the dataset).
///
/// Returns `None` when there is nothing to render: an empty dataset or an
/// empty mapping.
pub fn render(
    dataset: &Dataset,
    template: &Template,
    mapping: &Mapping,
    routing: &RoutingConfig,
    index: usize,
) -> Option<RenderedRecord> {
    if dataset.is_empty() || mapping.is_empty() {
        return None;
    }
    let index = index.min(dataset.len() - 1);
    let row = dataset.row(index)?;
    let recipients = resolve(row, routing);
    Some(RenderedRecord {
        subject: bind_subject(&template.subject, mapping, row),
        body: bind(&template.body, mapping, row),
        to: recipients.to,
        cc: recipients.cc,
        bcc: recipients.bcc,
        position: index + 1,
        total: dataset.len(),
    })
}
