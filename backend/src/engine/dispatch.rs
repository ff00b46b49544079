//! The batch dispatch loop.
//!
//! A [`DispatchJob`] is a validated, read-only snapshot of everything a batch
//! needs. [`run_batch`] walks its rows in ascending order on the calling
//! thread: bind, resolve, submit, record, report progress. A failed row is
//! recorded and the loop moves on; only failing to open the transport
//! session aborts the batch.

use crate::engine::binder::{bind, bind_subject};
use crate::engine::routing::resolve;
use crate::error::DispatchError;
use crate::transport::{MailTransport, OutgoingMessage, SessionGuard};
use common::model::dataset::{DataRow, Dataset};
use common::model::mapping::Mapping;
use common::model::merge::{BatchReport, DeliveryMode, DispatchOutcome, DispatchProgress, RowRange};
use common::model::routing::RoutingConfig;
use common::model::template::Template;
use log::{debug, error, info, warn};
use std::ops::Range;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct DispatchJob {
    dataset: Arc<Dataset>,
    template: Template,
    mapping: Mapping,
    routing: RoutingConfig,
    rows: Range<usize>,
    mode: DeliveryMode,
}

impl DispatchJob {
    /// Validates a batch request before any worker is started.
    pub fn new(
        dataset: Arc<Dataset>,
        template: Template,
        mapping: Mapping,
        routing: RoutingConfig,
        range: RowRange,
        mode: DeliveryMode,
    ) -> Result<Self, DispatchError> {
        if routing.to.is_none() {
            return Err(DispatchError::MissingToColumn);
        }
        if dataset.is_empty() {
            return Err(DispatchError::NoData);
        }
        let rows = range
            .to_indices(dataset.len())
            .ok_or(DispatchError::InvalidRange {
                start: range.start,
                end: range.end,
                len: dataset.len(),
            })?;
        Ok(Self {
            dataset,
            template,
            mapping,
            routing,
            rows,
            mode,
        })
    }

    pub fn total(&self) -> usize {
        self.rows.len()
    }

    pub fn mode(&self) -> DeliveryMode {
        self.mode
    }

    /// The 1-based, inclusive rows this job covers.
    pub fn range(&self) -> RowRange {
        RowRange::new(self.rows.start + 1, self.rows.end)
    }
}

/// Runs the batch to completion, calling `on_progress` once per row.
///
/// The transport session is opened once up front and released when this
/// function returns or unwinds.
pub fn run_batch<F>(
    job: &DispatchJob,
    transport: &dyn MailTransport,
    mut on_progress: F,
) -> Result<BatchReport, DispatchError>
where
    F: FnMut(DispatchProgress),
{
    let total = job.total();
    let session = transport.connect(job.mode).map_err(|e| {
        error!("Could not open mail session: {}", e);
        DispatchError::Fatal(e.to_string())
    })?;
    let mut session = SessionGuard::new(session);

    let mut report = BatchReport::default();
    for (n, index) in job.rows.clone().enumerate() {
        let row = job
            .dataset
            .row(index)
            .ok_or_else(|| DispatchError::Fatal(format!("row {} is missing", index + 1)))?;
        let outcome = dispatch_row(&mut session, job, row, index + 1);
        let progress = DispatchProgress::new(n + 1, total, &outcome.to, outcome.succeeded);
        report.record(outcome);
        on_progress(progress);
    }

    info!(
        "Batch finished: {} of {} rows succeeded",
        report.success_count, report.attempted
    );
    Ok(report)
}

fn dispatch_row(
    session: &mut SessionGuard,
    job: &DispatchJob,
    row: DataRow<'_>,
    row_number: usize,
) -> DispatchOutcome {
    let subject = bind_subject(&job.template.subject, &job.mapping, row);
    let body = bind(&job.template.body, &job.mapping, row);
    let recipients = resolve(row, &job.routing);
    if !recipients.to_resolved {
        warn!("Row {}: no recipient address, submitting anyway", row_number);
    }

    let to = recipients.to.clone();
    let message = OutgoingMessage::new(recipients, subject, body);
    match session.submit(&message, job.mode) {
        Ok(()) => {
            debug!("Row {} ({}) submitted", row_number, to);
            DispatchOutcome::success(row_number, to)
        }
        Err(e) => {
            warn!("Row {} ({}) failed: {}", row_number, to, e);
            DispatchOutcome::failure(row_number, to, e.to_string())
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::engine::routing::EMPTY_TO;
    use crate::transport::{MailSession, MockMailTransport, TransportError};
    use std::sync::Mutex;

    /// Records submissions and rejects any To without an `@`.
    #[derive(Default, Clone)]
    pub(crate) struct RecordingTransport {
        pub sent: Arc<Mutex<Vec<(DeliveryMode, OutgoingMessage)>>>,
        pub connects: Arc<Mutex<usize>>,
        pub releases: Arc<Mutex<usize>>,
    }

    struct RecordingSession(RecordingTransport);

    impl RecordingSession {
        fn push(&self, mode: DeliveryMode, message: &OutgoingMessage) -> Result<(), TransportError> {
            if !message.to.contains('@') {
                return Err(TransportError::InvalidAddress(message.to.clone()));
            }
            self.0.sent.lock().unwrap().push((mode, message.clone()));
            Ok(())
        }
    }

    impl MailSession for RecordingSession {
        fn save(&mut self, message: &OutgoingMessage) -> Result<(), TransportError> {
            self.push(DeliveryMode::Draft, message)
        }

        fn send(&mut self, message: &OutgoingMessage) -> Result<(), TransportError> {
            self.push(DeliveryMode::Send, message)
        }

        fn release(&mut self) {
            *self.0.releases.lock().unwrap() += 1;
        }
    }

    impl MailTransport for RecordingTransport {
        fn connect(&self, _mode: DeliveryMode) -> Result<Box<dyn MailSession>, TransportError> {
            *self.connects.lock().unwrap() += 1;
            Ok(Box::new(RecordingSession(self.clone())))
        }
    }

    pub(crate) fn ann_and_bo() -> Dataset {
        Dataset::new(
            vec!["Name".into(), "Email".into()],
            vec![
                vec![Some("Ann".into()), Some("a@x.com".into())],
                vec![Some("Bo".into()), Some("".into())],
            ],
        )
    }

    fn job(dataset: Dataset, range: RowRange, mode: DeliveryMode) -> Result<DispatchJob, DispatchError> {
        DispatchJob::new(
            Arc::new(dataset),
            Template {
                subject: "Hi {{Name}}".into(),
                body: "<p>Dear {{Name}}</p>".into(),
            },
            [("Name", "Name")].into_iter().collect(),
            RoutingConfig {
                to: Some("Email".into()),
                ..Default::default()
            },
            range,
            mode,
        )
    }

    #[test]
    fn partial_failure_is_recorded_and_the_batch_continues() {
        let transport = RecordingTransport::default();
        let job = job(ann_and_bo(), RowRange::full(2), DeliveryMode::Send).unwrap();

        let report = run_batch(&job, &transport, |_| {}).unwrap();

        assert_eq!(report.attempted, 2);
        assert_eq!(report.success_count, 1);
        assert_eq!(report.failures.len(), 1);
        let failure = &report.failures[0];
        assert_eq!(failure.row, 2);
        assert_eq!(failure.to, EMPTY_TO);
        assert!(failure.error.as_deref().unwrap().contains("Invalid address"));

        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, DeliveryMode::Send);
        assert_eq!(sent[0].1.subject, "Hi Ann");
        assert_eq!(sent[0].1.to, "a@x.com");
        assert_eq!(sent[0].1.html_body, "<p>Dear Ann</p>");
    }

    #[test]
    fn k_failures_out_of_n() {
        let rows = (1..=6)
            .map(|i| {
                let email = if i % 3 == 0 { "broken".to_string() } else { format!("u{i}@x.com") };
                vec![Some(format!("User {i}")), Some(email)]
            })
            .collect();
        let dataset = Dataset::new(vec!["Name".into(), "Email".into()], rows);
        let transport = RecordingTransport::default();
        let job = job(dataset, RowRange::full(6), DeliveryMode::Draft).unwrap();

        let report = run_batch(&job, &transport, |_| {}).unwrap();
        assert_eq!(report.success_count, 4);
        let failed_rows: Vec<_> = report.failures.iter().map(|f| f.row).collect();
        assert_eq!(failed_rows, vec![3, 6]);
        assert!(transport.sent.lock().unwrap().iter().all(|(m, _)| *m == DeliveryMode::Draft));
    }

    #[test]
    fn progress_counts_up_once_per_row() {
        let transport = RecordingTransport::default();
        let dataset = Dataset::new(
            vec!["Name".into(), "Email".into()],
            (0..7)
                .map(|i| vec![Some(format!("N{i}")), Some(format!("n{i}@x.com"))])
                .collect(),
        );
        let job = job(dataset, RowRange::new(2, 4), DeliveryMode::Draft).unwrap();

        let mut seen = Vec::new();
        run_batch(&job, &transport, |p| seen.push(p)).unwrap();

        let processed: Vec<_> = seen.iter().map(|p| p.processed).collect();
        assert_eq!(processed, vec![1, 2, 3]);
        let percents: Vec<_> = seen.iter().map(|p| p.percent).collect();
        assert_eq!(percents, vec![33, 67, 100]);
        assert_eq!(seen[0].message, "Processed 1/3: n1@x.com");
    }

    #[test]
    fn failed_row_progress_is_prefixed() {
        let transport = RecordingTransport::default();
        let job = job(ann_and_bo(), RowRange::full(2), DeliveryMode::Draft).unwrap();
        let mut messages = Vec::new();
        run_batch(&job, &transport, |p| messages.push(p.message)).unwrap();
        assert_eq!(messages[1], format!("FAILED 2/2: {EMPTY_TO}"));
    }

    #[test]
    fn session_is_opened_and_released_once() {
        let transport = RecordingTransport::default();
        let job = job(ann_and_bo(), RowRange::full(2), DeliveryMode::Draft).unwrap();
        run_batch(&job, &transport, |_| {}).unwrap();
        assert_eq!(*transport.connects.lock().unwrap(), 1);
        assert_eq!(*transport.releases.lock().unwrap(), 1);
    }

    #[test]
    fn unreachable_transport_is_fatal_and_attempts_nothing() {
        let mut transport = MockMailTransport::new();
        transport
            .expect_connect()
            .times(1)
            .returning(|_| Err(TransportError::Session("connection refused".into())));
        let job = job(ann_and_bo(), RowRange::full(2), DeliveryMode::Send).unwrap();

        let mut calls = 0;
        let err = run_batch(&job, &transport, |_| calls += 1).unwrap_err();
        assert!(err.is_fatal());
        assert!(err.to_string().contains("connection refused"));
        assert_eq!(calls, 0);
    }

    #[test]
    fn requests_are_validated_up_front() {
        assert!(matches!(
            job(ann_and_bo(), RowRange::new(1, 3), DeliveryMode::Draft),
            Err(DispatchError::InvalidRange { start: 1, end: 3, len: 2 })
        ));
        assert!(matches!(
            job(Dataset::default(), RowRange::full(0), DeliveryMode::Draft),
            Err(DispatchError::NoData)
        ));
        let no_to = DispatchJob::new(
            Arc::new(ann_and_bo()),
            Template::default(),
            Mapping::new(),
            RoutingConfig::default(),
            RowRange::full(2),
            DeliveryMode::Draft,
        );
        assert!(matches!(no_to, Err(DispatchError::MissingToColumn)));
    }

    #[test]
    fn job_reports_its_range() {
        let job = job(ann_and_bo(), RowRange::new(2, 2), DeliveryMode::Draft).unwrap();
        assert_eq!(job.total(), 1);
        assert_eq!(job.range(), RowRange::new(2, 2));
        assert_eq!(job.mode(), DeliveryMode::Draft);
    }
}
