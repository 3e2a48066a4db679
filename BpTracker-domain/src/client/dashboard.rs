use thiserror::Error;
use tracing::{info, warn};

use super::query::ReadingsQuery;
use super::source::{ClientError, ReadingsSource};
use crate::chart::ChartView;
use crate::entities::Reading;
use crate::export::{CsvExporter, ExportError};
use crate::form::{FormErrors, ReadingForm, SubmitNotice};
use crate::range::{CustomRange, PresetDays, RangeStateStore};

/// Why a submit did not record a reading
#[derive(Debug, Error)]
pub enum SubmitError {
    /// Form input is invalid; nothing was sent
    #[error("{0}")]
    Invalid(FormErrors),

    /// The server rejected or never received the reading
    #[error(transparent)]
    Client(#[from] ClientError),
}

/// One user's readings session: range selection, fetched data, the add
/// reading form and CSV export.
pub struct Dashboard<S: ReadingsSource> {
    store: RangeStateStore,
    query: ReadingsQuery,
    source: S,
    form: ReadingForm,
    exporter: CsvExporter,
}

impl<S: ReadingsSource> Dashboard<S> {
    pub fn new(source: S) -> Self {
        Self::with_store(source, RangeStateStore::default())
    }

    pub fn with_store(source: S, store: RangeStateStore) -> Self {
        Self {
            store,
            query: ReadingsQuery::new(),
            source,
            form: ReadingForm::default(),
            exporter: CsvExporter::default(),
        }
    }

    pub fn with_exporter(mut self, exporter: CsvExporter) -> Self {
        self.exporter = exporter;
        self
    }

    pub fn store(&self) -> &RangeStateStore {
        &self.store
    }

    pub fn query(&self) -> &ReadingsQuery {
        &self.query
    }

    pub fn form(&self) -> &ReadingForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut ReadingForm {
        &mut self.form
    }

    pub async fn select_preset(&mut self, days: PresetDays) -> Result<(), ClientError> {
        self.store.select_preset(days);
        self.refresh().await
    }

    pub async fn select_custom_range(&mut self, range: Option<CustomRange>) -> Result<(), ClientError> {
        self.store.select_custom_range(range);
        self.refresh().await
    }

    pub async fn reset(&mut self) -> Result<(), ClientError> {
        self.store.reset();
        self.refresh().await
    }

    /// Fetch readings for the current range. Does nothing while the range is
    /// not ready. On failure the previous data stays displayed.
    pub async fn refresh(&mut self) -> Result<(), ClientError> {
        let Some(ticket) = self.query.begin(self.store.resolved_range()) else {
            return Ok(());
        };

        let result = self.source.fetch_readings(ticket.key()).await;
        let failure = result.as_ref().err().cloned();
        self.query.complete(ticket, result);

        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Validate and send the form. The form is cleared only once the reading
    /// is recorded, and the chart is refreshed so the new reading shows up.
    pub async fn submit(&mut self) -> Result<Reading, SubmitError> {
        let request = self.form.validate().map_err(SubmitError::Invalid)?;

        info!("{}", SubmitNotice::Pending.message());
        let reading = match self.source.create_reading(&request).await {
            Ok(reading) => reading,
            Err(err) => {
                warn!("{}", SubmitNotice::Failed(err.to_string()).message());
                return Err(err.into());
            }
        };
        info!("{}", SubmitNotice::Added.message());

        self.form.reset();
        // Presets end at "now", which has moved past the new reading
        self.store.refresh();
        if let Err(err) = self.refresh().await {
            warn!("Failed to refresh readings after submit: {}", err);
        }

        Ok(reading)
    }

    /// Chart for the displayed readings
    pub fn chart(&self) -> ChartView {
        ChartView::from_readings_at(self.query.data(), self.exporter.offset())
    }

    /// CSV for the displayed readings
    pub fn export_csv(&self) -> Result<String, ExportError> {
        self.exporter.to_csv(self.query.data())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::source::MockReadingsSource;
    use crate::entities::CreateReadingRequest;
    use crate::range::{CalendarBound, ResolvedRange};
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};
    use mockall::predicate::eq;
    use tokio_test::{assert_err, assert_ok};

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 15, 9, 0, 0).unwrap()
    }

    fn reading(id: i64, systolic: i32, diastolic: i32) -> Reading {
        Reading {
            id,
            systolic,
            diastolic,
            recorded_at: Utc.with_ymd_and_hms(2024, 1, 10, 8, 0, 0).unwrap(),
        }
    }

    fn dashboard(source: MockReadingsSource) -> Dashboard<MockReadingsSource> {
        Dashboard::with_store(source, RangeStateStore::with_clock(CalendarBound::Today, fixed_now))
    }

    fn january() -> CustomRange {
        CustomRange::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_custom_range_after_preset_fetches_exact_dates() {
        let mut source = MockReadingsSource::new();
        source
            .expect_fetch_readings()
            .withf(|range| range.start_date.ends_with('Z'))
            .times(1)
            .returning(|_| Ok(Vec::new()));
        source
            .expect_fetch_readings()
            .with(eq(ResolvedRange::new("2024-01-01", "2024-01-31")))
            .times(1)
            .returning(|_| Ok(vec![reading(1, 120, 80)]));

        let mut dashboard = dashboard(source);
        assert_ok!(dashboard.select_preset(PresetDays::Sixty).await);
        assert_ok!(dashboard.select_custom_range(Some(january())).await);

        assert_eq!(dashboard.query().data(), &[reading(1, 120, 80)]);
        assert!(!dashboard.chart().is_empty());
    }

    #[tokio::test]
    async fn test_half_picked_range_does_not_fetch() {
        let mut source = MockReadingsSource::new();
        source.expect_fetch_readings().times(0);

        let mut dashboard = dashboard(source);
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_ok!(dashboard.select_custom_range(Some(CustomRange::starting(start))).await);
        assert!(dashboard.chart().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_failure_keeps_range_and_data() {
        let mut source = MockReadingsSource::new();
        source
            .expect_fetch_readings()
            .withf(|range| range.start_date.ends_with('Z'))
            .times(1)
            .returning(|_| Ok(vec![reading(1, 118, 76)]));
        source
            .expect_fetch_readings()
            .with(eq(ResolvedRange::new("2024-01-01", "2024-01-31")))
            .times(1)
            .returning(|_| Err(ClientError::Status { status: 500, message: "boom".to_string() }));

        let mut dashboard = dashboard(source);
        assert_ok!(dashboard.refresh().await);
        assert_err!(dashboard.select_custom_range(Some(january())).await);

        assert_eq!(dashboard.store().resolved_range(), ResolvedRange::new("2024-01-01", "2024-01-31"));
        assert_eq!(dashboard.query().data(), &[reading(1, 118, 76)]);
    }

    #[tokio::test]
    async fn test_submit_records_reading_and_clears_form() {
        let mut source = MockReadingsSource::new();
        source
            .expect_create_reading()
            .with(eq(CreateReadingRequest { systolic: 130, diastolic: 85 }))
            .times(1)
            .returning(|request| Ok(Reading {
                id: 7,
                systolic: request.systolic,
                diastolic: request.diastolic,
                recorded_at: fixed_now(),
            }));
        source
            .expect_fetch_readings()
            .times(1)
            .returning(|_| Ok(vec![reading(7, 130, 85)]));

        let mut dashboard = dashboard(source);
        *dashboard.form_mut() = ReadingForm::new("130", "85");

        let created = dashboard.submit().await.unwrap();
        assert_eq!(created.id, 7);
        assert_eq!(dashboard.form(), &ReadingForm::default());
        assert_eq!(dashboard.query().data().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_submit_keeps_form_values() {
        let mut source = MockReadingsSource::new();
        source
            .expect_create_reading()
            .times(1)
            .returning(|_| Err(ClientError::Transport("offline".to_string())));
        source.expect_fetch_readings().times(0);

        let mut dashboard = dashboard(source);
        *dashboard.form_mut() = ReadingForm::new("130", "85");

        let err = dashboard.submit().await.unwrap_err();
        assert!(matches!(err, SubmitError::Client(ClientError::Transport(_))));
        assert_eq!(dashboard.form(), &ReadingForm::new("130", "85"));
    }

    #[tokio::test]
    async fn test_invalid_form_is_not_sent() {
        let mut source = MockReadingsSource::new();
        source.expect_create_reading().times(0);

        let mut dashboard = dashboard(source);
        *dashboard.form_mut() = ReadingForm::new("", "80");

        let err = dashboard.submit().await.unwrap_err();
        assert_eq!(err.to_string(), "Systolic is Required");
    }

    #[tokio::test]
    async fn test_export_without_data_is_header_only() {
        let dashboard = dashboard(MockReadingsSource::new());
        assert_eq!(dashboard.export_csv().unwrap(), "Date,Blood Pressure\n");
    }
}
