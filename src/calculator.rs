use chrono::{DateTime, NaiveDate, Utc};
use hourglass_rs::SafeTimeProvider;

use crate::config::EngineConfig;
use crate::errors::Result;
use crate::presenter::{SchedulePresenter, CSV_CONTENT_TYPE};
use crate::request::{
    CalculationRequest, CalculationResponse, DetailedProjectionResponse, PreviewRequest, PreviewResponse,
    ProjectionRequest, ProjectionResponse,
};
use crate::schedule::{Schedule, ScheduleEngine};
use crate::store::{ClientSummary, ScheduleStore, StoredSchedule};

/// tabular export of a schedule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleExport {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// result of a calculation request
#[derive(Debug, Clone, PartialEq)]
pub enum CalculationOutput {
    Schedule(CalculationResponse),
    Download(ScheduleExport),
}

/// loan calculator service
///
/// Ties request validation, the schedule engine, presentation and the optional
/// per-client store together. The current date comes from the time provider.
#[derive(Debug, Clone)]
pub struct LoanCalculator {
    engine: ScheduleEngine,
    presenter: SchedulePresenter,
    store: Option<ScheduleStore>,
}

impl LoanCalculator {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            presenter: SchedulePresenter::new(config.presentation.clone()),
            engine: ScheduleEngine::new(config),
            store: None,
        }
    }

    /// calculator that persists non-download results under the configured directory
    pub fn with_store(config: EngineConfig) -> Self {
        let store = ScheduleStore::from_config(&config.store);
        Self {
            store: Some(store),
            ..Self::new(config)
        }
    }

    pub fn engine(&self) -> &ScheduleEngine {
        &self.engine
    }

    pub fn presenter(&self) -> &SchedulePresenter {
        &self.presenter
    }

    pub fn store(&self) -> Option<&ScheduleStore> {
        self.store.as_ref()
    }

    fn today(time_provider: &SafeTimeProvider) -> (DateTime<Utc>, NaiveDate) {
        let now = time_provider.now();
        (now, now.date_naive())
    }

    /// build the schedule a request describes, as of the provider's today
    pub fn schedule_for(&self, request: &CalculationRequest, as_of: NaiveDate) -> Result<Schedule> {
        let params = request.loan_parameters()?;
        let plan = request.repayment_plan(self.engine.config().presentation.default_plan_months)?;
        let event = request.event()?;

        self.engine.run(&params, &plan, event.as_ref(), as_of)
    }

    pub fn calculate(&self, request: &CalculationRequest, time_provider: &SafeTimeProvider) -> Result<CalculationOutput> {
        let (now, as_of) = Self::today(time_provider);
        let schedule = self.schedule_for(request, as_of)?;

        if request.is_download() {
            let bytes = self.presenter.export_csv_bytes(&schedule.entries)?;
            return Ok(CalculationOutput::Download(ScheduleExport {
                filename: self.presenter.export_filename(request.client_name(), now),
                content_type: CSV_CONTENT_TYPE,
                bytes,
            }));
        }

        let response = CalculationResponse {
            client_name: request.client_name().to_string(),
            months: self.presenter.entry_views(&schedule.entries),
            calculated_at: self.presenter.timestamp(now),
            projection: schedule.projection.message(),
        };

        if let Some(store) = &self.store {
            if !request.client_name().is_empty() {
                store.save(&StoredSchedule::capture(
                    request,
                    response.months.clone(),
                    response.calculated_at.clone(),
                    response.projection.clone(),
                    now,
                ))?;
            }
        }

        Ok(CalculationOutput::Schedule(response))
    }

    pub fn project(&self, request: &ProjectionRequest) -> Result<ProjectionResponse> {
        let inputs = request.inputs()?;
        let projection =
            self.engine
                .projector()
                .project(inputs.balance, inputs.rate, inputs.service_fee, inputs.repayment);

        Ok(ProjectionResponse {
            projection: projection.message(),
        })
    }

    pub fn project_detailed(&self, request: &ProjectionRequest) -> Result<DetailedProjectionResponse> {
        let inputs = request.inputs()?;
        let detailed =
            self.engine
                .projector()
                .project_detailed(inputs.balance, inputs.rate, inputs.service_fee, inputs.repayment);

        Ok(DetailedProjectionResponse {
            projections: self.presenter.projection_rows(&detailed),
        })
    }

    pub fn preview(&self, request: &PreviewRequest) -> Result<PreviewResponse> {
        let inputs = request.inputs()?;
        let rows = self
            .engine
            .projector()
            .preview(inputs.balance, inputs.rate, inputs.service_fee, inputs.repayment);

        Ok(PreviewResponse {
            success: true,
            months: self.presenter.preview_rows(&rows),
        })
    }

    fn attached_store(&self) -> ScheduleStore {
        self.store
            .clone()
            .unwrap_or_else(|| ScheduleStore::from_config(&self.engine.config().store))
    }

    pub fn history(&self) -> Result<Vec<ClientSummary>> {
        self.attached_store().history()
    }

    pub fn client_details(&self, client_name: &str) -> Result<StoredSchedule> {
        self.attached_store().load(client_name)
    }

    /// rebuild a stored client's schedule as of the provider's today
    pub fn recalculate(&self, client_name: &str, time_provider: &SafeTimeProvider) -> Result<CalculationResponse> {
        let (now, as_of) = Self::today(time_provider);
        let schedule = self.attached_store().recalculate(client_name, &self.engine, as_of)?;

        Ok(CalculationResponse {
            client_name: client_name.to_string(),
            months: self.presenter.entry_views(&schedule.entries),
            calculated_at: self.presenter.timestamp(now),
            projection: schedule.projection.message(),
        })
    }
}

impl Default for LoanCalculator {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
