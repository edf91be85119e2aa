use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::config::StoreConfig;
use crate::decimal::Money;
use crate::errors::{Result, ScheduleError};
use crate::presenter::EntryView;
use crate::request::CalculationRequest;
use crate::schedule::{Schedule, ScheduleEngine};

/// persisted calculation for one client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSchedule {
    pub snapshot_id: Uuid,
    pub client_name: String,
    pub request: CalculationRequest,
    pub months: Vec<EntryView>,
    pub calculated_at: String,
    pub captured_at: DateTime<Utc>,
    pub projection: String,
}

impl StoredSchedule {
    pub fn capture(
        request: &CalculationRequest,
        months: Vec<EntryView>,
        calculated_at: String,
        projection: String,
        captured_at: DateTime<Utc>,
    ) -> Self {
        Self {
            snapshot_id: Uuid::new_v4(),
            client_name: request.client_name().to_string(),
            request: request.clone(),
            months,
            calculated_at,
            captured_at,
            projection,
        }
    }
}

/// one line of the client history listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientSummary {
    pub client_name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub initial_balance: Decimal,
    pub calculation_date: String,
    pub projection: String,
}

impl From<&StoredSchedule> for ClientSummary {
    fn from(stored: &StoredSchedule) -> Self {
        let initial_balance = stored
            .request
            .loan_parameters()
            .map_or(Money::ZERO, |params| params.initial_balance);

        Self {
            client_name: stored.client_name.clone(),
            initial_balance: initial_balance.to_display_decimal(2),
            calculation_date: stored.calculated_at.clone(),
            projection: stored.projection.clone(),
        }
    }
}

/// one JSON file per client under a directory; last write wins
#[derive(Debug, Clone)]
pub struct ScheduleStore {
    directory: PathBuf,
}

impl ScheduleStore {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(config.directory.clone())
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// file key for a client: spaces become underscores
    pub fn key(client_name: &str) -> String {
        client_name.trim().replace(' ', "_")
    }

    pub fn path_for(&self, client_name: &str) -> PathBuf {
        self.directory.join(format!("{}.json", Self::key(client_name)))
    }

    pub fn save(&self, stored: &StoredSchedule) -> Result<PathBuf> {
        fs::create_dir_all(&self.directory)?;
        let path = self.path_for(&stored.client_name);
        fs::write(&path, serde_json::to_string_pretty(stored)?)?;

        log::info!(
            "saved schedule {} for {} to {}",
            stored.snapshot_id,
            stored.client_name,
            path.display()
        );
        Ok(path)
    }

    pub fn load(&self, client_name: &str) -> Result<StoredSchedule> {
        let path = self.path_for(client_name);
        let raw = fs::read_to_string(&path).map_err(|err| match err.kind() {
            IoErrorKind::NotFound => ScheduleError::ClientNotFound {
                client_name: client_name.to_string(),
            },
            _ => ScheduleError::Storage(err),
        })?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// summaries of every stored client, sorted by name
    ///
    /// Unreadable files are skipped with a warning.
    pub fn history(&self) -> Result<Vec<ClientSummary>> {
        let dir = match fs::read_dir(&self.directory) {
            Ok(dir) => dir,
            Err(err) if err.kind() == IoErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut summaries = Vec::new();
        for item in dir {
            let path = item?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }

            let parsed = fs::read_to_string(&path)
                .map_err(ScheduleError::from)
                .and_then(|raw| serde_json::from_str::<StoredSchedule>(&raw).map_err(ScheduleError::from));

            match parsed {
                Ok(stored) => summaries.push(ClientSummary::from(&stored)),
                Err(err) => log::warn!("skipping {}: {}", path.display(), err),
            }
        }

        summaries.sort_by(|a, b| a.client_name.cmp(&b.client_name));
        Ok(summaries)
    }

    /// rebuild a client's schedule from its stored request as of a new date
    pub fn recalculate(&self, client_name: &str, engine: &ScheduleEngine, as_of: NaiveDate) -> Result<Schedule> {
        let stored = self.load(client_name)?;
        let request = &stored.request;

        let params = request.loan_parameters()?;
        let plan = request.repayment_plan(engine.config().presentation.default_plan_months)?;
        let event = request.event()?;

        log::info!("recalculating {} as of {}", client_name, as_of);
        engine.run(&params, &plan, event.as_ref(), as_of)
    }
}
