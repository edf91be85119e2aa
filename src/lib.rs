pub mod calculator;
pub mod calendar;
pub mod config;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod interest;
pub mod presenter;
pub mod projection;
pub mod request;
pub mod schedule;
pub mod store;
pub mod types;

// re-export key types
pub use calculator::{CalculationOutput, LoanCalculator, ScheduleExport};
pub use config::{AccrualConfig, EngineConfig, PresentationConfig, ProjectionConfig, StoreConfig};
pub use decimal::{Money, Rate};
pub use errors::{DateBound, ErrorKind, ErrorResponse, Result, ScheduleError};
pub use events::Event;
pub use interest::{AccrualEngine, DayCount, InterestCalculation, InterestCalculator, Period};
pub use presenter::{EntryView, SchedulePresenter, EXPORT_COLUMNS};
pub use projection::{
    DetailedProjection, PreviewRow, Projection, ProjectionOutcome, ProjectionRow, SettlementProjector,
};
pub use request::{
    CalculationRequest, CalculationResponse, DetailedProjectionResponse, PreviewRequest, PreviewResponse,
    ProjectionRequest, ProjectionResponse,
};
pub use schedule::{insert_ordered, BuildSeed, EventInjector, Schedule, ScheduleBuilder, ScheduleEngine};
pub use store::{ClientSummary, ScheduleStore, StoredSchedule};
pub use types::{EntryKind, LoanParameters, RepaymentPlan, ScheduleEntry};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
