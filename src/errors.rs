use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// which neighbour of the anchor row a transaction date collided with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateBound {
    /// the selected (anchor) row
    Anchor,
    /// the row after the anchor
    Next,
}

impl DateBound {
    pub fn message(&self) -> &'static str {
        match self {
            DateBound::Anchor => "Transaction date must be after the selected row date",
            DateBound::Next => "Transaction date must be before the next row date",
        }
    }
}

#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("Start date is required")]
    MissingStartDate,

    #[error("Invalid start date format. Please use YYYY-MM-DD")]
    InvalidStartDate {
        value: String,
    },

    #[error("{field} is required")]
    MissingField {
        field: &'static str,
    },

    #[error("invalid number for {field}: {value}")]
    InvalidNumber {
        field: &'static str,
        value: String,
    },

    #[error("invalid date for {field}: {value}. Please use YYYY-MM-DD")]
    InvalidDate {
        field: &'static str,
        value: String,
    },

    #[error("{}", .bound.message())]
    TransactionDateOutOfOrder {
        date: NaiveDate,
        boundary: NaiveDate,
        bound: DateBound,
    },

    #[error("selected row {index} does not exist: schedule has {len} rows")]
    AnchorOutOfRange {
        index: usize,
        len: usize,
    },

    #[error("deposit date {deposit_date} is before the loan start date {start_date}")]
    DepositBeforeStart {
        deposit_date: NaiveDate,
        start_date: NaiveDate,
    },

    #[error("a request may carry either a mid-month transaction or a direct deposit, not both")]
    ConflictingEvents,

    #[error("Client not found")]
    ClientNotFound {
        client_name: String,
    },

    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("export error: {0}")]
    Export(#[from] csv::Error),
}

/// coarse failure class, used by callers to pick a response status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// rejected input, nothing computed (400-equivalent)
    Validation,
    /// unknown client (404-equivalent)
    NotFound,
    /// persistence or export failure (500-equivalent)
    Storage,
}

impl ScheduleError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ScheduleError::ClientNotFound { .. } => ErrorKind::NotFound,
            ScheduleError::Storage(_) | ScheduleError::Serialization(_) | ScheduleError::Export(_) => {
                ErrorKind::Storage
            }
            _ => ErrorKind::Validation,
        }
    }

    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }
}

/// `{error: <message>}` wire shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl From<&ScheduleError> for ErrorResponse {
    fn from(err: &ScheduleError) -> Self {
        ErrorResponse { error: err.to_string() }
    }
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
