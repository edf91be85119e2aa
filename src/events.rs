use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};

/// irregular intervention applied to a schedule build; at most one per request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// extra repayment between two existing rows, anchored to row `anchor_index`
    MidMonthRepayment {
        date: NaiveDate,
        amount: Money,
        /// fee charged on the injected sub-period (zero when not given)
        service_fee: Money,
        /// rate for the injected sub-period; the loan rate when `None`
        rate_override: Option<Rate>,
        anchor_index: usize,
    },
    /// lump sum paid on an arbitrary date, splitting its calendar month in two
    DirectDeposit {
        date: NaiveDate,
        amount: Money,
    },
}

impl Event {
    pub fn date(&self) -> NaiveDate {
        match self {
            Event::MidMonthRepayment { date, .. } | Event::DirectDeposit { date, .. } => *date,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Event::MidMonthRepayment { .. } => "mid-month repayment",
            Event::DirectDeposit { .. } => "direct deposit",
        }
    }
}
