use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};

/// loan terms, fixed for the duration of one schedule build
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanParameters {
    pub initial_balance: Money,
    /// annual rate, applied as simple daily-prorated interest
    pub interest_rate: Rate,
    /// flat fee charged every accrual period
    pub service_fee: Money,
    pub start_date: NaiveDate,
}

impl LoanParameters {
    pub fn new(initial_balance: Money, interest_rate: Rate, service_fee: Money, start_date: NaiveDate) -> Self {
        Self {
            initial_balance,
            interest_rate,
            service_fee,
            start_date,
        }
    }
}

/// monthly repayment amounts indexed by month offset from the start month
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RepaymentPlan {
    amounts: Vec<Money>,
}

impl RepaymentPlan {
    pub fn new(amounts: Vec<Money>) -> Self {
        Self { amounts }
    }

    /// a plan of `months` zero repayments
    pub fn zeros(months: usize) -> Self {
        Self {
            amounts: vec![Money::ZERO; months],
        }
    }

    /// same amount for every one of `months` months
    pub fn level(amount: Money, months: usize) -> Self {
        Self {
            amounts: vec![amount; months],
        }
    }

    /// repayment for a month offset, zero beyond the end of the plan
    pub fn amount_for(&self, month_index: usize) -> Money {
        self.amounts.get(month_index).copied().unwrap_or(Money::ZERO)
    }

    /// latest strictly positive amount, used as the steady repayment for projections
    pub fn last_positive(&self) -> Option<Money> {
        self.amounts.iter().rev().copied().find(|amount| amount.is_positive())
    }

    pub fn amounts(&self) -> &[Money] {
        &self.amounts
    }

    pub fn len(&self) -> usize {
        self.amounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.amounts.is_empty()
    }
}

/// where a schedule entry came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    /// synthetic first row carrying the initial balance
    Opening,
    /// whole calendar month (or the start month's remainder)
    Monthly,
    /// out-of-cycle repayment injected between two rows
    MidMonthRepayment,
    /// pre-deposit sub-period ending on the deposit date
    DirectDeposit,
    /// remainder of the deposit month after the deposit
    PostDeposit,
}

impl EntryKind {
    /// entries created by an injected event rather than the monthly cadence
    pub fn is_event_derived(&self) -> bool {
        matches!(self, EntryKind::MidMonthRepayment | EntryKind::DirectDeposit)
    }
}

/// one accrual period of the schedule
///
/// Amounts keep full working precision; presentation rounds them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub end_date: NaiveDate,
    pub opening_balance: Money,
    pub interest: Money,
    pub service_fee: Money,
    pub repayment: Money,
    pub closing_balance: Money,
    /// day count the interest was computed over
    pub days: i64,
    pub kind: EntryKind,
    /// set only on rows produced by the direct deposit walk
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_direct_deposit: Option<bool>,
}

impl ScheduleEntry {
    pub fn is_direct_deposit(&self) -> bool {
        self.is_direct_deposit.unwrap_or(false)
    }

    /// closing balance below zero means the client is owed money
    pub fn is_refund(&self) -> bool {
        self.closing_balance.is_negative()
    }

    /// opening + interest + fee - repayment, recomputed from the stored parts
    pub fn expected_closing(&self) -> Money {
        self.opening_balance + self.interest + self.service_fee - self.repayment
    }
}
