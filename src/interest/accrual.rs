use chrono::{Datelike, NaiveDate};

use crate::calendar::days_between;
use crate::config::AccrualConfig;
use crate::decimal::{Money, Rate};
use crate::interest::{InterestCalculation, InterestCalculator};
use crate::types::{EntryKind, ScheduleEntry};

/// how the day count of a period is derived from its dates
///
/// Each code path of the schedule uses its own convention; they are kept
/// distinct rather than unified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum DayCount {
    /// both endpoints counted: whole months and the pre-deposit sub-period
    Inclusive,
    /// days elapsed from start to end: cascaded rows and post-deposit remainders
    Elapsed,
    /// calendar day of the period end: mid-month repayments
    DayOfMonth,
}

/// date-bounded accrual period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub day_count: DayCount,
}

impl Period {
    pub fn new(start: NaiveDate, end: NaiveDate, day_count: DayCount) -> Self {
        Self { start, end, day_count }
    }

    /// calendar month (or part of one) counted inclusively
    pub fn inclusive(start: NaiveDate, end: NaiveDate) -> Self {
        Self::new(start, end, DayCount::Inclusive)
    }

    pub fn elapsed(start: NaiveDate, end: NaiveDate) -> Self {
        Self::new(start, end, DayCount::Elapsed)
    }

    /// period ending on `end`, counted by its day of month
    pub fn day_of_month(start: NaiveDate, end: NaiveDate) -> Self {
        Self::new(start, end, DayCount::DayOfMonth)
    }

    /// number of days interest accrues over; zero or negative for malformed periods
    pub fn days(&self) -> i64 {
        match self.day_count {
            DayCount::Inclusive => days_between(self.start, self.end) + 1,
            DayCount::Elapsed => days_between(self.start, self.end),
            DayCount::DayOfMonth => self.end.day() as i64,
        }
    }
}

/// period accrual calculator
#[derive(Debug, Clone)]
pub struct AccrualEngine {
    year_basis: u32,
}

impl AccrualEngine {
    pub fn new(year_basis: u32) -> Self {
        Self { year_basis }
    }

    pub fn from_config(config: &AccrualConfig) -> Self {
        Self::new(config.year_basis)
    }

    /// simple interest for an explicit day count
    pub fn interest_for_days(&self, principal: Money, rate: Rate, days: i64) -> Money {
        principal.apply_rate(rate, days, self.year_basis)
    }

    /// accrue one period and produce its schedule entry
    ///
    /// The first period of a schedule is the synthetic opening row: no interest,
    /// fee or repayment, and the supplied opening balance (the loan's initial
    /// balance) becomes its closing balance.
    pub fn accrue(
        &self,
        opening_balance: Money,
        rate: Rate,
        service_fee: Money,
        repayment: Money,
        period: &Period,
        is_first_period: bool,
    ) -> ScheduleEntry {
        if is_first_period {
            return ScheduleEntry {
                end_date: period.end,
                opening_balance: Money::ZERO,
                interest: Money::ZERO,
                service_fee: Money::ZERO,
                repayment: Money::ZERO,
                closing_balance: opening_balance,
                days: 0,
                kind: EntryKind::Opening,
                is_direct_deposit: None,
            };
        }

        self.accrue_entry(opening_balance, rate, service_fee, repayment, period, EntryKind::Monthly)
    }

    /// accrue one period tagged with the given entry kind
    pub fn accrue_entry(
        &self,
        opening_balance: Money,
        rate: Rate,
        service_fee: Money,
        repayment: Money,
        period: &Period,
        kind: EntryKind,
    ) -> ScheduleEntry {
        let calculation = self.calculate_interest(opening_balance, rate, period);
        let closing_balance = opening_balance + calculation.interest_amount + service_fee - repayment;

        log::debug!(
            "accrued {:?} period ending {}: {} {:?} days on {} at {}, interest {}, closing {}",
            kind,
            period.end,
            calculation.days,
            calculation.day_count,
            calculation.principal_base,
            calculation.annual_rate,
            calculation.interest_amount,
            closing_balance,
        );

        ScheduleEntry {
            end_date: period.end,
            opening_balance,
            interest: calculation.interest_amount,
            service_fee,
            repayment,
            closing_balance,
            days: calculation.days,
            kind,
            is_direct_deposit: None,
        }
    }
}

impl Default for AccrualEngine {
    fn default() -> Self {
        Self::from_config(&AccrualConfig::default())
    }
}

impl InterestCalculator for AccrualEngine {
    fn calculate_interest(&self, principal: Money, rate: Rate, period: &Period) -> InterestCalculation {
        let days = period.days();

        InterestCalculation {
            interest_amount: self.interest_for_days(principal, rate, days),
            days,
            principal_base: principal,
            annual_rate: rate,
            day_count: period.day_count,
        }
    }
}
