use chrono::NaiveDate;

use crate::calendar::{first_of_next_month, month_end};
use crate::decimal::Money;
use crate::interest::{AccrualEngine, Period};
use crate::types::{LoanParameters, RepaymentPlan, ScheduleEntry};

/// where a month-by-month pass starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildSeed {
    /// first accrual day of the first month produced
    pub period_start: NaiveDate,
    pub opening_balance: Money,
    /// repayment plan offset of the first month produced
    pub month_index: usize,
    /// precede the first month with the synthetic opening row
    pub opening_row: bool,
}

impl BuildSeed {
    /// a fresh schedule starting on the loan's start date
    pub fn from_start(params: &LoanParameters) -> Self {
        Self {
            period_start: params.start_date,
            opening_balance: params.initial_balance,
            month_index: 0,
            opening_row: true,
        }
    }
}

/// schedule builder: one entry per calendar month up to the as-of month end
#[derive(Debug, Clone)]
pub struct ScheduleBuilder {
    accrual: AccrualEngine,
}

impl ScheduleBuilder {
    pub fn new(accrual: AccrualEngine) -> Self {
        Self { accrual }
    }

    /// build the base monthly schedule covering `[start_date, month_end(as_of)]`
    pub fn build(&self, params: &LoanParameters, plan: &RepaymentPlan, as_of: NaiveDate) -> Vec<ScheduleEntry> {
        self.build_from(params, plan, BuildSeed::from_start(params), as_of)
    }

    /// continue month by month from `seed` up to the as-of month end
    ///
    /// A seed asking for an opening row gets one dated on its start, ahead of the
    /// first month, as long as that start is within the horizon.
    pub fn build_from(
        &self,
        params: &LoanParameters,
        plan: &RepaymentPlan,
        seed: BuildSeed,
        as_of: NaiveDate,
    ) -> Vec<ScheduleEntry> {
        let horizon = month_end(as_of);
        let mut entries = Vec::new();
        let mut current_date = seed.period_start;
        let mut balance = seed.opening_balance;
        let mut month_index = seed.month_index;

        if seed.opening_row && current_date <= horizon {
            entries.push(self.opening_row(params, current_date));
        }

        while current_date <= horizon {
            let end_date = month_end(current_date);

            let entry = self.accrual.accrue(
                balance,
                params.interest_rate,
                params.service_fee,
                plan.amount_for(month_index),
                &Period::inclusive(current_date, end_date),
                false,
            );

            balance = entry.closing_balance;
            entries.push(entry);

            month_index += 1;
            current_date = first_of_next_month(current_date);
        }

        log::info!(
            "built {} entries from {} through {}",
            entries.len(),
            seed.period_start,
            horizon,
        );

        entries
    }

    /// synthetic zero-activity row carrying the initial balance
    pub fn opening_row(&self, params: &LoanParameters, on: NaiveDate) -> ScheduleEntry {
        self.accrual.accrue(
            params.initial_balance,
            params.interest_rate,
            params.service_fee,
            Money::ZERO,
            &Period::inclusive(on, on),
            true,
        )
    }
}
