use chrono::NaiveDate;

use crate::calendar::{first_of_next_month, month_end};
use crate::decimal::{Money, Rate};
use crate::errors::{DateBound, Result, ScheduleError};
use crate::interest::{AccrualEngine, Period};
use crate::schedule::builder::{BuildSeed, ScheduleBuilder};
use crate::types::{EntryKind, LoanParameters, RepaymentPlan, ScheduleEntry};

/// entries produced by a direct deposit walk and where monthly building resumes
#[derive(Debug, Clone, PartialEq)]
pub struct DepositWalk {
    pub entries: Vec<ScheduleEntry>,
    pub resume: BuildSeed,
}

/// event injector: splits a month around an event date and recomputes what follows
#[derive(Debug, Clone)]
pub struct EventInjector {
    accrual: AccrualEngine,
    builder: ScheduleBuilder,
}

impl EventInjector {
    pub fn new(accrual: AccrualEngine) -> Self {
        Self {
            builder: ScheduleBuilder::new(accrual.clone()),
            accrual,
        }
    }

    /// insert a mid-month repayment after row `anchor` and cascade the rows after it
    ///
    /// The date must fall strictly between the anchor row and the row after it.
    /// Nothing is mutated when validation fails.
    #[allow(clippy::too_many_arguments)]
    pub fn inject_mid_month(
        &self,
        entries: &mut Vec<ScheduleEntry>,
        params: &LoanParameters,
        date: NaiveDate,
        amount: Money,
        service_fee: Money,
        rate_override: Option<Rate>,
        anchor: usize,
    ) -> Result<()> {
        let anchor_entry = entries.get(anchor).ok_or(ScheduleError::AnchorOutOfRange {
            index: anchor,
            len: entries.len(),
        })?;

        if date <= anchor_entry.end_date {
            log::warn!("rejected mid-month repayment on {}: not after row {}", date, anchor);
            return Err(ScheduleError::TransactionDateOutOfOrder {
                date,
                boundary: anchor_entry.end_date,
                bound: DateBound::Anchor,
            });
        }

        if let Some(next) = entries.get(anchor + 1) {
            if date >= next.end_date {
                log::warn!("rejected mid-month repayment on {}: not before row {}", date, anchor + 1);
                return Err(ScheduleError::TransactionDateOutOfOrder {
                    date,
                    boundary: next.end_date,
                    bound: DateBound::Next,
                });
            }
        }

        let injected = self.accrual.accrue_entry(
            anchor_entry.closing_balance,
            rate_override.unwrap_or(params.interest_rate),
            service_fee,
            amount,
            &Period::day_of_month(anchor_entry.end_date, date),
            EntryKind::MidMonthRepayment,
        );

        let insert_at = anchor + 1;
        entries.insert(insert_at, injected);
        self.cascade(entries, params, insert_at);

        log::info!(
            "injected mid-month repayment of {} on {} after row {}",
            amount,
            date,
            anchor
        );

        Ok(())
    }

    /// mid-month repayment against a schedule with no rows yet
    pub fn standalone_mid_month(
        &self,
        params: &LoanParameters,
        date: NaiveDate,
        amount: Money,
        service_fee: Money,
        rate_override: Option<Rate>,
    ) -> ScheduleEntry {
        self.accrual.accrue_entry(
            params.initial_balance,
            rate_override.unwrap_or(params.interest_rate),
            service_fee,
            amount,
            &Period::elapsed(params.start_date, date),
            EntryKind::MidMonthRepayment,
        )
    }

    /// re-derive every row after `from` from the running balance
    ///
    /// Each row keeps its own repayment and fee; days run from the previous row's date.
    fn cascade(&self, entries: &mut [ScheduleEntry], params: &LoanParameters, from: usize) {
        for i in (from + 1)..entries.len() {
            let previous = &entries[i - 1];
            let (balance, previous_end) = (previous.closing_balance, previous.end_date);
            let entry = &entries[i];

            let mut recomputed = self.accrual.accrue_entry(
                balance,
                params.interest_rate,
                entry.service_fee,
                entry.repayment,
                &Period::elapsed(previous_end, entry.end_date),
                entry.kind,
            );
            recomputed.is_direct_deposit = entry.is_direct_deposit;

            log::debug!(
                "cascaded row {} ending {}: opening {} closing {}",
                i,
                recomputed.end_date,
                recomputed.opening_balance,
                recomputed.closing_balance
            );

            entries[i] = recomputed;
        }
    }

    /// walk month by month from the start date up to the deposit, splitting its month
    ///
    /// The walk opens with the synthetic opening row and stops at the horizon. A
    /// deposit beyond it is recorded as a standalone entry spanning the days since
    /// the last walked row.
    pub fn direct_deposit(
        &self,
        params: &LoanParameters,
        plan: &RepaymentPlan,
        deposit_date: NaiveDate,
        amount: Money,
        horizon: NaiveDate,
    ) -> Result<DepositWalk> {
        if deposit_date < params.start_date {
            log::warn!("rejected direct deposit on {}: before loan start", deposit_date);
            return Err(ScheduleError::DepositBeforeStart {
                deposit_date,
                start_date: params.start_date,
            });
        }

        let mut opening = self.builder.opening_row(params, params.start_date);
        opening.is_direct_deposit = Some(false);

        let mut entries = vec![opening];
        let mut current_date = params.start_date;
        let mut balance = params.initial_balance;
        let mut month_index = 0;
        let mut deposited = false;

        while current_date <= deposit_date && current_date <= horizon {
            let end_date = month_end(current_date);

            if deposit_date <= end_date {
                balance = self.split_deposit_month(
                    &mut entries,
                    params,
                    Period::inclusive(current_date, deposit_date),
                    balance,
                    amount,
                );
                deposited = true;
                month_index += 1;
                break;
            }

            let mut entry = self.accrual.accrue_entry(
                balance,
                params.interest_rate,
                params.service_fee,
                plan.amount_for(month_index),
                &Period::inclusive(current_date, end_date),
                EntryKind::Monthly,
            );
            entry.is_direct_deposit = Some(false);
            balance = entry.closing_balance;
            entries.push(entry);

            month_index += 1;
            current_date = first_of_next_month(current_date);
        }

        if !deposited {
            let since = entries.last().map_or(params.start_date, |entry| entry.end_date);
            log::info!("deposit on {} lies beyond {}, recording it standalone", deposit_date, horizon);
            balance = self.split_deposit_month(
                &mut entries,
                params,
                Period::inclusive(since, deposit_date),
                balance,
                amount,
            );
            month_index += 1;
        }

        log::info!(
            "direct deposit of {} on {} produced {} entries",
            amount,
            deposit_date,
            entries.len()
        );

        Ok(DepositWalk {
            entries,
            resume: BuildSeed {
                period_start: first_of_next_month(deposit_date),
                opening_balance: balance,
                month_index,
                opening_row: false,
            },
        })
    }

    /// push the deposit row and, unless it lands on the month end, the remainder row
    ///
    /// Returns the balance carried out of the deposit month.
    fn split_deposit_month(
        &self,
        entries: &mut Vec<ScheduleEntry>,
        params: &LoanParameters,
        to_deposit: Period,
        opening_balance: Money,
        amount: Money,
    ) -> Money {
        let mut deposit = self.accrual.accrue_entry(
            opening_balance,
            params.interest_rate,
            Money::ZERO,
            amount,
            &to_deposit,
            EntryKind::DirectDeposit,
        );
        deposit.is_direct_deposit = Some(true);
        let mut balance = deposit.closing_balance;
        entries.push(deposit);

        let end_date = month_end(to_deposit.end);
        if to_deposit.end < end_date {
            let mut remainder = self.accrual.accrue_entry(
                balance,
                params.interest_rate,
                params.service_fee,
                Money::ZERO,
                &Period::elapsed(to_deposit.end, end_date),
                EntryKind::PostDeposit,
            );
            remainder.is_direct_deposit = Some(false);
            balance = remainder.closing_balance;
            entries.push(remainder);
        }

        balance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn params() -> LoanParameters {
        LoanParameters::new(
            Money::from_major(10_000),
            Rate::from_percentage(12),
            Money::from_major(20),
            date(2024, 1, 15),
        )
    }

    fn base_schedule() -> Vec<ScheduleEntry> {
        let plan = RepaymentPlan::level(Money::from_major(500), 12);
        // opening, jan, feb, mar, apr, may, jun
        ScheduleBuilder::new(AccrualEngine::default()).build(&params(), &plan, date(2024, 6, 10))
    }

    fn inject(entries: &mut Vec<ScheduleEntry>, on: NaiveDate, anchor: usize) -> Result<()> {
        EventInjector::new(AccrualEngine::default()).inject_mid_month(
            entries,
            &params(),
            on,
            Money::from_major(1_000),
            Money::ZERO,
            None,
            anchor,
        )
    }

    #[test]
    fn test_date_equal_to_anchor_rejected() {
        let mut entries = base_schedule();
        let before = entries.clone();

        let err = inject(&mut entries, date(2024, 2, 29), 2).unwrap_err();

        assert!(matches!(
            err,
            ScheduleError::TransactionDateOutOfOrder {
                bound: DateBound::Anchor,
                ..
            }
        ));
        assert_eq!(err.to_string(), "Transaction date must be after the selected row date");
        assert_eq!(entries, before);
    }

    #[test]
    fn test_date_equal_to_next_rejected() {
        let mut entries = base_schedule();
        let before = entries.clone();

        let err = inject(&mut entries, date(2024, 3, 31), 2).unwrap_err();

        assert!(matches!(
            err,
            ScheduleError::TransactionDateOutOfOrder {
                bound: DateBound::Next,
                ..
            }
        ));
        assert_eq!(entries, before);
    }

    #[test]
    fn test_dates_just_inside_bounds_accepted() {
        let mut entries = base_schedule();
        inject(&mut entries, date(2024, 3, 1), 2).unwrap();
        assert_eq!(entries.len(), 8);

        let mut entries = base_schedule();
        inject(&mut entries, date(2024, 3, 30), 2).unwrap();
        assert_eq!(entries[3].end_date, date(2024, 3, 30));
    }

    #[test]
    fn test_anchor_out_of_range() {
        let mut entries = base_schedule();
        let err = inject(&mut entries, date(2024, 9, 10), 7).unwrap_err();
        assert!(matches!(err, ScheduleError::AnchorOutOfRange { index: 7, len: 7 }));
    }

    #[test]
    fn test_last_row_anchor_has_no_upper_bound() {
        let mut entries = base_schedule();
        inject(&mut entries, date(2024, 7, 12), 6).unwrap();
        assert_eq!(entries.len(), 8);
        assert_eq!(entries[7].kind, EntryKind::MidMonthRepayment);
    }

    #[test]
    fn test_injected_row_uses_day_of_month() {
        let mut entries = base_schedule();
        let anchor_closing = entries[2].closing_balance;

        inject(&mut entries, date(2024, 3, 10), 2).unwrap();

        let injected = &entries[3];
        assert_eq!(injected.kind, EntryKind::MidMonthRepayment);
        assert_eq!(injected.days, 10);
        assert_eq!(injected.opening_balance, anchor_closing);
        assert_eq!(injected.repayment, Money::from_major(1_000));
        assert_eq!(injected.service_fee, Money::ZERO);
    }

    #[test]
    fn test_rate_override_applies_only_to_injected_row() {
        let mut entries = base_schedule();
        let injector = EventInjector::new(AccrualEngine::default());

        injector
            .inject_mid_month(
                &mut entries,
                &params(),
                date(2024, 3, 10),
                Money::from_major(1_000),
                Money::from_major(5),
                Some(Rate::ZERO),
                2,
            )
            .unwrap();

        assert_eq!(entries[3].interest, Money::ZERO);
        assert_eq!(entries[3].service_fee, Money::from_major(5));
        assert!(entries[4].interest.is_positive());
    }

    #[test]
    fn test_cascade_keeps_repayments_and_chains_balances() {
        let mut entries = base_schedule();
        let repayments: Vec<Money> = entries[3..].iter().map(|e| e.repayment).collect();

        inject(&mut entries, date(2024, 3, 10), 2).unwrap();

        let after: Vec<Money> = entries[4..].iter().map(|e| e.repayment).collect();
        assert_eq!(after, repayments);

        for pair in entries[3..].windows(2) {
            assert_eq!(pair[0].closing_balance, pair[1].opening_balance);
        }
        // march 10 -> march 31 is 21 elapsed days
        assert_eq!(entries[4].days, 21);
        assert_eq!(entries[5].days, 30);
        for entry in &entries[4..] {
            assert_eq!(entry.closing_balance, entry.expected_closing());
        }
    }

    #[test]
    fn test_standalone_mid_month_uses_elapsed_days() {
        let injector = EventInjector::new(AccrualEngine::default());
        let entry = injector.standalone_mid_month(
            &params(),
            date(2024, 2, 14),
            Money::from_major(200),
            Money::ZERO,
            None,
        );

        assert_eq!(entry.days, 30);
        assert_eq!(entry.opening_balance, Money::from_major(10_000));
        assert_eq!(entry.interest.display(2), "98.63");
    }

    #[test]
    fn test_deposit_splits_its_month() {
        let injector = EventInjector::new(AccrualEngine::default());
        let plan = RepaymentPlan::level(Money::from_major(500), 12);

        let walk = injector
            .direct_deposit(&params(), &plan, date(2024, 3, 10), Money::from_major(2_000), date(2024, 12, 31))
            .unwrap();

        let kinds: Vec<EntryKind> = walk.entries.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                EntryKind::Opening,
                EntryKind::Monthly,
                EntryKind::Monthly,
                EntryKind::DirectDeposit,
                EntryKind::PostDeposit
            ]
        );

        assert_eq!(walk.entries[0].closing_balance, Money::from_major(10_000));
        assert_eq!(walk.entries[0].is_direct_deposit, Some(false));

        // jan 15..31 inclusive, then all of february
        assert_eq!(walk.entries[1].days, 17);
        assert_eq!(walk.entries[1].repayment, Money::from_major(500));
        assert_eq!(walk.entries[2].days, 29);

        let deposit = &walk.entries[3];
        assert_eq!(deposit.days, 10);
        assert_eq!(deposit.service_fee, Money::ZERO);
        assert_eq!(deposit.repayment, Money::from_major(2_000));
        assert_eq!(deposit.is_direct_deposit, Some(true));

        let remainder = &walk.entries[4];
        assert_eq!(remainder.days, 21);
        assert_eq!(remainder.repayment, Money::ZERO);
        assert_eq!(remainder.service_fee, Money::from_major(20));
        assert_eq!(remainder.is_direct_deposit, Some(false));
        assert_eq!(remainder.opening_balance, deposit.closing_balance);

        assert_eq!(walk.resume.period_start, date(2024, 4, 1));
        assert_eq!(walk.resume.month_index, 3);
        assert_eq!(walk.resume.opening_balance, remainder.closing_balance);
        assert!(!walk.resume.opening_row);
    }

    #[test]
    fn test_deposit_on_month_end_has_no_remainder() {
        let injector = EventInjector::new(AccrualEngine::default());

        let walk = injector
            .direct_deposit(
                &params(),
                &RepaymentPlan::zeros(12),
                date(2024, 1, 31),
                Money::from_major(1_000),
                date(2024, 12, 31),
            )
            .unwrap();

        assert_eq!(walk.entries.len(), 2);
        assert_eq!(walk.entries[1].days, 17);
        assert_eq!(walk.resume.period_start, date(2024, 2, 1));
        assert_eq!(walk.resume.month_index, 1);
    }

    #[test]
    fn test_deposit_beyond_horizon_is_standalone() {
        let injector = EventInjector::new(AccrualEngine::default());

        let walk = injector
            .direct_deposit(
                &params(),
                &RepaymentPlan::zeros(12),
                date(2024, 4, 10),
                Money::from_major(1_000),
                date(2024, 2, 29),
            )
            .unwrap();

        assert_eq!(walk.entries.len(), 5);
        let deposit = &walk.entries[3];
        assert_eq!(deposit.kind, EntryKind::DirectDeposit);
        assert_eq!(deposit.end_date, date(2024, 4, 10));
        // feb 29 .. apr 10 counted inclusively
        assert_eq!(deposit.days, 42);
        assert_eq!(walk.entries[4].end_date, date(2024, 4, 30));
        assert_eq!(walk.entries[4].days, 20);
    }

    #[test]
    fn test_deposit_before_start_rejected() {
        let injector = EventInjector::new(AccrualEngine::default());
        let err = injector
            .direct_deposit(
                &params(),
                &RepaymentPlan::zeros(12),
                date(2024, 1, 2),
                Money::from_major(1_000),
                date(2024, 12, 31),
            )
            .unwrap_err();

        assert!(matches!(err, ScheduleError::DepositBeforeStart { .. }));
        assert!(err.is_validation());
    }
}
