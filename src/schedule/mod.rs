pub mod builder;
pub mod injection;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::month_end;
use crate::config::EngineConfig;
use crate::decimal::Money;
use crate::errors::{Result, ScheduleError};
use crate::events::Event;
use crate::interest::AccrualEngine;
use crate::projection::{Projection, SettlementProjector};
use crate::types::{LoanParameters, RepaymentPlan, ScheduleEntry};

pub use builder::{BuildSeed, ScheduleBuilder};
pub use injection::{DepositWalk, EventInjector};

/// ordered schedule plus its settlement projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub entries: Vec<ScheduleEntry>,
    pub projection: Projection,
}

impl Schedule {
    /// closing balance of the last entry, if any
    pub fn closing_balance(&self) -> Option<Money> {
        self.entries.last().map(|entry| entry.closing_balance)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// insert keeping `end_date` order; on a tie event-derived entries go first
pub fn insert_ordered(entries: &mut Vec<ScheduleEntry>, entry: ScheduleEntry) {
    let position = entries.partition_point(|existing| {
        existing.end_date < entry.end_date
            || (existing.end_date == entry.end_date && !entry.kind.is_event_derived())
    });
    entries.insert(position, entry);
}

/// schedule engine: builder, injector and projector behind one call
#[derive(Debug, Clone)]
pub struct ScheduleEngine {
    config: EngineConfig,
    builder: ScheduleBuilder,
    injector: EventInjector,
    projector: SettlementProjector,
}

impl ScheduleEngine {
    pub fn new(config: EngineConfig) -> Self {
        let accrual = AccrualEngine::from_config(&config.accrual);
        Self {
            builder: ScheduleBuilder::new(accrual.clone()),
            injector: EventInjector::new(accrual.clone()),
            projector: SettlementProjector::new(accrual, &config.projection),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn projector(&self) -> &SettlementProjector {
        &self.projector
    }

    /// ordered entries from the start date through the as-of month end, with `event` applied
    pub fn build_entries(
        &self,
        params: &LoanParameters,
        plan: &RepaymentPlan,
        event: Option<&Event>,
        as_of: NaiveDate,
    ) -> Result<Vec<ScheduleEntry>> {
        match event {
            None => Ok(self.builder.build(params, plan, as_of)),
            Some(Event::MidMonthRepayment {
                date,
                amount,
                service_fee,
                rate_override,
                anchor_index,
            }) => {
                let mut entries = self.builder.build(params, plan, as_of);
                if entries.is_empty() {
                    log::info!("no rows before {}, recording mid-month repayment standalone", date);
                    entries.push(self.injector.standalone_mid_month(
                        params,
                        *date,
                        *amount,
                        *service_fee,
                        *rate_override,
                    ));
                } else {
                    self.injector.inject_mid_month(
                        &mut entries,
                        params,
                        *date,
                        *amount,
                        *service_fee,
                        *rate_override,
                        *anchor_index,
                    )?;
                }
                Ok(entries)
            }
            Some(Event::DirectDeposit { date, amount }) => {
                let walk = self
                    .injector
                    .direct_deposit(params, plan, *date, *amount, month_end(as_of))?;

                let mut entries = walk.entries;
                for entry in self.builder.build_from(params, plan, walk.resume, as_of) {
                    insert_ordered(&mut entries, entry);
                }
                Ok(entries)
            }
        }
    }

    /// build the schedule and project settlement from its final balance
    pub fn run(
        &self,
        params: &LoanParameters,
        plan: &RepaymentPlan,
        event: Option<&Event>,
        as_of: NaiveDate,
    ) -> Result<Schedule> {
        let entries = self.build_entries(params, plan, event, as_of)?;
        let balance = entries
            .last()
            .map_or(params.initial_balance, |entry| entry.closing_balance);

        let projection = match plan.last_positive() {
            Some(repayment) => self
                .projector
                .project(balance, params.interest_rate, params.service_fee, repayment),
            None => Projection::no_repayment_entered(balance),
        };

        log::info!(
            "schedule of {} entries as of {}{}: {}",
            entries.len(),
            as_of,
            event.map_or(String::new(), |e| format!(" with {}", e.label())),
            projection
        );

        Ok(Schedule { entries, projection })
    }

    /// reject requests carrying more than one event
    pub fn single_event(mid_month: Option<Event>, deposit: Option<Event>) -> Result<Option<Event>> {
        match (mid_month, deposit) {
            (Some(_), Some(_)) => Err(ScheduleError::ConflictingEvents),
            (event, None) | (None, event) => Ok(event),
        }
    }
}

impl Default for ScheduleEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Rate;
    use crate::projection::ProjectionOutcome;
    use crate::types::EntryKind;

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

    fn plan() -> RepaymentPlan {
        RepaymentPlan::level(Money::from_major(500), 12)
    }

    #[test]
    fn test_run_without_event() {
        let engine = ScheduleEngine::default();
        let schedule = engine.run(&params(), &plan(), None, date(2024, 12, 5)).unwrap();

        assert_eq!(schedule.len(), 13);
        assert_eq!(schedule.entries[0].kind, EntryKind::Opening);
        assert!(schedule.projection.settles());
    }

    #[test]
    fn test_projection_starts_from_final_balance() {
        let engine = ScheduleEngine::default();
        let schedule = engine.run(&params(), &plan(), None, date(2024, 12, 5)).unwrap();
        let closing = schedule.closing_balance().unwrap();

        let expected = engine.projector().project(
            closing,
            Rate::from_percentage(12),
            Money::from_major(20),
            Money::from_major(500),
        );
        assert_eq!(schedule.projection, expected);
    }

    #[test]
    fn test_plan_without_repayments() {
        let engine = ScheduleEngine::default();
        let schedule = engine
            .run(&params(), &RepaymentPlan::zeros(12), None, date(2024, 3, 1))
            .unwrap();

        assert_eq!(schedule.projection.outcome, ProjectionOutcome::NoRepaymentEntered);
        assert_eq!(schedule.projection.to_string(), "No repayment entered yet");
    }

    #[test]
    fn test_direct_deposit_continues_monthly() {
        let engine = ScheduleEngine::default();
        let event = Event::DirectDeposit {
            date: date(2024, 3, 10),
            amount: Money::from_major(2_000),
        };

        let entries = engine
            .build_entries(&params(), &plan(), Some(&event), date(2024, 6, 15))
            .unwrap();

        // opening, jan, feb, deposit, remainder, apr, may, jun
        assert_eq!(entries.len(), 8);
        assert_eq!(entries[5].end_date, date(2024, 4, 30));
        assert_eq!(entries[5].kind, EntryKind::Monthly);
        assert_eq!(entries[5].opening_balance, entries[4].closing_balance);
        assert_eq!(entries[5].repayment, Money::from_major(500));
        assert_eq!(entries[5].is_direct_deposit, None);
        for pair in entries.windows(2) {
            assert!(pair[0].end_date <= pair[1].end_date);
            assert_eq!(pair[0].closing_balance, pair[1].opening_balance);
        }
    }

    #[test]
    fn test_mid_month_on_empty_schedule() {
        let engine = ScheduleEngine::default();
        let event = Event::MidMonthRepayment {
            date: date(2024, 2, 14),
            amount: Money::from_major(100),
            service_fee: Money::ZERO,
            rate_override: None,
            anchor_index: 0,
        };

        let entries = engine
            .build_entries(&params(), &plan(), Some(&event), date(2023, 11, 1))
            .unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, EntryKind::MidMonthRepayment);
        assert_eq!(entries[0].days, 30);
    }

    #[test]
    fn test_rejected_event_fails_the_run() {
        let engine = ScheduleEngine::default();
        let event = Event::MidMonthRepayment {
            date: date(2024, 1, 31),
            amount: Money::from_major(100),
            service_fee: Money::ZERO,
            rate_override: None,
            anchor_index: 0,
        };

        let err = engine.run(&params(), &plan(), Some(&event), date(2024, 6, 1)).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_insert_ordered_puts_event_first_on_tie() {
        let engine = ScheduleEngine::default();
        let mut entries = engine.build_entries(&params(), &plan(), None, date(2024, 3, 1)).unwrap();
        let mut event_entry = entries[1].clone();
        event_entry.kind = EntryKind::DirectDeposit;

        insert_ordered(&mut entries, event_entry);
        assert_eq!(entries[1].kind, EntryKind::DirectDeposit);
        assert_eq!(entries[2].kind, EntryKind::Monthly);

        let mut monthly = entries[2].clone();
        monthly.opening_balance = Money::ZERO;
        insert_ordered(&mut entries, monthly);
        assert_eq!(entries[3].opening_balance, Money::ZERO);
        assert_eq!(entries.len(), 6);
    }

    #[test]
    fn test_single_event() {
        let deposit = Event::DirectDeposit {
            date: date(2024, 3, 10),
            amount: Money::from_major(1),
        };
        assert!(ScheduleEngine::single_event(None, None).unwrap().is_none());
        assert_eq!(
            ScheduleEngine::single_event(None, Some(deposit.clone())).unwrap(),
            Some(deposit.clone())
        );
        assert!(matches!(
            ScheduleEngine::single_event(Some(deposit.clone()), Some(deposit)),
            Err(ScheduleError::ConflictingEvents)
        ));
    }
}
