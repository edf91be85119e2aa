use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::ProjectionConfig;
use crate::decimal::{Money, Rate};
use crate::interest::AccrualEngine;

/// how a forward simulation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectionOutcome {
    /// the plan holds no positive repayment, nothing was simulated
    NoRepaymentEntered,
    /// the steady repayment is zero or negative
    NoRepayment,
    /// a month's interest met or exceeded the repayment
    InterestExceedsRepayment,
    /// balance reached zero or below; `refund` is the overshoot
    Settles { months: u32, refund: Money },
    /// still owing after `cap_months`
    CapReached { cap_months: u32 },
}

impl fmt::Display for ProjectionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectionOutcome::NoRepaymentEntered => write!(f, "No repayment entered yet"),
            ProjectionOutcome::NoRepayment => write!(f, "Loan will not settle - no repayment"),
            ProjectionOutcome::InterestExceedsRepayment => {
                write!(f, "Loan will not settle - repayment less than monthly interest")
            }
            ProjectionOutcome::Settles { months, refund } => write!(
                f,
                "Loan will settle in {} months with a refund of ${}",
                months,
                refund.display(2)
            ),
            ProjectionOutcome::CapReached { cap_months } if cap_months % 12 == 0 => {
                write!(f, "Loan will not settle within {} years", cap_months / 12)
            }
            ProjectionOutcome::CapReached { cap_months } => {
                write!(f, "Loan will not settle within {} months", cap_months)
            }
        }
    }
}

/// settlement projection summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Projection {
    pub outcome: ProjectionOutcome,
    /// simulated months completed
    pub months_elapsed: u32,
    pub final_balance: Money,
}

impl Projection {
    pub fn no_repayment_entered(balance: Money) -> Self {
        Self {
            outcome: ProjectionOutcome::NoRepaymentEntered,
            months_elapsed: 0,
            final_balance: balance,
        }
    }

    pub fn settles(&self) -> bool {
        matches!(self.outcome, ProjectionOutcome::Settles { .. })
    }

    pub fn message(&self) -> String {
        self.outcome.to_string()
    }
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.outcome.fmt(f)
    }
}

/// one simulated month of a detailed projection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionRow {
    pub month: u32,
    pub opening_balance: Money,
    pub interest: Money,
    pub service_fee: Money,
    pub repayment: Money,
    pub closing_balance: Money,
}

/// per-month trace plus the summary it leads to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedProjection {
    pub rows: Vec<ProjectionRow>,
    pub projection: Projection,
}

/// one row of the short preview
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewRow {
    pub month: u32,
    pub balance: Money,
    pub interest: Money,
}

/// settlement projector
///
/// Simulates a steady repayment forward using a fixed day count per month,
/// independent of the calendar.
#[derive(Debug, Clone)]
pub struct SettlementProjector {
    accrual: AccrualEngine,
    max_months: u32,
    days_per_month: i64,
    preview_months: u32,
}

impl SettlementProjector {
    pub fn new(accrual: AccrualEngine, config: &ProjectionConfig) -> Self {
        Self {
            accrual,
            max_months: config.max_months,
            days_per_month: config.days_per_month as i64,
            preview_months: config.preview_months,
        }
    }

    /// months until settlement, as a summary
    pub fn project(&self, balance: Money, rate: Rate, service_fee: Money, repayment: Money) -> Projection {
        self.simulate(balance, rate, service_fee, repayment, |_| {})
    }

    /// same simulation, keeping every month
    pub fn project_detailed(
        &self,
        balance: Money,
        rate: Rate,
        service_fee: Money,
        repayment: Money,
    ) -> DetailedProjection {
        let mut rows = Vec::new();
        let projection = self.simulate(balance, rate, service_fee, repayment, |row| rows.push(row));
        DetailedProjection { rows, projection }
    }

    /// short balance preview, up to the configured number of months
    ///
    /// Stops once the balance reaches zero; accepts any repayment, including zero.
    pub fn preview(&self, balance: Money, rate: Rate, service_fee: Money, repayment: Money) -> Vec<PreviewRow> {
        let mut rows = Vec::new();
        let mut balance = balance;
        let mut month = 1;

        while balance.is_positive() && month <= self.preview_months {
            let interest = self.monthly_interest(balance, rate);
            balance = balance + interest + service_fee - repayment;

            rows.push(PreviewRow {
                month,
                balance,
                interest,
            });
            month += 1;
        }

        rows
    }

    fn monthly_interest(&self, balance: Money, rate: Rate) -> Money {
        self.accrual.interest_for_days(balance, rate, self.days_per_month)
    }

    fn simulate(
        &self,
        balance: Money,
        rate: Rate,
        service_fee: Money,
        repayment: Money,
        mut on_month: impl FnMut(ProjectionRow),
    ) -> Projection {
        if !repayment.is_positive() {
            log::warn!("projection skipped: repayment {} is not positive", repayment);
            return Projection {
                outcome: ProjectionOutcome::NoRepayment,
                months_elapsed: 0,
                final_balance: balance,
            };
        }

        let mut balance = balance;
        let mut months = 0;

        while balance.is_positive() && months < self.max_months {
            let interest = self.monthly_interest(balance, rate);
            if repayment <= interest {
                log::warn!(
                    "projection diverges after {} months: interest {} covers repayment {}",
                    months,
                    interest,
                    repayment
                );
                return Projection {
                    outcome: ProjectionOutcome::InterestExceedsRepayment,
                    months_elapsed: months,
                    final_balance: balance,
                };
            }

            let closing_balance = balance + interest + service_fee - repayment;
            months += 1;
            on_month(ProjectionRow {
                month: months,
                opening_balance: balance,
                interest,
                service_fee,
                repayment,
                closing_balance,
            });
            balance = closing_balance;
        }

        let outcome = if balance.is_positive() {
            ProjectionOutcome::CapReached {
                cap_months: self.max_months,
            }
        } else {
            ProjectionOutcome::Settles {
                months,
                refund: balance.abs(),
            }
        };

        log::info!("projection after {} months: {}", months, outcome);

        Projection {
            outcome,
            months_elapsed: months,
            final_balance: balance,
        }
    }
}

impl Default for SettlementProjector {
    fn default() -> Self {
        Self::new(AccrualEngine::default(), &ProjectionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_zero_repayment_is_not_simulated() {
        let projector = SettlementProjector::default();
        let projection = projector.project(Money::from_major(5_000), Rate::from_percentage(12), Money::ZERO, Money::ZERO);

        assert_eq!(projection.outcome, ProjectionOutcome::NoRepayment);
        assert_eq!(projection.months_elapsed, 0);
        assert_eq!(projection.to_string(), "Loan will not settle - no repayment");
    }

    #[test]
    fn test_interest_exceeding_repayment_stops_at_zero_months() {
        let projector = SettlementProjector::default();
        // 30 days on 100000 at 24% is about 1972.60
        let projection = projector.project(
            Money::from_major(100_000),
            Rate::from_percentage(24),
            Money::ZERO,
            Money::from_major(1_000),
        );

        assert_eq!(projection.outcome, ProjectionOutcome::InterestExceedsRepayment);
        assert_eq!(projection.months_elapsed, 0);
        assert_eq!(
            projection.to_string(),
            "Loan will not settle - repayment less than monthly interest"
        );
    }

    #[test]
    fn test_cap_reached_after_exactly_max_months() {
        let projector = SettlementProjector::default();
        // interest starts at 98.63 and falls slowly; 100 a month never clears 10000 in 10 years
        let detailed = projector.project_detailed(
            Money::from_major(10_000),
            Rate::from_percentage(12),
            Money::ZERO,
            Money::from_major(100),
        );

        assert_eq!(detailed.rows.len(), 120);
        assert_eq!(detailed.projection.months_elapsed, 120);
        assert_eq!(detailed.projection.outcome, ProjectionOutcome::CapReached { cap_months: 120 });
        assert_eq!(detailed.projection.to_string(), "Loan will not settle within 10 years");
        assert!(detailed.projection.final_balance.is_positive());
    }

    #[test]
    fn test_settles_with_refund() {
        let projector = SettlementProjector::default();
        let projection = projector.project(
            Money::from_major(1_000),
            Rate::ZERO,
            Money::from_major(10),
            Money::from_major(300),
        );

        // 1000 -> 710 -> 420 -> 130 -> -160
        assert_eq!(projection.months_elapsed, 4);
        assert_eq!(
            projection.outcome,
            ProjectionOutcome::Settles {
                months: 4,
                refund: Money::from_major(160)
            }
        );
        assert_eq!(projection.to_string(), "Loan will settle in 4 months with a refund of $160.00");
        assert!(projection.settles());
    }

    #[test]
    fn test_detailed_rows_match_summary() {
        let projector = SettlementProjector::default();
        let balance = Money::from_decimal(dec!(2500));
        let rate = Rate::from_percent(dec!(18.5));
        let fee = Money::from_major(15);
        let repayment = Money::from_major(400);

        let summary = projector.project(balance, rate, fee, repayment);
        let detailed = projector.project_detailed(balance, rate, fee, repayment);

        assert_eq!(detailed.projection, summary);
        assert_eq!(detailed.rows.len() as u32, summary.months_elapsed);
        for pair in detailed.rows.windows(2) {
            assert_eq!(pair[0].closing_balance, pair[1].opening_balance);
        }
        let last = detailed.rows.last().unwrap();
        assert!(!last.closing_balance.is_positive());
    }

    #[test]
    fn test_already_settled_balance() {
        let projector = SettlementProjector::default();
        let projection = projector.project(
            Money::from_major(-50),
            Rate::from_percentage(12),
            Money::ZERO,
            Money::from_major(100),
        );

        assert_eq!(projection.months_elapsed, 0);
        assert_eq!(projection.to_string(), "Loan will settle in 0 months with a refund of $50.00");
    }

    #[test]
    fn test_cap_message_for_partial_years() {
        let outcome = ProjectionOutcome::CapReached { cap_months: 18 };
        assert_eq!(outcome.to_string(), "Loan will not settle within 18 months");
        let outcome = ProjectionOutcome::CapReached { cap_months: 24 };
        assert_eq!(outcome.to_string(), "Loan will not settle within 2 years");
    }

    #[test]
    fn test_preview_is_capped_and_stops_when_paid() {
        let projector = SettlementProjector::default();

        let rows = projector.preview(Money::from_major(10_000), Rate::from_percentage(12), Money::ZERO, Money::ZERO);
        assert_eq!(rows.len(), 12);
        assert!(rows[11].balance > rows[0].balance);

        let rows = projector.preview(Money::from_major(1_000), Rate::ZERO, Money::ZERO, Money::from_major(400));
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2].balance, Money::from_major(-200));
    }
}
