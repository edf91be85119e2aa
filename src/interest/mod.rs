pub mod accrual;

use crate::decimal::{Money, Rate};

pub use accrual::{AccrualEngine, DayCount, Period};

/// interest calculation result
#[derive(Debug, Clone, PartialEq)]
pub struct InterestCalculation {
    pub interest_amount: Money,
    pub days: i64,
    pub principal_base: Money,
    pub annual_rate: Rate,
    pub day_count: DayCount,
}

/// trait for interest calculations over a dated period
pub trait InterestCalculator {
    fn calculate_interest(&self, principal: Money, rate: Rate, period: &Period) -> InterestCalculation;
}
