//! JSON wire types and their validation into engine inputs
//!
//! Numeric fields are accepted either as JSON numbers or as numeric strings.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

use crate::calendar::{parse_iso_date, ISO_DATE};
use crate::decimal::{Money, Rate};
use crate::errors::{Result, ScheduleError};
use crate::events::Event;
use crate::presenter::{EntryView, PreviewRowView, ProjectionRowView};
use crate::schedule::ScheduleEngine;
use crate::types::{LoanParameters, RepaymentPlan};

/// schedule calculation request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalculationRequest {
    #[serde(default)]
    pub client_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_balance: Option<Value>,
    /// percent per annum
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interest_rate: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_fee: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default)]
    pub repayments: Vec<Value>,

    #[serde(default)]
    pub is_mid_month_transaction: bool,
    #[serde(rename = "midMonth_date", default, skip_serializing_if = "Option::is_none")]
    pub mid_month_date: Option<String>,
    #[serde(rename = "midMonth_amount", default, skip_serializing_if = "Option::is_none")]
    pub mid_month_amount: Option<Value>,
    #[serde(rename = "midMonth_service_fee", default, skip_serializing_if = "Option::is_none")]
    pub mid_month_service_fee: Option<Value>,
    #[serde(rename = "midMonth_interest_rate", default, skip_serializing_if = "Option::is_none")]
    pub mid_month_interest_rate: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month_index: Option<Value>,

    #[serde(default)]
    pub is_direct_deposit: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deposit_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deposit_amount: Option<Value>,

    #[serde(default)]
    pub download: bool,
}

fn parse_decimal(field: &'static str, value: &Value) -> Result<Decimal> {
    let invalid = || ScheduleError::InvalidNumber {
        field,
        value: value.to_string(),
    };

    let raw = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return Err(invalid()),
    };

    Decimal::from_str(&raw)
        .or_else(|_| Decimal::from_scientific(&raw))
        .map_err(|_| invalid())
}

fn required<'a>(field: &'static str, value: &'a Option<Value>) -> Result<&'a Value> {
    match value {
        None | Some(Value::Null) => Err(ScheduleError::MissingField { field }),
        Some(value) => Ok(value),
    }
}

fn optional_decimal(field: &'static str, value: &Option<Value>) -> Result<Option<Decimal>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(value) => parse_decimal(field, value).map(Some),
    }
}

fn required_money(field: &'static str, value: &Option<Value>) -> Result<Money> {
    parse_decimal(field, required(field, value)?).map(Money::from_decimal)
}

fn required_rate(field: &'static str, value: &Option<Value>) -> Result<Rate> {
    parse_decimal(field, required(field, value)?).map(Rate::from_percent)
}

fn required_date(field: &'static str, value: &Option<String>) -> Result<chrono::NaiveDate> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Err(ScheduleError::MissingField { field }),
        Some(raw) => parse_iso_date(field, raw),
    }
}

fn required_index(field: &'static str, value: &Option<Value>) -> Result<usize> {
    let raw = required(field, value)?;
    let index = parse_decimal(field, raw)?;
    if !index.fract().is_zero() {
        return Err(ScheduleError::InvalidNumber {
            field,
            value: raw.to_string(),
        });
    }
    index.to_usize().ok_or_else(|| ScheduleError::InvalidNumber {
        field,
        value: raw.to_string(),
    })
}

impl CalculationRequest {
    pub fn client_name(&self) -> &str {
        self.client_name.trim()
    }

    pub fn is_download(&self) -> bool {
        self.download
    }

    pub fn loan_parameters(&self) -> Result<LoanParameters> {
        let initial_balance = required_money("initial_balance", &self.initial_balance)?;
        let interest_rate = required_rate("interest_rate", &self.interest_rate)?;
        let service_fee = required_money("service_fee", &self.service_fee)?;

        let start_date = match self.start_date.as_deref().map(str::trim) {
            None | Some("") => return Err(ScheduleError::MissingStartDate),
            Some(raw) => chrono::NaiveDate::parse_from_str(raw, ISO_DATE).map_err(|_| {
                ScheduleError::InvalidStartDate {
                    value: raw.to_string(),
                }
            })?,
        };

        Ok(LoanParameters::new(initial_balance, interest_rate, service_fee, start_date))
    }

    /// repayment amounts, or `default_months` zeros when none were sent
    pub fn repayment_plan(&self, default_months: usize) -> Result<RepaymentPlan> {
        if self.repayments.is_empty() {
            return Ok(RepaymentPlan::zeros(default_months));
        }

        self.repayments
            .iter()
            .map(|value| parse_decimal("repayments", value).map(Money::from_decimal))
            .collect::<Result<Vec<_>>>()
            .map(RepaymentPlan::new)
    }

    /// the single event this request carries, if any
    pub fn event(&self) -> Result<Option<Event>> {
        let mid_month = if self.is_mid_month_transaction {
            Some(Event::MidMonthRepayment {
                date: required_date("midMonth_date", &self.mid_month_date)?,
                amount: required_money("midMonth_amount", &self.mid_month_amount)?,
                service_fee: optional_decimal("midMonth_service_fee", &self.mid_month_service_fee)?
                    .map_or(Money::ZERO, Money::from_decimal),
                rate_override: optional_decimal("midMonth_interest_rate", &self.mid_month_interest_rate)?
                    .map(Rate::from_percent),
                anchor_index: required_index("month_index", &self.month_index)?,
            })
        } else {
            None
        };

        let deposit = if self.is_direct_deposit {
            Some(Event::DirectDeposit {
                date: required_date("deposit_date", &self.deposit_date)?,
                amount: required_money("deposit_amount", &self.deposit_amount)?,
            })
        } else {
            None
        };

        ScheduleEngine::single_event(mid_month, deposit)
    }
}

/// non-download calculation response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResponse {
    pub client_name: String,
    pub months: Vec<EntryView>,
    pub calculated_at: String,
    pub projection: String,
}

/// validated projector inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectionInputs {
    pub balance: Money,
    pub rate: Rate,
    pub service_fee: Money,
    pub repayment: Money,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectionRequest {
    #[serde(default)]
    pub current_balance: Option<Value>,
    #[serde(default)]
    pub monthly_repayment: Option<Value>,
    #[serde(default)]
    pub interest_rate: Option<Value>,
    #[serde(default)]
    pub service_fee: Option<Value>,
}

impl ProjectionRequest {
    pub fn inputs(&self) -> Result<ProjectionInputs> {
        Ok(ProjectionInputs {
            balance: required_money("current_balance", &self.current_balance)?,
            rate: required_rate("interest_rate", &self.interest_rate)?,
            service_fee: required_money("service_fee", &self.service_fee)?,
            repayment: required_money("monthly_repayment", &self.monthly_repayment)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionResponse {
    pub projection: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedProjectionResponse {
    pub projections: Vec<ProjectionRowView>,
}

/// short preview request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreviewRequest {
    #[serde(default)]
    pub initial_balance: Option<Value>,
    #[serde(default)]
    pub interest_rate: Option<Value>,
    #[serde(default)]
    pub service_fee: Option<Value>,
    #[serde(default)]
    pub monthly_repayment: Option<Value>,
}

impl PreviewRequest {
    pub fn inputs(&self) -> Result<ProjectionInputs> {
        Ok(ProjectionInputs {
            balance: required_money("initial_balance", &self.initial_balance)?,
            rate: required_rate("interest_rate", &self.interest_rate)?,
            service_fee: required_money("service_fee", &self.service_fee)?,
            repayment: required_money("monthly_repayment", &self.monthly_repayment)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewResponse {
    pub success: bool,
    pub months: Vec<PreviewRowView>,
}
