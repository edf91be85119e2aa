use chrono::{DateTime, NaiveDate, Utc};
use csv::WriterBuilder;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::config::PresentationConfig;
use crate::decimal::Money;
use crate::errors::Result;
use crate::projection::{DetailedProjection, PreviewRow, ProjectionRow};
use crate::types::{EntryKind, ScheduleEntry};

/// tabular export header, in column order
pub const EXPORT_COLUMNS: [&str; 6] = [
    "Month End Date",
    "Opening Balance",
    "Interest",
    "Service Fee",
    "Repayment",
    "Closing Balance",
];

pub const CSV_CONTENT_TYPE: &str = "text/csv";

/// schedule entry as callers see it: rounded, dated "DD Mon YYYY"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryView {
    pub end_date: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub opening_balance: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub interest: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub service_fee: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub repayment: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub closing_balance: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_direct_deposit: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refund_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionRowView {
    pub month: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub opening_balance: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub interest: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub service_fee: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub repayment: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub closing_balance: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewRowView {
    pub month: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub interest: Decimal,
}

/// schedule presenter: rounding, date formatting and csv export
#[derive(Debug, Clone)]
pub struct SchedulePresenter {
    config: PresentationConfig,
}

impl SchedulePresenter {
    pub fn new(config: PresentationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PresentationConfig {
        &self.config
    }

    fn amount(&self, money: Money) -> Decimal {
        money.to_display_decimal(self.config.decimal_places)
    }

    fn amount_text(&self, money: Money) -> String {
        money.display(self.config.decimal_places)
    }

    pub fn format_date(&self, date: NaiveDate) -> String {
        date.format(&self.config.date_format).to_string()
    }

    /// `calculated_at` stamp
    pub fn timestamp(&self, at: DateTime<Utc>) -> String {
        at.format(&self.config.timestamp_format).to_string()
    }

    /// note attached to rows where the client is owed money
    pub fn refund_message(&self, entry: &ScheduleEntry) -> Option<String> {
        entry
            .is_refund()
            .then(|| format!("Client has a refund of ${}", entry.closing_balance.abs().display(2)))
    }

    pub fn entry_view(&self, entry: &ScheduleEntry) -> EntryView {
        let is_direct_deposit = match entry.kind {
            EntryKind::DirectDeposit => Some(true),
            _ => entry.is_direct_deposit,
        };

        EntryView {
            end_date: self.format_date(entry.end_date),
            opening_balance: self.amount(entry.opening_balance),
            interest: self.amount(entry.interest),
            service_fee: self.amount(entry.service_fee),
            repayment: self.amount(entry.repayment),
            closing_balance: self.amount(entry.closing_balance),
            is_direct_deposit,
            refund_message: self.refund_message(entry),
        }
    }

    pub fn entry_views(&self, entries: &[ScheduleEntry]) -> Vec<EntryView> {
        entries.iter().map(|entry| self.entry_view(entry)).collect()
    }

    pub fn projection_rows(&self, detailed: &DetailedProjection) -> Vec<ProjectionRowView> {
        detailed.rows.iter().map(|row| self.projection_row(row)).collect()
    }

    fn projection_row(&self, row: &ProjectionRow) -> ProjectionRowView {
        ProjectionRowView {
            month: row.month,
            opening_balance: self.amount(row.opening_balance),
            interest: self.amount(row.interest),
            service_fee: self.amount(row.service_fee),
            repayment: self.amount(row.repayment),
            closing_balance: self.amount(row.closing_balance),
        }
    }

    pub fn preview_rows(&self, rows: &[PreviewRow]) -> Vec<PreviewRowView> {
        rows.iter()
            .map(|row| PreviewRowView {
                month: row.month,
                balance: self.amount(row.balance),
                interest: self.amount(row.interest),
            })
            .collect()
    }

    /// write the schedule as csv, header first
    pub fn export_csv<W: Write>(&self, entries: &[ScheduleEntry], w: W) -> Result<()> {
        let mut wrt = WriterBuilder::new().from_writer(w);
        wrt.write_record(EXPORT_COLUMNS)?;

        for entry in entries {
            wrt.write_record([
                self.format_date(entry.end_date),
                self.amount_text(entry.opening_balance),
                self.amount_text(entry.interest),
                self.amount_text(entry.service_fee),
                self.amount_text(entry.repayment),
                self.amount_text(entry.closing_balance),
            ])?;
        }

        wrt.flush()?;
        Ok(())
    }

    pub fn export_csv_bytes(&self, entries: &[ScheduleEntry]) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.export_csv(entries, &mut buf)?;
        Ok(buf)
    }

    /// `loan_schedule_{client}_{YYYYmmdd_HHMMSS}.csv`
    pub fn export_filename(&self, client_name: &str, at: DateTime<Utc>) -> String {
        format!("loan_schedule_{}_{}.csv", client_name, at.format("%Y%m%d_%H%M%S"))
    }
}

impl Default for SchedulePresenter {
    fn default() -> Self {
        Self::new(PresentationConfig::default())
    }
}
