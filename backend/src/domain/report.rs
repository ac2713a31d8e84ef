//! Ledger aggregation and reporting core.
//!
//! This module contains the pure computation behind the report views: the
//! inclusive calendar-day range filter, the decimal aggregator, and the
//! report document builder. Everything here is a function of its inputs;
//! persistence and rendering live elsewhere.
//!
//! ## Pipeline
//!
//! (records, expenses, foreign donations, range)
//!   -> filtered subsets (order preserved)
//!   -> totals (exact decimal sums, balance = donations - expenses + foreign)
//!   -> report document (fixed section order, subtotal footers, summary,
//!      signature placeholders)
//!
//! Amounts accumulate as `Decimal` and are rounded to two places only when
//! rendered into document cells. Foreign amounts are summed at face value,
//! without currency conversion.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

use shared::{
    DateRange, DonationRecord, Expense, ForeignDonation, ReportDocument, ReportSection,
    SignatureLine, SummaryRow, SummarySection, TableSection, Totals,
};

/// Title line of the generated report
pub const REPORT_TITLE: &str = "Donations and Expenses Report";

/// Caption under each signature placeholder
pub const SIGNATURE_CAPTION: &str = "Responsible Signature";

/// Foreign donation descriptions longer than this are shortened with an
/// ellipsis in the export variant
const FOREIGN_DESCRIPTION_LIMIT: usize = 20;

/// Error for a range whose bounds cannot be parsed as dates
#[derive(Debug, Error)]
pub enum RangeError {
    #[error("invalid date range: {0}")]
    InvalidRange(String),
}

/// Parse range bounds given as ISO `YYYY-MM-DD` strings, failing fast on
/// malformed input rather than defaulting silently.
pub fn parse_range(from: &str, to: &str) -> Result<DateRange, RangeError> {
    let from = NaiveDate::parse_from_str(from, "%Y-%m-%d")
        .map_err(|e| RangeError::InvalidRange(format!("from: {}", e)))?;
    let to = NaiveDate::parse_from_str(to, "%Y-%m-%d")
        .map_err(|e| RangeError::InvalidRange(format!("to: {}", e)))?;
    Ok(DateRange::new(from, to))
}

/// An entity carrying its creation timestamp, as seen by the range filter
pub trait Dated {
    fn entry_date(&self) -> DateTime<Utc>;
}

impl Dated for DonationRecord {
    fn entry_date(&self) -> DateTime<Utc> {
        self.date
    }
}

impl Dated for Expense {
    fn entry_date(&self) -> DateTime<Utc> {
        self.date
    }
}

impl Dated for ForeignDonation {
    fn entry_date(&self) -> DateTime<Utc> {
        self.date
    }
}

/// Select the entities whose calendar date falls within the range,
/// inclusive on both ends. Time of day is discarded before comparison, so
/// an entry at 23:59 on the `to` date is still included. Input order is
/// preserved; an inverted range yields an empty result.
pub fn filter_by_range<T: Dated + Clone>(items: &[T], range: &DateRange) -> Vec<T> {
    items
        .iter()
        .filter(|item| {
            let day = item.entry_date().date_naive();
            day >= range.from && day <= range.to
        })
        .cloned()
        .collect()
}

/// Sum each filtered collection and derive the combined balance.
/// Accumulation stays in `Decimal`; nothing is rounded here.
pub fn compute_totals(
    records: &[DonationRecord],
    expenses: &[Expense],
    foreign_donations: &[ForeignDonation],
) -> Totals {
    let total_donations: Decimal = records.iter().map(|r| r.amount).sum();
    let total_expenses: Decimal = expenses.iter().map(|e| e.amount).sum();
    let total_foreign: Decimal = foreign_donations.iter().map(|d| d.amount).sum();

    Totals {
        total_donations,
        total_expenses,
        total_foreign,
        balance: total_donations - total_expenses + total_foreign,
    }
}

/// Which rendering surface the document is built for. The export variant
/// shortens long foreign donation descriptions; the screen variant shows
/// them in full.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportVariant {
    Screen,
    Export,
}

/// Render an amount with exactly two decimal places
pub fn format_amount(amount: Decimal) -> String {
    format!("{:.2}", amount)
}

/// Render a timestamp as its calendar date, `yyyy/MM/dd`
pub fn format_date(date: DateTime<Utc>) -> String {
    date.format("%Y/%m/%d").to_string()
}

fn format_period(range: &DateRange) -> String {
    format!(
        "Period: {} to {}",
        range.from.format("%Y/%m/%d"),
        range.to.format("%Y/%m/%d")
    )
}

fn foreign_description(description: &str, variant: ReportVariant) -> String {
    match variant {
        ReportVariant::Screen => description.to_string(),
        ReportVariant::Export => {
            if description.chars().count() > FOREIGN_DESCRIPTION_LIMIT {
                let shortened: String = description.chars().take(FOREIGN_DESCRIPTION_LIMIT).collect();
                format!("{}...", shortened)
            } else {
                description.to_string()
            }
        }
    }
}

fn foreign_value(donation: &ForeignDonation) -> String {
    match donation.currency.code() {
        Some(code) => format!("{} {}", code, format_amount(donation.amount)),
        None => format_amount(donation.amount),
    }
}

fn records_section(records: &[DonationRecord], totals: &Totals) -> TableSection {
    TableSection {
        title: "Donation Records".to_string(),
        columns: ["Date", "Service", "Name", "Category", "Method", "Value"]
            .map(String::from)
            .to_vec(),
        rows: records
            .iter()
            .map(|record| {
                vec![
                    format_date(record.date),
                    record.service_description.clone(),
                    record.donor_name.clone(),
                    record.category.to_string(),
                    record.payment_method.to_string(),
                    format_amount(record.amount),
                ]
            })
            .collect(),
        footer: vec![
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            "Total:".to_string(),
            format_amount(totals.total_donations),
        ],
    }
}

fn expenses_section(expenses: &[Expense], totals: &Totals) -> TableSection {
    TableSection {
        title: "Expenses".to_string(),
        columns: ["Date", "Description", "Value"].map(String::from).to_vec(),
        rows: expenses
            .iter()
            .map(|expense| {
                vec![
                    format_date(expense.date),
                    expense.service_description.clone(),
                    format_amount(expense.amount),
                ]
            })
            .collect(),
        footer: vec![
            String::new(),
            "Total:".to_string(),
            format_amount(totals.total_expenses),
        ],
    }
}

fn foreign_section(
    foreign_donations: &[ForeignDonation],
    totals: &Totals,
    variant: ReportVariant,
) -> TableSection {
    TableSection {
        title: "Foreign Donations".to_string(),
        columns: ["Date", "Name", "Currency", "Method", "Description", "Value"]
            .map(String::from)
            .to_vec(),
        rows: foreign_donations
            .iter()
            .map(|donation| {
                vec![
                    format_date(donation.date),
                    donation.donor_name.clone(),
                    donation.currency.to_string(),
                    donation.payment_method.to_string(),
                    foreign_description(&donation.description, variant),
                    foreign_value(donation),
                ]
            })
            .collect(),
        footer: vec![
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            "Total:".to_string(),
            format_amount(totals.total_foreign),
        ],
    }
}

fn summary_section(totals: &Totals) -> SummarySection {
    SummarySection {
        title: "Summary".to_string(),
        rows: vec![
            SummaryRow {
                label: "Total Donations:".to_string(),
                value: format_amount(totals.total_donations),
                emphasis: false,
            },
            SummaryRow {
                label: "Total Expenses:".to_string(),
                value: format_amount(totals.total_expenses),
                emphasis: false,
            },
            SummaryRow {
                label: "Total Foreign Donations:".to_string(),
                value: format_amount(totals.total_foreign),
                emphasis: false,
            },
            SummaryRow {
                label: "Total Balance:".to_string(),
                value: format_amount(totals.balance),
                emphasis: true,
            },
        ],
    }
}

/// Assemble the report document from already-filtered collections and
/// their totals. Section order is fixed: donation records, expenses,
/// foreign donations, summary, then two signature placeholders.
pub fn build_report(
    records: &[DonationRecord],
    expenses: &[Expense],
    foreign_donations: &[ForeignDonation],
    totals: &Totals,
    range: Option<&DateRange>,
    variant: ReportVariant,
) -> ReportDocument {
    ReportDocument {
        title: REPORT_TITLE.to_string(),
        period: range.map(format_period),
        sections: vec![
            ReportSection::Table(records_section(records, totals)),
            ReportSection::Table(expenses_section(expenses, totals)),
            ReportSection::Table(foreign_section(foreign_donations, totals, variant)),
            ReportSection::Summary(summary_section(totals)),
        ],
        signatures: vec![
            SignatureLine {
                caption: SIGNATURE_CAPTION.to_string(),
            },
            SignatureLine {
                caption: SIGNATURE_CAPTION.to_string(),
            },
        ],
    }
}
