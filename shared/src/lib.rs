use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Category of an in-person contribution recorded per service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Tithe,
    Offering,
    Donation,
    Other,
}

/// How a contribution or donation was paid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    Cash,
    Check,
    Card,
    Transfer,
    Other,
}

/// Currency of a foreign donation, recorded without conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Brl,
    Usd,
    Eur,
    Gbp,
    Other,
}

impl Currency {
    /// ISO-style code used to prefix amounts in reports.
    /// `Other` has no code and renders as the bare number.
    pub fn code(&self) -> Option<&'static str> {
        match self {
            Currency::Brl => Some("BRL"),
            Currency::Usd => Some("USD"),
            Currency::Eur => Some("EUR"),
            Currency::Gbp => Some("GBP"),
            Currency::Other => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Tithe => "Tithe",
            Category::Offering => "Offering",
            Category::Donation => "Donation",
            Category::Other => "Other",
        };
        write!(f, "{}", name)
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::Check => "Check",
            PaymentMethod::Card => "Card",
            PaymentMethod::Transfer => "Transfer",
            PaymentMethod::Other => "Other",
        };
        write!(f, "{}", name)
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code().unwrap_or("Other"))
    }
}

/// Error returned when a stored enum value cannot be parsed back
#[derive(Debug, Clone, PartialEq)]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} value: {}", self.kind, self.value)
    }
}

impl std::error::Error for ParseEnumError {}

impl FromStr for Category {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Tithe" => Ok(Category::Tithe),
            "Offering" => Ok(Category::Offering),
            "Donation" => Ok(Category::Donation),
            "Other" => Ok(Category::Other),
            other => Err(ParseEnumError {
                kind: "category",
                value: other.to_string(),
            }),
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Cash" => Ok(PaymentMethod::Cash),
            "Check" => Ok(PaymentMethod::Check),
            "Card" => Ok(PaymentMethod::Card),
            "Transfer" => Ok(PaymentMethod::Transfer),
            "Other" => Ok(PaymentMethod::Other),
            other => Err(ParseEnumError {
                kind: "payment method",
                value: other.to_string(),
            }),
        }
    }
}

impl FromStr for Currency {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BRL" => Ok(Currency::Brl),
            "USD" => Ok(Currency::Usd),
            "EUR" => Ok(Currency::Eur),
            "GBP" => Ok(Currency::Gbp),
            "Other" => Ok(Currency::Other),
            other => Err(ParseEnumError {
                kind: "currency",
                value: other.to_string(),
            }),
        }
    }
}

/// A tithe/offering/donation counted after a service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonationRecord {
    pub id: String,
    pub service_description: String,
    /// Name of the person who counted the money
    pub counted_by: String,
    pub donor_name: String,
    /// Strictly positive, validated at entry
    pub amount: Decimal,
    pub category: Category,
    pub payment_method: PaymentMethod,
    /// Creation timestamp, preserved across edits
    pub date: DateTime<Utc>,
}

/// An expense paid out of the local ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: String,
    pub service_description: String,
    pub amount: Decimal,
    pub date: DateTime<Utc>,
}

/// A donation denominated in a foreign currency, summed at face value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignDonation {
    pub id: String,
    pub donor_name: String,
    pub amount: Decimal,
    pub currency: Currency,
    pub payment_method: PaymentMethod,
    pub description: String,
    pub date: DateTime<Utc>,
}

/// Request for creating a donation record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateRecordRequest {
    pub service_description: String,
    pub counted_by: String,
    pub donor_name: String,
    pub amount: Decimal,
    pub category: Category,
    pub payment_method: PaymentMethod,
    /// Optional date override - uses current time if not provided
    pub date: Option<DateTime<Utc>>,
}

/// Full-record replacement of a donation record, keyed by id.
/// The stored creation date is kept unless a new one is given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateRecordRequest {
    pub service_description: String,
    pub counted_by: String,
    pub donor_name: String,
    pub amount: Decimal,
    pub category: Category,
    pub payment_method: PaymentMethod,
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordListResponse {
    pub records: Vec<DonationRecord>,
}

/// Request for creating an expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateExpenseRequest {
    pub service_description: String,
    pub amount: Decimal,
    pub date: Option<DateTime<Utc>>,
}

/// Full-record replacement of an expense, keyed by id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateExpenseRequest {
    pub service_description: String,
    pub amount: Decimal,
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseListResponse {
    pub expenses: Vec<Expense>,
}

/// Request for creating a foreign donation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateForeignDonationRequest {
    pub donor_name: String,
    pub amount: Decimal,
    pub currency: Currency,
    pub payment_method: PaymentMethod,
    pub description: String,
    pub date: Option<DateTime<Utc>>,
}

/// Full-record replacement of a foreign donation, keyed by id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateForeignDonationRequest {
    pub donor_name: String,
    pub amount: Decimal,
    pub currency: Currency,
    pub payment_method: PaymentMethod,
    pub description: String,
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignDonationListResponse {
    pub foreign_donations: Vec<ForeignDonation>,
}

/// Inclusive calendar-day range used to filter the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from, to }
    }
}

/// Per-category sums and the combined balance for a filtered ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub total_donations: Decimal,
    pub total_expenses: Decimal,
    pub total_foreign: Decimal,
    /// total_donations - total_expenses + total_foreign
    pub balance: Decimal,
}

/// A table section of the report: column headers, one row per entity,
/// and a footer row carrying the subtotal under the amount column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSection {
    pub title: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub footer: Vec<String>,
}

/// One label/value row of the summary section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub label: String,
    pub value: String,
    /// The bottom-line figure is rendered with visual emphasis
    pub emphasis: bool,
}

/// The label/value summary section closing the report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummarySection {
    pub title: String,
    pub rows: Vec<SummaryRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ReportSection {
    Table(TableSection),
    Summary(SummarySection),
}

/// A signature placeholder appended after the summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignatureLine {
    pub caption: String,
}

/// The assembled report: ordered sections plus signature placeholders.
/// A separate export or render stage turns this into a file or a view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportDocument {
    pub title: String,
    /// Date-range caption line, e.g. "Period: 2025/06/01 to 2025/06/30"
    pub period: Option<String>,
    pub sections: Vec<ReportSection>,
    pub signatures: Vec<SignatureLine>,
}

impl ReportDocument {
    /// Convenience accessor for the table sections in document order
    pub fn tables(&self) -> Vec<&TableSection> {
        self.sections
            .iter()
            .filter_map(|s| match s {
                ReportSection::Table(t) => Some(t),
                ReportSection::Summary(_) => None,
            })
            .collect()
    }

    /// Convenience accessor for the summary section, if present
    pub fn summary(&self) -> Option<&SummarySection> {
        self.sections.iter().find_map(|s| match s {
            ReportSection::Summary(sum) => Some(sum),
            ReportSection::Table(_) => None,
        })
    }
}

/// Response for the on-screen report view: the filtered collections,
/// the computed totals, and the assembled document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportResponse {
    pub records: Vec<DonationRecord>,
    pub expenses: Vec<Expense>,
    pub foreign_donations: Vec<ForeignDonation>,
    pub totals: Totals,
    pub document: ReportDocument,
}

/// Request for exporting the report to a file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportReportRequest {
    pub from: NaiveDate,
    pub to: NaiveDate,
    /// Destination directory - uses the current directory if not provided
    pub directory: Option<String>,
}

/// Response after exporting the report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportReportResponse {
    pub success: bool,
    pub message: String,
    pub file_path: String,
}
