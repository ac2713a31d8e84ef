//! Report generation orchestration: snapshot -> filter -> totals -> document.
//!
//! The service only reads. It takes a fresh snapshot of the three
//! collections on every invocation and hands it to the pure pipeline in
//! [`crate::domain::report`]; there is no caching and no state between calls.

use anyhow::Result;
use tracing::info;

use crate::domain::report::{build_report, compute_totals, filter_by_range, ReportVariant};
use crate::storage::traits::LedgerStorage;
use shared::{DateRange, ReportResponse};

#[derive(Clone)]
pub struct ReportService<S: LedgerStorage> {
    storage: S,
}

impl<S: LedgerStorage> ReportService<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Produce the filtered collections, totals and assembled document for
    /// the given range. Either the complete response is returned or an
    /// error is; there is no partial report.
    pub async fn generate(&self, range: DateRange, variant: ReportVariant) -> Result<ReportResponse> {
        let records = self.storage.list_records().await?;
        let expenses = self.storage.list_expenses().await?;
        let foreign_donations = self.storage.list_foreign_donations().await?;

        let records = filter_by_range(&records, &range);
        let expenses = filter_by_range(&expenses, &range);
        let foreign_donations = filter_by_range(&foreign_donations, &range);

        let totals = compute_totals(&records, &expenses, &foreign_donations);
        let document = build_report(
            &records,
            &expenses,
            &foreign_donations,
            &totals,
            Some(&range),
            variant,
        );

        info!(
            "Generated report for {} to {}: {} records, {} expenses, {} foreign donations",
            range.from,
            range.to,
            records.len(),
            expenses.len(),
            foreign_donations.len()
        );

        Ok(ReportResponse {
            records,
            expenses,
            foreign_donations,
            totals,
            document,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::expense_service::ExpenseService;
    use crate::domain::foreign_service::ForeignDonationService;
    use crate::domain::record_service::RecordService;
    use crate::storage::DbConnection;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use shared::{
        Category, CreateExpenseRequest, CreateForeignDonationRequest, CreateRecordRequest,
        Currency, PaymentMethod,
    };

    struct TestServices {
        records: RecordService<DbConnection>,
        expenses: ExpenseService<DbConnection>,
        foreign: ForeignDonationService<DbConnection>,
        reports: ReportService<DbConnection>,
    }

    async fn create_test_services() -> TestServices {
        let db = DbConnection::init_test().await.expect("Failed to init test DB");
        TestServices {
            records: RecordService::new(db.clone()),
            expenses: ExpenseService::new(db.clone()),
            foreign: ForeignDonationService::new(db.clone()),
            reports: ReportService::new(db),
        }
    }

    async fn seed_june_data(services: &TestServices) {
        services
            .records
            .create_record(CreateRecordRequest {
                service_description: "Sunday Service".to_string(),
                counted_by: "Maria Oliveira".to_string(),
                donor_name: "João da Silva".to_string(),
                amount: Decimal::from_str_exact("150.00").unwrap(),
                category: Category::Tithe,
                payment_method: PaymentMethod::Cash,
                date: Some("2025-06-15T10:30:00Z".parse().unwrap()),
            })
            .await
            .unwrap();

        services
            .expenses
            .create_expense(CreateExpenseRequest {
                service_description: "Electricity bill".to_string(),
                amount: Decimal::from_str_exact("350.00").unwrap(),
                date: Some("2025-06-10T08:00:00Z".parse().unwrap()),
            })
            .await
            .unwrap();

        services
            .foreign
            .create_foreign_donation(CreateForeignDonationRequest {
                donor_name: "Partner Church".to_string(),
                amount: Decimal::from_str_exact("1000.00").unwrap(),
                currency: Currency::Usd,
                payment_method: PaymentMethod::Transfer,
                description: "Donation for social project".to_string(),
                date: Some("2025-06-15T12:00:00Z".parse().unwrap()),
            })
            .await
            .unwrap();
    }

    fn range(from: (i32, u32, u32), to: (i32, u32, u32)) -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(from.0, from.1, from.2).unwrap(),
            NaiveDate::from_ymd_opt(to.0, to.1, to.2).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_generate_report_over_stored_data() {
        let services = create_test_services().await;
        seed_june_data(&services).await;

        let response = services
            .reports
            .generate(range((2025, 6, 1), (2025, 6, 30)), ReportVariant::Screen)
            .await
            .unwrap();

        assert_eq!(response.records.len(), 1);
        assert_eq!(response.expenses.len(), 1);
        assert_eq!(response.foreign_donations.len(), 1);
        assert_eq!(
            response.totals.balance,
            Decimal::from_str_exact("800.00").unwrap()
        );
        assert_eq!(response.document.sections.len(), 4);
    }

    #[tokio::test]
    async fn test_generate_report_with_no_overlap() {
        let services = create_test_services().await;
        seed_june_data(&services).await;

        let response = services
            .reports
            .generate(range((2025, 7, 1), (2025, 7, 31)), ReportVariant::Export)
            .await
            .unwrap();

        assert!(response.records.is_empty());
        assert!(response.expenses.is_empty());
        assert!(response.foreign_donations.is_empty());
        assert_eq!(response.totals.balance, Decimal::ZERO);
        // The document still renders all sections and both signature lines
        assert_eq!(response.document.sections.len(), 4);
        assert_eq!(response.document.signatures.len(), 2);
    }

    #[tokio::test]
    async fn test_generate_report_on_empty_store() {
        let services = create_test_services().await;

        let response = services
            .reports
            .generate(range((2025, 6, 1), (2025, 6, 30)), ReportVariant::Screen)
            .await
            .unwrap();

        assert_eq!(response.totals.total_donations, Decimal::ZERO);
        assert_eq!(response.totals.balance, Decimal::ZERO);
        assert_eq!(response.document.summary().unwrap().rows[3].value, "0.00");
    }

    #[tokio::test]
    async fn test_generate_is_idempotent() {
        let services = create_test_services().await;
        seed_june_data(&services).await;

        let june = range((2025, 6, 1), (2025, 6, 30));
        let first = services
            .reports
            .generate(june, ReportVariant::Export)
            .await
            .unwrap();
        let second = services
            .reports
            .generate(june, ReportVariant::Export)
            .await
            .unwrap();

        assert_eq!(first, second);
    }
}
