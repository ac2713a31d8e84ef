//! Donation record service domain logic for the church ledger.

use anyhow::{anyhow, Result};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::domain::validate::{require_positive_amount, require_text};
use crate::storage::traits::RecordStorage;
use shared::{CreateRecordRequest, DonationRecord, RecordListResponse, UpdateRecordRequest};

#[derive(Clone)]
pub struct RecordService<S: RecordStorage> {
    storage: S,
}

impl<S: RecordStorage> RecordService<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Create a donation record from a validated request. The id and the
    /// creation timestamp are assigned here.
    pub async fn create_record(&self, request: CreateRecordRequest) -> Result<DonationRecord> {
        require_text("Service description", &request.service_description)?;
        require_text("Counted by", &request.counted_by)?;
        require_text("Donor name", &request.donor_name)?;
        require_positive_amount(request.amount)?;

        let record = DonationRecord {
            id: Uuid::new_v4().to_string(),
            service_description: request.service_description,
            counted_by: request.counted_by,
            donor_name: request.donor_name,
            amount: request.amount,
            category: request.category,
            payment_method: request.payment_method,
            date: request.date.unwrap_or_else(Utc::now),
        };

        self.storage.store_record(&record).await?;
        info!("Created donation record {} for {}", record.id, record.donor_name);
        Ok(record)
    }

    /// List all donation records in chronological order
    pub async fn list_records(&self) -> Result<RecordListResponse> {
        let records = self.storage.list_records().await?;
        Ok(RecordListResponse { records })
    }

    /// Replace a donation record by id. Every field of the stored record is
    /// overwritten from the request; the original creation date is kept
    /// unless the request carries a new one.
    pub async fn update_record(
        &self,
        id: &str,
        request: UpdateRecordRequest,
    ) -> Result<DonationRecord> {
        require_text("Service description", &request.service_description)?;
        require_text("Counted by", &request.counted_by)?;
        require_text("Donor name", &request.donor_name)?;
        require_positive_amount(request.amount)?;

        let existing = self
            .storage
            .get_record(id)
            .await?
            .ok_or_else(|| anyhow!("Donation record not found: {}", id))?;

        let record = DonationRecord {
            id: existing.id,
            service_description: request.service_description,
            counted_by: request.counted_by,
            donor_name: request.donor_name,
            amount: request.amount,
            category: request.category,
            payment_method: request.payment_method,
            date: request.date.unwrap_or(existing.date),
        };

        self.storage.update_record(&record).await?;
        info!("Updated donation record {}", record.id);
        Ok(record)
    }

    /// Delete a donation record by id. Returns whether anything was removed.
    pub async fn delete_record(&self, id: &str) -> Result<bool> {
        let deleted = self.storage.delete_record(id).await?;
        if deleted {
            info!("Deleted donation record {}", id);
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::DbConnection;
    use rust_decimal::Decimal;
    use shared::{Category, PaymentMethod};

    async fn create_test_service() -> RecordService<DbConnection> {
        let db = DbConnection::init_test().await.expect("Failed to init test DB");
        RecordService::new(db)
    }

    fn create_request(amount: &str) -> CreateRecordRequest {
        CreateRecordRequest {
            service_description: "Sunday Service".to_string(),
            counted_by: "Maria Oliveira".to_string(),
            donor_name: "João da Silva".to_string(),
            amount: Decimal::from_str_exact(amount).unwrap(),
            category: Category::Tithe,
            payment_method: PaymentMethod::Cash,
            date: None,
        }
    }

    #[tokio::test]
    async fn test_create_record_assigns_id_and_date() {
        let service = create_test_service().await;

        let record = service.create_record(create_request("150.00")).await.unwrap();

        assert!(!record.id.is_empty());
        assert_eq!(record.amount, Decimal::from_str_exact("150.00").unwrap());

        let listed = service.list_records().await.unwrap();
        assert_eq!(listed.records, vec![record]);
    }

    #[tokio::test]
    async fn test_create_record_with_explicit_date() {
        let service = create_test_service().await;

        let mut request = create_request("150.00");
        request.date = Some("2025-06-15T10:30:00Z".parse().unwrap());

        let record = service.create_record(request).await.unwrap();
        assert_eq!(record.date, "2025-06-15T10:30:00Z".parse::<chrono::DateTime<Utc>>().unwrap());
    }

    #[tokio::test]
    async fn test_create_record_rejects_non_positive_amount() {
        let service = create_test_service().await;

        let result = service.create_record(create_request("0")).await;
        assert!(result.is_err());

        let result = service.create_record(create_request("-5.00")).await;
        assert!(result.is_err());

        // Nothing was persisted
        assert!(service.list_records().await.unwrap().records.is_empty());
    }

    #[tokio::test]
    async fn test_create_record_rejects_empty_fields() {
        let service = create_test_service().await;

        let mut request = create_request("150.00");
        request.donor_name = "  ".to_string();

        let err = service.create_record(request).await.unwrap_err();
        assert_eq!(err.to_string(), "Donor name cannot be empty");
    }

    #[tokio::test]
    async fn test_update_record_preserves_creation_date() {
        let service = create_test_service().await;

        let mut create = create_request("150.00");
        create.date = Some("2025-06-15T10:30:00Z".parse().unwrap());
        let record = service.create_record(create).await.unwrap();

        let update = UpdateRecordRequest {
            service_description: "Special Event".to_string(),
            counted_by: "Pedro Santos".to_string(),
            donor_name: "Mariana Costa".to_string(),
            amount: Decimal::from_str_exact("500.00").unwrap(),
            category: Category::Donation,
            payment_method: PaymentMethod::Check,
            date: None,
        };

        let updated = service.update_record(&record.id, update).await.unwrap();

        assert_eq!(updated.id, record.id);
        assert_eq!(updated.donor_name, "Mariana Costa");
        assert_eq!(updated.amount, Decimal::from_str_exact("500.00").unwrap());
        // Date is preserved because the update did not supply one
        assert_eq!(updated.date, record.date);
    }

    #[tokio::test]
    async fn test_update_missing_record_fails() {
        let service = create_test_service().await;

        let update = UpdateRecordRequest {
            service_description: "Special Event".to_string(),
            counted_by: "Pedro Santos".to_string(),
            donor_name: "Mariana Costa".to_string(),
            amount: Decimal::from_str_exact("500.00").unwrap(),
            category: Category::Donation,
            payment_method: PaymentMethod::Check,
            date: None,
        };

        let result = service.update_record("missing", update).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_delete_record() {
        let service = create_test_service().await;

        let record = service.create_record(create_request("150.00")).await.unwrap();

        assert!(service.delete_record(&record.id).await.unwrap());
        assert!(!service.delete_record(&record.id).await.unwrap());
        assert!(service.list_records().await.unwrap().records.is_empty());
    }
}
