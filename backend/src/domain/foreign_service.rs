//! Foreign donation service domain logic for the church ledger.

use anyhow::{anyhow, Result};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::domain::validate::{require_positive_amount, require_text};
use crate::storage::traits::ForeignDonationStorage;
use shared::{
    CreateForeignDonationRequest, ForeignDonation, ForeignDonationListResponse,
    UpdateForeignDonationRequest,
};

#[derive(Clone)]
pub struct ForeignDonationService<S: ForeignDonationStorage> {
    storage: S,
}

impl<S: ForeignDonationStorage> ForeignDonationService<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Create a foreign donation from a validated request. The amount is
    /// kept in the donation's own currency; no conversion happens anywhere.
    pub async fn create_foreign_donation(
        &self,
        request: CreateForeignDonationRequest,
    ) -> Result<ForeignDonation> {
        require_text("Donor name", &request.donor_name)?;
        require_text("Description", &request.description)?;
        require_positive_amount(request.amount)?;

        let donation = ForeignDonation {
            id: Uuid::new_v4().to_string(),
            donor_name: request.donor_name,
            amount: request.amount,
            currency: request.currency,
            payment_method: request.payment_method,
            description: request.description,
            date: request.date.unwrap_or_else(Utc::now),
        };

        self.storage.store_foreign_donation(&donation).await?;
        info!(
            "Created foreign donation {} ({} {})",
            donation.id, donation.currency, donation.amount
        );
        Ok(donation)
    }

    /// List all foreign donations in chronological order
    pub async fn list_foreign_donations(&self) -> Result<ForeignDonationListResponse> {
        let foreign_donations = self.storage.list_foreign_donations().await?;
        Ok(ForeignDonationListResponse { foreign_donations })
    }

    /// Replace a foreign donation by id, keeping the stored creation date
    /// unless the request carries a new one
    pub async fn update_foreign_donation(
        &self,
        id: &str,
        request: UpdateForeignDonationRequest,
    ) -> Result<ForeignDonation> {
        require_text("Donor name", &request.donor_name)?;
        require_text("Description", &request.description)?;
        require_positive_amount(request.amount)?;

        let existing = self
            .storage
            .get_foreign_donation(id)
            .await?
            .ok_or_else(|| anyhow!("Foreign donation not found: {}", id))?;

        let donation = ForeignDonation {
            id: existing.id,
            donor_name: request.donor_name,
            amount: request.amount,
            currency: request.currency,
            payment_method: request.payment_method,
            description: request.description,
            date: request.date.unwrap_or(existing.date),
        };

        self.storage.update_foreign_donation(&donation).await?;
        info!("Updated foreign donation {}", donation.id);
        Ok(donation)
    }

    /// Delete a foreign donation by id. Returns whether anything was removed.
    pub async fn delete_foreign_donation(&self, id: &str) -> Result<bool> {
        let deleted = self.storage.delete_foreign_donation(id).await?;
        if deleted {
            info!("Deleted foreign donation {}", id);
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::DbConnection;
    use rust_decimal::Decimal;
    use shared::{Currency, PaymentMethod};

    async fn create_test_service() -> ForeignDonationService<DbConnection> {
        let db = DbConnection::init_test().await.expect("Failed to init test DB");
        ForeignDonationService::new(db)
    }

    fn create_request(amount: &str, currency: Currency) -> CreateForeignDonationRequest {
        CreateForeignDonationRequest {
            donor_name: "Partner Church".to_string(),
            amount: Decimal::from_str_exact(amount).unwrap(),
            currency,
            payment_method: PaymentMethod::Transfer,
            description: "Donation for social project".to_string(),
            date: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_list_foreign_donations() {
        let service = create_test_service().await;

        let donation = service
            .create_foreign_donation(create_request("1000.00", Currency::Usd))
            .await
            .unwrap();

        assert_eq!(donation.currency, Currency::Usd);
        // The amount stays in the donation's own currency at face value
        assert_eq!(donation.amount, Decimal::from_str_exact("1000.00").unwrap());

        let listed = service.list_foreign_donations().await.unwrap();
        assert_eq!(listed.foreign_donations, vec![donation]);
    }

    #[tokio::test]
    async fn test_create_foreign_donation_rejects_invalid_input() {
        let service = create_test_service().await;

        let mut request = create_request("1000.00", Currency::Usd);
        request.donor_name = String::new();
        assert!(service.create_foreign_donation(request).await.is_err());

        let request = create_request("-1.00", Currency::Eur);
        assert!(service.create_foreign_donation(request).await.is_err());
    }

    #[tokio::test]
    async fn test_update_foreign_donation_can_change_currency() {
        let service = create_test_service().await;

        let donation = service
            .create_foreign_donation(create_request("1000.00", Currency::Usd))
            .await
            .unwrap();

        let update = UpdateForeignDonationRequest {
            donor_name: "Missionary in Europe".to_string(),
            amount: Decimal::from_str_exact("800.00").unwrap(),
            currency: Currency::Eur,
            payment_method: PaymentMethod::Transfer,
            description: "Support for construction".to_string(),
            date: None,
        };

        let updated = service
            .update_foreign_donation(&donation.id, update)
            .await
            .unwrap();
        assert_eq!(updated.currency, Currency::Eur);
        assert_eq!(updated.date, donation.date);
    }

    #[tokio::test]
    async fn test_delete_foreign_donation() {
        let service = create_test_service().await;

        let donation = service
            .create_foreign_donation(create_request("1000.00", Currency::Usd))
            .await
            .unwrap();

        assert!(service.delete_foreign_donation(&donation.id).await.unwrap());
        assert!(!service.delete_foreign_donation(&donation.id).await.unwrap());
    }
}
