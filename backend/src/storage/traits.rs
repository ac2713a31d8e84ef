//! # Storage Traits
//!
//! Storage abstraction for the three ledger collections. The domain layer
//! talks to these traits only, so the reporting pipeline stays decoupled
//! from the persistence mechanism.

use anyhow::Result;
use async_trait::async_trait;
use shared::{DonationRecord, Expense, ForeignDonation};

/// Trait defining the interface for donation record storage operations
#[async_trait]
pub trait RecordStorage: Send + Sync {
    /// Store a new donation record
    async fn store_record(&self, record: &DonationRecord) -> Result<()>;

    /// Retrieve a specific donation record by ID
    async fn get_record(&self, id: &str) -> Result<Option<DonationRecord>>;

    /// List all donation records in chronological order (oldest first)
    async fn list_records(&self) -> Result<Vec<DonationRecord>>;

    /// Replace an existing donation record, keyed by its ID
    async fn update_record(&self, record: &DonationRecord) -> Result<()>;

    /// Delete a donation record by ID.
    /// Returns true if the record was found and deleted, false otherwise
    async fn delete_record(&self, id: &str) -> Result<bool>;
}

/// Trait defining the interface for expense storage operations
#[async_trait]
pub trait ExpenseStorage: Send + Sync {
    /// Store a new expense
    async fn store_expense(&self, expense: &Expense) -> Result<()>;

    /// Retrieve a specific expense by ID
    async fn get_expense(&self, id: &str) -> Result<Option<Expense>>;

    /// List all expenses in chronological order (oldest first)
    async fn list_expenses(&self) -> Result<Vec<Expense>>;

    /// Replace an existing expense, keyed by its ID
    async fn update_expense(&self, expense: &Expense) -> Result<()>;

    /// Delete an expense by ID.
    /// Returns true if the expense was found and deleted, false otherwise
    async fn delete_expense(&self, id: &str) -> Result<bool>;
}

/// Trait defining the interface for foreign donation storage operations
#[async_trait]
pub trait ForeignDonationStorage: Send + Sync {
    /// Store a new foreign donation
    async fn store_foreign_donation(&self, donation: &ForeignDonation) -> Result<()>;

    /// Retrieve a specific foreign donation by ID
    async fn get_foreign_donation(&self, id: &str) -> Result<Option<ForeignDonation>>;

    /// List all foreign donations in chronological order (oldest first)
    async fn list_foreign_donations(&self) -> Result<Vec<ForeignDonation>>;

    /// Replace an existing foreign donation, keyed by its ID
    async fn update_foreign_donation(&self, donation: &ForeignDonation) -> Result<()>;

    /// Delete a foreign donation by ID.
    /// Returns true if the donation was found and deleted, false otherwise
    async fn delete_foreign_donation(&self, id: &str) -> Result<bool>;
}

/// Read access to all three collections, as consumed by the reporting
/// pipeline. Blanket-implemented for any storage that has the three parts.
pub trait LedgerStorage: RecordStorage + ExpenseStorage + ForeignDonationStorage {}

impl<T: RecordStorage + ExpenseStorage + ForeignDonationStorage> LedgerStorage for T {}
