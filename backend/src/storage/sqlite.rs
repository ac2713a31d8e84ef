//! SQLite implementation of the ledger storage traits.
//!
//! Amounts are persisted as text so they stay exact decimals end to end;
//! dates are persisted as RFC 3339 text.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{migrate::MigrateDatabase, Row, Sqlite, SqlitePool};
use std::str::FromStr;
use std::sync::Arc;

use crate::storage::traits::{ExpenseStorage, ForeignDonationStorage, RecordStorage};
use shared::{Category, Currency, DonationRecord, Expense, ForeignDonation, PaymentMethod};

// The database URL for the production database
const DATABASE_URL: &str = "sqlite:church_ledger.db";

/// DbConnection manages database operations for all three collections
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
}

impl DbConnection {
    /// Create a new database connection
    pub async fn new(url: &str) -> Result<Self> {
        // Create database if it doesn't exist
        if !Sqlite::database_exists(url).await.unwrap_or(false) {
            Sqlite::create_database(url).await?
        }

        // Connect to the database
        let pool = SqlitePool::connect(url).await?;

        // Setup database schema
        Self::setup_schema(&pool).await?;

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// Initialize the standard database
    pub async fn init() -> Result<Self> {
        Self::new(DATABASE_URL).await
    }

    /// Initialize a test database with a unique name
    #[cfg(test)]
    pub async fn init_test() -> Result<Self> {
        // Generate a unique database name for tests
        let test_id = uuid::Uuid::new_v4().simple().to_string();
        let db_url = format!("sqlite:file:memdb_{}?mode=memory&cache=shared", test_id);

        Self::new(&db_url).await
    }

    /// Set up the required database schema
    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS donation_records (
                id TEXT PRIMARY KEY,
                service_description TEXT NOT NULL,
                counted_by TEXT NOT NULL,
                donor_name TEXT NOT NULL,
                amount TEXT NOT NULL,
                category TEXT NOT NULL,
                payment_method TEXT NOT NULL,
                date TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS expenses (
                id TEXT PRIMARY KEY,
                service_description TEXT NOT NULL,
                amount TEXT NOT NULL,
                date TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS foreign_donations (
                id TEXT PRIMARY KEY,
                donor_name TEXT NOT NULL,
                amount TEXT NOT NULL,
                currency TEXT NOT NULL,
                payment_method TEXT NOT NULL,
                description TEXT NOT NULL,
                date TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}

fn parse_amount(raw: &str) -> Result<Decimal> {
    Ok(Decimal::from_str_exact(raw)?)
}

fn parse_date(raw: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(raw)?.with_timezone(&Utc))
}

fn record_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<DonationRecord> {
    let amount: String = row.get("amount");
    let category: String = row.get("category");
    let payment_method: String = row.get("payment_method");
    let date: String = row.get("date");

    Ok(DonationRecord {
        id: row.get("id"),
        service_description: row.get("service_description"),
        counted_by: row.get("counted_by"),
        donor_name: row.get("donor_name"),
        amount: parse_amount(&amount)?,
        category: Category::from_str(&category)?,
        payment_method: PaymentMethod::from_str(&payment_method)?,
        date: parse_date(&date)?,
    })
}

fn expense_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Expense> {
    let amount: String = row.get("amount");
    let date: String = row.get("date");

    Ok(Expense {
        id: row.get("id"),
        service_description: row.get("service_description"),
        amount: parse_amount(&amount)?,
        date: parse_date(&date)?,
    })
}

fn foreign_donation_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<ForeignDonation> {
    let amount: String = row.get("amount");
    let currency: String = row.get("currency");
    let payment_method: String = row.get("payment_method");
    let date: String = row.get("date");

    Ok(ForeignDonation {
        id: row.get("id"),
        donor_name: row.get("donor_name"),
        amount: parse_amount(&amount)?,
        currency: Currency::from_str(&currency)?,
        payment_method: PaymentMethod::from_str(&payment_method)?,
        description: row.get("description"),
        date: parse_date(&date)?,
    })
}

#[async_trait]
impl RecordStorage for DbConnection {
    async fn store_record(&self, record: &DonationRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO donation_records
                (id, service_description, counted_by, donor_name, amount, category, payment_method, date)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.id)
        .bind(&record.service_description)
        .bind(&record.counted_by)
        .bind(&record.donor_name)
        .bind(record.amount.to_string())
        .bind(record.category.to_string())
        .bind(record.payment_method.to_string())
        .bind(record.date.to_rfc3339())
        .execute(&*self.pool)
        .await?;
        Ok(())
    }

    async fn get_record(&self, id: &str) -> Result<Option<DonationRecord>> {
        let row = sqlx::query("SELECT * FROM donation_records WHERE id = ?")
            .bind(id)
            .fetch_optional(&*self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(record_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn list_records(&self) -> Result<Vec<DonationRecord>> {
        let rows = sqlx::query("SELECT * FROM donation_records ORDER BY date ASC, id ASC")
            .fetch_all(&*self.pool)
            .await?;

        rows.iter().map(record_from_row).collect()
    }

    async fn update_record(&self, record: &DonationRecord) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE donation_records
            SET service_description = ?, counted_by = ?, donor_name = ?,
                amount = ?, category = ?, payment_method = ?, date = ?
            WHERE id = ?
            "#,
        )
        .bind(&record.service_description)
        .bind(&record.counted_by)
        .bind(&record.donor_name)
        .bind(record.amount.to_string())
        .bind(record.category.to_string())
        .bind(record.payment_method.to_string())
        .bind(record.date.to_rfc3339())
        .bind(&record.id)
        .execute(&*self.pool)
        .await?;
        Ok(())
    }

    async fn delete_record(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM donation_records WHERE id = ?")
            .bind(id)
            .execute(&*self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ExpenseStorage for DbConnection {
    async fn store_expense(&self, expense: &Expense) -> Result<()> {
        sqlx::query(
            "INSERT INTO expenses (id, service_description, amount, date) VALUES (?, ?, ?, ?)",
        )
        .bind(&expense.id)
        .bind(&expense.service_description)
        .bind(expense.amount.to_string())
        .bind(expense.date.to_rfc3339())
        .execute(&*self.pool)
        .await?;
        Ok(())
    }

    async fn get_expense(&self, id: &str) -> Result<Option<Expense>> {
        let row = sqlx::query("SELECT * FROM expenses WHERE id = ?")
            .bind(id)
            .fetch_optional(&*self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(expense_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn list_expenses(&self) -> Result<Vec<Expense>> {
        let rows = sqlx::query("SELECT * FROM expenses ORDER BY date ASC, id ASC")
            .fetch_all(&*self.pool)
            .await?;

        rows.iter().map(expense_from_row).collect()
    }

    async fn update_expense(&self, expense: &Expense) -> Result<()> {
        sqlx::query("UPDATE expenses SET service_description = ?, amount = ?, date = ? WHERE id = ?")
            .bind(&expense.service_description)
            .bind(expense.amount.to_string())
            .bind(expense.date.to_rfc3339())
            .bind(&expense.id)
            .execute(&*self.pool)
            .await?;
        Ok(())
    }

    async fn delete_expense(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM expenses WHERE id = ?")
            .bind(id)
            .execute(&*self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ForeignDonationStorage for DbConnection {
    async fn store_foreign_donation(&self, donation: &ForeignDonation) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO foreign_donations
                (id, donor_name, amount, currency, payment_method, description, date)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&donation.id)
        .bind(&donation.donor_name)
        .bind(donation.amount.to_string())
        .bind(donation.currency.to_string())
        .bind(donation.payment_method.to_string())
        .bind(&donation.description)
        .bind(donation.date.to_rfc3339())
        .execute(&*self.pool)
        .await?;
        Ok(())
    }

    async fn get_foreign_donation(&self, id: &str) -> Result<Option<ForeignDonation>> {
        let row = sqlx::query("SELECT * FROM foreign_donations WHERE id = ?")
            .bind(id)
            .fetch_optional(&*self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(foreign_donation_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn list_foreign_donations(&self) -> Result<Vec<ForeignDonation>> {
        let rows = sqlx::query("SELECT * FROM foreign_donations ORDER BY date ASC, id ASC")
            .fetch_all(&*self.pool)
            .await?;

        rows.iter().map(foreign_donation_from_row).collect()
    }

    async fn update_foreign_donation(&self, donation: &ForeignDonation) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE foreign_donations
            SET donor_name = ?, amount = ?, currency = ?, payment_method = ?, description = ?, date = ?
            WHERE id = ?
            "#,
        )
        .bind(&donation.donor_name)
        .bind(donation.amount.to_string())
        .bind(donation.currency.to_string())
        .bind(donation.payment_method.to_string())
        .bind(&donation.description)
        .bind(donation.date.to_rfc3339())
        .bind(&donation.id)
        .execute(&*self.pool)
        .await?;
        Ok(())
    }

    async fn delete_foreign_donation(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM foreign_donations WHERE id = ?")
            .bind(id)
            .execute(&*self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Setup a new test database for each test
    async fn setup_test() -> DbConnection {
        DbConnection::init_test()
            .await
            .expect("Failed to create test database")
    }

    fn test_record(id: &str, amount: &str, date: &str) -> DonationRecord {
        DonationRecord {
            id: id.to_string(),
            service_description: "Sunday Service".to_string(),
            counted_by: "Maria Oliveira".to_string(),
            donor_name: "João da Silva".to_string(),
            amount: Decimal::from_str_exact(amount).unwrap(),
            category: Category::Tithe,
            payment_method: PaymentMethod::Cash,
            date: date.parse().unwrap(),
        }
    }

    fn test_expense(id: &str, amount: &str, date: &str) -> Expense {
        Expense {
            id: id.to_string(),
            service_description: "Electricity bill".to_string(),
            amount: Decimal::from_str_exact(amount).unwrap(),
            date: date.parse().unwrap(),
        }
    }

    fn test_foreign_donation(id: &str, amount: &str, date: &str) -> ForeignDonation {
        ForeignDonation {
            id: id.to_string(),
            donor_name: "Partner Church".to_string(),
            amount: Decimal::from_str_exact(amount).unwrap(),
            currency: Currency::Usd,
            payment_method: PaymentMethod::Transfer,
            description: "Donation for social project".to_string(),
            date: date.parse().unwrap(),
        }
    }

    #[tokio::test]
    async fn test_store_and_get_record() {
        let db = setup_test().await;

        let record = test_record("rec-1", "150.00", "2025-06-15T10:30:00Z");
        db.store_record(&record).await.expect("Failed to store record");

        let fetched = db
            .get_record("rec-1")
            .await
            .expect("Failed to get record")
            .expect("Record should exist");

        assert_eq!(fetched, record);
        // The amount must come back as an exact decimal, not a float
        assert_eq!(fetched.amount, Decimal::from_str_exact("150.00").unwrap());
    }

    #[tokio::test]
    async fn test_get_nonexistent_record() {
        let db = setup_test().await;

        let result = db.get_record("missing").await.expect("Query failed");
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_list_records_chronological_order() {
        let db = setup_test().await;

        // Insert out of order; listing must come back oldest first
        db.store_record(&test_record("rec-2", "75.50", "2025-06-18T09:00:00Z"))
            .await
            .unwrap();
        db.store_record(&test_record("rec-1", "150.00", "2025-06-15T10:30:00Z"))
            .await
            .unwrap();
        db.store_record(&test_record("rec-3", "200.00", "2025-06-22T11:00:00Z"))
            .await
            .unwrap();

        let records = db.list_records().await.expect("Failed to list records");

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].id, "rec-1");
        assert_eq!(records[1].id, "rec-2");
        assert_eq!(records[2].id, "rec-3");
    }

    #[tokio::test]
    async fn test_update_record_replaces_fields() {
        let db = setup_test().await;

        let mut record = test_record("rec-1", "150.00", "2025-06-15T10:30:00Z");
        db.store_record(&record).await.unwrap();

        record.donor_name = "Carlos Ferreira".to_string();
        record.amount = Decimal::from_str_exact("175.25").unwrap();
        record.category = Category::Offering;
        db.update_record(&record).await.expect("Failed to update record");

        let fetched = db.get_record("rec-1").await.unwrap().unwrap();
        assert_eq!(fetched.donor_name, "Carlos Ferreira");
        assert_eq!(fetched.amount, Decimal::from_str_exact("175.25").unwrap());
        assert_eq!(fetched.category, Category::Offering);
        // Creation date is untouched by the replacement
        assert_eq!(fetched.date, record.date);
    }

    #[tokio::test]
    async fn test_delete_record() {
        let db = setup_test().await;

        db.store_record(&test_record("rec-1", "150.00", "2025-06-15T10:30:00Z"))
            .await
            .unwrap();

        let deleted = db.delete_record("rec-1").await.expect("Failed to delete");
        assert!(deleted, "Record should have been deleted");

        let exists_after = db.get_record("rec-1").await.unwrap();
        assert!(exists_after.is_none());

        // Deleting again reports nothing was removed
        let deleted_again = db.delete_record("rec-1").await.unwrap();
        assert!(!deleted_again);
    }

    #[tokio::test]
    async fn test_expense_round_trip() {
        let db = setup_test().await;

        let expense = test_expense("exp-1", "350.00", "2025-06-10T08:00:00Z");
        db.store_expense(&expense).await.expect("Failed to store expense");

        let listed = db.list_expenses().await.expect("Failed to list expenses");
        assert_eq!(listed, vec![expense.clone()]);

        let deleted = db.delete_expense("exp-1").await.unwrap();
        assert!(deleted);
        assert!(db.list_expenses().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_foreign_donation_round_trip() {
        let db = setup_test().await;

        let donation = test_foreign_donation("for-1", "1000.00", "2025-06-15T12:00:00Z");
        db.store_foreign_donation(&donation)
            .await
            .expect("Failed to store foreign donation");

        let fetched = db
            .get_foreign_donation("for-1")
            .await
            .unwrap()
            .expect("Donation should exist");
        assert_eq!(fetched.currency, Currency::Usd);
        assert_eq!(fetched, donation);

        let mut updated = donation.clone();
        updated.currency = Currency::Eur;
        updated.amount = Decimal::from_str_exact("800.00").unwrap();
        db.update_foreign_donation(&updated).await.unwrap();

        let fetched = db.get_foreign_donation("for-1").await.unwrap().unwrap();
        assert_eq!(fetched.currency, Currency::Eur);
        assert_eq!(fetched.amount, Decimal::from_str_exact("800.00").unwrap());
    }

    #[tokio::test]
    async fn test_collections_are_independent() {
        let db = setup_test().await;

        db.store_record(&test_record("id-1", "150.00", "2025-06-15T10:30:00Z"))
            .await
            .unwrap();
        db.store_expense(&test_expense("id-1", "350.00", "2025-06-10T08:00:00Z"))
            .await
            .unwrap();

        // Same id in different collections does not collide
        assert_eq!(db.list_records().await.unwrap().len(), 1);
        assert_eq!(db.list_expenses().await.unwrap().len(), 1);

        db.delete_record("id-1").await.unwrap();
        assert!(db.list_records().await.unwrap().is_empty());
        assert_eq!(db.list_expenses().await.unwrap().len(), 1);
    }
}
