//! Expense service domain logic for the church ledger.

use anyhow::{anyhow, Result};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::domain::validate::{require_positive_amount, require_text};
use crate::storage::traits::ExpenseStorage;
use shared::{CreateExpenseRequest, Expense, ExpenseListResponse, UpdateExpenseRequest};

#[derive(Clone)]
pub struct ExpenseService<S: ExpenseStorage> {
    storage: S,
}

impl<S: ExpenseStorage> ExpenseService<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Create an expense from a validated request
    pub async fn create_expense(&self, request: CreateExpenseRequest) -> Result<Expense> {
        require_text("Service description", &request.service_description)?;
        require_positive_amount(request.amount)?;

        let expense = Expense {
            id: Uuid::new_v4().to_string(),
            service_description: request.service_description,
            amount: request.amount,
            date: request.date.unwrap_or_else(Utc::now),
        };

        self.storage.store_expense(&expense).await?;
        info!("Created expense {}: {}", expense.id, expense.service_description);
        Ok(expense)
    }

    /// List all expenses in chronological order
    pub async fn list_expenses(&self) -> Result<ExpenseListResponse> {
        let expenses = self.storage.list_expenses().await?;
        Ok(ExpenseListResponse { expenses })
    }

    /// Replace an expense by id, keeping the stored creation date unless
    /// the request carries a new one
    pub async fn update_expense(&self, id: &str, request: UpdateExpenseRequest) -> Result<Expense> {
        require_text("Service description", &request.service_description)?;
        require_positive_amount(request.amount)?;

        let existing = self
            .storage
            .get_expense(id)
            .await?
            .ok_or_else(|| anyhow!("Expense not found: {}", id))?;

        let expense = Expense {
            id: existing.id,
            service_description: request.service_description,
            amount: request.amount,
            date: request.date.unwrap_or(existing.date),
        };

        self.storage.update_expense(&expense).await?;
        info!("Updated expense {}", expense.id);
        Ok(expense)
    }

    /// Delete an expense by id. Returns whether anything was removed.
    pub async fn delete_expense(&self, id: &str) -> Result<bool> {
        let deleted = self.storage.delete_expense(id).await?;
        if deleted {
            info!("Deleted expense {}", id);
        }
        Ok(deleted)
    }
}
