use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::errors::ApiError;
use crate::models::{Loan, User};

/// In-process document store. Constructed in `main` (or a test harness) and
/// handed to actix as shared state; there are no ambient globals.
///
/// Loan lookups always filter by the owning user, so a loan that exists
/// under another owner behaves exactly like one that does not exist. Each
/// method holds its collection lock for the whole find-and-mutate, making
/// every single operation atomic; two sequential updates to the same loan
/// remain last-write-wins.
#[derive(Default)]
pub struct Database {
    users: Mutex<Vec<User>>,
    loans: Mutex<Vec<Loan>>,
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a user. Username uniqueness is checked under the same lock as
    /// the insert, so two concurrent registrations cannot both succeed.
    pub async fn insert_user(&self, user: User) -> Result<User, ApiError> {
        let mut users = self.users.lock().await;
        if users.iter().any(|u| u.username == user.username) {
            return Err(ApiError::DuplicateUser);
        }
        users.push(user.clone());
        Ok(user)
    }

    pub async fn find_user_by_username(&self, username: &str) -> Option<User> {
        let users = self.users.lock().await;
        users.iter().find(|u| u.username == username).cloned()
    }

    pub async fn find_user_by_id(&self, id: Uuid) -> Option<User> {
        let users = self.users.lock().await;
        users.iter().find(|u| u.id == id).cloned()
    }

    pub async fn insert_loan(&self, loan: Loan) -> Loan {
        let mut loans = self.loans.lock().await;
        loans.push(loan.clone());
        loan
    }

    /// All loans owned by `owner`, in insertion order.
    pub async fn find_loans(&self, owner: Uuid) -> Vec<Loan> {
        let loans = self.loans.lock().await;
        loans
            .iter()
            .filter(|l| l.created_by == owner)
            .cloned()
            .collect()
    }

    pub async fn find_loan(&self, owner: Uuid, id: Uuid) -> Option<Loan> {
        let loans = self.loans.lock().await;
        loans
            .iter()
            .find(|l| l.id == id && l.created_by == owner)
            .cloned()
    }

    /// Find-one-and-update in a single locked operation. `apply` runs on the
    /// stored record and `updated_at` is refreshed afterwards.
    pub async fn find_loan_and_update<F>(&self, owner: Uuid, id: Uuid, apply: F) -> Option<Loan>
    where
        F: FnOnce(&mut Loan),
    {
        let mut loans = self.loans.lock().await;
        let loan = loans
            .iter_mut()
            .find(|l| l.id == id && l.created_by == owner)?;
        apply(loan);
        loan.updated_at = Utc::now();
        Some(loan.clone())
    }

    /// Find-one-and-delete in a single locked operation; there is no window
    /// between the ownership check and the removal.
    pub async fn find_loan_and_delete(&self, owner: Uuid, id: Uuid) -> Option<Loan> {
        let mut loans = self.loans.lock().await;
        let index = loans
            .iter()
            .position(|l| l.id == id && l.created_by == owner)?;
        Some(loans.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LoanStatus;
    use chrono::NaiveDate;

    fn user(username: &str) -> User {
        User {
            id: Uuid::new_v4(),
            username: username.into(),
            password_hash: "hash".into(),
            created_at: Utc::now(),
        }
    }

    fn loan(owner: Uuid) -> Loan {
        let now = Utc::now();
        Loan {
            id: Uuid::new_v4(),
            borrower_name: "John Doe".into(),
            loan_amount: 10000.0,
            interest_rate: 5.0,
            loan_term: 12,
            loan_status: LoanStatus::Pending,
            payment_due_date: NaiveDate::from_ymd_opt(2024, 9, 30).unwrap(),
            created_by: owner,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn duplicate_usernames_are_rejected() {
        let db = Database::new();
        db.insert_user(user("ada")).await.unwrap();
        let err = db.insert_user(user("ada")).await.unwrap_err();
        assert!(matches!(err, ApiError::DuplicateUser));
    }

    #[tokio::test]
    async fn loans_are_scoped_to_their_owner() {
        let db = Database::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let stored = db.insert_loan(loan(alice)).await;

        assert!(db.find_loan(bob, stored.id).await.is_none());
        assert!(db.find_loans(bob).await.is_empty());
        assert!(db.find_loan_and_delete(bob, stored.id).await.is_none());
        assert!(db
            .find_loan_and_update(bob, stored.id, |l| l.loan_amount = 1.0)
            .await
            .is_none());

        // Still there, untouched, for the real owner.
        let found = db.find_loan(alice, stored.id).await.unwrap();
        assert_eq!(found.loan_amount, 10000.0);
    }

    #[tokio::test]
    async fn delete_removes_the_record() {
        let db = Database::new();
        let owner = Uuid::new_v4();
        let stored = db.insert_loan(loan(owner)).await;

        let removed = db.find_loan_and_delete(owner, stored.id).await.unwrap();
        assert_eq!(removed.id, stored.id);
        assert!(db.find_loan(owner, stored.id).await.is_none());
    }

    #[tokio::test]
    async fn update_refreshes_updated_at() {
        let db = Database::new();
        let owner = Uuid::new_v4();
        let stored = db.insert_loan(loan(owner)).await;

        let updated = db
            .find_loan_and_update(owner, stored.id, |l| l.loan_amount = 12000.0)
            .await
            .unwrap();
        assert_eq!(updated.loan_amount, 12000.0);
        assert!(updated.updated_at >= stored.updated_at);
    }
}
