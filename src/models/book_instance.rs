//! Book instance (loanable copy) model and loan status

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;

/// Loan status of a copy, stored as a single character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    #[default]
    Maintenance,
    OnLoan,
    Available,
    Reserved,
}

impl LoanStatus {
    pub fn code(&self) -> &'static str {
        match self {
            LoanStatus::Maintenance => "m",
            LoanStatus::OnLoan => "o",
            LoanStatus::Available => "a",
            LoanStatus::Reserved => "r",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LoanStatus::Maintenance => "Maintenance",
            LoanStatus::OnLoan => "On loan",
            LoanStatus::Available => "Available",
            LoanStatus::Reserved => "Reserved",
        }
    }

    /// Whether a copy in this status may move to `next`
    pub fn can_transition_to(self, next: LoanStatus) -> bool {
        use LoanStatus::*;
        if self == next {
            return true;
        }
        matches!(
            (self, next),
            (Maintenance, Available)
                | (Available, OnLoan)
                | (Available, Reserved)
                | (Available, Maintenance)
                | (Reserved, OnLoan)
                | (Reserved, Available)
                | (OnLoan, Available)
                | (OnLoan, Maintenance)
        )
    }

    /// Statuses in which the copy is on the shelf and belongs to nobody
    fn is_shelved(self) -> bool {
        matches!(self, LoanStatus::Available | LoanStatus::Maintenance)
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for LoanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "m" => Ok(LoanStatus::Maintenance),
            "o" => Ok(LoanStatus::OnLoan),
            "a" => Ok(LoanStatus::Available),
            "r" => Ok(LoanStatus::Reserved),
            _ => Err(format!("Invalid loan status code: {}", s)),
        }
    }
}

impl sqlx::Type<Postgres> for LoanStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for LoanStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for LoanStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <&str as Encode<Postgres>>::encode_by_ref(&self.code(), buf)
    }
}

/// Book instance from database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookInstance {
    pub id: Uuid,
    pub book_id: i32,
    pub imprint: String,
    pub due_back: Option<NaiveDate>,
    pub status: LoanStatus,
    pub borrower_id: Option<i32>,
}

impl BookInstance {
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.due_back.map(|d| today > d).unwrap_or(false)
    }

    /// Apply a partial update, enforcing status transitions.
    ///
    /// Shelved statuses drop the borrower and due date; `on_loan` requires both.
    pub fn apply(&self, update: &UpdateBookInstance) -> Result<BookInstance, AppError> {
        let status = update.status.unwrap_or(self.status);
        if !self.status.can_transition_to(status) {
            return Err(AppError::BusinessRule(format!(
                "Cannot change status from '{}' to '{}'",
                self.status, status
            )));
        }

        let mut next = BookInstance {
            id: self.id,
            book_id: self.book_id,
            imprint: update.imprint.clone().unwrap_or_else(|| self.imprint.clone()),
            due_back: update.due_back.or(self.due_back),
            status,
            borrower_id: update.borrower_id.or(self.borrower_id),
        };

        if status.is_shelved() {
            next.borrower_id = None;
            next.due_back = None;
        }

        if status == LoanStatus::OnLoan && (next.borrower_id.is_none() || next.due_back.is_none()) {
            return Err(AppError::BusinessRule(
                "A copy on loan needs a borrower and a due date".to_string(),
            ));
        }

        Ok(next)
    }
}

/// Instance joined with its book and borrower, as shown in loan lists
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct LoanedInstance {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub instance: BookInstance,
    pub book_title: String,
    pub borrower_username: Option<String>,
    pub is_overdue: bool,
}

/// Create instance request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBookInstance {
    #[validate(length(min = 1, max = 200, message = "Imprint must be 1-200 characters"))]
    pub imprint: String,
    pub status: Option<LoanStatus>,
    pub due_back: Option<NaiveDate>,
    pub borrower_id: Option<i32>,
}

/// Partial update of an instance
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateBookInstance {
    #[validate(length(min = 1, max = 200, message = "Imprint must be 1-200 characters"))]
    pub imprint: Option<String>,
    pub status: Option<LoanStatus>,
    pub due_back: Option<NaiveDate>,
    pub borrower_id: Option<i32>,
}

impl From<&CreateBookInstance> for UpdateBookInstance {
    fn from(c: &CreateBookInstance) -> Self {
        Self {
            imprint: Some(c.imprint.clone()),
            status: c.status,
            due_back: c.due_back,
            borrower_id: c.borrower_id,
        }
    }
}
