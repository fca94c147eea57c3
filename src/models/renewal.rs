//! Librarian loan renewal form

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{ValidationError, ValidationErrors};

use super::book_instance::LoanedInstance;

/// Weeks ahead of today proposed as the default renewal date
pub const PROPOSED_RENEWAL_WEEKS: i64 = 3;
/// Renewal dates further than this many weeks ahead are rejected
pub const MAX_RENEWAL_WEEKS: i64 = 4;

pub const ERR_RENEWAL_IN_PAST: &str = "Invalid date \u{2014} renewal in past";
pub const ERR_RENEWAL_TOO_FAR: &str = "Invalid date \u{2014} renewal more than 4 weeks ahead";
/// Missing or unparseable `renewal_date`
pub const ERR_RENEWAL_NOT_A_DATE: &str = "Enter a valid date.";

/// Renewal form submitted by a librarian
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RenewBookForm {
    /// Enter a date between now and 4 weeks (default 3)
    pub renewal_date: NaiveDate,
}

impl RenewBookForm {
    /// Unbound form pre-filled with the proposed date
    pub fn initial(today: NaiveDate) -> Self {
        Self {
            renewal_date: today + Duration::weeks(PROPOSED_RENEWAL_WEEKS),
        }
    }

    /// Validate against `today` and return the cleaned renewal date
    pub fn clean(&self, today: NaiveDate) -> Result<NaiveDate, ValidationErrors> {
        let (code, message) = if self.renewal_date < today {
            ("renewal_in_past", ERR_RENEWAL_IN_PAST)
        } else if self.renewal_date > today + Duration::weeks(MAX_RENEWAL_WEEKS) {
            ("renewal_too_far", ERR_RENEWAL_TOO_FAR)
        } else {
            return Ok(self.renewal_date);
        };

        Err(renewal_date_error(code, message))
    }

    /// Field error for a body whose `renewal_date` could not be read as a date
    pub fn not_a_date() -> ValidationErrors {
        renewal_date_error("invalid", ERR_RENEWAL_NOT_A_DATE)
    }
}

fn renewal_date_error(code: &'static str, message: &'static str) -> ValidationErrors {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    let mut errors = ValidationErrors::new();
    errors.add("renewal_date", err);
    errors
}

/// Renewal page: the copy being renewed and the initial form
#[derive(Debug, Serialize, ToSchema)]
pub struct RenewalPage {
    pub book_instance: LoanedInstance,
    pub form: RenewBookForm,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::field_messages;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    fn clean(offset_days: i64) -> Result<NaiveDate, ValidationErrors> {
        RenewBookForm {
            renewal_date: today() + Duration::days(offset_days),
        }
        .clean(today())
    }

    #[test]
    fn test_initial_is_three_weeks_ahead() {
        let form = RenewBookForm::initial(today());
        assert_eq!(form.renewal_date, NaiveDate::from_ymd_opt(2024, 4, 5).unwrap());
    }

    #[test]
    fn test_today_is_accepted() {
        assert_eq!(clean(0).unwrap(), today());
    }

    #[test]
    fn test_four_weeks_is_accepted() {
        assert_eq!(clean(28).unwrap(), today() + Duration::weeks(4));
    }

    #[test]
    fn test_past_date_rejected() {
        let errors = clean(-1).unwrap_err();
        assert_eq!(field_messages(&errors)["renewal_date"], vec![ERR_RENEWAL_IN_PAST]);
    }

    #[test]
    fn test_beyond_four_weeks_rejected() {
        let errors = clean(29).unwrap_err();
        assert_eq!(field_messages(&errors)["renewal_date"], vec![ERR_RENEWAL_TOO_FAR]);
    }

    #[test]
    fn test_messages_match_form_text() {
        assert_eq!(ERR_RENEWAL_IN_PAST, "Invalid date \u{2014} renewal in past");
        assert!(ERR_RENEWAL_TOO_FAR.ends_with("renewal more than 4 weeks ahead"));
    }

    #[test]
    fn test_not_a_date_targets_renewal_date() {
        let errors = RenewBookForm::not_a_date();
        assert_eq!(field_messages(&errors)["renewal_date"], vec![ERR_RENEWAL_NOT_A_DATE]);
    }
}
