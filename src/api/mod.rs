//! Wire shapes: request bodies with their validation and camelCase responses.

pub mod board;
pub mod comment;
pub mod init_settings;
pub mod participant;
pub mod project;
pub mod taxonomy;
pub mod workspace;

use std::str::FromStr;

use serde::Deserialize;

use crate::error::ApiError;

/// Character-count bounds for a text field
pub fn check_length(field: &str, value: &str, min: usize, max: usize) -> Result<(), ApiError> {
    let len = value.chars().count();
    if len < min {
        let problem = if min == 1 {
            "is required".to_string()
        } else {
            format!("must be at least {} characters", min)
        };
        return Err(ApiError::invalid_field(field, problem));
    }
    if len > max {
        return Err(ApiError::invalid_field(
            field,
            format!("must be at most {} characters", max),
        ));
    }
    Ok(())
}

/// Parse one of a fixed vocabulary, naming the allowed values on failure
pub fn parse_choice<T>(field: &str, value: &str, allowed: &[T]) -> Result<T, ApiError>
where
    T: FromStr + PartialEq + std::fmt::Display,
{
    let invalid = || {
        let choices: Vec<String> = allowed.iter().map(ToString::to_string).collect();
        ApiError::invalid_field(field, format!("must be one of {}", choices.join(", ")))
    };
    let parsed = value.parse::<T>().map_err(|_| invalid())?;
    if !allowed.contains(&parsed) {
        return Err(invalid());
    }
    Ok(parsed)
}

/// `page`/`limit` query parameters
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Pagination {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl Pagination {
    /// Returns `(page, limit)`; page starts at 1, limit within 1..=max
    pub fn resolve(&self, default_limit: i64, max_limit: i64) -> Result<(i64, i64), ApiError> {
        let page = self.page.unwrap_or(1);
        if page < 1 {
            return Err(ApiError::invalid_field("page", "must be at least 1"));
        }

        let limit = self.limit.unwrap_or(default_limit);
        if !(1..=max_limit).contains(&limit) {
            return Err(ApiError::invalid_field(
                "limit",
                format!("must be between 1 and {}", max_limit),
            ));
        }

        Ok((page, limit))
    }

    pub fn offset(page: i64, limit: i64) -> Result<i64, ApiError> {
        (page - 1)
            .checked_mul(limit)
            .ok_or_else(|| ApiError::invalid_field("page", "is too large"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{JoinRequestStatus, MemberRole};

    #[test]
    fn length_counts_characters_not_bytes() {
        assert!(check_length("name", "프로젝트", 2, 4).is_ok());
        assert!(check_length("name", "a", 2, 100).is_err());
        assert!(check_length("name", &"a".repeat(101), 2, 100).is_err());
    }

    #[test]
    fn choice_errors_list_the_vocabulary() {
        let err = parse_choice("roleName", "GUEST", MemberRole::ALL).unwrap_err();
        assert_eq!(err.status_code(), 400);
        let fields = err.to_json()["fields"]["roleName"].as_str().unwrap().to_string();
        assert!(fields.contains("OWNER, ADMIN, MEMBER"));
    }

    #[test]
    fn pagination_defaults_and_bounds() {
        let p = Pagination::default();
        assert_eq!(p.resolve(20, 100).unwrap(), (1, 20));

        let p = Pagination { page: Some(0), limit: None };
        assert!(p.resolve(20, 100).is_err());

        let p = Pagination { page: Some(2), limit: Some(101) };
        assert!(p.resolve(20, 100).is_err());

        assert_eq!(Pagination::offset(3, 10).unwrap(), 20);
    }

    #[test]
    fn huge_pages_are_rejected_instead_of_overflowing() {
        let p = Pagination { page: Some(i64::MAX), limit: Some(100) };
        let (page, limit) = p.resolve(20, 100).unwrap();
        let err = Pagination::offset(page, limit).unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
        assert!(err.to_json()["fields"]["page"].is_string());
    }

    #[test]
    fn choices_outside_the_allowed_subset_are_rejected() {
        let decisions = [JoinRequestStatus::Approved, JoinRequestStatus::Rejected];
        assert_eq!(parse_choice("status", "APPROVED", &decisions).unwrap(), JoinRequestStatus::Approved);

        let err = parse_choice("status", "PENDING", &decisions).unwrap_err();
        let fields = err.to_json()["fields"]["status"].as_str().unwrap().to_string();
        assert_eq!(fields, "must be one of APPROVED, REJECTED");
    }
}
