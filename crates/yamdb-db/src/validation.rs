//! Field-level checks applied before every write.
//!
//! Each check returns [`ModelError::Validation`] naming the offending field.
//! Lengths are counted in characters, not bytes.

use std::sync::LazyLock;

use chrono::{Datelike, Utc};
use regex::Regex;
use sea_orm::{ActiveValue, Value};

use crate::error::ModelError;

pub const EMAIL_MAX_LEN: usize = 100;
pub const USERNAME_MAX_LEN: usize = 150;
pub const PERSON_NAME_MAX_LEN: usize = 150;
pub const BIO_MAX_LEN: usize = 500;
pub const CONFIRMATION_CODE_MAX_LEN: usize = 50;
pub const CLASSIFIER_NAME_MAX_LEN: usize = 200;
pub const SLUG_MAX_LEN: usize = 100;
pub const TITLE_NAME_MAX_LEN: usize = 100;
pub const DESCRIPTION_MAX_LEN: usize = 300;
pub const MIN_YEAR: i32 = 1600;
pub const MIN_SCORE: i16 = 1;
pub const MAX_SCORE: i16 = 10;

static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-a-zA-Z0-9_]+$").expect("slug pattern is valid"));

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.@+-]+$").expect("username pattern is valid"));

/// Value held by an active field, if any.
pub(crate) fn active<T>(value: &ActiveValue<T>) -> Option<&T>
where
    T: Into<Value>,
{
    match value {
        ActiveValue::Set(v) | ActiveValue::Unchanged(v) => Some(v),
        ActiveValue::NotSet => None,
    }
}

pub fn required(field: &'static str, value: &str) -> Result<(), ModelError> {
    if value.trim().is_empty() {
        return Err(ModelError::validation(field, "must not be empty"));
    }
    Ok(())
}

pub fn max_len(field: &'static str, value: &str, max: usize) -> Result<(), ModelError> {
    let len = value.chars().count();
    if len > max {
        return Err(ModelError::validation(
            field,
            format!("must be at most {max} characters (got {len})"),
        ));
    }
    Ok(())
}

/// Lower-case the domain part of an address; the local part is left alone.
pub fn normalize_email(email: &str) -> String {
    match email.trim().rsplit_once('@') {
        Some((local, domain)) => format!("{local}@{}", domain.to_lowercase()),
        None => email.to_string(),
    }
}

pub fn email(value: &str) -> Result<(), ModelError> {
    required("email", value)?;
    max_len("email", value, EMAIL_MAX_LEN)?;
    let valid = match value.rsplit_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !value.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        return Err(ModelError::validation("email", "not a valid email address"));
    }
    Ok(())
}

pub fn username(value: &str) -> Result<(), ModelError> {
    required("username", value)?;
    max_len("username", value, USERNAME_MAX_LEN)?;
    if !USERNAME_RE.is_match(value) {
        return Err(ModelError::validation(
            "username",
            "may contain only letters, digits and @/./+/-/_",
        ));
    }
    Ok(())
}

pub fn slug(value: &str) -> Result<(), ModelError> {
    max_len("slug", value, SLUG_MAX_LEN)?;
    if !SLUG_RE.is_match(value) {
        return Err(ModelError::validation(
            "slug",
            "may contain only letters, digits, hyphens and underscores",
        ));
    }
    Ok(())
}

/// Slug to store: the given one, or one derived from `name` when blank.
///
/// A derived slug is cut to [`SLUG_MAX_LEN`]; a name with nothing to derive
/// from is reported against `name`.
pub fn slug_or_derive(slug: Option<&str>, name: &str) -> Result<String, ModelError> {
    if let Some(s) = slug.map(str::trim).filter(|s| !s.is_empty()) {
        return Ok(s.to_string());
    }
    let derived: String = ::slug::slugify(name).chars().take(SLUG_MAX_LEN).collect();
    let derived = derived.trim_end_matches('-');
    if derived.is_empty() {
        return Err(ModelError::validation(
            "name",
            "must contain a letter or digit to derive a slug from",
        ));
    }
    Ok(derived.to_string())
}

pub fn current_year() -> i32 {
    Utc::now().year()
}

pub fn year(value: Option<i32>) -> Result<(), ModelError> {
    let Some(year) = value else {
        return Ok(());
    };
    let max = current_year();
    if !(MIN_YEAR..=max).contains(&year) {
        return Err(ModelError::validation(
            "year",
            format!("must be between {MIN_YEAR} and {max}"),
        ));
    }
    Ok(())
}

pub fn score(value: i16) -> Result<(), ModelError> {
    if !(MIN_SCORE..=MAX_SCORE).contains(&value) {
        return Err(ModelError::validation(
            "score",
            format!("must be between {MIN_SCORE} and {MAX_SCORE}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email_lowercases_domain_only() {
        assert_eq!(normalize_email("John.Doe@Example.COM"), "John.Doe@example.com");
    }

    #[test]
    fn test_normalize_email_same_form_for_domain_case() {
        assert_eq!(
            normalize_email("critic@MAIL.org"),
            normalize_email("critic@mail.ORG")
        );
    }

    #[test]
    fn test_normalize_email_splits_on_last_at() {
        assert_eq!(normalize_email("\"a@b\"@HOST.io"), "\"a@b\"@host.io");
    }

    #[test]
    fn test_normalize_email_trims() {
        assert_eq!(normalize_email("  me@Site.NET "), "me@site.net");
    }

    #[test]
    fn test_normalize_email_without_at_is_untouched() {
        assert_eq!(normalize_email("NoDomain"), "NoDomain");
    }

    #[test]
    fn test_email_rejects_empty_and_malformed() {
        assert!(email("").is_err());
        assert!(email("plain").is_err());
        assert!(email("@host.com").is_err());
        assert!(email("me@").is_err());
        assert!(email("me @host.com").is_err());
        assert!(email("me@host.com").is_ok());
    }

    #[test]
    fn test_email_length_limit() {
        let long = format!("{}@x.io", "a".repeat(EMAIL_MAX_LEN));
        let err = email(&long).unwrap_err();
        assert_eq!(err.field(), Some("email"));
    }

    #[test]
    fn test_username_pattern() {
        assert!(username("critic_42").is_ok());
        assert!(username("a.b+c-d@e").is_ok());
        assert!(username("Кинокритик").is_ok());
        assert!(username("with space").is_err());
        assert!(username("").is_err());
        assert!(username("semi;colon").is_err());
    }

    #[test]
    fn test_slug_pattern() {
        assert!(slug("sci-fi_2").is_ok());
        assert!(slug("").is_err());
        assert!(slug("no spaces").is_err());
        assert!(slug(&"s".repeat(SLUG_MAX_LEN + 1)).is_err());
    }

    #[test]
    fn test_slug_or_derive() {
        assert_eq!(slug_or_derive(Some("rock"), "Rock Music").unwrap(), "rock");
        assert_eq!(slug_or_derive(None, "Rock Music").unwrap(), "rock-music");
        assert_eq!(slug_or_derive(Some("  "), "Art House").unwrap(), "art-house");
    }

    #[test]
    fn test_derived_slug_is_cut_to_limit() {
        let name = format!("{} {}", "a".repeat(SLUG_MAX_LEN - 1), "b".repeat(50));
        let derived = slug_or_derive(None, &name).unwrap();
        assert_eq!(derived, "a".repeat(SLUG_MAX_LEN - 1));
        assert!(slug(&derived).is_ok());
    }

    #[test]
    fn test_underivable_name_reports_name() {
        let err = slug_or_derive(None, "!!!").unwrap_err();
        assert_eq!(err.field(), Some("name"));
    }

    #[test]
    fn test_max_len_counts_chars() {
        assert!(max_len("name", "ééé", 3).is_ok());
        assert!(max_len("name", "éééé", 3).is_err());
    }

    #[test]
    fn test_year_bounds() {
        let now = current_year();
        assert!(year(Some(1599)).is_err());
        assert!(year(Some(1600)).is_ok());
        assert!(year(Some(now)).is_ok());
        assert!(year(Some(now + 1)).is_err());
        assert!(year(None).is_ok());
    }

    #[test]
    fn test_score_bounds() {
        assert!(score(0).is_err());
        assert!(score(1).is_ok());
        assert!(score(10).is_ok());
        assert!(score(11).is_err());
    }

    #[test]
    fn test_active_value_lookup() {
        let set: ActiveValue<i32> = ActiveValue::Set(3);
        let unchanged: ActiveValue<i32> = ActiveValue::Unchanged(4);
        let not_set: ActiveValue<i32> = ActiveValue::NotSet;
        assert_eq!(active(&set), Some(&3));
        assert_eq!(active(&unchanged), Some(&4));
        assert_eq!(active(&not_set), None);
    }
}
