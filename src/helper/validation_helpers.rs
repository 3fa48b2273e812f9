use crate::error::ApiError;
use crate::models::db_operations::read_row_locale;
use crate::models::Locale;
use chrono::{DateTime, Utc};
use rusqlite::Connection;

pub const VALID_PRIORITIES: &[&str] = &["normal", "high", "urgent"];
pub const VALID_FREQUENCIES: &[&str] = &["always", "once-per-session", "once-per-day"];

/// Title-like required fields: non-empty after trimming, at most 200 chars.
pub fn validate_title(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::Validation(format!("{} must not be empty", field)));
    }
    if value.chars().count() > 200 {
        return Err(ApiError::Validation(format!(
            "{} must be at most 200 characters",
            field
        )));
    }
    Ok(())
}

pub fn validate_priority(priority: &str) -> Result<(), ApiError> {
    if !VALID_PRIORITIES.contains(&priority) {
        return Err(ApiError::Validation(format!(
            "Invalid priority '{}'. Valid priorities: {}",
            priority,
            VALID_PRIORITIES.join(", ")
        )));
    }
    Ok(())
}

pub fn validate_frequency(frequency: &str) -> Result<(), ApiError> {
    if !VALID_FREQUENCIES.contains(&frequency) {
        return Err(ApiError::Validation(format!(
            "Invalid frequency '{}'. Valid frequencies: {}",
            frequency,
            VALID_FREQUENCIES.join(", ")
        )));
    }
    Ok(())
}

/// Link and media fields accept either a site-relative path (`/media/...`)
/// or an absolute http(s) URL.
pub fn validate_url_field(field: &str, value: &str) -> Result<(), ApiError> {
    if value.starts_with('/') {
        return Ok(());
    }
    match url::Url::parse(value) {
        Ok(parsed) if parsed.scheme() == "http" || parsed.scheme() == "https" => Ok(()),
        _ => Err(ApiError::Validation(format!(
            "{} must be a site-relative path or an http(s) URL",
            field
        ))),
    }
}

/// Parses an RFC3339 timestamp and re-renders it in UTC. Stored timestamps
/// all share the `+00:00` offset, so window filters and ordering can compare
/// them as text.
pub fn normalize_timestamp(field: &str, value: &str) -> Result<String, ApiError> {
    let parsed = DateTime::parse_from_rfc3339(value).map_err(|_| {
        ApiError::Validation(format!("{} must be an RFC3339 timestamp", field))
    })?;
    Ok(parsed.with_timezone(&Utc).to_rfc3339())
}

/// The rich-text body must be valid JSON (the block tree is stored as-is).
pub fn validate_body_json(body: &str) -> Result<(), ApiError> {
    serde_json::from_str::<serde_json::Value>(body)
        .map_err(|_| ApiError::Validation("body must be valid rich-text block JSON".to_string()))?;
    Ok(())
}

/// Translation-pairing check: `parent_id` must point at an existing row of
/// the same table carrying the *other* locale.
pub fn validate_parent_pairing(
    conn: &Connection,
    table: &'static str,
    parent_id: i64,
    locale: Locale,
) -> Result<(), ApiError> {
    match read_row_locale(conn, table, parent_id)? {
        None => Err(ApiError::Validation(format!(
            "parent_id {} does not exist",
            parent_id
        ))),
        Some(parent_locale) if parent_locale == locale.as_str() => Err(ApiError::Validation(
            "parent_id must reference a record in the other locale".to_string(),
        )),
        Some(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::db_operations::content_db_operations::{create_content, ContentInput};
    use crate::models::ContentKind;
    use crate::setup::db_setup;

    #[test]
    fn title_rules() {
        assert!(validate_title("title", "Genel Kurul Duyurusu").is_ok());
        assert!(validate_title("title", "   ").is_err());
        assert!(validate_title("title", &"a".repeat(201)).is_err());
    }

    #[test]
    fn priority_enum() {
        assert!(validate_priority("urgent").is_ok());
        assert!(validate_priority("asap").is_err());
    }

    #[test]
    fn frequency_enum() {
        assert!(validate_frequency("once-per-day").is_ok());
        assert!(validate_frequency("hourly").is_err());
    }

    #[test]
    fn url_fields() {
        assert!(validate_url_field("logo_url", "/media/uploads/aa/bb/x.png").is_ok());
        assert!(validate_url_field("website_url", "https://ornek.org").is_ok());
        assert!(validate_url_field("website_url", "javascript:alert(1)").is_err());
        assert!(validate_url_field("website_url", "not a url").is_err());
    }

    #[test]
    fn timestamps_normalize_to_utc() {
        assert_eq!(
            normalize_timestamp("published_at", "2024-05-01T10:00:00+00:00").unwrap(),
            "2024-05-01T10:00:00+00:00"
        );
        assert_eq!(
            normalize_timestamp("starts_at", "2024-06-15T13:00:00+03:00").unwrap(),
            "2024-06-15T10:00:00+00:00"
        );
        assert!(normalize_timestamp("published_at", "bugün").is_err());
    }

    #[test]
    fn body_must_be_json() {
        assert!(validate_body_json(r#"{"blocks":[]}"#).is_ok());
        assert!(validate_body_json("<p>html</p>").is_err());
    }

    #[test]
    fn parent_pairing_requires_other_locale() {
        let mut conn = Connection::open_in_memory().unwrap();
        db_setup::setup_content_db(&mut conn).unwrap();
        let parent = create_content(
            &conn,
            ContentKind::News,
            &ContentInput {
                locale: Locale::Tr,
                title: "Ana",
                slug: "ana",
                summary: "",
                body: "{}",
                cover_image: None,
                priority: None,
                published_at: None,
                is_active: true,
                parent_id: None,
            },
        )
        .unwrap();

        assert!(validate_parent_pairing(&conn, "news", parent, Locale::En).is_ok());
        assert!(validate_parent_pairing(&conn, "news", parent, Locale::Tr).is_err());
        assert!(validate_parent_pairing(&conn, "news", 9999, Locale::En).is_err());
    }
}
