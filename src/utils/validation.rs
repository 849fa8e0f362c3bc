use crate::utils::error::{ParcelError, Result};
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static TRACKING_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^CE[0-9]+$").expect("tracking code pattern compiles"));

static POSTAL_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{5}-?[0-9]{3}$").expect("postal code pattern compiles"));

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(ParcelError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(ParcelError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(ParcelError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(ParcelError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(ParcelError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// Input checks below reject caller data, so they raise `ValidationError`
/// rather than the config variants above.
pub fn validate_non_blank(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ParcelError::validation(
            field_name,
            "must not be empty or whitespace-only",
        ));
    }
    Ok(())
}

pub fn validate_tracking_code(code: &str) -> Result<()> {
    if !TRACKING_CODE.is_match(code) {
        return Err(ParcelError::validation(
            "code",
            format!("'{}' must be CE followed by digits", code),
        ));
    }
    Ok(())
}

pub fn validate_postal_code(field_name: &str, postal_code: &str) -> Result<()> {
    if !POSTAL_CODE.is_match(postal_code) {
        return Err(ParcelError::validation(
            field_name,
            format!("'{}' must look like 00000-000", postal_code),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("postal_lookup.base_url", "https://viacep.com.br/ws").is_ok());
        assert!(validate_url("postal_lookup.base_url", "http://localhost:8080").is_ok());
        assert!(validate_url("postal_lookup.base_url", "").is_err());
        assert!(validate_url("postal_lookup.base_url", "invalid-url").is_err());
        assert!(validate_url("postal_lookup.base_url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_tracking_code() {
        assert!(validate_tracking_code("CE1").is_ok());
        assert!(validate_tracking_code("CE20240101000001").is_ok());
        assert!(validate_tracking_code("CE").is_err());
        assert!(validate_tracking_code("ce123").is_err());
        assert!(validate_tracking_code("CE12a").is_err());
        assert!(validate_tracking_code(" CE12").is_err());
        assert!(validate_tracking_code("CE\u{661}\u{662}\u{663}").is_err());
    }

    #[test]
    fn test_validate_postal_code() {
        assert!(validate_postal_code("cep", "13801-005").is_ok());
        assert!(validate_postal_code("cep", "13801005").is_ok());
        assert!(validate_postal_code("cep", "1380-1005").is_err());
        assert!(validate_postal_code("cep", "").is_err());
        let arabic_indic = "\u{661}\u{663}\u{668}\u{660}\u{661}-\u{660}\u{660}\u{665}";
        assert!(validate_postal_code("cep", arabic_indic).is_err());
    }

    #[test]
    fn test_validate_non_blank() {
        assert!(validate_non_blank("reason", "damaged in transit").is_ok());
        assert!(matches!(
            validate_non_blank("reason", "   "),
            Err(ParcelError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("freight.express_multiplier", 1.5, 1.0, 10.0).is_ok());
        assert!(validate_range("freight.express_multiplier", 0.5, 1.0, 10.0).is_err());
    }
}
