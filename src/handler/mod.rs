use std::str::FromStr;
use uuid::Uuid;

use crate::{error::ApiError, model::ParseEnumError};

pub mod accounts;
pub mod auth;
pub mod bills;
pub mod dashboard;
pub mod health;
pub mod payments;
pub mod properties;
pub mod session;
pub mod subscription;
pub mod tenants;
pub mod vacancies;

/// Parses an optional enum query parameter; blank means "no filter".
pub(crate) fn parse_enum_param<T>(value: Option<&str>) -> Result<Option<T>, ApiError>
where
    T: FromStr<Err = ParseEnumError>,
{
    match value.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|err: ParseEnumError| ApiError::bad_request(err.to_string())),
        None => Ok(None),
    }
}

/// Parses an optional uid query parameter; blank means absent.
pub(crate) fn parse_uid_param(name: &str, value: Option<&str>) -> Result<Option<Uuid>, ApiError> {
    match value.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => Uuid::parse_str(value)
            .map(Some)
            .map_err(|_| ApiError::bad_request(format!("invalid {name}: {value}"))),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PropertyStatus;
    use axum::http::StatusCode;

    #[test]
    fn blank_params_mean_no_filter() {
        assert_eq!(parse_enum_param::<PropertyStatus>(Some("  ")).unwrap(), None);
        assert_eq!(parse_uid_param("property", None).unwrap(), None);
    }

    #[test]
    fn bad_params_are_rejected() {
        let err = parse_enum_param::<PropertyStatus>(Some("demolished")).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err = parse_uid_param("property", Some("not-a-uid")).unwrap_err();
        assert_eq!(err.code(), "invalid_request");
    }

    #[test]
    fn known_values_parse() {
        assert_eq!(
            parse_enum_param::<PropertyStatus>(Some("Maintenance")).unwrap(),
            Some(PropertyStatus::Maintenance)
        );
    }
}
