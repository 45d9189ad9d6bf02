//! Tests for the domain error payload and its serde contract.

use super::*;
use rstest::{fixture, rstest};
use serde_json::json;

#[fixture]
fn invalid_filters_error() -> Error {
    Error::invalid_request("price range is inverted")
        .with_details(json!({"field": "priceRange", "min": 10, "max": 1}))
}

#[rstest]
#[case::query(Error::query_failure("down"), ErrorCode::QueryFailure)]
#[case::not_found(Error::not_found("missing"), ErrorCode::NotFound)]
#[case::unauthenticated(Error::unauthenticated("sign in"), ErrorCode::Unauthenticated)]
#[case::sync(Error::favorite_sync_failure("rejected"), ErrorCode::FavoriteSyncFailure)]
#[case::conflict(Error::conflict("busy"), ErrorCode::Conflict)]
#[case::internal(Error::internal("boom"), ErrorCode::InternalError)]
fn constructors_set_code(#[case] error: Error, #[case] expected: ErrorCode) {
    assert_eq!(error.code(), expected);
}

#[rstest]
fn try_new_rejects_empty_messages() {
    let result = Error::try_new(ErrorCode::InvalidRequest, "   ");
    assert!(matches!(result, Err(ErrorValidationError::EmptyMessage)));
}

#[rstest]
fn new_substitutes_blank_messages() {
    let error = Error::new(ErrorCode::InternalError, "");
    assert_eq!(error.message(), "unspecified error");
}

#[rstest]
fn serialises_with_snake_case_code(invalid_filters_error: Error) {
    let value = serde_json::to_value(&invalid_filters_error).expect("serialise error");
    assert_eq!(value["code"], "invalid_request");
    assert_eq!(value["message"], "price range is inverted");
    assert_eq!(value["details"]["field"], "priceRange");
}

#[rstest]
fn deserialising_blank_message_fails() {
    let payload = json!({"code": "not_found", "message": "  "});
    let result = serde_json::from_value::<Error>(payload);
    assert!(result.is_err(), "blank messages must be rejected");
}

#[rstest]
fn display_uses_message(invalid_filters_error: Error) {
    assert_eq!(invalid_filters_error.to_string(), "price range is inverted");
}
