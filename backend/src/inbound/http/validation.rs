//! Path parameter validation for the item endpoints.
//!
//! Parameters travel as path segments. A request with fewer segments than the
//! endpoint needs is a client error; one with more segments does not match
//! the endpoint at all and is answered as an unmatched route.

use serde_json::json;

use crate::domain::{Error, ItemValidationError};

/// Body message for unmatched routes.
pub(crate) const UNMATCHED_ROUTE_MESSAGE: &str = "Bad request";

/// Validation error codes reported in `details.code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ValidationCode {
    MissingParameter,
    InvalidParameter,
}

impl ValidationCode {
    fn as_str(self) -> &'static str {
        match self {
            ValidationCode::MissingParameter => "missing_parameter",
            ValidationCode::InvalidParameter => "invalid_parameter",
        }
    }
}

/// Newtype wrapper for path parameter names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub(crate) fn as_str(&self) -> &'static str {
        self.0
    }
}

/// Whether an endpoint takes one parameter or several; this only changes the
/// wording of the failure message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Arity {
    Single,
    Multiple,
}

impl Arity {
    fn missing_message(self) -> &'static str {
        match self {
            Arity::Single => "Missed Parameter",
            Arity::Multiple => "Missed Parameter(s)",
        }
    }

    fn invalid_message(self) -> &'static str {
        match self {
            Arity::Single => "Invalid Parameter",
            Arity::Multiple => "Invalid Parameter(s)",
        }
    }
}

pub(crate) fn unmatched_route_error() -> Error {
    Error::not_found(UNMATCHED_ROUTE_MESSAGE)
}

pub(crate) fn missing_parameters_error(arity: Arity, fields: &[FieldName]) -> Error {
    let names: Vec<&str> = fields.iter().map(FieldName::as_str).collect();
    Error::invalid_request(arity.missing_message()).with_details(json!({
        "missing": names,
        "code": ValidationCode::MissingParameter.as_str(),
    }))
}

pub(crate) fn invalid_parameter_error(
    arity: Arity,
    field: FieldName,
    value: &str,
    reason: &ItemValidationError,
) -> Error {
    Error::invalid_request(arity.invalid_message()).with_details(json!({
        "field": field.as_str(),
        "value": value,
        "reason": reason.to_string(),
        "code": ValidationCode::InvalidParameter.as_str(),
    }))
}

/// Map a domain validation failure onto the endpoint's failure envelope.
///
/// Blank values count as missing so `/items/%20` reads like `/items/`.
pub(crate) fn parameter_error(
    arity: Arity,
    field: FieldName,
    value: &str,
    reason: &ItemValidationError,
) -> Error {
    match reason {
        ItemValidationError::EmptyOwner
        | ItemValidationError::EmptyTitle
        | ItemValidationError::EmptyDescription => missing_parameters_error(arity, &[field]),
        _ => invalid_parameter_error(arity, field, value, reason),
    }
}

/// Split the tail of a request path into exactly `fields.len()` decoded
/// parameters.
///
/// One trailing slash is ignored. Absent or empty segments are reported
/// together as missing; surplus segments make the route unmatched.
pub(crate) fn path_params(
    raw: &str,
    fields: &[FieldName],
    arity: Arity,
) -> Result<Vec<String>, Error> {
    let trimmed = raw.strip_suffix('/').unwrap_or(raw);
    let segments: Vec<&str> = if trimmed.is_empty() {
        Vec::new()
    } else {
        trimmed.split('/').collect()
    };
    if segments.len() > fields.len() {
        return Err(unmatched_route_error());
    }

    let missing: Vec<FieldName> = fields
        .iter()
        .enumerate()
        .filter(|(position, _)| segments.get(*position).is_none_or(|s| s.is_empty()))
        .map(|(_, field)| *field)
        .collect();
    if !missing.is_empty() {
        return Err(missing_parameters_error(arity, &missing));
    }

    Ok(segments.into_iter().map(percent_decode).collect())
}

/// Decode `%XX` escapes left in a matched path segment.
///
/// Actix keeps reserved escapes such as `%2F` encoded when matching so they
/// cannot split segments; decoding happens here, after splitting. Malformed
/// escapes are kept verbatim and invalid UTF-8 is replaced.
pub(crate) fn percent_decode(segment: &str) -> String {
    String::from_utf8_lossy(&urlencoding::decode_binary(segment.as_bytes())).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    const OWNER: FieldName = FieldName::new("ownerId");
    const TITLE: FieldName = FieldName::new("title");

    #[rstest]
    #[case("u1/Book", vec!["u1", "Book"])]
    #[case("u1/Book/", vec!["u1", "Book"])]
    #[case("u1/Red%20Book", vec!["u1", "Red Book"])]
    #[case("u1/a%2Fb", vec!["u1", "a/b"])]
    fn splits_and_decodes_segments(#[case] raw: &str, #[case] expected: Vec<&str>) {
        let params = path_params(raw, &[OWNER, TITLE], Arity::Multiple).expect("valid params");
        assert_eq!(params, expected);
    }

    #[rstest]
    #[case("", vec!["ownerId", "title"])]
    #[case("/", vec!["ownerId", "title"])]
    #[case("u1", vec!["title"])]
    #[case("/Book", vec!["ownerId"])]
    fn reports_missing_segments(#[case] raw: &str, #[case] missing: Vec<&str>) {
        let error = path_params(raw, &[OWNER, TITLE], Arity::Multiple).expect_err("missing");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
        assert_eq!(error.message(), "Missed Parameter(s)");
        let details = error.details().expect("details");
        assert_eq!(details["missing"], json!(missing));
    }

    #[rstest]
    #[case("u1/Book/extra")]
    #[case("u1/Book//")]
    fn surplus_segments_are_unmatched(#[case] raw: &str) {
        let error = path_params(raw, &[OWNER, TITLE], Arity::Multiple).expect_err("unmatched");
        assert_eq!(error.code(), ErrorCode::NotFound);
        assert_eq!(error.message(), UNMATCHED_ROUTE_MESSAGE);
    }

    #[rstest]
    #[case("100%", "100%")]
    #[case("%zz", "%zz")]
    #[case("%2", "%2")]
    #[case("caf%C3%A9", "café")]
    #[case("a%2541", "a%41")]
    #[case("x%2Fy", "x/y")]
    #[case("p%2Bq", "p+q")]
    #[case("%FF", "\u{FFFD}")]
    fn decoding_keeps_malformed_escapes(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(percent_decode(raw), expected);
    }

    #[rstest]
    fn blank_values_count_as_missing() {
        let error = parameter_error(Arity::Single, OWNER, " ", &ItemValidationError::EmptyOwner);
        assert_eq!(error.message(), "Missed Parameter");
    }

    #[rstest]
    fn invalid_values_carry_the_reason() {
        let error = parameter_error(
            Arity::Multiple,
            FieldName::new("cost"),
            "ten",
            &ItemValidationError::InvalidCost,
        );
        assert_eq!(error.message(), "Invalid Parameter(s)");
        let details = error.details().expect("details");
        assert_eq!(details["field"], "cost");
        assert_eq!(details["value"], "ten");
        assert_eq!(details["code"], "invalid_parameter");
    }
}
