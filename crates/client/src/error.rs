//! Failed-call classification.
//!
//! Every failure of a backend call is captured as an [`ApiError`] carrying
//! enough context (connection failure kind, HTTP status, parsed error body,
//! rate-limit headers) for the classification methods to be pure functions
//! over it: [`ApiError::user_message`] produces one user-presentable
//! sentence with a fixed precedence, [`ApiError::field_errors`] extracts
//! field-level validation messages, and [`ApiError::rate_limit_info`]
//! surfaces structured 429 metadata.

use std::collections::BTreeMap;

use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::storage::StorageError;

/// Errors that can occur when calling the ordering backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request was sent but timed out before a response arrived.
    #[error("request timed out")]
    Timeout,

    /// The request failed at the transport level after connecting.
    #[error("network error: {0}")]
    Network(String),

    /// A connection to the server could not be established.
    #[error("connection failed: {0}")]
    Connect(String),

    /// The server responded with a non-success status.
    #[error("HTTP error: {0}")]
    Response(ErrorResponse),

    /// A success response could not be parsed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The local cart or session store failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The response had a success status but not the expected shape.
    #[error("unexpected response shape")]
    Unexpected,
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Connect(err.to_string())
        } else if err.is_request() || err.is_body() || err.is_decode() {
            Self::Network(err.to_string())
        } else {
            Self::Unexpected
        }
    }
}

impl ApiError {
    /// Capture a non-success HTTP response.
    ///
    /// Reads the rate-limit headers (429 only) before consuming the body.
    pub async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status().as_u16();
        let rate_limit = if status == 429 {
            RateLimitInfo::from_headers(response.headers())
        } else {
            None
        };
        let text = response.text().await.unwrap_or_default();
        let body = ErrorBody::parse(&text);
        Self::Response(ErrorResponse {
            status,
            body,
            rate_limit,
        })
    }

    /// One human-readable sentence describing the failure.
    ///
    /// Precedence: connection-level failures first, then any message the
    /// response body carries, then a fixed table keyed by status, then the
    /// verbatim message of non-HTTP failures.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Timeout => "Request timed out. Please try again.".to_string(),
            Self::Network(_) => {
                "Network error. Please check your connection and try again.".to_string()
            }
            Self::Connect(_) => "Unable to connect to server. Please try again later.".to_string(),
            Self::Response(response) => response.user_message(),
            Self::Parse(err) => err.to_string(),
            Self::Storage(err) => err.to_string(),
            Self::Unexpected => "An unexpected error occurred. Please try again.".to_string(),
        }
    }

    /// Field-level validation messages from the response body, keyed by
    /// field name. Empty when the failure carries none.
    #[must_use]
    pub fn field_errors(&self) -> BTreeMap<String, String> {
        match self {
            Self::Response(response) => response.body.field_errors(),
            _ => BTreeMap::new(),
        }
    }

    /// Structured rate-limit metadata. Present only for 429 responses that
    /// carried at least one rate-limit header.
    #[must_use]
    pub fn rate_limit_info(&self) -> Option<RateLimitInfo> {
        match self {
            Self::Response(response) if response.status == 429 => response.rate_limit,
            _ => None,
        }
    }

    /// Rate-limit sentence, when [`Self::rate_limit_info`] is present.
    #[must_use]
    pub fn rate_limit_message(&self) -> Option<String> {
        self.rate_limit_info().map(|info| info.message())
    }

    /// HTTP status of the failure, when a response was received.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Response(response) => Some(response.status),
            _ => None,
        }
    }

    /// Whether the failure was a 429 rejection.
    #[must_use]
    pub const fn is_rate_limited(&self) -> bool {
        matches!(self.status(), Some(429))
    }
}

// =============================================================================
// ErrorResponse
// =============================================================================

/// A non-success HTTP response, captured for classification.
#[derive(Debug, Clone)]
pub struct ErrorResponse {
    /// HTTP status code.
    pub status: u16,
    /// Parsed error body (all fields optional and lenient).
    pub body: ErrorBody,
    /// Rate-limit header metadata, captured for 429 responses.
    pub rate_limit: Option<RateLimitInfo>,
}

impl ErrorResponse {
    fn user_message(&self) -> String {
        if let Some(message) = self.body.primary_message() {
            return message;
        }
        match self.status {
            400 => "Invalid request. Please check your input and try again.".to_string(),
            401 => "Invalid credentials. Please try again.".to_string(),
            403 => "You do not have permission to perform this action.".to_string(),
            404 => "The requested resource was not found.".to_string(),
            429 => self.rate_limit.map_or_else(
                || "Too many requests. Please try again later.".to_string(),
                |info| info.message(),
            ),
            500 => "Server error. Please try again later.".to_string(),
            502 | 503 | 504 => "Service temporarily unavailable. Please try again later.".to_string(),
            status => format!("An error occurred ({status})."),
        }
    }
}

impl std::fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.body.primary_message() {
            Some(message) => write!(f, "status {}: {message}", self.status),
            None => write!(f, "status {}", self.status),
        }
    }
}

/// Error body shape used by the backend:
/// `{ error?, message?, errors?: { field: string | string[] } }`.
///
/// Fields are kept as raw JSON so a malformed body never fails the capture;
/// anything unusable simply contributes no message.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    error: Option<Value>,
    #[serde(default)]
    message: Option<Value>,
    #[serde(default)]
    errors: Option<Value>,
}

impl ErrorBody {
    /// Parse a response body. Unparseable text yields an empty body.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        serde_json::from_str(text).unwrap_or_default()
    }

    /// First non-empty message in the body, in precedence order: a string
    /// `error`, a string `message`, a legacy object `error` carrying a
    /// string `message`, then the first field-errors entry.
    fn primary_message(&self) -> Option<String> {
        if let Some(Value::String(s)) = &self.error
            && let Some(message) = non_empty(s)
        {
            return Some(message);
        }
        if let Some(Value::String(s)) = &self.message
            && let Some(message) = non_empty(s)
        {
            return Some(message);
        }
        if let Some(Value::Object(legacy)) = &self.error
            && let Some(Value::String(s)) = legacy.get("message")
            && let Some(message) = non_empty(s)
        {
            return Some(message);
        }
        self.field_errors().into_iter().next().map(|(_, msg)| msg)
    }

    /// Field-level messages: string values used directly, non-empty array
    /// values contribute their first string element, anything else skipped.
    fn field_errors(&self) -> BTreeMap<String, String> {
        let mut out = BTreeMap::new();
        if let Some(Value::Object(map)) = &self.errors {
            for (field, value) in map {
                match value {
                    Value::String(s) => {
                        out.insert(field.clone(), s.clone());
                    }
                    Value::Array(items) => {
                        if let Some(Value::String(first)) = items.first() {
                            out.insert(field.clone(), first.clone());
                        }
                    }
                    _ => {}
                }
            }
        }
        out
    }
}

// =============================================================================
// Rate limiting
// =============================================================================

/// Rate-limit metadata from a 429 response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitInfo {
    /// Request allowance for the window (`x-ratelimit-limit`, 0 if absent).
    pub limit: u32,
    /// Requests left in the window (`x-ratelimit-remaining`, 0 if absent).
    pub remaining: u32,
    /// Unix time the window resets (`x-ratelimit-reset`, 0 if absent).
    pub reset_epoch_seconds: i64,
    /// Seconds to wait before retrying (`retry-after`), absent if the
    /// header is missing.
    pub retry_after_seconds: Option<u64>,
}

impl RateLimitInfo {
    /// Parse the rate-limit headers of a rejected response.
    ///
    /// Returns a value only when at least one header carries usable data:
    /// a positive limit, a parsed remaining count, a positive reset time,
    /// or a retry-after duration.
    #[must_use]
    pub fn from_headers(headers: &reqwest::header::HeaderMap) -> Option<Self> {
        let limit: Option<u32> = parse_header(headers, "x-ratelimit-limit");
        let remaining: Option<u32> = parse_header(headers, "x-ratelimit-remaining");
        let reset: Option<i64> = parse_header(headers, "x-ratelimit-reset");
        let retry_after: Option<u64> = parse_header(headers, "retry-after");

        let populated = limit.unwrap_or(0) > 0
            || remaining.is_some()
            || reset.unwrap_or(0) > 0
            || retry_after.is_some();

        populated.then(|| Self {
            limit: limit.unwrap_or(0),
            remaining: remaining.unwrap_or(0),
            reset_epoch_seconds: reset.unwrap_or(0),
            retry_after_seconds: retry_after,
        })
    }

    /// Seconds until a retry is worthwhile: the `retry-after` duration when
    /// given, otherwise the distance to the reset time (0 when unknown or
    /// already elapsed).
    #[must_use]
    pub fn seconds_until_retry(&self) -> u64 {
        if let Some(secs) = self.retry_after_seconds {
            return secs;
        }
        let remaining = self.reset_epoch_seconds - Utc::now().timestamp();
        u64::try_from(remaining).unwrap_or(0)
    }

    /// User-facing rate-limit sentence.
    #[must_use]
    pub fn message(&self) -> String {
        self.message_at(Utc::now().timestamp())
    }

    fn message_at(&self, now: i64) -> String {
        if let Some(secs) = self.retry_after_seconds {
            return format!(
                "Too many attempts. Please try again in {}.",
                format_duration(secs)
            );
        }
        if self.reset_epoch_seconds > 0 {
            return format!(
                "You can try again {}.",
                format_retry_time_at(self.reset_epoch_seconds, now)
            );
        }
        if self.limit > 0 {
            return format!(
                "Too many attempts. You have {} of {} attempts remaining.",
                self.remaining, self.limit
            );
        }
        "Too many attempts. Please try again later.".to_string()
    }
}

/// Human phrase for when a rate-limit window resets, relative to now.
#[must_use]
pub fn format_retry_time(reset_epoch_seconds: i64) -> String {
    format_retry_time_at(reset_epoch_seconds, Utc::now().timestamp())
}

fn format_retry_time_at(reset_epoch_seconds: i64, now: i64) -> String {
    let remaining = reset_epoch_seconds - now;
    match u64::try_from(remaining) {
        Ok(secs) if secs > 0 => format!("in {}", format_duration(secs)),
        _ => "now".to_string(),
    }
}

/// Seconds rendered at the coarsest sensible unit, singular at exactly 1.
fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        pluralize(seconds, "second")
    } else if seconds < 3600 {
        pluralize(seconds.div_ceil(60), "minute")
    } else {
        pluralize(seconds.div_ceil(3600), "hour")
    }
}

fn pluralize(count: u64, unit: &str) -> String {
    if count == 1 {
        format!("1 {unit}")
    } else {
        format!("{count} {unit}s")
    }
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn parse_header<T: std::str::FromStr>(
    headers: &reqwest::header::HeaderMap,
    name: &str,
) -> Option<T> {
    headers.get(name)?.to_str().ok()?.trim().parse().ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn response(status: u16, body: &str) -> ApiError {
        ApiError::Response(ErrorResponse {
            status,
            body: ErrorBody::parse(body),
            rate_limit: None,
        })
    }

    fn rate_limited(info: RateLimitInfo) -> ApiError {
        ApiError::Response(ErrorResponse {
            status: 429,
            body: ErrorBody::default(),
            rate_limit: Some(info),
        })
    }

    #[test]
    fn test_connection_failure_messages() {
        assert_eq!(
            ApiError::Timeout.user_message(),
            "Request timed out. Please try again."
        );
        assert_eq!(
            ApiError::Network("boom".to_string()).user_message(),
            "Network error. Please check your connection and try again."
        );
        assert_eq!(
            ApiError::Connect("refused".to_string()).user_message(),
            "Unable to connect to server. Please try again later."
        );
    }

    #[test]
    fn test_body_error_string_wins() {
        let err = response(
            400,
            r#"{"error": "Dish is sold out", "message": "ignored"}"#,
        );
        assert_eq!(err.user_message(), "Dish is sold out");
    }

    #[test]
    fn test_body_message_when_error_absent() {
        let err = response(400, r#"{"message": "Cart is empty"}"#);
        assert_eq!(err.user_message(), "Cart is empty");
    }

    #[test]
    fn test_legacy_error_object_message() {
        let err = response(400, r#"{"error": {"message": "Legacy shape"}}"#);
        assert_eq!(err.user_message(), "Legacy shape");
    }

    #[test]
    fn test_message_beats_legacy_error_object() {
        let err = response(
            400,
            r#"{"error": {"message": "legacy"}, "message": "Flat message"}"#,
        );
        assert_eq!(err.user_message(), "Flat message");
    }

    #[test]
    fn test_first_field_error_used_as_message() {
        let err = response(
            400,
            r#"{"errors": {"email": ["Email is invalid", "second"], "name": "Name required"}}"#,
        );
        // First entry of the (ordered) errors map; array values contribute
        // their first element.
        assert_eq!(err.user_message(), "Email is invalid");
    }

    #[test]
    fn test_empty_strings_skipped() {
        let err = response(404, r#"{"error": "", "message": "   "}"#);
        assert_eq!(err.user_message(), "The requested resource was not found.");
    }

    #[test]
    fn test_status_table() {
        let cases = [
            (400, "Invalid request. Please check your input and try again."),
            (401, "Invalid credentials. Please try again."),
            (403, "You do not have permission to perform this action."),
            (404, "The requested resource was not found."),
            (429, "Too many requests. Please try again later."),
            (500, "Server error. Please try again later."),
            (502, "Service temporarily unavailable. Please try again later."),
            (503, "Service temporarily unavailable. Please try again later."),
            (504, "Service temporarily unavailable. Please try again later."),
        ];
        for (status, expected) in cases {
            assert_eq!(response(status, "{}").user_message(), expected);
        }
        assert_eq!(response(418, "{}").user_message(), "An error occurred (418).");
    }

    #[test]
    fn test_not_found_with_empty_data_body() {
        let err = response(404, r#"{"data": {}}"#);
        assert_eq!(err.user_message(), "The requested resource was not found.");
    }

    #[test]
    fn test_field_errors_extraction() {
        let err = response(
            400,
            r#"{"errors": {"email": "Email is invalid", "phone": ["Too short"], "age": 42, "tags": []}}"#,
        );
        let fields = err.field_errors();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields.get("email").unwrap(), "Email is invalid");
        assert_eq!(fields.get("phone").unwrap(), "Too short");
        assert!(!fields.contains_key("age"));
        assert!(!fields.contains_key("tags"));
    }

    #[test]
    fn test_field_errors_empty_when_absent() {
        assert!(response(500, "{}").field_errors().is_empty());
        assert!(ApiError::Timeout.field_errors().is_empty());
    }

    #[test]
    fn test_malformed_body_falls_back_to_status() {
        let err = response(500, "<html>Internal Server Error</html>");
        assert_eq!(err.user_message(), "Server error. Please try again later.");
    }

    #[test]
    fn test_rate_limit_info_only_on_429() {
        let info = RateLimitInfo {
            limit: 10,
            remaining: 0,
            reset_epoch_seconds: 0,
            retry_after_seconds: None,
        };
        let not_rate_limited = ApiError::Response(ErrorResponse {
            status: 404,
            body: ErrorBody::default(),
            rate_limit: Some(info),
        });
        assert!(not_rate_limited.rate_limit_info().is_none());
        assert_eq!(rate_limited(info).rate_limit_info(), Some(info));
    }

    #[test]
    fn test_retry_after_message() {
        let err = rate_limited(RateLimitInfo {
            limit: 0,
            remaining: 0,
            reset_epoch_seconds: 0,
            retry_after_seconds: Some(30),
        });
        let message = err.user_message();
        assert!(message.contains("30 second"), "got: {message}");
        assert!(err.is_rate_limited());
    }

    #[test]
    fn test_remaining_attempts_message() {
        let info = RateLimitInfo {
            limit: 5,
            remaining: 2,
            reset_epoch_seconds: 0,
            retry_after_seconds: None,
        };
        assert_eq!(
            info.message_at(1_000),
            "Too many attempts. You have 2 of 5 attempts remaining."
        );
    }

    #[test]
    fn test_reset_time_message() {
        let info = RateLimitInfo {
            limit: 5,
            remaining: 0,
            reset_epoch_seconds: 1_045,
            retry_after_seconds: None,
        };
        assert_eq!(info.message_at(1_000), "You can try again in 45 seconds.");
    }

    #[test]
    fn test_format_retry_time_units() {
        assert_eq!(format_retry_time_at(900, 1_000), "now");
        assert_eq!(format_retry_time_at(1_000, 1_000), "now");
        assert_eq!(format_retry_time_at(1_001, 1_000), "in 1 second");
        assert_eq!(format_retry_time_at(1_045, 1_000), "in 45 seconds");
        assert_eq!(format_retry_time_at(1_090, 1_000), "in 2 minutes");
        assert_eq!(format_retry_time_at(1_060, 1_000), "in 1 minute");
        assert_eq!(format_retry_time_at(8_200, 1_000), "in 2 hours");
    }

    #[test]
    fn test_duration_pluralization() {
        assert_eq!(format_duration(1), "1 second");
        assert_eq!(format_duration(59), "59 seconds");
        assert_eq!(format_duration(60), "1 minute");
        assert_eq!(format_duration(3599), "60 minutes");
        assert_eq!(format_duration(3600), "1 hour");
        assert_eq!(format_duration(7201), "3 hours");
    }

    #[test]
    fn test_from_headers_requires_usable_data() {
        use reqwest::header::{HeaderMap, HeaderValue};

        let mut headers = HeaderMap::new();
        assert!(RateLimitInfo::from_headers(&headers).is_none());

        headers.insert("x-ratelimit-limit", HeaderValue::from_static("0"));
        assert!(RateLimitInfo::from_headers(&headers).is_none());

        headers.insert("x-ratelimit-remaining", HeaderValue::from_static("0"));
        let info = RateLimitInfo::from_headers(&headers).unwrap();
        assert_eq!(info.limit, 0);
        assert_eq!(info.remaining, 0);

        let mut headers = HeaderMap::new();
        headers.insert("retry-after", HeaderValue::from_static("30"));
        let info = RateLimitInfo::from_headers(&headers).unwrap();
        assert_eq!(info.retry_after_seconds, Some(30));
    }
}
