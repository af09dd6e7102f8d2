//! Mapping HTTP/reqwest errors to [`ProviderError`].

use std::time::Duration;

use trickle_types::ProviderError;

/// Map an HTTP status code to a [`ProviderError`].
///
/// Reference: <https://platform.openai.com/docs/guides/error-codes>
pub fn map_http_status(status: reqwest::StatusCode, body: &str) -> ProviderError {
    match status.as_u16() {
        401 | 403 => ProviderError::Authentication(body.to_string()),
        400 | 422 => ProviderError::InvalidRequest(body.to_string()),
        404 => ProviderError::ModelNotFound(body.to_string()),
        // 429 may carry a delay in the message; parsed best-effort
        429 => ProviderError::RateLimit {
            retry_after: parse_retry_after(body),
        },
        500 | 502 | 503 | 504 => ProviderError::ServiceUnavailable(body.to_string()),
        _ => ProviderError::InvalidRequest(format!("HTTP {status}: {body}")),
    }
}

/// Pull a "retry after N seconds" hint out of an error body.
fn parse_retry_after(body: &str) -> Option<Duration> {
    let lower = body.to_lowercase();
    let idx = lower.find("retry after ")?;
    let digits: String = lower[idx + "retry after ".len()..]
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse::<u64>().ok().map(Duration::from_secs)
}

/// Timeouts a client was configured with, reported back when one fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutLimits {
    /// Limit on establishing a connection.
    pub connect: Duration,
    /// Limit on silence between two reads, if any.
    pub read: Option<Duration>,
}

/// Map a [`reqwest::Error`] to a [`ProviderError`].
///
/// Timeouts carry the limit that fired: the connect limit for connection
/// failures, otherwise the read limit.
pub fn map_reqwest_error(err: reqwest::Error, limits: TimeoutLimits) -> ProviderError {
    if err.is_timeout() {
        let limit = match limits.read {
            Some(read) if !err.is_connect() => read,
            _ => limits.connect,
        };
        ProviderError::Timeout(limit)
    } else {
        ProviderError::Network(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_401_and_403_to_authentication() {
        let err = map_http_status(reqwest::StatusCode::UNAUTHORIZED, "Invalid API key");
        assert!(matches!(err, ProviderError::Authentication(_)));
        let err = map_http_status(reqwest::StatusCode::FORBIDDEN, "nope");
        assert!(matches!(err, ProviderError::Authentication(_)));
    }

    #[test]
    fn map_400_to_invalid_request() {
        let err = map_http_status(reqwest::StatusCode::BAD_REQUEST, "Bad request");
        assert!(matches!(err, ProviderError::InvalidRequest(_)));
    }

    #[test]
    fn map_404_to_model_not_found() {
        let err = map_http_status(reqwest::StatusCode::NOT_FOUND, "The model does not exist");
        assert!(matches!(err, ProviderError::ModelNotFound(_)));
    }

    #[test]
    fn map_429_with_retry_after() {
        let err = map_http_status(
            reqwest::StatusCode::TOO_MANY_REQUESTS,
            "Please retry after 20 seconds",
        );
        match err {
            ProviderError::RateLimit { retry_after } => {
                assert_eq!(retry_after, Some(Duration::from_secs(20)));
            }
            other => panic!("expected RateLimit, got {other:?}"),
        }
    }

    #[test]
    fn map_5xx_to_service_unavailable() {
        for status in [
            reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            reqwest::StatusCode::BAD_GATEWAY,
            reqwest::StatusCode::SERVICE_UNAVAILABLE,
            reqwest::StatusCode::GATEWAY_TIMEOUT,
        ] {
            let err = map_http_status(status, "down");
            assert!(matches!(err, ProviderError::ServiceUnavailable(_)));
            assert!(err.is_retryable());
        }
    }

    #[test]
    fn map_unknown_status_keeps_code() {
        let err = map_http_status(reqwest::StatusCode::IM_A_TEAPOT, "teapot");
        match err {
            ProviderError::InvalidRequest(msg) => assert!(msg.contains("418")),
            other => panic!("expected InvalidRequest, got {other:?}"),
        }
    }

    #[test]
    fn parse_retry_after_absent() {
        assert_eq!(parse_retry_after("Generic error message"), None);
        assert_eq!(parse_retry_after("retry after soon"), None);
    }
}
