use remote_hash_store::StoreError;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Invalid URL: {message}")]
    InvalidUrl { message: String },

    #[error("Invalid header name: {0}")]
    InvalidHeaderName(#[from] http::header::InvalidHeaderName),

    #[error("Invalid header value: {0}")]
    InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("{segment:?} cannot be a URL path segment")]
    DotSegment { segment: String },
}

impl From<Error> for StoreError {
    fn from(error: Error) -> Self {
        match error {
            Error::Http(e) if e.is_decode() => StoreError::Decode {
                message: e.to_string(),
            },
            Error::Http(e) => StoreError::Transport(Box::new(e)),
            Error::Json(e) => StoreError::Decode {
                message: e.to_string(),
            },
            Error::Status { status, body } => StoreError::Status {
                status,
                message: body,
            },
            Error::DotSegment { segment } => StoreError::InvalidName {
                name: segment,
                reason: "dot segments are removed from URL paths".to_string(),
            },
            e @ (Error::UrlParse(_)
            | Error::InvalidUrl { .. }
            | Error::InvalidHeaderName(_)
            | Error::InvalidHeaderValue(_)) => StoreError::InvalidConfig {
                message: e.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_becomes_store_status() {
        let e: StoreError = Error::Status {
            status: 500,
            body: "boom".to_string(),
        }
        .into();
        assert!(matches!(e, StoreError::Status { status: 500, ref message } if message == "boom"));
    }

    #[test]
    fn bad_url_becomes_invalid_config() {
        let parse_err = url::Url::parse("::nope").unwrap_err();
        let e: StoreError = Error::from(parse_err).into();
        assert!(matches!(e, StoreError::InvalidConfig { .. }));
    }

    #[test]
    fn json_becomes_decode() {
        let json_err = serde_json::from_str::<String>("{").unwrap_err();
        let e: StoreError = Error::from(json_err).into();
        assert!(matches!(e, StoreError::Decode { .. }));
    }

    #[test]
    fn dot_segment_becomes_invalid_name() {
        let e: StoreError = Error::DotSegment {
            segment: "..".to_string(),
        }
        .into();
        assert!(matches!(e, StoreError::InvalidName { ref name, .. } if name == ".."));
    }
}
