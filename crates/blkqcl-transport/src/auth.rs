use core::fmt;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

use crate::http::{check_header, HeaderError};

const AUTHORIZATION: &str = "Authorization";

/// Value of the `Authorization` header sent with every request.
#[derive(Clone, PartialEq, Eq)]
pub struct Authorization {
    header: String,
}

impl Authorization {
    /// HTTP Basic credentials, `Basic base64(user:password)`. The user-id may
    /// not contain `:` and neither part may contain control characters.
    pub fn basic(user: &str, password: &str) -> Result<Self, HeaderError> {
        if user.contains(':') {
            return Err(HeaderError::UserIdColon);
        }
        check_header(AUTHORIZATION, user)?;
        check_header(AUTHORIZATION, password)?;
        Ok(Self {
            header: format!("Basic {}", BASE64.encode(format!("{user}:{password}"))),
        })
    }

    /// A pre-built header value, sent verbatim.
    pub fn from_header_value(value: impl Into<String>) -> Result<Self, HeaderError> {
        let header = value.into();
        check_header(AUTHORIZATION, &header)?;
        Ok(Self { header })
    }

    pub fn header_value(&self) -> &str {
        &self.header
    }
}

impl fmt::Debug for Authorization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scheme = self.header.split_whitespace().next().unwrap_or("");
        write!(f, "Authorization({scheme} <redacted>)")
    }
}
