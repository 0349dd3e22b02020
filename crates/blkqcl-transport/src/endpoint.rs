use core::fmt;
use core::str::FromStr;

use crate::TransportError;

/// Port used when the endpoint string carries none.
pub const DEFAULT_PORT: u16 = 8080;

/// Host and port of a device's SOAP service.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    host: String,
    port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Parses `host`, `host:port`, `[v6]:port` or a bare IPv6 literal, with an
    /// optional `http://` prefix and a trailing `/`.
    pub fn parse(input: &str) -> Result<Self, TransportError> {
        let invalid = |why: &str| TransportError::InvalidEndpoint(format!("{input:?}: {why}"));
        let mut rest = input.trim();
        if let Some((scheme, after)) = rest.split_once("://") {
            if !scheme.eq_ignore_ascii_case("http") {
                return Err(invalid("only plain http is supported"));
            }
            rest = after;
        }
        let rest = match rest.find('/') {
            Some(i) if &rest[i..] == "/" => &rest[..i],
            Some(_) => return Err(invalid("requests always go to `/`; drop the path")),
            None => rest,
        };

        let (host, port) = if let Some(bracketed) = rest.strip_prefix('[') {
            let (host, tail) = bracketed
                .split_once(']')
                .ok_or_else(|| invalid("unterminated `[`"))?;
            match tail {
                "" => (host, None),
                _ => (
                    host,
                    Some(tail.strip_prefix(':').ok_or_else(|| invalid("junk after `]`"))?),
                ),
            }
        } else if rest.matches(':').count() > 1 {
            (rest, None)
        } else {
            match rest.split_once(':') {
                Some((host, port)) => (host, Some(port)),
                None => (rest, None),
            }
        };

        if host.is_empty() {
            return Err(invalid("missing host"));
        }
        let port = match port {
            Some(p) => p
                .parse::<u16>()
                .ok()
                .filter(|&p| p != 0)
                .ok_or_else(|| invalid("bad port"))?,
            None => DEFAULT_PORT,
        };
        Ok(Self::new(host, port))
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// `Host` header value.
    pub fn authority(&self) -> String {
        self.to_string()
    }
}

impl FromStr for Endpoint {
    type Err = TransportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}
