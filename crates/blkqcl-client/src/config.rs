use std::time::Duration;

use blkqcl_core::ProtocolVersion;
use blkqcl_transport::connection::DEFAULT_CONNECT_TIMEOUT;
use blkqcl_transport::{Authorization, Endpoint, HeaderError, TransportError, TransportOptions};
use thiserror::Error;

/// Local configuration mistakes, reported before any I/O.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("a pre-built authorization header excludes a username/password pair")]
    ConflictingCredentials,
    #[error("username and password must be given together")]
    IncompleteCredentials,
    #[error("invalid credentials: {0}")]
    InvalidCredentials(HeaderError),
    #[error("pipelining depth {0} is below 2")]
    PipelineDepth(usize),
    #[error("invalid endpoint: {0}")]
    Endpoint(String),
}

/// How many identical requests a pipelined client keeps in flight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Pipelining {
    #[default]
    Off,
    Depth(usize),
}

impl Pipelining {
    pub const fn depth(self) -> Option<usize> {
        match self {
            Self::Off => None,
            Self::Depth(n) => Some(n),
        }
    }
}

impl From<bool> for Pipelining {
    fn from(on: bool) -> Self {
        if on {
            Self::Depth(2)
        } else {
            Self::Off
        }
    }
}

impl From<usize> for Pipelining {
    fn from(depth: usize) -> Self {
        match depth {
            0 => Self::Off,
            n => Self::Depth(n),
        }
    }
}

/// Which schema revision a client speaks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum VersionSelector {
    /// Probe the device newest-first with `GetDeviceName`.
    #[default]
    Automatic,
    Explicit(ProtocolVersion),
}

impl From<ProtocolVersion> for VersionSelector {
    fn from(version: ProtocolVersion) -> Self {
        Self::Explicit(version)
    }
}

/// Validated, immutable client settings. Built with [`ClientConfig::builder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    endpoint: Endpoint,
    authorization: Option<Authorization>,
    pipelining: Pipelining,
    transport: TransportOptions,
    version: VersionSelector,
}

impl ClientConfig {
    pub fn builder(endpoint: impl Into<String>) -> ClientConfigBuilder {
        ClientConfigBuilder {
            endpoint: endpoint.into(),
            authorization: None,
            username: None,
            password: None,
            pipelining: Pipelining::Off,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            response_timeout: None,
            version: VersionSelector::Automatic,
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn authorization(&self) -> Option<&Authorization> {
        self.authorization.as_ref()
    }

    pub fn pipelining(&self) -> Pipelining {
        self.pipelining
    }

    pub fn transport_options(&self) -> TransportOptions {
        self.transport
    }

    pub fn version(&self) -> VersionSelector {
        self.version
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfigBuilder {
    endpoint: String,
    authorization: Option<String>,
    username: Option<String>,
    password: Option<String>,
    pipelining: Pipelining,
    connect_timeout: Duration,
    response_timeout: Option<Duration>,
    version: VersionSelector,
}

impl ClientConfigBuilder {
    /// A complete `Authorization` header value, e.g. `Basic dXNlcjpwdw==`.
    pub fn with_authorization(mut self, header_value: impl Into<String>) -> Self {
        self.authorization = Some(header_value.into());
        self
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_credentials(self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.with_username(username).with_password(password)
    }

    /// `true` means depth 2; `0`/`false` turns pipelining off.
    pub fn with_pipelining(mut self, pipelining: impl Into<Pipelining>) -> Self {
        self.pipelining = pipelining.into();
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = Some(timeout);
        self
    }

    pub fn with_version(mut self, version: impl Into<VersionSelector>) -> Self {
        self.version = version.into();
        self
    }

    pub fn build(self) -> Result<ClientConfig, ConfigError> {
        let authorization = match (self.authorization, self.username, self.password) {
            (Some(_), Some(_), _) | (Some(_), _, Some(_)) => {
                return Err(ConfigError::ConflictingCredentials)
            }
            (Some(header), None, None) => Some(
                Authorization::from_header_value(header)
                    .map_err(ConfigError::InvalidCredentials)?,
            ),
            (None, Some(user), Some(password)) => Some(
                Authorization::basic(&user, &password).map_err(ConfigError::InvalidCredentials)?,
            ),
            (None, Some(_), None) | (None, None, Some(_)) => {
                return Err(ConfigError::IncompleteCredentials)
            }
            (None, None, None) => None,
        };
        if let Pipelining::Depth(n) = self.pipelining {
            if n < 2 {
                return Err(ConfigError::PipelineDepth(n));
            }
        }
        let endpoint = Endpoint::parse(&self.endpoint).map_err(|err| match err {
            TransportError::InvalidEndpoint(why) => ConfigError::Endpoint(why),
            other => ConfigError::Endpoint(other.to_string()),
        })?;
        Ok(ClientConfig {
            endpoint,
            authorization,
            pipelining: self.pipelining,
            transport: TransportOptions {
                connect_timeout: self.connect_timeout,
                response_timeout: self.response_timeout,
            },
            version: self.version,
        })
    }
}
