//! Minimal HTTP/1.1 framing: request serialization and response parsing.

use std::borrow::Cow;
use std::io;

use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

use crate::{Authorization, Endpoint, TransportError};

/// Largest response body accepted, in bytes.
pub const MAX_BODY_LEN: usize = 64 * 1024 * 1024;
const MAX_LINE_LEN: usize = 8 * 1024;
const MAX_HEADERS: usize = 128;

/// A `POST /` carrying a SOAP envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl HttpRequest {
    /// Request with the headers the device expects for SOAP calls.
    pub fn soap(body: impl Into<Vec<u8>>) -> Self {
        Self {
            headers: vec![
                ("Content-Type".into(), "text/xml".into()),
                ("Accept".into(), "text/xml".into()),
                ("Connection".into(), "keep-alive".into()),
            ],
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_authorization(self, auth: Option<&Authorization>) -> Self {
        match auth {
            Some(auth) => self.with_header("Authorization", auth.header_value()),
            None => self,
        }
    }

    pub fn headers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Request line, `Host`, the stored headers, `Content-Length`, then the body.
    ///
    /// Fails if a stored header would break the header block.
    pub fn serialize(&self, endpoint: &Endpoint) -> Result<Vec<u8>, HeaderError> {
        let mut head = format!("POST / HTTP/1.1\r\nHost: {}\r\n", endpoint.authority());
        for (name, value) in &self.headers {
            check_header(name, value)?;
            head.push_str(name);
            head.push_str(": ");
            head.push_str(value);
            head.push_str("\r\n");
        }
        head.push_str(&format!("Content-Length: {}\r\n\r\n", self.body.len()));
        let mut out = head.into_bytes();
        out.extend_from_slice(&self.body);
        Ok(out)
    }
}

/// A header that cannot be written as a single HTTP/1.1 field line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeaderError {
    #[error("invalid header name {0:?}")]
    Name(String),
    #[error("value of header {name} contains control byte {byte:#04x}")]
    Value { name: String, byte: u8 },
    #[error("Basic auth user-id contains ':'")]
    UserIdColon,
}

/// Names must be RFC 9110 tokens. Values may hold tab and visible bytes but
/// no CR, LF, NUL or other control bytes.
pub fn check_header(name: &str, value: &str) -> Result<(), HeaderError> {
    let is_tchar = |b: u8| b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b);
    if name.is_empty() || !name.bytes().all(is_tchar) {
        return Err(HeaderError::Name(name.to_owned()));
    }
    match value.bytes().find(|&b| (b < 0x20 && b != b'\t') || b == 0x7f) {
        Some(byte) => Err(HeaderError::Value {
            name: name.to_owned(),
            byte,
        }),
        None => Ok(()),
    }
}

/// A fully read response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    status: u16,
    reason: String,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
    will_close: bool,
}

impl HttpResponse {
    /// Builds a response as an HTTP/1.1 peer would send it; `will_close`
    /// follows the `Connection` header.
    pub fn new(
        status: u16,
        reason: impl Into<String>,
        headers: Vec<(String, String)>,
        body: Vec<u8>,
    ) -> Self {
        let will_close = connection_has(&headers, "close");
        Self {
            status,
            reason: reason.into(),
            headers,
            body,
            will_close,
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn headers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// First header with the given name, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        header(&self.headers, name)
    }

    /// The peer closes the connection after this response.
    pub fn will_close(&self) -> bool {
        self.will_close
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn into_body(self) -> Vec<u8> {
        self.body
    }

    /// The body of a 2xx response, or the status as an error.
    pub fn error_for_status(self) -> Result<Vec<u8>, HttpStatusError> {
        if self.is_success() {
            Ok(self.body)
        } else {
            Err(HttpStatusError {
                status: self.status,
                reason: self.reason,
                body: self.body,
            })
        }
    }
}

/// A non-2xx response, body included.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("HTTP {status} {reason}")]
pub struct HttpStatusError {
    pub status: u16,
    pub reason: String,
    pub body: Vec<u8>,
}

impl HttpStatusError {
    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

fn header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

fn connection_has(headers: &[(String, String)], token: &str) -> bool {
    headers
        .iter()
        .filter(|(k, _)| k.eq_ignore_ascii_case("connection"))
        .flat_map(|(_, v)| v.split(','))
        .any(|t| t.trim().eq_ignore_ascii_case(token))
}

fn malformed(why: impl Into<String>) -> TransportError {
    TransportError::MalformedResponse(why.into())
}

fn eof_is_closed(err: io::Error) -> TransportError {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        TransportError::ConnectionClosed
    } else {
        TransportError::Io(err)
    }
}

/// Reads one CRLF- or LF-terminated line without its terminator. `None` at a
/// clean end of stream.
async fn read_line<R>(reader: &mut R) -> Result<Option<String>, TransportError>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = Vec::new();
    let n = AsyncReadExt::take(&mut *reader, MAX_LINE_LEN as u64)
        .read_until(b'\n', &mut line)
        .await?;
    if n == 0 {
        return Ok(None);
    }
    if line.last() != Some(&b'\n') {
        return Err(if n >= MAX_LINE_LEN {
            malformed("header line too long")
        } else {
            TransportError::ConnectionClosed
        });
    }
    line.pop();
    if line.last() == Some(&b'\r') {
        line.pop();
    }
    String::from_utf8(line)
        .map(Some)
        .map_err(|_| malformed("header is not UTF-8"))
}

fn parse_status_line(line: &str) -> Result<(bool, u16, String), TransportError> {
    let mut parts = line.splitn(3, ' ');
    let version = parts.next().unwrap_or_default();
    if !version.starts_with("HTTP/1.") {
        return Err(malformed(format!("bad status line {line:?}")));
    }
    let status = parts
        .next()
        .and_then(|s| s.parse::<u16>().ok())
        .filter(|s| (100..600).contains(s))
        .ok_or_else(|| malformed(format!("bad status line {line:?}")))?;
    let reason = parts.next().unwrap_or_default().trim().to_owned();
    Ok((version == "HTTP/1.0", status, reason))
}

async fn read_headers<R>(reader: &mut R) -> Result<Vec<(String, String)>, TransportError>
where
    R: AsyncBufRead + Unpin,
{
    let mut headers = Vec::new();
    loop {
        let line = read_line(reader)
            .await?
            .ok_or(TransportError::ConnectionClosed)?;
        if line.is_empty() {
            return Ok(headers);
        }
        if headers.len() == MAX_HEADERS {
            return Err(malformed("too many headers"));
        }
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| malformed(format!("bad header {line:?}")))?;
        headers.push((name.trim().to_owned(), value.trim().to_owned()));
    }
}

async fn read_chunked<R>(reader: &mut R) -> Result<Vec<u8>, TransportError>
where
    R: AsyncBufRead + Unpin,
{
    let mut body = Vec::new();
    loop {
        let line = read_line(reader)
            .await?
            .ok_or(TransportError::ConnectionClosed)?;
        let size_text = line.split(';').next().unwrap_or_default().trim();
        let size = usize::from_str_radix(size_text, 16)
            .map_err(|_| malformed(format!("bad chunk size {size_text:?}")))?;
        if size == 0 {
            // Trailers are read and dropped.
            while !read_line(reader)
                .await?
                .ok_or(TransportError::ConnectionClosed)?
                .is_empty()
            {}
            return Ok(body);
        }
        if body.len().saturating_add(size) > MAX_BODY_LEN {
            return Err(malformed("response body too large"));
        }
        let start = body.len();
        body.resize(start + size, 0);
        reader
            .read_exact(&mut body[start..])
            .await
            .map_err(eof_is_closed)?;
        let terminator = read_line(reader)
            .await?
            .ok_or(TransportError::ConnectionClosed)?;
        if !terminator.is_empty() {
            return Err(malformed("chunk not followed by CRLF"));
        }
    }
}

/// Reads the next final response from `reader`, skipping interim 1xx
/// responses.
///
/// The body is framed by `Transfer-Encoding: chunked`, then `Content-Length`,
/// and otherwise runs to end of stream, in which case the response is marked
/// as closing.
pub async fn read_response<R>(reader: &mut R) -> Result<HttpResponse, TransportError>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let status_line = read_line(reader)
            .await?
            .ok_or(TransportError::ConnectionClosed)?;
        let (http10, status, reason) = parse_status_line(&status_line)?;
        let headers = read_headers(reader).await?;
        if (100..200).contains(&status) {
            log::trace!("skipping interim {status} response");
            continue;
        }

        let chunked = header(&headers, "transfer-encoding")
            .is_some_and(|v| v.to_ascii_lowercase().contains("chunked"));
        let mut read_to_eof = false;
        let body = if status == 204 || status == 304 {
            Vec::new()
        } else if chunked {
            read_chunked(reader).await?
        } else if let Some(len) = header(&headers, "content-length") {
            let len = len
                .parse::<usize>()
                .map_err(|_| malformed(format!("bad Content-Length {len:?}")))?;
            if len > MAX_BODY_LEN {
                return Err(malformed("response body too large"));
            }
            let mut body = vec![0; len];
            reader.read_exact(&mut body).await.map_err(eof_is_closed)?;
            body
        } else {
            read_to_eof = true;
            let mut body = Vec::new();
            AsyncReadExt::take(&mut *reader, MAX_BODY_LEN as u64 + 1)
                .read_to_end(&mut body)
                .await?;
            if body.len() > MAX_BODY_LEN {
                return Err(malformed("response body too large"));
            }
            body
        };

        let will_close = read_to_eof
            || connection_has(&headers, "close")
            || (http10 && !connection_has(&headers, "keep-alive"));
        return Ok(HttpResponse {
            status,
            reason,
            headers,
            body,
            will_close,
        });
    }
}
