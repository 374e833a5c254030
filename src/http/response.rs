use std::fmt;
use std::io::{self, Write};
use tracing::warn;

/// Ways a response can reject a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseError {
    /// Status codes must fall within 100..=599.
    InvalidStatusCode(u16),
}

impl fmt::Display for ResponseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidStatusCode(code) => {
                write!(f, "invalid status code {code}; must be within 100..=599")
            }
        }
    }
}

impl std::error::Error for ResponseError {}

/// Accumulating response: named body segments in insertion order, normalized
/// headers, raw header lines, and a validated status code.
#[derive(Debug)]
pub struct Response {
    body: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    headers_raw: Vec<String>,
    status: u16,
    is_redirect: bool,
    sent: bool,
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl Response {
    pub fn new() -> Self {
        Self {
            body: Vec::new(),
            headers: Vec::new(),
            headers_raw: Vec::new(),
            status: 200,
            is_redirect: false,
            sent: false,
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn set_status(&mut self, code: u16) -> Result<(), ResponseError> {
        if !(100..=599).contains(&code) {
            return Err(ResponseError::InvalidStatusCode(code));
        }
        self.is_redirect = (300..=307).contains(&code);
        self.status = code;
        Ok(())
    }

    /// Set a name/value header. The name is normalized to
    /// `X-Capitalized-Names` form. With `replace`, every header already
    /// carrying the same normalized name is dropped first; otherwise the new
    /// value is appended alongside them.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>, replace: bool) -> &mut Self {
        let name = normalize_header_name(name);
        if replace {
            self.headers.retain(|(existing, _)| *existing != name);
        }
        self.headers.push((name, value.into()));
        self
    }

    /// Append a pre-formatted header line verbatim. Raw lines are emitted
    /// before typed headers, in insertion order.
    pub fn set_raw_header(&mut self, line: impl Into<String>) -> &mut Self {
        let line = line.into();
        if line.starts_with("Location:") {
            self.is_redirect = true;
        }
        self.headers_raw.push(line);
        self
    }

    pub fn set_redirect(&mut self, url: &str, code: u16) -> Result<(), ResponseError> {
        self.set_header("Location", url, true);
        self.set_status(code)
    }

    pub fn is_redirect(&self) -> bool {
        self.is_redirect
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn raw_headers(&self) -> &[String] {
        &self.headers_raw
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        let name = normalize_header_name(name);
        self.headers
            .iter()
            .find(|(existing, _)| *existing == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn clear_headers(&mut self) -> &mut Self {
        self.headers.clear();
        self
    }

    pub fn clear_raw_headers(&mut self) -> &mut Self {
        self.headers_raw.clear();
        self
    }

    /// Set a named body segment. An existing segment with the same name is
    /// replaced and moved to the end of the emission order.
    pub fn append(&mut self, name: &str, content: impl Into<String>) -> &mut Self {
        self.body.retain(|(existing, _)| existing != name);
        self.body.push((name.to_string(), content.into()));
        self
    }

    /// Like [`Response::append`], but the segment moves to the front.
    pub fn prepend(&mut self, name: &str, content: impl Into<String>) -> &mut Self {
        self.body.retain(|(existing, _)| existing != name);
        self.body.insert(0, (name.to_string(), content.into()));
        self
    }

    /// Reset the body to a single unnamed (`default`) segment.
    pub fn set_body(&mut self, content: impl Into<String>) -> &mut Self {
        self.body.clear();
        self.body.push(("default".to_string(), content.into()));
        self
    }

    /// Append to the `default` segment, creating it at the end when absent.
    pub fn append_body(&mut self, content: &str) -> &mut Self {
        match self.body.iter_mut().find(|(name, _)| name == "default") {
            Some((_, existing)) => existing.push_str(content),
            None => self.body.push(("default".to_string(), content.to_string())),
        }
        self
    }

    pub fn segment(&self, name: &str) -> Option<&str> {
        self.body
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, content)| content.as_str())
    }

    /// Drop one named segment, or the whole body when `name` is `None`.
    /// Returns whether anything was removed.
    pub fn clear_body(&mut self, name: Option<&str>) -> bool {
        match name {
            Some(name) => {
                let before = self.body.len();
                self.body.retain(|(existing, _)| existing != name);
                self.body.len() != before
            }
            None => {
                let had_any = !self.body.is_empty();
                self.body.clear();
                had_any
            }
        }
    }

    /// The full body: every segment concatenated in emission order.
    pub fn body(&self) -> String {
        let mut combined = String::new();
        for (_, content) in &self.body {
            combined.push_str(content);
        }
        combined
    }

    pub fn sent(&self) -> bool {
        self.sent
    }

    /// Serialize the response: status line (unless the first raw header
    /// already carries one), raw header lines, typed headers, blank line,
    /// concatenated body. A second send is a warned no-op.
    pub fn send(&mut self, sink: &mut dyn Write) -> io::Result<()> {
        if self.sent {
            warn!(status = self.status, "response already sent; ignoring second send");
            return Ok(());
        }
        self.sent = true;

        let raw_carries_status = self
            .headers_raw
            .first()
            .is_some_and(|line| line.starts_with("HTTP/"));
        if !raw_carries_status {
            write!(
                sink,
                "HTTP/1.1 {} {}\r\n",
                self.status,
                status_reason(self.status)
            )?;
        }
        for line in &self.headers_raw {
            write!(sink, "{line}\r\n")?;
        }
        for (name, value) in &self.headers {
            write!(sink, "{name}: {value}\r\n")?;
        }
        write!(sink, "\r\n")?;
        for (_, content) in &self.body {
            sink.write_all(content.as_bytes())?;
        }
        Ok(())
    }
}

/// Normalize a header name to `X-Capitalized-Names` form: `-` and `_` both
/// separate words, each word starts upper-case and continues lower-case.
fn normalize_header_name(name: &str) -> String {
    name.split(['-', '_'])
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    let mut out = String::with_capacity(word.len());
                    out.push(first.to_ascii_uppercase());
                    out.extend(chars.map(|c| c.to_ascii_lowercase()));
                    out
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

/// Reason phrase for common status codes used in the status line.
fn status_reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        301 => "Moved Permanently",
        302 => "Found",
        303 => "See Other",
        307 => "Temporary Redirect",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "OK",
    }
}
