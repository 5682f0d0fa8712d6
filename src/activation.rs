//! Activation policies deciding which option set applies to a live
//! request/response pair.

use std::fmt;
use std::sync::Arc;

/// Request snapshot handed to predicates.
///
/// Carries the header values content-negotiation predicates need; the
/// integration layer builds one per request. Header lookup is
/// case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct Request {
    headers: Vec<(String, String)>,
}

impl Request {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a header value, builder style.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// First value of the named header.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(header, _)| header.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Response snapshot handed to predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Response {
    status: u16,
}

impl Response {
    pub fn new(status: u16) -> Self {
        Self { status }
    }

    pub fn status(&self) -> u16 {
        self.status
    }
}

/// Shared predicate over a request/response pair.
///
/// Predicates compare by identity, not by behavior: clones of one predicate
/// are equal, separately constructed predicates never are.
#[derive(Clone)]
pub struct Predicate(Arc<dyn Fn(&Request, &Response) -> bool + Send + Sync>);

impl Predicate {
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&Request, &Response) -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(predicate))
    }

    pub fn evaluate(&self, req: &Request, res: &Response) -> bool {
        (self.0)(req, res)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate(..)")
    }
}

impl PartialEq for Predicate {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Activation policy held in an option set's apply slot or as an
/// annotation-level default.
#[derive(Debug, Clone, PartialEq)]
pub enum ApplyPolicy {
    /// Apply unconditionally.
    Always,
    /// Never apply: the option set stays declared but inert.
    Never,
    /// Apply when the predicate holds.
    When(Predicate),
}

impl ApplyPolicy {
    pub fn evaluate(&self, req: &Request, res: &Response) -> bool {
        match self {
            ApplyPolicy::Always => true,
            ApplyPolicy::Never => false,
            ApplyPolicy::When(predicate) => predicate.evaluate(req, res),
        }
    }
}

impl From<Predicate> for ApplyPolicy {
    fn from(predicate: Predicate) -> Self {
        ApplyPolicy::When(predicate)
    }
}

/// Predicate matching one response status code exactly.
pub fn match_status_code(code: u16) -> Predicate {
    Predicate::new(move |_req, res| res.status() == code)
}
