//! Field-level validation primitives shared by the request validators.
//!
//! Validators never fail on well-typed input: they collect human-readable
//! messages in rule order and hand them back as [`ValidationErrors`].

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ValidationErrors;

/// Number of digits in a RUC (tax identifier).
pub const RUC_LENGTH: usize = 11;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
});

/// Exactly eleven ASCII digits.
pub fn is_valid_ruc(ruc: &str) -> bool {
    ruc.len() == RUC_LENGTH && ruc.bytes().all(|b| b.is_ascii_digit())
}

/// `local@domain.tld` shape check (not a full RFC 5322 parser).
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Length of `value` after trimming surrounding whitespace, in characters.
pub fn trimmed_len(value: &str) -> usize {
    value.trim().chars().count()
}

/// Accumulates validation messages in the order rules are checked.
#[derive(Debug, Default)]
pub struct Validator {
    errors: ValidationErrors,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `msg` unless `ok` holds.
    pub fn check(&mut self, ok: bool, msg: &str) -> &mut Self {
        if !ok {
            self.errors.push(msg);
        }
        self
    }

    /// Field must be present with at least `min` characters after trimming.
    pub fn required_min_len(&mut self, value: Option<&str>, min: usize, msg: &str) -> &mut Self {
        let ok = value.is_some_and(|v| trimmed_len(v) >= min);
        self.check(ok, msg)
    }

    /// Field may be absent; when present it needs `min` characters after trimming.
    pub fn optional_min_len(&mut self, value: Option<&str>, min: usize, msg: &str) -> &mut Self {
        let ok = value.is_none_or(|v| trimmed_len(v) >= min);
        self.check(ok, msg)
    }

    /// Field must be present and non-blank.
    pub fn required_non_blank(&mut self, value: Option<&str>, msg: &str) -> &mut Self {
        self.required_min_len(value, 1, msg)
    }

    /// RUC must be present and well-formed.
    pub fn required_ruc(&mut self, value: Option<&str>, msg: &str) -> &mut Self {
        let ok = value.is_some_and(is_valid_ruc);
        self.check(ok, msg)
    }

    /// Email may be absent or empty; otherwise it must look like an address.
    pub fn optional_email(&mut self, value: Option<&str>, msg: &str) -> &mut Self {
        let ok = value.is_none_or(|v| v.is_empty() || is_valid_email(v));
        self.check(ok, msg)
    }

    pub fn finish(self) -> ValidationErrors {
        self.errors
    }
}
