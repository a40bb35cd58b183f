//! Permission-string validation and entry classification
//!
//! A mode string is either a pure octal literal in `[0, 0o7777]` or a
//! comma-separated list of `{selectors}{operator}{letters}` groups,
//! e.g. `u+rx,g=rs,o+r-w,+t`. Strings like `+` or `u-` are accepted by
//! chmod but change nothing; [`ModeSpec`] tracks that as the
//! "nontrivial" bit so the engine can skip chmod invocations entirely
//! for no-op strings.

use crate::error::ConfigError;
use std::sync::Arc;

const SELECTORS: &[char] = &['u', 'g', 'o', 'a'];
const OPERATORS: &[char] = &['+', '-', '='];
const PERMISSIONS: &[char] = &['r', 'w', 'x', 'X', 's', 't'];

/// A validated chmod-style permission string
#[derive(Debug, Clone)]
pub struct ModeSpec {
    /// The string exactly as given (passed verbatim to chmod)
    raw: Arc<str>,

    /// Whether applying the string can actually flip a mode bit
    nontrivial: bool,
}

impl ModeSpec {
    /// Parse and validate a permission string
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let nontrivial = validate(s).map_err(|reason| ConfigError::InvalidModeString {
            perms: s.to_string(),
            reason: reason.to_string(),
        })?;

        Ok(Self {
            raw: Arc::from(s),
            nontrivial,
        })
    }

    /// The raw mode string
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Shared handle to the raw string, used to tag work items
    pub fn shared(&self) -> Arc<str> {
        Arc::clone(&self.raw)
    }

    /// Whether applying this string changes any bit
    pub fn is_nontrivial(&self) -> bool {
        self.nontrivial
    }
}

/// Validate a permission string, returning its nontrivial bit
fn validate(s: &str) -> Result<bool, &'static str> {
    if s.is_empty() {
        return Err("empty string");
    }

    // Pure octal literal
    if let Ok(n) = u32::from_str_radix(s, 8) {
        return if n <= 0o7777 {
            Ok(true)
        } else {
            Err("octal mode out of range (max 7777)")
        };
    }

    let mut nontrivial = false;
    for group in s.split(',') {
        let mut op: Option<char> = None;
        for c in group.chars() {
            if OPERATORS.contains(&c) {
                op = Some(c);
                // '=' clears unnamed bits even with no letters after it
                if c == '=' {
                    nontrivial = true;
                }
            } else if op.is_none() {
                if !SELECTORS.contains(&c) {
                    return Err("expected selector (u, g, o, a) or operator (+, -, =)");
                }
            } else if PERMISSIONS.contains(&c) {
                nontrivial = true;
            } else {
                return Err("expected permission letter (r, w, x, X, s, t)");
            }
        }
        if op.is_none() {
            return Err("group has no operator (+, -, =)");
        }
    }

    Ok(nontrivial)
}

/// Kind of filesystem entry, as seen by the traversal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Regular file (or any non-directory entry)
    File,

    /// Directory
    Directory,
}

/// Maps an entry kind to its configured mode string
///
/// Pure function of the configuration: classifying the same kind twice
/// always yields the same string.
#[derive(Debug, Clone)]
pub struct Classifier {
    file: ModeSpec,
    dir: ModeSpec,
}

impl Classifier {
    /// Create a classifier from the configured file/directory specs
    pub fn new(file: ModeSpec, dir: ModeSpec) -> Self {
        Self { file, dir }
    }

    /// The mode string that applies to the given entry kind
    pub fn perms_for(&self, kind: EntryKind) -> Arc<str> {
        match kind {
            EntryKind::File => self.file.shared(),
            EntryKind::Directory => self.dir.shared(),
        }
    }

    /// Whether either configured string changes any bit
    pub fn is_nontrivial(&self) -> bool {
        self.file.is_nontrivial() || self.dir.is_nontrivial()
    }
}
