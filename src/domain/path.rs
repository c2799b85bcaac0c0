use std::{borrow::Cow, fmt, str::FromStr, sync::LazyLock};

use percent_encoding::percent_decode_str;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

static SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?P<head>(?:[^.\[\]\\]|\\.)+)|\.(?P<key>(?:[^.\[\]\\]|\\.)+)|\[(?P<index>\d+)\]",
    )
    .expect("segment pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// Position of a field inside a value tree, displayed as `a.b[0].c`.
///
/// Keys containing `.`, `[`, `]` or `\` are written with a backslash before
/// each of those characters (`"a.b"` displays as `a\.b`), so every path
/// parses back to the segments it was built from.
///
/// Paths key error messages and option caches; values are mutated through
/// [`crate::form::value_ops::set_at`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FieldPath(Vec<PathSegment>);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathParseError {
    #[error("invalid field path '{0}'")]
    Syntax(String),
    #[error("invalid percent-encoding in pointer '{0}'")]
    Encoding(String),
}

impl FieldPath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn key(name: impl Into<String>) -> Self {
        Self(vec![PathSegment::Key(name.into())])
    }

    pub fn child(&self, name: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Key(name.to_string()));
        Self(segments)
    }

    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Index(index));
        Self(segments)
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Build a path from a JSON pointer (`/a/0/b`) or a URI fragment (`#/a%20b/0`).
    /// All-digit segments become indices.
    pub fn from_pointer(pointer: &str) -> Result<Self, PathParseError> {
        let decoded = match pointer.strip_prefix('#') {
            Some(fragment) => percent_decode_str(fragment)
                .decode_utf8()
                .map_err(|_| PathParseError::Encoding(pointer.to_string()))?
                .into_owned(),
            None => pointer.to_string(),
        };
        if decoded.is_empty() {
            return Ok(Self::root());
        }
        let Some(rest) = decoded.strip_prefix('/') else {
            return Err(PathParseError::Syntax(pointer.to_string()));
        };
        let segments = rest
            .split('/')
            .map(|raw| {
                let token = raw.replace("~1", "/").replace("~0", "~");
                match token.parse::<usize>() {
                    Ok(index) if !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit()) => {
                        PathSegment::Index(index)
                    }
                    _ => PathSegment::Key(token),
                }
            })
            .collect();
        Ok(Self(segments))
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Key(name) if idx == 0 => write!(f, "{}", escape_key(name))?,
                PathSegment::Key(name) => write!(f, ".{}", escape_key(name))?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

impl FromStr for FieldPath {
    type Err = PathParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut segments = Vec::new();
        let mut offset = 0;
        while offset < s.len() {
            let captures = SEGMENT
                .captures_at(s, offset)
                .filter(|caps| caps.get(0).is_some_and(|m| m.start() == offset))
                .ok_or_else(|| PathParseError::Syntax(s.to_string()))?;
            if let Some(head) = captures.name("head") {
                if offset != 0 {
                    return Err(PathParseError::Syntax(s.to_string()));
                }
                segments.push(PathSegment::Key(unescape_key(head.as_str())));
            } else if let Some(key) = captures.name("key") {
                if offset == 0 {
                    return Err(PathParseError::Syntax(s.to_string()));
                }
                segments.push(PathSegment::Key(unescape_key(key.as_str())));
            } else if let Some(index) = captures.name("index") {
                let index = index
                    .as_str()
                    .parse()
                    .map_err(|_| PathParseError::Syntax(s.to_string()))?;
                segments.push(PathSegment::Index(index));
            }
            offset = captures.get(0).map(|m| m.end()).unwrap_or(s.len());
        }
        Ok(Self(segments))
    }
}

fn escape_key(name: &str) -> Cow<'_, str> {
    if !name.contains(['.', '[', ']', '\\']) {
        return Cow::Borrowed(name);
    }
    let mut escaped = String::with_capacity(name.len() + 2);
    for ch in name.chars() {
        if matches!(ch, '.' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    Cow::Owned(escaped)
}

fn unescape_key(raw: &str) -> String {
    let mut key = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => key.extend(chars.next()),
            other => key.push(other),
        }
    }
    key
}

impl TryFrom<String> for FieldPath {
    type Error = PathParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FieldPath> for String {
    fn from(path: FieldPath) -> Self {
        path.to_string()
    }
}
