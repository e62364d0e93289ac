//! Ant-style request path patterns.

use std::fmt;

use formgate_core::error::AppError;
use formgate_core::result::AppResult;

/// One segment of a compiled pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    /// Matches exactly this text.
    Literal(String),
    /// `*`: matches exactly one segment.
    Any,
    /// `**`: matches zero or more segments.
    AnyDepth,
}

/// A compiled path pattern such as `/my/**` or `/files/*/meta`.
///
/// Paths and patterns are compared segment by segment, so empty segments
/// and trailing slashes are ignored: `/admin/` matches `/admin`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    source: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Compiles a pattern. Patterns must start with `/`.
    pub fn parse(pattern: &str) -> AppResult<Self> {
        if !pattern.starts_with('/') {
            return Err(AppError::configuration(format!(
                "Path pattern '{pattern}' must start with '/'"
            )));
        }

        let segments = split(pattern)
            .map(|segment| match segment {
                "**" => Ok(Segment::AnyDepth),
                "*" => Ok(Segment::Any),
                s if s.contains('*') => Err(AppError::configuration(format!(
                    "Path pattern '{pattern}': '*' must fill a whole segment"
                ))),
                s => Ok(Segment::Literal(s.to_string())),
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(Self {
            source: pattern.to_string(),
            segments,
        })
    }

    /// Whether `path` (without query string) matches this pattern.
    pub fn matches(&self, path: &str) -> bool {
        let path: Vec<&str> = split(path).collect();
        matches_from(&self.segments, &path)
    }

    /// The pattern as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Whether a request path is in canonical form.
///
/// Dot segments, doubled slashes, backslashes, and encoded separators would
/// let one path be spelled several ways; such paths are refused before any
/// rule is checked.
pub fn is_normalized(path: &str) -> bool {
    if !path.starts_with('/')
        || path.contains("//")
        || path.contains('\\')
        || path.contains('\0')
    {
        return false;
    }

    let lower = path.to_ascii_lowercase();
    if lower.contains("%2f") || lower.contains("%5c") || lower.contains("%2e") {
        return false;
    }

    split(path).all(|segment| segment != "." && segment != "..")
}

fn split(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}

fn matches_from(pattern: &[Segment], path: &[&str]) -> bool {
    match (pattern.split_first(), path.split_first()) {
        (None, _) => path.is_empty(),
        (Some((Segment::AnyDepth, rest)), _) => {
            (0..=path.len()).any(|skip| matches_from(rest, &path[skip..]))
        }
        (Some(_), None) => false,
        (Some((Segment::Any, rest)), Some((_, tail))) => matches_from(rest, tail),
        (Some((Segment::Literal(literal), rest)), Some((head, tail))) => {
            literal.as_str() == *head && matches_from(rest, tail)
        }
    }
}
