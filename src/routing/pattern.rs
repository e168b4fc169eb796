//! URL pattern parsing and matching.
//!
//! A pattern is a `/`-separated list of segments. Each segment is a sequence
//! of literal text and `{name}` parameters, so both whole-segment parameters
//! (`media/delete/{id}`) and inline ones (`term_type={type}/all`) are
//! supported.
//!
//! # Matching rules
//! - One leading and one trailing slash are ignored; `/` is the root pattern
//! - Empty segments (`//`) never match
//! - A parameter never matches an empty string and never spans a `/`
//! - An inline parameter ends at an occurrence of the literal that follows
//!   it; the earliest occurrence that lets the rest of the segment match wins
//! - Captured values are percent-decoded
//!
//! # Example
//! ```rust,ignore
//! let pattern = RoutePattern::parse("/admin/term_type={type}/edit/{id}")?;
//! let params = pattern.matches("/admin/term_type=post/edit/7").unwrap();
//! assert_eq!(params.get("type"), Some("post"));
//! ```

use std::fmt;

use super::params::PathParams;
use super::RouteError;

/// Stands in for parameter values when comparing patterns
const SAMPLE_VALUE: char = '\u{1}';

/// A piece of a single path segment
#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Literal(String),
    Param(String),
}

/// A parsed route pattern
#[derive(Debug, Clone)]
pub struct RoutePattern {
    /// Normalized source text, always starting with `/`
    source: String,
    segments: Vec<Vec<Part>>,
}

impl RoutePattern {
    /// Parse a pattern such as `page/{slug}` or `/term_type={type}/all`.
    ///
    /// # Errors
    /// Returns `RouteError::InvalidPattern` for unbalanced braces, empty or
    /// malformed parameter names, repeated parameter names, empty segments,
    /// or two parameters adjacent inside one segment.
    pub fn parse(pattern: &str) -> Result<Self, RouteError> {
        let invalid = |reason: &str| RouteError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = pattern.trim_matches('/');
        let mut segments = Vec::new();
        let mut names: Vec<String> = Vec::new();

        if !trimmed.is_empty() {
            for raw in trimmed.split('/') {
                if raw.is_empty() {
                    return Err(invalid("empty path segment"));
                }

                let parts = parse_segment(raw).map_err(|reason| invalid(reason))?;
                for part in &parts {
                    if let Part::Param(name) = part {
                        if names.contains(name) {
                            return Err(invalid(&format!("parameter `{}` appears twice", name)));
                        }
                        names.push(name.clone());
                    }
                }
                segments.push(parts);
            }
        }

        Ok(Self {
            source: format!("/{}", trimmed),
            segments,
        })
    }

    /// The normalized pattern text (e.g. `/admin/media/delete/{id}`)
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Parameter names in positional order
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().flatten().filter_map(|part| match part {
            Part::Param(name) => Some(name.as_str()),
            Part::Literal(_) => None,
        })
    }

    /// Match a request path, returning the captured parameters on success.
    pub fn matches(&self, path: &str) -> Option<PathParams> {
        let request_segments: Vec<&str> = if path.is_empty() || path == "/" {
            Vec::new()
        } else {
            let trimmed = path.strip_prefix('/').unwrap_or(path);
            let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
            trimmed.split('/').collect()
        };

        if request_segments.len() != self.segments.len() {
            return None;
        }

        let mut params = PathParams::default();
        for (parts, segment) in self.segments.iter().zip(request_segments) {
            match_segment(parts, segment, &mut params)?;
        }

        Some(params)
    }

    /// Two patterns are structurally identical when every request path
    /// matched by one is matched by the other, whatever the parameter names.
    pub fn same_shape(&self, other: &RoutePattern) -> bool {
        self.segments.len() == other.segments.len()
            && self
                .segments
                .iter()
                .zip(&other.segments)
                .all(|(a, b)| {
                    a.len() == b.len()
                        && a.iter().zip(b).all(|pair| match pair {
                            (Part::Literal(x), Part::Literal(y)) => x == y,
                            (Part::Param(_), Part::Param(_)) => true,
                            _ => false,
                        })
                })
    }

    /// A path this pattern matches, with every parameter bound to a value no
    /// literal can contain. Any pattern matching it matches all of this
    /// pattern's paths.
    pub(crate) fn sample_path(&self) -> String {
        if self.segments.is_empty() {
            return "/".to_string();
        }

        let mut path = String::new();
        for parts in &self.segments {
            path.push('/');
            for part in parts {
                match part {
                    Part::Literal(text) => path.push_str(text),
                    Part::Param(_) => path.push(SAMPLE_VALUE),
                }
            }
        }
        path
    }

    /// Build a concrete path by substituting parameters.
    ///
    /// Returns the name of the first parameter with no value on failure.
    pub fn to_path(&self, lookup: impl Fn(&str) -> Option<String>) -> Result<String, String> {
        if self.segments.is_empty() {
            return Ok("/".to_string());
        }

        let mut path = String::new();
        for parts in &self.segments {
            path.push('/');
            for part in parts {
                match part {
                    Part::Literal(text) => path.push_str(text),
                    Part::Param(name) => {
                        let value = lookup(name).ok_or_else(|| name.clone())?;
                        path.push_str(&urlencoding::encode(&value));
                    }
                }
            }
        }

        Ok(path)
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn parse_segment(raw: &str) -> Result<Vec<Part>, &'static str> {
    let mut parts = Vec::new();
    let mut rest = raw;

    while !rest.is_empty() {
        if let Some(after_open) = rest.strip_prefix('{') {
            let close = after_open.find('}').ok_or("unclosed `{`")?;
            let name = &after_open[..close];
            if !is_valid_param_name(name) {
                return Err("parameter names must match [A-Za-z_][A-Za-z0-9_]*");
            }
            if matches!(parts.last(), Some(Part::Param(_))) {
                return Err("adjacent parameters in one segment are ambiguous");
            }
            parts.push(Part::Param(name.to_string()));
            rest = &after_open[close + 1..];
        } else {
            let end = rest.find(['{', '}']).unwrap_or(rest.len());
            if rest[end..].starts_with('}') {
                return Err("unmatched `}`");
            }
            parts.push(Part::Literal(rest[..end].to_string()));
            rest = &rest[end..];
        }
    }

    Ok(parts)
}

fn is_valid_param_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

fn match_segment(parts: &[Part], segment: &str, params: &mut PathParams) -> Option<()> {
    let mut captured = Vec::new();
    if !match_parts(parts, segment, &mut captured) {
        return None;
    }

    for (name, value) in captured {
        params.push(name, value);
    }
    Some(())
}

fn match_parts<'p>(
    parts: &'p [Part],
    rest: &str,
    captured: &mut Vec<(&'p str, String)>,
) -> bool {
    match parts.split_first() {
        None => rest.is_empty(),
        Some((Part::Literal(text), tail)) => rest
            .strip_prefix(text.as_str())
            .is_some_and(|rest| match_parts(tail, rest, captured)),
        Some((Part::Param(name), tail)) => {
            let ends: Vec<usize> = match tail.first() {
                Some(Part::Literal(next)) => (1..=rest.len())
                    .filter(|&i| rest.is_char_boundary(i) && rest[i..].starts_with(next.as_str()))
                    .collect(),
                _ => vec![rest.len()],
            };

            for end in ends {
                if end == 0 {
                    continue;
                }
                let Ok(value) = urlencoding::decode(&rest[..end]) else {
                    continue;
                };
                captured.push((name.as_str(), value.into_owned()));
                if match_parts(tail, &rest[end..], captured) {
                    return true;
                }
                captured.pop();
            }
            false
        }
    }
}
