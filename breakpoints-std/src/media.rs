//! Media query parsing and evaluation.
//!
//! Supports the subset of CSS media queries that responsive breakpoints are
//! written in:
//!
//! ```text
//! screen and (min-width: 600px) and (max-width: 959px)
//! not print
//! (orientation: portrait), (max-aspect-ratio: 4/3)
//! ```
//!
//! A comma-separated list matches when any of its queries matches. The empty
//! list matches everything. Lengths accept `px`, `em` and `rem` (16px each),
//! or a bare `0`.

use bitflags::bitflags;
use std::{fmt, str::FromStr};
use thiserror::Error;

const PX_PER_EM: f64 = 16.0;

bitflags! {
    /// Media types a query can target or an environment can present.
    ///
    /// The `all` media type is [`MediaTypes::all()`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MediaTypes: u8 {
        /// Screen-based devices.
        const SCREEN = 1;
        /// Paged output.
        const PRINT = 1 << 1;
    }
}

impl Default for MediaTypes {
    fn default() -> Self {
        MediaTypes::SCREEN
    }
}

/// The environment a media query is evaluated against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MediaState {
    /// Viewport width in CSS pixels.
    pub width: f64,
    /// Viewport height in CSS pixels.
    pub height: f64,
    /// Media types presented by the environment.
    pub media: MediaTypes,
}

impl MediaState {
    /// A screen environment of the given size.
    pub fn screen(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            media: MediaTypes::SCREEN,
        }
    }

    /// The current orientation.
    pub fn orientation(&self) -> Orientation {
        if self.height >= self.width {
            Orientation::Portrait
        } else {
            Orientation::Landscape
        }
    }

    fn aspect_ratio(&self) -> Option<f64> {
        (self.height > 0.0).then(|| self.width / self.height)
    }
}

/// Errors produced while parsing a media query.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// A query in the list was empty.
    #[error("empty media query")]
    EmptyQuery,

    /// The media type is not recognized.
    #[error("unknown media type `{0}`")]
    UnknownMediaType(String),

    /// The media feature is not recognized.
    #[error("unknown media feature `{0}`")]
    UnknownFeature(String),

    /// A feature value could not be parsed.
    #[error("invalid value `{value}` for `{feature}`")]
    InvalidValue {
        /// The feature name.
        feature: String,
        /// The rejected value.
        value: String,
    },

    /// The query is not well formed.
    #[error("{0}")]
    Syntax(String),
}

/// Screen orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Height is greater than or equal to width.
    Portrait,
    /// Width is greater than height.
    Landscape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dimension {
    Width,
    Height,
    AspectRatio,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bound {
    Exact,
    Min,
    Max,
}

#[derive(Debug, Clone, PartialEq)]
enum Condition {
    Range {
        dimension: Dimension,
        bound: Bound,
        value: f64,
    },
    Orientation(Orientation),
}

impl Condition {
    fn matches(&self, state: &MediaState) -> bool {
        match *self {
            Condition::Orientation(orientation) => state.orientation() == orientation,
            Condition::Range {
                dimension,
                bound,
                value,
            } => {
                let actual = match dimension {
                    Dimension::Width => state.width,
                    Dimension::Height => state.height,
                    Dimension::AspectRatio => match state.aspect_ratio() {
                        Some(ratio) => ratio,
                        None => return false,
                    },
                };
                match bound {
                    Bound::Exact => (actual - value).abs() < 1e-9,
                    Bound::Min => actual >= value,
                    Bound::Max => actual <= value,
                }
            }
        }
    }
}

/// A single media query: `[not|only] type and (feature) ...`.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaQuery {
    negated: bool,
    media: MediaTypes,
    conditions: Vec<Condition>,
}

impl MediaQuery {
    /// Whether this query matches the given environment.
    pub fn matches(&self, state: &MediaState) -> bool {
        let hit = self.media.intersects(state.media)
            && self.conditions.iter().all(|c| c.matches(state));
        hit != self.negated
    }

    /// Whether the query is negated with `not`.
    pub fn is_negated(&self) -> bool {
        self.negated
    }

    /// The media types this query targets.
    pub fn media(&self) -> MediaTypes {
        self.media
    }

    fn parse(input: &str) -> Result<Self, ParseError> {
        let mut rest = input.trim();
        if rest.is_empty() {
            return Err(ParseError::EmptyQuery);
        }

        let mut negated = false;
        if let Some(after) = strip_keyword(rest, "not") {
            negated = true;
            rest = after;
        } else if let Some(after) = strip_keyword(rest, "only") {
            if after.starts_with('(') {
                return Err(ParseError::Syntax(
                    "`only` must be followed by a media type".to_string(),
                ));
            }
            rest = after;
        }

        let mut media = MediaTypes::all();
        let mut conditions = Vec::new();

        if !rest.starts_with('(') {
            let end = rest
                .find(|c: char| c.is_whitespace() || c == '(')
                .unwrap_or(rest.len());
            media = parse_media_type(&rest[..end])?;
            rest = rest[end..].trim_start();
            if rest.is_empty() {
                return Ok(Self {
                    negated,
                    media,
                    conditions,
                });
            }
            rest = strip_keyword(rest, "and")
                .ok_or_else(|| ParseError::Syntax(format!("expected `and` before `{rest}`")))?;
        }

        loop {
            let (condition, after) = parse_condition(rest)?;
            conditions.push(condition);
            rest = after.trim_start();
            if rest.is_empty() {
                break;
            }
            rest = strip_keyword(rest, "and")
                .ok_or_else(|| ParseError::Syntax(format!("expected `and` before `{rest}`")))?;
        }

        Ok(Self {
            negated,
            media,
            conditions,
        })
    }
}

/// A comma-separated list of media queries.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MediaQueryList {
    queries: Vec<MediaQuery>,
}

impl MediaQueryList {
    /// Parse a media query list. Matching is case-insensitive.
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        let lowered = input.trim().to_ascii_lowercase();
        if lowered.is_empty() {
            return Ok(Self::default());
        }
        let queries = lowered
            .split(',')
            .map(MediaQuery::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { queries })
    }

    /// Whether any query of the list matches.
    pub fn matches(&self, state: &MediaState) -> bool {
        self.queries.is_empty() || self.queries.iter().any(|q| q.matches(state))
    }

    /// The individual queries.
    pub fn queries(&self) -> &[MediaQuery] {
        &self.queries
    }
}

impl FromStr for MediaQueryList {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Orientation::Portrait => f.write_str("portrait"),
            Orientation::Landscape => f.write_str("landscape"),
        }
    }
}

fn strip_keyword<'a>(input: &'a str, keyword: &str) -> Option<&'a str> {
    let after = input.strip_prefix(keyword)?;
    match after.chars().next() {
        Some(c) if c.is_whitespace() || c == '(' => Some(after.trim_start()),
        _ => None,
    }
}

fn parse_media_type(name: &str) -> Result<MediaTypes, ParseError> {
    match name {
        "all" => Ok(MediaTypes::all()),
        "screen" => Ok(MediaTypes::SCREEN),
        "print" => Ok(MediaTypes::PRINT),
        other => Err(ParseError::UnknownMediaType(other.to_string())),
    }
}

fn parse_condition(input: &str) -> Result<(Condition, &str), ParseError> {
    let body = input
        .strip_prefix('(')
        .ok_or_else(|| ParseError::Syntax(format!("expected `(` at `{input}`")))?;
    let close = body
        .find(')')
        .ok_or_else(|| ParseError::Syntax("unclosed `(`".to_string()))?;
    let (inner, rest) = (&body[..close], &body[close + 1..]);

    let (name, value) = inner
        .split_once(':')
        .ok_or_else(|| ParseError::Syntax(format!("missing value in `({inner})`")))?;
    let (name, value) = (name.trim(), value.trim());

    let (bound, base) = if let Some(base) = name.strip_prefix("min-") {
        (Bound::Min, base)
    } else if let Some(base) = name.strip_prefix("max-") {
        (Bound::Max, base)
    } else {
        (Bound::Exact, name)
    };

    let condition = match base {
        "width" | "height" => Condition::Range {
            dimension: if base == "width" {
                Dimension::Width
            } else {
                Dimension::Height
            },
            bound,
            value: parse_length(name, value)?,
        },
        "aspect-ratio" => Condition::Range {
            dimension: Dimension::AspectRatio,
            bound,
            value: parse_ratio(name, value)?,
        },
        "orientation" if bound == Bound::Exact => Condition::Orientation(match value {
            "portrait" => Orientation::Portrait,
            "landscape" => Orientation::Landscape,
            _ => return Err(invalid(name, value)),
        }),
        _ => return Err(ParseError::UnknownFeature(name.to_string())),
    };

    Ok((condition, rest))
}

fn parse_length(feature: &str, value: &str) -> Result<f64, ParseError> {
    let split = value
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(value.len());
    let (number, unit) = value.split_at(split);
    let number: f64 = number.parse().map_err(|_| invalid(feature, value))?;
    let scale = match unit.trim() {
        "px" => 1.0,
        "em" | "rem" => PX_PER_EM,
        "" if number == 0.0 => 1.0,
        _ => return Err(invalid(feature, value)),
    };
    Ok(number * scale)
}

fn parse_ratio(feature: &str, value: &str) -> Result<f64, ParseError> {
    let parse = |s: &str| -> Result<f64, ParseError> {
        let n: f64 = s.trim().parse().map_err(|_| invalid(feature, value))?;
        if n.is_finite() && n >= 0.0 {
            Ok(n)
        } else {
            Err(invalid(feature, value))
        }
    };
    match value.split_once('/') {
        Some((w, h)) => {
            let (w, h) = (parse(w)?, parse(h)?);
            if h == 0.0 {
                return Err(invalid(feature, value));
            }
            Ok(w / h)
        }
        None => parse(value),
    }
}

fn invalid(feature: &str, value: &str) -> ParseError {
    ParseError::InvalidValue {
        feature: feature.to_string(),
        value: value.to_string(),
    }
}
