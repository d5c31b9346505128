//! Path expressions and tree locations.
//!
//! A [`PathExpr`] is the user-facing address (`employees.*.address`), tokenized
//! into [`Segment`]s once. A [`Location`] is a concrete position inside a tree
//! (`$.employees[0].address`), produced while walking and used for reporting.

use std::fmt;
use std::str::FromStr;

/// Reserved segment token meaning "every key or element of the current node".
pub const WILDCARD: &str = "*";

/// Separator between path segments.
pub const SEPARATOR: char = '.';

/// A single navigation step of a path expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Literal key. `spread` is set when the key was directly followed by `*`:
    /// the pair is one navigational step ("every element of the array at this key").
    Key { name: String, spread: bool },
    /// Broadcast into every own key of a mapping or every element of a sequence.
    Wildcard,
}

impl Segment {
    pub fn key(name: impl Into<String>) -> Self {
        Segment::Key {
            name: name.into(),
            spread: false,
        }
    }

    pub fn spread(name: impl Into<String>) -> Self {
        Segment::Key {
            name: name.into(),
            spread: true,
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, Segment::Wildcard)
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key { name, spread: false } => write!(f, "{}", name),
            Segment::Key { name, spread: true } => write!(f, "{}{}{}", name, SEPARATOR, WILDCARD),
            Segment::Wildcard => write!(f, "{}", WILDCARD),
        }
    }
}

/// A parsed, dot-separated path expression.
///
/// The empty expression addresses the root itself. Parsing never fails: there is
/// no escaping, so every string is a valid (possibly unmatched) path.
///
/// # Examples
///
/// ```
/// use jsonmix::domain::{PathExpr, Segment};
///
/// let path = PathExpr::parse("company.employees.*");
/// assert_eq!(
///     path.segments(),
///     &[Segment::key("company"), Segment::spread("employees")]
/// );
/// assert!(PathExpr::parse("").is_root());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PathExpr {
    segments: Vec<Segment>,
}

impl PathExpr {
    /// The expression addressing the root node.
    pub fn root() -> Self {
        Self::default()
    }

    /// Tokenize a path expression.
    ///
    /// A literal key immediately followed by `*` folds into a single
    /// `Segment::Key { spread: true }`. A `*` after another `*` (or at the start)
    /// stays a standalone [`Segment::Wildcard`].
    pub fn parse(expr: &str) -> Self {
        if expr.is_empty() {
            return Self::root();
        }

        let mut segments: Vec<Segment> = Vec::new();
        for token in expr.split(SEPARATOR) {
            if token == WILDCARD {
                if let Some(Segment::Key { spread, .. }) = segments.last_mut() {
                    if !*spread {
                        *spread = true;
                        continue;
                    }
                }
                segments.push(Segment::Wildcard);
            } else {
                segments.push(Segment::key(token));
            }
        }
        Self { segments }
    }

    pub fn from_segments(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl FromStr for PathExpr {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for PathExpr {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl fmt::Display for PathExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, seg) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", SEPARATOR)?;
            }
            write!(f, "{}", seg)?;
        }
        Ok(())
    }
}

/// One concrete step from a node to one of its children.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Step {
    /// Field of a mapping or mixed node.
    Key(String),
    /// Element of a sequence.
    Index(usize),
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Key(k) => write!(f, ".{}", k),
            Step::Index(i) => write!(f, "[{}]", i),
        }
    }
}

/// A concrete position inside a tree, displayed as `$.employees[0].address`.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Location(Vec<Step>);

impl Location {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn from_steps(steps: Vec<Step>) -> Self {
        Self(steps)
    }

    /// Builder-style key step.
    pub fn key(mut self, k: impl Into<String>) -> Self {
        self.0.push(Step::Key(k.into()));
        self
    }

    /// Builder-style index step.
    pub fn index(mut self, i: usize) -> Self {
        self.0.push(Step::Index(i));
        self
    }

    pub fn push(&mut self, step: Step) {
        self.0.push(step);
    }

    pub fn pop(&mut self) -> Option<Step> {
        self.0.pop()
    }

    pub fn steps(&self) -> &[Step] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "$")?;
        for step in &self.0 {
            write!(f, "{}", step)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_expression_is_root() {
        assert!(PathExpr::parse("").is_root());
        assert_eq!(PathExpr::parse("").to_string(), "");
    }

    #[test]
    fn test_plain_keys() {
        let path = PathExpr::parse("employees.lead");
        assert_eq!(
            path.segments(),
            &[Segment::key("employees"), Segment::key("lead")]
        );
    }

    #[test]
    fn test_key_followed_by_wildcard_folds() {
        let path = PathExpr::parse("employees.*");
        assert_eq!(path.segments(), &[Segment::spread("employees")]);
        assert_eq!(path.len(), 1);
    }

    #[test]
    fn test_leading_wildcard_stays_standalone() {
        let path = PathExpr::parse("*.name");
        assert_eq!(path.segments(), &[Segment::Wildcard, Segment::key("name")]);
        assert!(path.segments()[0].is_wildcard());
        assert!(!path.segments()[1].is_wildcard());
    }

    #[test]
    fn test_double_wildcard_folds_only_once() {
        let path = PathExpr::parse("a.*.*");
        assert_eq!(path.segments(), &[Segment::spread("a"), Segment::Wildcard]);

        let path = PathExpr::parse("*.*");
        assert_eq!(path.segments(), &[Segment::Wildcard, Segment::Wildcard]);
    }

    #[test]
    fn test_wildcard_mid_path() {
        let path = PathExpr::parse("departments.*.staff.*");
        assert_eq!(
            path.segments(),
            &[Segment::spread("departments"), Segment::spread("staff")]
        );
        assert_eq!(
            path,
            PathExpr::from_segments(vec![Segment::spread("departments"), Segment::spread("staff")])
        );
    }

    #[test]
    fn test_display_round_trips_source_text() {
        for expr in ["a.b", "a.*", "*", "*.x.*", "a.*.*.b"] {
            assert_eq!(PathExpr::parse(expr).to_string(), expr);
        }
    }

    #[test]
    fn test_empty_segments_are_literal_keys() {
        let path = PathExpr::parse("a..b");
        assert_eq!(
            path.segments(),
            &[Segment::key("a"), Segment::key(""), Segment::key("b")]
        );
    }

    #[test]
    fn test_location_display() {
        let loc = Location::root().key("employees").index(0).key("address");
        assert_eq!(loc.to_string(), "$.employees[0].address");
        assert_eq!(Location::root().to_string(), "$");
        assert_eq!(loc.depth(), 3);
        let built = Location::from_steps(vec![
            Step::Key("employees".into()),
            Step::Index(0),
            Step::Key("address".into()),
        ]);
        assert_eq!(built, loc);
    }
}
