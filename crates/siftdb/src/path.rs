use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error as ThisError;

///
/// PathSegment
///
/// One field-access step. `unwrap` asserts the value is non-null before
/// descending; resolution through a null stops with an unresolved path.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PathSegment {
    pub name: String,
    pub unwrap: bool,
}

impl PathSegment {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            unwrap: false,
        }
    }
}

///
/// FieldPath
///
/// Ordered list of segments from a record root to a (possibly nested,
/// possibly optional) field. Immutable after construction and compared
/// structurally; the simplifier and the permission layer both rely on that.
///
/// The wire form is the dotted rendering, with `?` marking unwrap steps:
/// `profile?.age`. The empty string is the root path (the whole record).
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FieldPath(Vec<PathSegment>);

impl FieldPath {
    #[must_use]
    pub const fn root() -> Self {
        Self(Vec::new())
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    /// Append one plain field-access step.
    #[must_use]
    pub fn child(&self, name: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::new(name));
        Self(segments)
    }

    /// Mark the last step as unwrapping an optional value.
    ///
    /// No-op on the root path.
    #[must_use]
    pub fn some(&self) -> Self {
        let mut segments = self.0.clone();
        if let Some(last) = segments.last_mut() {
            last.unwrap = true;
        }
        Self(segments)
    }

    /// Concatenate two paths: `a.join(b)` addresses `b` inside `a`.
    #[must_use]
    pub fn join(&self, tail: &Self) -> Self {
        let mut segments = self.0.clone();
        segments.extend(tail.0.iter().cloned());
        Self(segments)
    }

    /// Name-wise prefix test; unwrap markers do not affect addressing.
    #[must_use]
    pub fn starts_with(&self, prefix: &Self) -> bool {
        prefix.0.len() <= self.0.len()
            && prefix
                .0
                .iter()
                .zip(self.0.iter())
                .all(|(p, s)| p.name == s.name)
    }

    /// Two paths overlap when either addresses a region containing the other.
    /// The root path overlaps everything.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.starts_with(other) || other.starts_with(self)
    }
}

impl From<PathSegment> for FieldPath {
    fn from(segment: PathSegment) -> Self {
        Self(vec![segment])
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, segment) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(".")?;
            }
            f.write_str(&segment.name)?;
            if segment.unwrap {
                f.write_str("?")?;
            }
        }

        Ok(())
    }
}

///
/// PathParseError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum PathParseError {
    #[error("path segment {index} is empty")]
    EmptySegment { index: usize },
    #[error("path segment '{segment}' contains '?' outside the trailing position")]
    MisplacedUnwrap { segment: String },
}

impl FromStr for FieldPath {
    type Err = PathParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Self::root());
        }

        let mut segments = Vec::new();
        for (index, raw) in s.split('.').enumerate() {
            let (name, unwrap) = match raw.strip_suffix('?') {
                Some(name) => (name, true),
                None => (raw, false),
            };

            if name.is_empty() {
                return Err(PathParseError::EmptySegment { index });
            }
            if name.contains('?') {
                return Err(PathParseError::MisplacedUnwrap {
                    segment: raw.to_string(),
                });
            }

            segments.push(PathSegment {
                name: name.to_string(),
                unwrap,
            });
        }

        Ok(Self(segments))
    }
}

impl Serialize for FieldPath {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FieldPath {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> FieldPath {
        s.parse().expect("valid path")
    }

    #[test]
    fn display_round_trips() {
        for s in ["", "age", "profile?.age", "a.b?.c", "outer.inner"] {
            assert_eq!(parse(s).to_string(), s);
        }
    }

    #[test]
    fn parse_rejects_malformed_segments() {
        assert_eq!(
            "a..b".parse::<FieldPath>(),
            Err(PathParseError::EmptySegment { index: 1 })
        );
        assert_eq!(
            "?".parse::<FieldPath>(),
            Err(PathParseError::EmptySegment { index: 0 })
        );
        assert_eq!(
            "a?b.c".parse::<FieldPath>(),
            Err(PathParseError::MisplacedUnwrap {
                segment: "a?b".to_string()
            })
        );
    }

    #[test]
    fn join_concatenates_steps() {
        let joined = parse("profile?").join(&parse("address.city"));
        assert_eq!(joined, parse("profile?.address.city"));
        assert_eq!(FieldPath::root().join(&parse("age")), parse("age"));
    }

    #[test]
    fn some_marks_the_last_segment() {
        assert_eq!(FieldPath::root().child("profile").some(), parse("profile?"));
        assert_eq!(FieldPath::root().some(), FieldPath::root());
    }

    #[test]
    fn overlap_ignores_unwrap_markers() {
        assert!(parse("profile?.age").overlaps(&parse("profile")));
        assert!(parse("profile").overlaps(&parse("profile.age")));
        assert!(FieldPath::root().overlaps(&parse("anything.at.all")));
        assert!(!parse("profile.age").overlaps(&parse("profile.bio")));
    }

    #[test]
    fn equality_is_structural() {
        assert_ne!(parse("profile?.age"), parse("profile.age"));
        assert_eq!(parse("profile?.age"), parse("profile?.age"));
    }
}
