mod compare;
mod float;

use derive_more::{Deref, DerefMut};
use serde::{Deserialize, Serialize};
use std::{borrow::Cow, collections::BTreeMap};

pub use compare::{canonical_cmp, strict_order_cmp};
pub use float::Float64;

///
/// TextMode
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TextMode {
    Cs, // case-sensitive
    Ci, // case-insensitive
}

///
/// Value
///
/// Dynamic representation shared by conditions, modifications, and records.
/// Records are the `Map` variant: string keys, deterministic order, unique
/// keys (both guaranteed by the ordered-map representation).
///
/// Null → the field's value is Option::None.
///
/// The serialized form is externally tagged (`{"Int": 5}`), and equality is
/// structural: `Int(5)` and `Uint(5)` are different values.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(Float64),
    Text(String),
    Bytes(#[serde(with = "serde_bytes")] Vec<u8>),
    /// Ordered list of values. Element order is preserved everywhere.
    List(Vec<Self>),
    /// Canonical record/map representation: sorted, unique string keys.
    Map(BTreeMap<String, Self>),
}

impl Value {
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub const fn as_text(&self) -> Option<&String> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_list(&self) -> Option<&Vec<Self>> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_map(&self) -> Option<&BTreeMap<String, Self>> {
        match self {
            Self::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Two's-complement bit pattern of an integer value, for bitmask tests.
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub(crate) const fn flag_bits(&self) -> Option<u64> {
        match self {
            Self::Int(v) => Some(*v as u64),
            Self::Uint(v) => Some(*v),
            _ => None,
        }
    }

    /// Additive identity of the value's numeric family.
    #[must_use]
    pub(crate) fn is_zero(&self) -> bool {
        match self {
            Self::Int(v) => *v == 0,
            Self::Uint(v) => *v == 0,
            Self::Float(v) => v.get() == 0.0,
            _ => false,
        }
    }

    /// Multiplicative identity of the value's numeric family.
    #[must_use]
    pub(crate) fn is_one(&self) -> bool {
        match self {
            Self::Int(v) => *v == 1,
            Self::Uint(v) => *v == 1,
            Self::Float(v) => v.get() == 1.0,
            _ => false,
        }
    }

    ///
    /// TEXT COMPARISON
    ///

    pub(crate) fn fold_ci(s: &str) -> Cow<'_, str> {
        if s.is_ascii() {
            return Cow::Owned(s.to_ascii_lowercase());
        }
        // NOTE: Unicode fallback — locale-independent to_lowercase for non-ASCII.
        Cow::Owned(s.to_lowercase())
    }

    fn text_with_mode(s: &'_ str, mode: TextMode) -> Cow<'_, str> {
        match mode {
            TextMode::Cs => Cow::Borrowed(s),
            TextMode::Ci => Self::fold_ci(s),
        }
    }

    /// Check whether `needle` is a substring of `self` under the given text mode.
    ///
    /// Returns `None` when `self` is not text; callers treat that as a
    /// non-match.
    #[must_use]
    pub fn text_contains(&self, needle: &str, mode: TextMode) -> Option<bool> {
        let s = self.as_text()?;
        let s = Self::text_with_mode(s, mode);
        let needle = Self::text_with_mode(needle, mode);

        Some(s.contains(needle.as_ref()))
    }
}

///
/// Bytes
///
/// Owned byte-string for typed model fields. A separate wrapper keeps the
/// blanket `Vec<V: FieldValue>` list impl unambiguous.
///

#[derive(
    Clone, Debug, Default, Deref, DerefMut, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct Bytes(#[serde(with = "serde_bytes")] Vec<u8>);

impl Bytes {
    #[must_use]
    pub const fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }
}

impl From<Vec<u8>> for Bytes {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for Bytes {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl From<Bytes> for Vec<u8> {
    fn from(bytes: Bytes) -> Self {
        bytes.0
    }
}

#[macro_export]
macro_rules! impl_from_for {
    ( $( $type:ty => $variant:ident ),* $(,)? ) => {
        $(
            impl From<$type> for Value {
                fn from(v: $type) -> Self {
                    Self::$variant(v.into())
                }
            }
        )*
    };
}

impl_from_for! {
    bool    => Bool,
    i8      => Int,
    i16     => Int,
    i32     => Int,
    i64     => Int,
    u8      => Uint,
    u16     => Uint,
    u32     => Uint,
    u64     => Uint,
    Float64 => Float,
    &str    => Text,
    String  => Text,
}

impl From<Bytes> for Value {
    fn from(bytes: Bytes) -> Self {
        Self::Bytes(bytes.into_inner())
    }
}

impl From<Vec<Self>> for Value {
    fn from(items: Vec<Self>) -> Self {
        Self::List(items)
    }
}

impl From<BTreeMap<String, Self>> for Value {
    fn from(entries: BTreeMap<String, Self>) -> Self {
        Self::Map(entries)
    }
}

impl TryFrom<f64> for Value {
    type Error = ();

    fn try_from(v: f64) -> Result<Self, Self::Error> {
        Float64::try_new(v).map(Self::Float).ok_or(())
    }
}

///
/// TESTS
///
