use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::{
    cmp::Ordering,
    hash::{Hash, Hasher},
};

///
/// Float64
///
/// Finite f64 only; -0.0 canonically stored as 0.0
///
/// Keeping non-finite values out at construction gives the type honest
/// `Eq`/`Ord`/`Hash` semantics, so ordered comparisons in the condition
/// interpreter never observe NaN.
///

#[repr(transparent)]
#[derive(Clone, Copy, Debug, Default, Display, Serialize)]
pub struct Float64(f64);

impl Float64 {
    pub const MAX: Self = Self(f64::MAX);
    pub const MIN: Self = Self(f64::MIN);

    #[must_use]
    /// Fallible constructor that rejects non-finite values and normalizes -0.0.
    pub fn try_new(v: f64) -> Option<Self> {
        if !v.is_finite() {
            return None;
        }

        // canonicalize -0.0 to 0.0 so Eq/Hash/Ord are consistent
        Some(Self(if v == 0.0 { 0.0 } else { v }))
    }

    #[must_use]
    pub const fn get(self) -> f64 {
        self.0
    }

    /// Clamp a raw arithmetic result back into the finite range.
    ///
    /// Sums and products of finite operands can overflow to ±inf but never
    /// produce NaN; the NaN arm exists only to keep this total.
    #[must_use]
    pub(crate) fn saturating(raw: f64) -> Self {
        if raw.is_nan() {
            return Self::default();
        }

        Self::try_new(raw).unwrap_or(if raw > 0.0 { Self::MAX } else { Self::MIN })
    }

    #[must_use]
    pub const fn to_be_bytes(&self) -> [u8; 8] {
        self.0.to_bits().to_be_bytes()
    }
}

impl Eq for Float64 {}

impl PartialEq for Float64 {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Hash for Float64 {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.0.to_bits()); // stable 8-byte IEEE-754
    }
}

impl Ord for Float64 {
    fn cmp(&self, other: &Self) -> Ordering {
        // safe: no NaN, -0 normalized
        self.0.partial_cmp(&other.0).unwrap()
    }
}

impl PartialOrd for Float64 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl TryFrom<f64> for Float64 {
    type Error = ();

    fn try_from(v: f64) -> Result<Self, Self::Error> {
        Self::try_new(v).ok_or(())
    }
}

impl From<Float64> for f64 {
    fn from(x: Float64) -> Self {
        x.0
    }
}

impl<'de> Deserialize<'de> for Float64 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = f64::deserialize(deserializer)?;
        Self::try_new(value)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid Float64 value: {value}")))
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use serde::de::value::{Error as DeError, F64Deserializer};

    #[test]
    fn try_new_normalizes_negative_zero() {
        let value = Float64::try_new(-0.0).expect("finite");
        assert_eq!(value.to_be_bytes(), 0.0f64.to_bits().to_be_bytes());
    }

    #[test]
    fn try_new_rejects_non_finite() {
        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(Float64::try_new(value).is_none());
        }
    }

    #[test]
    fn deserialize_rejects_non_finite() {
        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(Float64::deserialize(F64Deserializer::<DeError>::new(value)).is_err());
        }
    }

    #[test]
    fn saturating_clamps_overflow() {
        assert_eq!(Float64::saturating(f64::INFINITY), Float64::MAX);
        assert_eq!(Float64::saturating(f64::NEG_INFINITY), Float64::MIN);
        assert_eq!(
            Float64::saturating(1.5),
            Float64::try_new(1.5).expect("finite")
        );
    }
}
