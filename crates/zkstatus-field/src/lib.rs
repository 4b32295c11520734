//! BN254 scalar field element plus decimal-string codecs for 256-bit words.
//!
//! - [`Fr`]: element of the BN254 scalar field, canonical representative `< P`.
//! - [`MODULUS`]: the field prime `P`.
//! - [`dec`]: decimal-string helpers (and a `serde(with = ...)` module) for
//!   raw [`U256`] words, used wherever large integers cross a wire boundary.
//!
//! Arithmetic is written for clarity, not speed: it backs Merkle pair
//! hashing over a few thousand leaves at most.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used
)]

pub use alloy_primitives::U256;

use core::fmt;
use core::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// BN254 scalar field prime
/// `21888242871839275222246405745257275088548364400416034343698204186575808495617`.
pub const MODULUS: U256 = U256::from_limbs([
    0x43e1_f593_f000_0001,
    0x2833_e848_79b9_7091,
    0xb850_45b6_8181_585d,
    0x3064_4e72_e131_a029,
]);

/// Errors raised when parsing or range-checking field elements.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    /// Value is `>= P` where a canonical representative was required.
    #[error("value {0} is not a canonical field element")]
    NotCanonical(U256),
    /// String is not a valid decimal or `0x` hex integer.
    #[error("invalid integer literal {0:?}")]
    Parse(String),
}

/// Element of the BN254 scalar field.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fr(U256);

impl Fr {
    /// Zero.
    pub const ZERO: Self = Self(U256::ZERO);

    /// One.
    pub const ONE: Self = Self(U256::from_limbs([1, 0, 0, 0]));

    /// Reduce an arbitrary 256-bit word into the field.
    #[inline]
    #[must_use]
    pub fn new(v: U256) -> Self {
        Self(v.reduce_mod(MODULUS))
    }

    /// From `u64` (always canonical).
    #[inline]
    #[must_use]
    pub const fn from_u64(x: u64) -> Self {
        Self(U256::from_limbs([x, 0, 0, 0]))
    }

    /// Accept `v` only if it is already `< P`.
    pub fn from_canonical(v: U256) -> Result<Self, FieldError> {
        if v < MODULUS {
            Ok(Self(v))
        } else {
            Err(FieldError::NotCanonical(v))
        }
    }

    /// Reduce 32 big-endian bytes into the field.
    #[inline]
    #[must_use]
    pub fn from_be_bytes_reduced(bytes: [u8; 32]) -> Self {
        Self::new(U256::from_be_bytes(bytes))
    }

    /// Canonical 32-byte big-endian encoding.
    #[inline]
    #[must_use]
    pub fn to_be_bytes(self) -> [u8; 32] {
        self.0.to_be_bytes::<32>()
    }

    /// Underlying canonical representative.
    #[inline]
    #[must_use]
    pub const fn value(self) -> U256 {
        self.0
    }

    /// Whether this is the additive identity.
    #[inline]
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    /// Exponentiation by squaring.
    #[must_use]
    pub fn pow(self, mut e: u64) -> Self {
        let mut base = self;
        let mut acc = Self::ONE;
        while e > 0 {
            if e & 1 == 1 {
                acc *= base;
            }
            base *= base;
            e >>= 1;
        }
        acc
    }
}

impl From<u64> for Fr {
    #[inline]
    fn from(x: u64) -> Self {
        Self::from_u64(x)
    }
}

impl From<Fr> for U256 {
    #[inline]
    fn from(x: Fr) -> Self {
        x.0
    }
}

impl fmt::Display for Fr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl core::str::FromStr for Fr {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_canonical(dec::parse(s)?)
    }
}

impl Add for Fr {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self(self.0.add_mod(rhs.0, MODULUS))
    }
}
impl Sub for Fr {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        if self.0 >= rhs.0 {
            Self(self.0 - rhs.0)
        } else {
            // Both operands are < P < 2^254, so this cannot overflow.
            Self(self.0 + (MODULUS - rhs.0))
        }
    }
}
impl Mul for Fr {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: Self) -> Self {
        Self(self.0.mul_mod(rhs.0, MODULUS))
    }
}
impl Neg for Fr {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self::ZERO - self
    }
}
impl AddAssign for Fr {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}
impl SubAssign for Fr {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}
impl MulAssign for Fr {
    #[inline]
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl Serialize for Fr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Fr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let v = deserializer.deserialize_any(U256Visitor)?;
        Self::from_canonical(v).map_err(de::Error::custom)
    }
}

/// Accepts decimal/hex strings and small unsigned integers.
struct U256Visitor;

impl Visitor<'_> for U256Visitor {
    type Value = U256;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a decimal string, 0x-prefixed hex string, or unsigned integer")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<U256, E> {
        Ok(U256::from(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<U256, E> {
        dec::parse(v).map_err(E::custom)
    }
}

/* ---------------- decimal-string codecs ---------------- */

/// Decimal-string helpers for raw [`U256`] words.
///
/// Usable as `#[serde(with = "zkstatus_field::dec")]` on `U256` fields.
pub mod dec {
    use super::{FieldError, U256Visitor, U256};
    use serde::{Deserializer, Serializer};

    /// Render `v` in base 10.
    #[inline]
    #[must_use]
    pub fn to_string(v: &U256) -> String {
        v.to_string()
    }

    /// Parse a base-10 literal, or base-16 when prefixed with `0x`.
    pub fn parse(s: &str) -> Result<U256, FieldError> {
        let s = s.trim();
        let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            Some(hex) => U256::from_str_radix(hex, 16),
            None => U256::from_str_radix(s, 10),
        };
        parsed.map_err(|_| FieldError::Parse(s.to_owned()))
    }

    /// Serde serializer writing a decimal string.
    pub fn serialize<S: Serializer>(v: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(v)
    }

    /// Serde deserializer accepting decimal/hex strings or integers.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        deserializer.deserialize_any(U256Visitor)
    }

    /// `Vec<U256>` as a list of decimal strings.
    pub mod vec {
        use super::super::U256Visitor;
        use super::U256;
        use serde::de::{DeserializeSeed, SeqAccess, Visitor};
        use serde::ser::SerializeSeq;
        use serde::{Deserializer, Serializer};
        use std::fmt;

        /// Serialize each word as a decimal string.
        pub fn serialize<S: Serializer>(v: &[U256], serializer: S) -> Result<S::Ok, S::Error> {
            let mut seq = serializer.serialize_seq(Some(v.len()))?;
            for w in v {
                seq.serialize_element(&w.to_string())?;
            }
            seq.end()
        }

        /// Deserialize a list of decimal/hex strings or integers.
        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Vec<U256>, D::Error> {
            struct Seed;
            impl<'de> DeserializeSeed<'de> for Seed {
                type Value = U256;
                fn deserialize<D: Deserializer<'de>>(self, d: D) -> Result<U256, D::Error> {
                    d.deserialize_any(U256Visitor)
                }
            }

            struct SeqVisitor;
            impl<'de> Visitor<'de> for SeqVisitor {
                type Value = Vec<U256>;
                fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str("a sequence of 256-bit integers")
                }
                fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Vec<U256>, A::Error> {
                    let mut out = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                    while let Some(w) = seq.next_element_seed(Seed)? {
                        out.push(w);
                    }
                    Ok(out)
                }
            }

            deserializer.deserialize_seq(SeqVisitor)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modulus_matches_decimal() {
        let p = dec::parse(
            "21888242871839275222246405745257275088548364400416034343698204186575808495617",
        )
        .unwrap();
        assert_eq!(p, MODULUS);
    }

    #[test]
    fn add_wraps_at_modulus() {
        let minus_one = Fr::new(MODULUS - U256::from(1u64));
        assert_eq!(minus_one + Fr::ONE, Fr::ZERO);
        assert_eq!(Fr::ZERO - Fr::ONE, minus_one);
        assert_eq!(-Fr::ONE, minus_one);
    }

    #[test]
    fn pow_small() {
        assert_eq!(Fr::from_u64(3).pow(4), Fr::from_u64(81));
        assert_eq!(Fr::from_u64(7).pow(0), Fr::ONE);
    }

    #[test]
    fn from_canonical_rejects_modulus() {
        assert!(matches!(
            Fr::from_canonical(MODULUS),
            Err(FieldError::NotCanonical(_))
        ));
        assert_eq!(Fr::new(MODULUS), Fr::ZERO);
    }

    #[test]
    fn serde_uses_decimal_strings() {
        let x = Fr::from_u64(1_234_567);
        let s = serde_json::to_string(&x).unwrap();
        assert_eq!(s, "\"1234567\"");
        let back: Fr = serde_json::from_str(&s).unwrap();
        assert_eq!(back, x);
        let from_num: Fr = serde_json::from_str("42").unwrap();
        assert_eq!(from_num, Fr::from_u64(42));
    }

    #[test]
    fn dec_parse_accepts_hex() {
        assert_eq!(dec::parse("0xff").unwrap(), U256::from(255u64));
        assert!(dec::parse("12ab").is_err());
    }
}
