// crates/zkstatus-merkle/src/lib.rs

//! Fixed-height binary Merkle accumulator over BN254 field elements.
//!
//! - Leaves are field elements. [`build_root`] takes a full power-of-two
//!   layer; [`prefix_root`] takes only the non-zero prefix and stands in
//!   precomputed all-zero subtrees for the padding, so memory and hashing
//!   follow the prefix length rather than `2^height`.
//! - Parents are computed by a pluggable [`PairHasher`]: plain modular
//!   addition (matches the deployed circuits), a MiMC-style permutation, or
//!   BLAKE3 reduced into the field.
//! - Status trees use the time-derived leaf sequence `[1, 2, ..., time]`
//!   ([`leaves_at_time`]).

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

use blake3::Hasher;
use serde::{Deserialize, Serialize};
use zkstatus_field::Fr;

/// Number of MiMC rounds used for BN254.
pub const MIMC_ROUNDS: usize = 91;

/// Largest supported tree height (leaf layer of `2^24` elements).
pub const MAX_HEIGHT: u32 = 24;

/// Merkle construction errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MerkleError {
    /// Leaf count is zero or not a power of two.
    #[error("leaf count {len} is not a non-zero power of two")]
    NotPowerOfTwo {
        /// Offending leaf count.
        len: usize,
    },
    /// More leaves than the tree of the given height can hold.
    #[error("{len} leaves exceed capacity {capacity} of a height-{height} tree")]
    Overflow {
        /// Number of leaves supplied.
        len: usize,
        /// Tree height.
        height: u32,
        /// `2^height`.
        capacity: u64,
    },
    /// Height above [`MAX_HEIGHT`].
    #[error("tree height {0} exceeds maximum {MAX_HEIGHT}")]
    HeightTooLarge(u32),
}

/// Compresses two child nodes into their parent.
pub trait PairHasher {
    /// Hash `(left, right)` into a parent node.
    fn hash_pair(&self, left: Fr, right: Fr) -> Fr;
}

/// `(a + b) mod P`. Not collision resistant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AdditionHasher;

impl PairHasher for AdditionHasher {
    #[inline]
    fn hash_pair(&self, left: Fr, right: Fr) -> Fr {
        left + right
    }
}

/// MiMC-style compression: `t = a + b`, then `t = (t + key)^7` for
/// [`MIMC_ROUNDS`] rounds, output `t + key`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MimcHasher {
    /// Round key (zero in the reference parameterisation).
    pub key: Fr,
}

impl PairHasher for MimcHasher {
    fn hash_pair(&self, left: Fr, right: Fr) -> Fr {
        let mut t = left + right;
        for _ in 0..MIMC_ROUNDS {
            t = (t + self.key).pow(7);
        }
        t + self.key
    }
}

/// BLAKE3 over both 32-byte big-endian encodings, reduced mod `P`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Blake3Hasher;

impl PairHasher for Blake3Hasher {
    fn hash_pair(&self, left: Fr, right: Fr) -> Fr {
        let mut h = Hasher::new();
        h.update(b"zkstatus.merkle.node");
        h.update(&left.to_be_bytes());
        h.update(&right.to_be_bytes());
        Fr::from_be_bytes_reduced(*h.finalize().as_bytes())
    }
}

/// Runtime-selectable pair hasher (config value).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PairHashKind {
    /// [`AdditionHasher`].
    Addition,
    /// [`MimcHasher`] with key zero.
    #[default]
    Mimc,
    /// [`Blake3Hasher`].
    Blake3,
}

impl PairHasher for PairHashKind {
    #[inline]
    fn hash_pair(&self, left: Fr, right: Fr) -> Fr {
        match self {
            Self::Addition => AdditionHasher.hash_pair(left, right),
            Self::Mimc => MimcHasher::default().hash_pair(left, right),
            Self::Blake3 => Blake3Hasher.hash_pair(left, right),
        }
    }
}

impl<H: PairHasher + ?Sized> PairHasher for &H {
    #[inline]
    fn hash_pair(&self, left: Fr, right: Fr) -> Fr {
        (**self).hash_pair(left, right)
    }
}

/// Reduce a power-of-two leaf layer to its root by pairwise hashing.
pub fn build_root<H: PairHasher + ?Sized>(leaves: &[Fr], hasher: &H) -> Result<Fr, MerkleError> {
    if leaves.is_empty() || !leaves.len().is_power_of_two() {
        return Err(MerkleError::NotPowerOfTwo { len: leaves.len() });
    }
    let mut level = leaves.to_vec();
    while level.len() > 1 {
        level = level
            .chunks_exact(2)
            .map(|pair| hasher.hash_pair(pair[0], pair[1]))
            .collect();
    }
    Ok(level[0])
}

/// Root of a height-`height` tree whose leaves are all zero.
#[must_use]
pub fn zero_root<H: PairHasher + ?Sized>(height: u32, hasher: &H) -> Fr {
    (0..height).fold(Fr::ZERO, |node, _| hasher.hash_pair(node, node))
}

/// Root of the tree with `prefix` as its leftmost leaves and zeros after.
///
/// Equal to `build_root(&pad_leaves(prefix, height)?, hasher)` without
/// materialising the padding.
pub fn prefix_root<H: PairHasher + ?Sized>(
    prefix: &[Fr],
    height: u32,
    hasher: &H,
) -> Result<Fr, MerkleError> {
    check_fits(prefix.len(), height)?;
    let mut level = prefix.to_vec();
    let mut zero = Fr::ZERO;
    for _ in 0..height {
        if level.is_empty() {
            break;
        }
        if level.len() % 2 == 1 {
            level.push(zero);
        }
        level = level
            .chunks_exact(2)
            .map(|pair| hasher.hash_pair(pair[0], pair[1]))
            .collect();
        zero = hasher.hash_pair(zero, zero);
    }
    Ok(match level.first() {
        Some(root) => *root,
        None => zero_root(height, hasher),
    })
}

fn check_fits(len: usize, height: u32) -> Result<u64, MerkleError> {
    let cap = capacity(height)?;
    if len as u64 > cap {
        return Err(MerkleError::Overflow {
            len,
            height,
            capacity: cap,
        });
    }
    Ok(cap)
}

/// Leaf capacity `2^height`.
pub fn capacity(height: u32) -> Result<u64, MerkleError> {
    if height > MAX_HEIGHT {
        return Err(MerkleError::HeightTooLarge(height));
    }
    Ok(1u64 << height)
}

/// The status leaf sequence `[1, 2, ..., time]` (empty at time zero).
#[must_use]
pub fn leaves_at_time(time: u32) -> Vec<Fr> {
    (1..=u64::from(time)).map(Fr::from_u64).collect()
}

/// Zero-pad `leaves` to `2^height`; fails if they do not fit.
pub fn pad_leaves(mut leaves: Vec<Fr>, height: u32) -> Result<Vec<Fr>, MerkleError> {
    let cap = check_fits(leaves.len(), height)?;
    // cap <= 2^24 always fits usize.
    leaves.resize(usize::try_from(cap).unwrap_or(usize::MAX), Fr::ZERO);
    Ok(leaves)
}

/// A fixed-height tree holding only its leaf prefix; the rest is zero.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleTree {
    height: u32,
    leaves: Vec<Fr>,
}

impl MerkleTree {
    /// Tree of height `height` with `leaves` on the left; fails if they do not fit.
    pub fn new(height: u32, leaves: Vec<Fr>) -> Result<Self, MerkleError> {
        check_fits(leaves.len(), height)?;
        Ok(Self { height, leaves })
    }

    /// All-zero tree of height `height`.
    #[must_use]
    pub const fn empty(height: u32) -> Self {
        Self {
            height,
            leaves: Vec::new(),
        }
    }

    /// Tree height.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Leaf prefix, without padding.
    #[inline]
    #[must_use]
    pub fn leaves(&self) -> &[Fr] {
        &self.leaves
    }

    /// Root under `hasher`.
    pub fn root<H: PairHasher + ?Sized>(&self, hasher: &H) -> Result<Fr, MerkleError> {
        prefix_root(&self.leaves, self.height, hasher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fr(xs: &[u64]) -> Vec<Fr> {
        xs.iter().copied().map(Fr::from_u64).collect()
    }

    #[test]
    fn addition_root_of_four() {
        let root = build_root(&fr(&[1, 2, 3, 4]), &AdditionHasher).unwrap();
        assert_eq!(root, (Fr::from_u64(1) + Fr::from_u64(2)) + (Fr::from_u64(3) + Fr::from_u64(4)));
        assert_eq!(root, Fr::from_u64(10));
    }

    #[test]
    fn rejects_non_power_of_two() {
        assert_eq!(
            build_root(&fr(&[1, 2, 3]), &AdditionHasher),
            Err(MerkleError::NotPowerOfTwo { len: 3 })
        );
        assert_eq!(
            build_root(&[], &AdditionHasher),
            Err(MerkleError::NotPowerOfTwo { len: 0 })
        );
    }

    #[test]
    fn single_leaf_is_root() {
        let root = build_root(&fr(&[9]), &MimcHasher::default()).unwrap();
        assert_eq!(root, Fr::from_u64(9));
    }

    #[test]
    fn mimc_known_vector() {
        let h = MimcHasher::default();
        let got = h.hash_pair(Fr::from_u64(1), Fr::from_u64(2));
        let want: Fr =
            "11528207530246219926336009334570328191056682577766403146985310011206860521242"
                .parse()
                .unwrap();
        assert_eq!(got, want);
        assert_eq!(h.hash_pair(Fr::ZERO, Fr::ZERO), Fr::ZERO);
    }

    #[test]
    fn kind_dispatch_matches_concrete() {
        let (a, b) = (Fr::from_u64(5), Fr::from_u64(11));
        assert_eq!(PairHashKind::Addition.hash_pair(a, b), AdditionHasher.hash_pair(a, b));
        assert_eq!(PairHashKind::Blake3.hash_pair(a, b), Blake3Hasher.hash_pair(a, b));
        assert_ne!(Blake3Hasher.hash_pair(a, b), Blake3Hasher.hash_pair(b, a));
    }

    #[test]
    fn pad_and_overflow() {
        let t = MerkleTree::new(2, leaves_at_time(3)).unwrap();
        assert_eq!(t.leaves(), fr(&[1, 2, 3]).as_slice());
        assert_eq!(pad_leaves(t.leaves().to_vec(), 2).unwrap(), fr(&[1, 2, 3, 0]));
        assert_eq!(t.root(&AdditionHasher).unwrap(), Fr::from_u64(6));
        assert!(matches!(
            MerkleTree::new(2, leaves_at_time(5)),
            Err(MerkleError::Overflow { len: 5, height: 2, capacity: 4 })
        ));
    }

    #[test]
    fn zero_subtrees() {
        let h = PairHashKind::Mimc;
        assert_eq!(zero_root(0, &h), Fr::ZERO);
        assert_eq!(prefix_root(&[], 4, &h).unwrap(), zero_root(4, &h));
        assert_eq!(prefix_root(&[], 4, &h).unwrap(), build_root(&[Fr::ZERO; 16], &h).unwrap());
    }

    #[test]
    fn tall_tree_with_short_prefix() {
        let t = MerkleTree::new(MAX_HEIGHT, leaves_at_time(3)).unwrap();
        assert_eq!(t.root(&AdditionHasher).unwrap(), Fr::from_u64(6));
        assert_eq!(t.leaves().len(), 3);
    }

    #[test]
    fn kind_serde_lowercase() {
        let s = serde_json::to_string(&PairHashKind::Blake3).unwrap();
        assert_eq!(s, "\"blake3\"");
        let k: PairHashKind = serde_json::from_str("\"addition\"").unwrap();
        assert_eq!(k, PairHashKind::Addition);
    }
}
