//! Status codec and progression properties.
//!
//! - encode/decode is a bijection on every variant,
//! - `advance` is monotone: time +1, superset of the previous bits, exactly
//!   one more bit set (or `Exhausted` when full),
//! - genesis is idempotent.

use proptest::prelude::*;
use zkstatus_core::{
    MerkleOverflowPolicy, MerkleParams, PairHashKind, Status, StatusError, StatusParams, U256,
};

fn arb_u256() -> impl Strategy<Value = U256> {
    prop_oneof![
        Just(U256::ZERO),
        Just(U256::MAX),
        any::<[u64; 4]>().prop_map(U256::from_limbs),
    ]
}

fn arb_wide() -> impl Strategy<Value = (StatusParams, Status)> {
    (any::<u32>(), prop::collection::vec(arb_u256(), 1..5)).prop_map(|(time, words)| {
        (
            StatusParams::WideBitmask {
                data_size: words.len(),
            },
            Status::WideBitmask { time, words },
        )
    })
}

#[track_caller]
fn merkle_params(height: u32, hasher: PairHashKind) -> StatusParams {
    StatusParams::Merkle(MerkleParams::new(height, hasher, MerkleOverflowPolicy::Reject).unwrap())
}

#[track_caller]
fn advance_n(params: &StatusParams, n: usize) -> Status {
    let mut s = Status::genesis(params);
    for _ in 0..n {
        s = s.advance().unwrap();
    }
    s
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    #[test]
    fn bitmask64_round_trip(time in any::<u64>(), bits in any::<u64>()) {
        let s = Status::Bitmask64 { time, bits };
        let bytes = s.encode();
        prop_assert_eq!(bytes.len(), 16);
        prop_assert_eq!(Status::decode(&bytes, &StatusParams::Bitmask64).unwrap(), s);
    }

    #[test]
    fn wide_round_trip((params, s) in arb_wide()) {
        let bytes = s.encode();
        prop_assert_eq!(bytes.len(), params.encoded_len());
        prop_assert_eq!(Status::decode(&bytes, &params).unwrap(), s);
    }

    #[test]
    fn merkle_round_trip(height in 0u32..5, frac in 0.0f64..=1.0, hasher_ix in 0usize..3) {
        let hasher = [PairHashKind::Addition, PairHashKind::Mimc, PairHashKind::Blake3][hasher_ix];
        let params = merkle_params(height, hasher);
        let steps = (f64::from(1u32 << height) * frac) as usize;
        let s = advance_n(&params, steps);
        prop_assert_eq!(Status::decode(&s.encode(), &params).unwrap(), s);
    }

    #[test]
    fn bitmask64_advance_is_monotone(time in 0u64..u64::MAX, bits in any::<u64>()) {
        let s = Status::Bitmask64 { time, bits };
        match s.advance() {
            Ok(next) => {
                prop_assert_eq!(next.time(), time + 1);
                prop_assert!(next.contains(&s));
                prop_assert_eq!(next.popcount(), s.popcount() + 1);
            }
            Err(e) => {
                prop_assert_eq!(bits, u64::MAX);
                prop_assert_eq!(e, StatusError::Exhausted { capacity: 64 });
            }
        }
    }

    #[test]
    fn wide_advance_is_monotone((_, s) in arb_wide()) {
        let Status::WideBitmask { time, words } = &s else { unreachable!() };
        match s.advance() {
            Ok(next) => {
                prop_assert_eq!(next.time(), u64::from(*time) + 1);
                prop_assert!(next.contains(&s));
                prop_assert_eq!(next.popcount(), s.popcount() + 1);
                // Exactly one word changed: the first non-full one.
                let Status::WideBitmask { words: after, .. } = &next else { unreachable!() };
                let first_open = words.iter().position(|w| *w != U256::MAX).unwrap();
                for (i, (a, b)) in words.iter().zip(after).enumerate() {
                    prop_assert_eq!(a == b, i != first_open);
                }
            }
            Err(StatusError::Exhausted { capacity }) => {
                prop_assert!(words.iter().all(|w| *w == U256::MAX));
                prop_assert_eq!(capacity, words.len() * 256);
            }
            Err(StatusError::TimeOverflow { .. }) => prop_assert_eq!(*time, u32::MAX),
            Err(e) => prop_assert!(false, "unexpected error {e}"),
        }
    }

    #[test]
    fn genesis_is_idempotent(data_size in 1usize..6, height in 0u32..6) {
        for params in [
            StatusParams::Bitmask64,
            StatusParams::WideBitmask { data_size },
            merkle_params(height, PairHashKind::Mimc),
        ] {
            let a = Status::genesis(&params);
            prop_assert_eq!(a.time(), 0);
            prop_assert_eq!(a.popcount(), 0);
            prop_assert_eq!(&a, &Status::genesis(&params));
        }
    }
}

#[test]
fn scenario_bitmask64_three_steps() {
    let s = advance_n(&StatusParams::Bitmask64, 3);
    assert_eq!(s, Status::Bitmask64 { time: 3, bits: 0b111 });
}

#[test]
fn scenario_wide_capacity_boundary() {
    let one = StatusParams::WideBitmask { data_size: 1 };
    let full = advance_n(&one, 256);
    assert_eq!(full.advance(), Err(StatusError::Exhausted { capacity: 256 }));

    let two = StatusParams::WideBitmask { data_size: 2 };
    let s = advance_n(&two, 257);
    assert_eq!(s.words(), vec![U256::MAX, U256::from(1u64)]);
}

#[test]
fn merkle_decode_rejects_time_past_capacity() {
    let params = merkle_params(1, PairHashKind::Addition);
    // time 3 with root 6 would be the addition root of [1, 2, 3], which does
    // not fit a height-1 tree.
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&3u32.to_be_bytes());
    bytes.extend_from_slice(&1u32.to_be_bytes());
    bytes.extend_from_slice(&U256::from(6u64).to_be_bytes::<32>());
    assert_eq!(
        Status::decode(&bytes, &params),
        Err(StatusError::MerkleCapacity { time: 3, capacity: 2 })
    );
}
