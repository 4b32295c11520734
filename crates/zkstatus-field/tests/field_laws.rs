//! Ring laws for `Fr` over random canonical elements.

use proptest::prelude::*;
use zkstatus_field::{Fr, U256};

prop_compose! {
    fn arb_fr()(limbs in any::<[u64; 4]>()) -> Fr {
        Fr::new(U256::from_limbs(limbs))
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    #[test]
    fn add_sub_inverse(a in arb_fr(), b in arb_fr()) {
        prop_assert_eq!((a + b) - b, a);
    }

    #[test]
    fn mul_distributes(a in arb_fr(), b in arb_fr(), c in arb_fr()) {
        prop_assert_eq!(a * (b + c), a * b + a * c);
    }

    #[test]
    fn bytes_are_canonical(a in arb_fr()) {
        prop_assert_eq!(Fr::from_be_bytes_reduced(a.to_be_bytes()), a);
    }

    #[test]
    fn pow_matches_repeated_mul(a in arb_fr(), e in 0u64..16) {
        let mut acc = Fr::ONE;
        for _ in 0..e {
            acc *= a;
        }
        prop_assert_eq!(a.pow(e), acc);
    }
}
