//! Property coverage for zone matching.

use proptest::prelude::*;

use shiplane_core::{AggregateId, TenantId};
use shiplane_zones::{resolve, PostalPattern, Zone, ZoneDefinition, ZoneId};

fn postal_code() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[0-9]{4,6}").unwrap()
}

fn pattern() -> impl Strategy<Value = PostalPattern> {
    prop_oneof![
        postal_code().prop_map(PostalPattern::Exact),
        proptest::string::string_regex("[0-9]{1,3}")
            .unwrap()
            .prop_map(PostalPattern::Prefix),
        (postal_code(), postal_code()).prop_map(|(a, b)| {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            PostalPattern::Range { lo, hi }
        }),
    ]
}

fn zone(allowed: Vec<PostalPattern>, excluded: Vec<PostalPattern>, priority: i32) -> Zone {
    Zone::new(
        ZoneId::new(AggregateId::new()),
        TenantId::new(),
        ZoneDefinition {
            code: format!("z{priority}"),
            name: format!("zone {priority}"),
            countries: vec!["FR".to_string()],
            allowed,
            excluded,
            priority,
        },
    )
    .unwrap()
}

proptest! {
    /// Resolution is a pure function of the zone list and destination.
    #[test]
    fn resolve_is_deterministic(
        patterns in proptest::collection::vec(pattern(), 0..4),
        excluded in proptest::collection::vec(pattern(), 0..4),
        postal in postal_code(),
    ) {
        let zones = vec![
            zone(patterns.clone(), excluded.clone(), 1),
            zone(vec![], vec![], 2),
        ];

        let first = resolve(&zones, "FR", &postal).map(|z| z.code().to_string());
        let second = resolve(&zones, "FR", &postal).map(|z| z.code().to_string());
        prop_assert_eq!(first, second);
    }

    /// A code matching any exclusion pattern is never admitted, even when an
    /// allow pattern also matches it.
    #[test]
    fn exclusion_beats_allow_list(
        postal in postal_code(),
        extra in proptest::collection::vec(pattern(), 0..3),
    ) {
        let mut allowed = extra.clone();
        allowed.push(PostalPattern::Exact(postal.clone()));
        let excluded = vec![PostalPattern::Exact(postal.clone())];

        let z = zone(allowed, excluded, 1);
        prop_assert!(!z.matches_postal(&postal));
    }

    /// With no exclusions and an empty allow-list, every code is admitted.
    #[test]
    fn open_zone_admits_everything(postal in postal_code()) {
        let z = zone(vec![], vec![], 1);
        prop_assert!(z.matches_postal(&postal));
    }
}
