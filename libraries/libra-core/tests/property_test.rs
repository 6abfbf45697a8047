//! Property-based tests for the core value types
//!
//! Each property states a law the rest of the workspace relies on.

use libra_core::{
    parse_human_duration, ByteSize, HumanDuration, LinkedSource, Playable, Track, Version,
};
use proptest::prelude::*;

// ===== Helpers =====

fn arbitrary_version() -> impl Strategy<Value = Version> {
    (
        0u64..1000,
        0u64..1000,
        0u64..1000,
        proptest::option::of("[a-z][a-z0-9.]{0,8}"),
    )
        .prop_map(|(major, minor, patch, suffix)| Version {
            major,
            minor,
            patch,
            suffix,
        })
}

fn arbitrary_track() -> impl Strategy<Value = Track> {
    (
        "[A-Za-z0-9]{0,11}",
        "[A-Za-z ]{1,30}",
        prop::collection::vec("[A-Za-z0-9]{11}", 0..4),
        0i64..10_000,
        0i64..100_000,
        prop::collection::vec("[a-z]{1,8}", 0..4),
    )
        .prop_map(|(id, title, artist_ids, duration, listen_count, tags)| Track {
            id,
            title,
            artist_ids,
            duration: HumanDuration::from_secs(duration),
            listen_count,
            tags,
            metadata_source: LinkedSource::new("youtube", "https://youtu.be/x"),
            ..Track::default()
        })
}

// ===== Property Tests =====

proptest! {
    /// Property: printing then parsing a version yields the same version
    #[test]
    fn version_display_parse_roundtrip(version in arbitrary_version()) {
        let parsed = Version::parse(&version.to_string()).unwrap();
        prop_assert_eq!(parsed, version);
    }

    /// Property: ordering agrees with is_at_least
    #[test]
    fn version_ordering_matches_is_at_least(a in arbitrary_version(), b in arbitrary_version()) {
        prop_assert_eq!(a.is_at_least(&b), a >= b);
        prop_assert!(a.is_at_least(&b) || b.is_at_least(&a));
    }

    /// Property: a duration's printed form parses back to the same length
    #[test]
    fn duration_display_parse_roundtrip(secs in -10_000_000i64..10_000_000) {
        let duration = HumanDuration::from_secs(secs);
        let parsed = parse_human_duration(&duration.to_string()).unwrap();
        prop_assert_eq!(parsed.num_seconds(), secs);
    }

    /// Property: a source reference splits back into what built it
    #[test]
    fn linked_source_parts(id in "[a-z][a-z0-9:/._-]{0,11}[a-z0-9]", locator in "[ -~]{0,40}") {
        prop_assume!(!id.contains("::"));
        let linked = LinkedSource::new(&id, &locator);
        prop_assert_eq!(linked.source_id(), id.as_str());
        prop_assert_eq!(linked.locator(), locator.as_str());
    }

    /// Property: byte sizes survive their display form
    #[test]
    fn byte_size_display_parse_roundtrip(bytes in 0u64..(1 << 50)) {
        let size = ByteSize(bytes);
        prop_assert_eq!(size.to_string().parse::<ByteSize>().unwrap(), size);
    }

    /// Property: a playable is temporary exactly when it has no id
    #[test]
    fn temporary_iff_id_empty(track in arbitrary_track()) {
        let playable = Playable::Track(track.clone());
        prop_assert_eq!(playable.is_temporary(), track.id.is_empty());
    }

    /// Property: JSON encoding preserves every field of a track
    #[test]
    fn track_json_roundtrip(track in arbitrary_track()) {
        let playable = Playable::Track(track);
        let json = serde_json::to_string(&playable).unwrap();
        let back: Playable = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back, playable);
    }
}
