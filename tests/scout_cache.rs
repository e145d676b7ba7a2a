// tests/scout_cache.rs
// TTL behaviour of the result cache, driven with explicit clocks.

use chrono::{Duration, TimeZone, Utc};
use exam_scout::cache::{videos_key, CACHE_TTL_SECS};
use exam_scout::ResultCache;
use serde_json::json;

#[test]
fn entry_lives_exactly_seven_days() {
    let cache = ResultCache::new();
    let t = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
    let key = videos_key("os");
    cache.set_at(&key, json!({"topic_id": "os"}), t);

    assert!(cache.get_at(&key, t + Duration::days(3)).is_some());
    assert!(cache.get_at(&key, t + Duration::seconds(CACHE_TTL_SECS)).is_some());
    assert!(cache
        .get_at(&key, t + Duration::seconds(CACHE_TTL_SECS + 1))
        .is_none());
    // Evicted on the expired lookup, so even an earlier clock misses now.
    assert!(cache.get_at(&key, t).is_none());
}

#[test]
fn repeated_reads_return_the_same_value() {
    let cache = ResultCache::new();
    let t = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
    cache.set_at("videos:dbms", json!([1, 2, 3]), t);

    let first = cache.get_at("videos:dbms", t + Duration::hours(1));
    let second = cache.get_at("videos:dbms", t + Duration::hours(2));
    assert_eq!(first, second);
    assert_eq!(cache.len(), 1);
}

#[test]
fn keys_are_independent() {
    let cache = ResultCache::new();
    let t = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
    cache.set_at(&videos_key("os"), json!("os"), t);
    cache.set_at(&videos_key("cn"), json!("cn"), t + Duration::days(5));

    let later = t + Duration::days(8);
    assert!(cache.get_at(&videos_key("os"), later).is_none());
    assert_eq!(cache.get_at(&videos_key("cn"), later), Some(json!("cn")));
}
