//! Round-trip properties over randomly generated media types and resources.

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

use walktrack::media::{
    json_media_type, JsonTranscoder, Transcoder, TranscoderRole, WalkTrackMediaType,
};
use walktrack::modules::entries::model::Entry;
use walktrack::state::build_transcoder_registry;

fn random_segment(rng: &mut StdRng) -> String {
    let len = rng.gen_range(1..=12);
    (0..len)
        .map(|_| {
            let c = rng.gen_range(0..26) as u8;
            (b'a' + c) as char
        })
        .collect()
}

#[test]
fn test_media_type_parse_display_round_trip() {
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..200 {
        let built = WalkTrackMediaType::builder()
            .mime_type(random_segment(&mut rng))
            .sub_type(random_segment(&mut rng))
            .structure(format!(
                "{}.{}",
                random_segment(&mut rng),
                random_segment(&mut rng)
            ))
            .version(rng.gen_range(0..10_000))
            .build()
            .unwrap();

        let reparsed: WalkTrackMediaType = built.to_string().parse().unwrap();
        assert_eq!(reparsed, built);
    }
}

#[test]
fn test_media_type_equality_ignores_case() {
    let lower: WalkTrackMediaType = "application/json; structure=walktrack.user; version=1"
        .parse()
        .unwrap();
    let upper: WalkTrackMediaType = "APPLICATION/JSON; STRUCTURE=WalkTrack.User; VERSION=1"
        .parse()
        .unwrap();
    assert_eq!(lower, upper);
}

fn random_entry(rng: &mut StdRng) -> Entry {
    let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let created = Utc.timestamp_opt(rng.gen_range(1_600_000_000..1_700_000_000), 0).unwrap();
    Entry {
        id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        date: base + Duration::days(rng.gen_range(0..365)),
        distance: f64::from(rng.gen_range(0..50_000)) / 1000.0,
        created_at: created,
        updated_at: created + Duration::hours(1),
    }
}

#[test]
fn test_entry_transcoder_round_trip() {
    let mut rng = StdRng::seed_from_u64(11);
    let transcoder = JsonTranscoder::<Entry>::new(json_media_type("WalkTrack.Entry", 1));

    for _ in 0..100 {
        let entry = random_entry(&mut rng);
        let mut buf = Vec::new();
        transcoder.encode(&entry, &mut buf).unwrap();
        assert_eq!(transcoder.decode(&buf).unwrap(), entry);
    }
}

#[test]
fn test_registry_round_trips_entry_collections() {
    let mut rng = StdRng::seed_from_u64(13);
    let registry = build_transcoder_registry().unwrap();
    let mt = json_media_type("WalkTrack.Entry", 1);

    let entries: Vec<Entry> = (0..10).map(|_| random_entry(&mut rng)).collect();
    let bytes = registry
        .encode(&mt, &entries, TranscoderRole::Wire)
        .unwrap();
    let decoded: Vec<Entry> = registry.decode(&mt, &bytes, TranscoderRole::Wire).unwrap();
    assert_eq!(decoded, entries);

    // The envelope is the documented shape, not a bare array.
    let envelope: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(envelope["count"], 10);
}
