//! Export and import through the façade.
mod common;

use chrono::NaiveDate;
use common::{ALL_SETUPS, Setup, photo, store, weight};
use hutch_store::{ImportSummary, StoreError, ValidationError};
use hutch_types::{ExportDocument, PhotoEntry, PhotoKind, Settings, WeightEntry};

fn mochi() -> Settings {
    Settings {
        rabbit_name: "Mochi".into(),
        rabbit_breed: "Mini Rex".into(),
        rabbit_birthday: "2021-09-12".into(),
        openai_api_key: String::new(),
    }
}

#[tokio::test]
async fn export_then_import_into_fresh_store() {
    for setup in ALL_SETUPS {
        let (_src_dir, source) = store(setup).await;
        source.append_record(&weight(1, 1, 1500.0)).await.unwrap();
        source.append_record(&photo(2, 2, PhotoKind::Fur)).await.unwrap();
        source.write_settings(&mochi()).await.unwrap();

        let json = source.export_json().await.unwrap();
        assert!(json.contains("\n  \"weights\""), "export should be pretty-printed");

        let (_dst_dir, target) = store(Setup::Structured).await;
        let summary = target.import_json(&json).await.unwrap();

        assert_eq!(
            summary,
            ImportSummary {
                weights: Some(1),
                photos: Some(1),
                settings: true
            }
        );
        assert_eq!(
            target.export_document().await.unwrap(),
            source.export_document().await.unwrap(),
            "{setup:?}"
        );
    }
}

#[tokio::test]
async fn partial_import_leaves_other_data_alone() {
    let (_dir, store) = store(Setup::Structured).await;
    store.append_record(&photo(7, 1, PhotoKind::Poop)).await.unwrap();
    store.write_settings(&mochi()).await.unwrap();

    let summary = store
        .import_json(r#"{"weights":[{"id":1,"weight":1450,"date":"2024-01-05T00:00:00.000Z","dateStr":"2024/1/5"}]}"#)
        .await
        .unwrap();

    assert_eq!(summary.weights, Some(1));
    assert_eq!(summary.photos, None);
    assert!(!summary.settings);

    let photos = store.read_collection::<PhotoEntry>().await.unwrap();
    assert_eq!(photos.len(), 1);
    assert_eq!(store.read_settings().await.unwrap(), mochi());

    let weights = store.read_collection::<WeightEntry>().await.unwrap();
    assert_eq!(weights[0].weight, 1450.0);
}

#[tokio::test]
async fn malformed_import_mutates_nothing() {
    for setup in ALL_SETUPS {
        let (_dir, store) = store(setup).await;
        store.append_record(&weight(1, 1, 1500.0)).await.unwrap();
        let before = store.export_document().await.unwrap();

        for bad in [
            "{ not json",
            r#"{"weights": "nope"}"#,
            // Valid weights, broken photos: the weights must not be applied either.
            r#"{"weights": [], "photos": [{"id": 1, "type": "whiskers"}]}"#,
        ] {
            let err = store.import_json(bad).await.unwrap_err();
            assert!(matches!(err, StoreError::MalformedImport(_)), "{bad}");
        }

        assert_eq!(store.export_document().await.unwrap(), before, "{setup:?}");
    }
}

#[tokio::test]
async fn duplicate_ids_in_import_are_refused() {
    let (_dir, store) = store(Setup::Structured).await;
    store.append_record(&weight(1, 1, 1500.0)).await.unwrap();

    let doc = r#"{"weights": [
        {"id": 3, "weight": 1500, "date": "2024-01-01T00:00:00Z", "dateStr": ""},
        {"id": 3, "weight": 1510, "date": "2024-01-02T00:00:00Z", "dateStr": ""}
    ]}"#;
    let err = store.import_json(doc).await.unwrap_err();
    assert!(matches!(err, StoreError::DuplicateId { id: 3, .. }));

    let weights = store.read_collection::<WeightEntry>().await.unwrap();
    assert_eq!(weights.iter().map(|w| w.id).collect::<Vec<_>>(), vec![1]);
}

#[tokio::test]
async fn invalid_entries_reject_the_whole_import() {
    for setup in ALL_SETUPS {
        let (_dir, store) = store(setup).await;
        store.append_record(&weight(1, 1, 1500.0)).await.unwrap();
        store.append_record(&photo(2, 2, PhotoKind::Poop)).await.unwrap();
        let before = store.export_document().await.unwrap();

        let bad_weights = r#"{
            "weights": [
                {"id": 10, "weight": -5, "date": "2024-01-01T00:00:00Z", "dateStr": ""},
                {"id": 11, "weight": 0, "date": "2024-01-02T00:00:00Z", "dateStr": ""}
            ],
            "settings": {"rabbitName": "Kinako"}
        }"#;
        let err = store.import_json(bad_weights).await.unwrap_err();
        assert!(
            matches!(err, StoreError::Invalid(ValidationError::InvalidWeight(_))),
            "{setup:?}: {err}"
        );

        let bad_photo = r#"{
            "weights": [{"id": 10, "weight": 1490, "date": "2024-01-01T00:00:00Z", "dateStr": ""}],
            "photos": [{"id": 12, "type": "fur", "dataUrl": "not a data url",
                        "date": "2024-01-03T00:00:00Z", "dateStr": "", "timeStr": ""}]
        }"#;
        let err = store.import_json(bad_photo).await.unwrap_err();
        assert!(
            matches!(err, StoreError::Invalid(ValidationError::NotADataUrl)),
            "{setup:?}: {err}"
        );

        assert_eq!(store.export_document().await.unwrap(), before, "{setup:?}");
    }
}

#[tokio::test]
async fn oversized_imported_photo_is_refused() {
    let (_dir, store) = store(Setup::Structured).await;
    let limit = store.photo_policy().max_bytes;
    let data_url = format!("data:image/png;base64,{}", "A".repeat(limit));

    let doc = serde_json::json!({
        "photos": [{
            "id": 1, "type": "fur", "dataUrl": data_url,
            "date": "2024-01-01T00:00:00Z", "dateStr": "", "timeStr": ""
        }]
    });
    let err = store.import_json(&doc.to_string()).await.unwrap_err();
    assert!(matches!(
        err,
        StoreError::Invalid(ValidationError::PhotoTooLarge { .. })
    ));
    assert!(store.read_collection::<PhotoEntry>().await.unwrap().is_empty());
}

#[tokio::test]
async fn empty_import_changes_nothing() {
    let (_dir, store) = store(Setup::Structured).await;
    store.append_record(&weight(1, 1, 1500.0)).await.unwrap();

    let summary = store.import_json(r#"{"unrelated": true}"#).await.unwrap();
    assert_eq!(summary, ImportSummary::default());
    assert_eq!(store.read_collection::<WeightEntry>().await.unwrap().len(), 1);
}

#[tokio::test]
async fn export_file_round_trips_through_disk() {
    let (dir, store) = store(Setup::Structured).await;
    store.append_record(&weight(1, 1, 1500.0)).await.unwrap();

    let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
    let path = store.export_to_dir(dir.path(), date).await.unwrap();
    assert!(path.ends_with("rabbit-health-data-2024-02-29.json"));

    let text = std::fs::read_to_string(&path).unwrap();
    let doc: ExportDocument = serde_json::from_str(&text).unwrap();
    assert_eq!(doc.weights.len(), 1);

    store.clear_everything().await.unwrap();
    store.import_file(&path).await.unwrap();
    assert_eq!(store.read_collection::<WeightEntry>().await.unwrap().len(), 1);
}
