//! Roster JSON on disk to bundle on disk, then read back.

use std::sync::Arc;

use checkpack::export::{BundleOptions, bundle_entries, build_bundle};
use checkpack::{LocalFileReader, Roster, ZipExtractor};

const ROSTER: &str = r#"[
  {"id":"a1","name":"Ada Lovelace","email":"ada@example.com","checkedIn":true,
   "signatureUrl":"data:image/png;base64,iVBORw0KGgo="},
  {"id":"b2","name":"Bob \"Bobby\" Tables","email":"bob@example.com","checkedIn":false,
   "signatureUrl":null},
  {"id":"c3","name":"Zoë","email":"","checkedIn":true,
   "signatureUrl":"data:image/png;base64,AAEC"}
]"#;

#[tokio::test]
async fn bundle_round_trip_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let roster_path = dir.path().join("roster.json");
    tokio::fs::write(&roster_path, ROSTER).await.unwrap();

    let roster = Roster::load(&roster_path).await.unwrap();
    assert_eq!(roster.checked_in_count(), 2);

    let zip_path = dir.path().join("checkins.zip");
    let zip = build_bundle(&roster, &BundleOptions::default()).unwrap();
    tokio::fs::write(&zip_path, &zip).await.unwrap();

    let extractor = ZipExtractor::new(Arc::new(LocalFileReader::new(&zip_path).unwrap()));
    let files = extractor.list_files().await.unwrap();
    let names: Vec<_> = files.iter().map(|f| f.file_name.as_str()).collect();
    assert_eq!(
        names,
        [
            "checkins.csv",
            "signatures/ada_lovelace_a1.png",
            "signatures/zo_c3.png"
        ]
    );

    let csv = extractor.extract_to_memory(&files[0]).await.unwrap();
    let csv = String::from_utf8(csv).unwrap();
    assert_eq!(
        csv,
        "\"name\",\"email\",\"checkedIn\",\"signatureUrl\"\n\
         \"Ada Lovelace\",\"ada@example.com\",\"1\",\"signatures/ada_lovelace_a1.png\"\n\
         \"Bob \"\"Bobby\"\" Tables\",\"bob@example.com\",\"0\",\"\"\n\
         \"Zoë\",\"\",\"1\",\"signatures/zo_c3.png\""
    );

    assert_eq!(
        extractor.extract_to_memory(&files[1]).await.unwrap(),
        b"\x89PNG\r\n\x1a\n"
    );
    assert_eq!(extractor.extract_to_memory(&files[2]).await.unwrap(), [0, 1, 2]);

    let checks = extractor.test_archive().await.unwrap();
    assert_eq!(checks.len(), 3);
    assert!(checks.iter().all(|c| c.is_ok()));
}

#[test]
fn custom_names() {
    let roster = Roster::from_json(ROSTER).unwrap();
    let options = BundleOptions {
        csv_name: "day1/guests.csv".to_string(),
        signature_dir: "day1/sigs/".to_string(),
    };
    let report = bundle_entries(&roster, &options).unwrap();

    assert_eq!(report.entries[0].name, "day1/guests.csv");
    assert_eq!(report.entries[1].name, "day1/sigs/ada_lovelace_a1.png");
    assert!(report.skipped.is_empty());
}
