//! Integration-Tests fuer CalibrationStore mit Datei-Medium

use std::sync::Arc;
use std::thread;

use calistore_core::{AudioOutput, Calibration, CalibrationError, Distance, NetworkCalibration};
use calistore_store::{CalibrationStore, JsonFile, StoreOptions, DEFAULT_IDENTIFIER, META_KEY};

fn oeffnen(dir: &tempfile::TempDir) -> CalibrationStore {
    let medium = JsonFile::open(dir.path().join("data"), "calibration.json")
        .expect("Medium konnte nicht geoeffnet werden");
    CalibrationStore::open(
        medium,
        StoreOptions {
            seed_default: false,
        },
    )
    .expect("Bestand konnte nicht geoeffnet werden")
}

fn audio(delay: f64, gain: f64) -> Calibration {
    Calibration::empty().with_audio_output("internal", AudioOutput::new(delay, gain))
}

#[test]
fn bestand_ueberlebt_neustart() {
    let dir = tempfile::tempdir().unwrap();

    {
        let store = oeffnen(&dir);
        assert!(store.save("Mozilla/5.0 Foo", &audio(0.01, -3.0)));
        assert!(store.save("Mozilla/5.0 Foo", &audio(0.02, -4.0)));
        assert!(store.save(
            "Opera/9.80",
            &Calibration::empty().with_network(NetworkCalibration::new(0.05, 0.1)),
        ));
    }

    let store = oeffnen(&dir);
    assert_eq!(store.identifiers(), vec!["Mozilla/5.0 Foo", "Opera/9.80"]);

    let r = store.load("Mozilla/5.0 Foo");
    assert_eq!(r.distance, Distance::Finite(0));
    assert_eq!(r.calibration.audio_output("internal"), Some(&AudioOutput::new(0.02, -4.0)));

    let history = store.history("Mozilla/5.0 Foo").unwrap();
    assert_eq!(history.audio["internal"].len(), 2);

    let netz = store.load("Opera/9.80");
    assert_eq!(netz.calibration.network, Some(NetworkCalibration::new(0.05, 0.1)));
    assert_eq!(netz.distance, Distance::Infinite);
}

#[test]
fn dokument_enthaelt_metadaten_und_historien() {
    let dir = tempfile::tempdir().unwrap();
    let store = oeffnen(&dir);
    store.save("dev", &audio(0.01, -3.0));

    let inhalt = std::fs::read_to_string(dir.path().join("data/calibration.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&inhalt).unwrap();
    assert_eq!(json[META_KEY]["schema"], 2);

    let eintrag = &json["dev"]["audio"]["internal"][0];
    assert!(eintrag[0].is_string(), "Zeitstempel zuerst");
    assert_eq!(eintrag[1]["delay"], 0.01);
    assert_eq!(eintrag[1]["gain"], -3.0);
}

#[test]
fn fehlende_datei_mit_vorbelegung() {
    let dir = tempfile::tempdir().unwrap();
    let medium = JsonFile::open(dir.path().join("neu"), "calibration.json").unwrap();
    let store = CalibrationStore::open(medium, StoreOptions::default()).unwrap();

    assert_eq!(store.identifiers(), vec![DEFAULT_IDENTIFIER]);
    assert!(store.load("Irgendein Browser").distance.is_finite());
    assert!(!dir.path().join("neu/calibration.json").exists());
}

#[test]
fn beschaedigte_datei_verhindert_start() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("data")).unwrap();
    std::fs::write(dir.path().join("data/calibration.json"), "{\"abgeschnitten\": [").unwrap();

    let medium = JsonFile::open(dir.path().join("data"), "calibration.json").unwrap();
    let err = CalibrationStore::open(medium, StoreOptions::default()).err();
    assert!(matches!(err, Some(CalibrationError::CorruptStore(_))));
}

#[test]
fn altes_dokument_wird_migriert() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("data")).unwrap();
    std::fs::write(
        dir.path().join("data/calibration.json"),
        r#"{"default":{"audio":[["default",{"delay":0,"gain":0}]]},
            "iPad":{"audio":[["2015-03-01T10:00:00.000Z",{"internal":{"delay":0.04,"gain":-2}}]]}}"#,
    )
    .unwrap();

    let store = oeffnen(&dir);
    assert_eq!(store.identifiers(), vec!["default", "iPad"]);
    let r = store.load("iPad");
    assert_eq!(r.calibration.audio_output("internal"), Some(&AudioOutput::new(0.04, -2.0)));

    // Naechstes save schreibt Schema 2 mit allen alten Eintraegen
    store.save("iPad", &audio(0.05, -2.0));
    let inhalt = std::fs::read_to_string(dir.path().join("data/calibration.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&inhalt).unwrap();
    assert_eq!(json[META_KEY]["schema"], 2);
    assert_eq!(json["iPad"]["audio"]["internal"].as_array().unwrap().len(), 2);
    assert_eq!(json["default"]["audio"]["default"][0][0], "default");
}

#[test]
fn schreibfehler_bei_fehlendem_verzeichnis() {
    let dir = tempfile::tempdir().unwrap();
    let store = oeffnen(&dir);
    std::fs::remove_dir_all(dir.path().join("data")).unwrap();

    assert!(store.save("dev", &audio(0.01, 0.0)));
    assert!(store.has_pending_write());
    assert_eq!(store.load("dev").distance, Distance::Finite(0));

    std::fs::create_dir_all(dir.path().join("data")).unwrap();
    assert!(store.save("dev", &audio(0.02, 0.0)));
    assert!(!store.has_pending_write());

    let neu = oeffnen(&dir);
    assert_eq!(neu.history("dev").unwrap().audio["internal"].len(), 2);
}

#[test]
fn parallele_saves_gehen_nicht_verloren() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(oeffnen(&dir));

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 0..10 {
                    store.save(&format!("geraet-{t}"), &audio(f64::from(i) / 100.0, 0.0));
                    store.load("geraet-0");
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(store.len(), 8);
    let neu = oeffnen(&dir);
    for t in 0..8 {
        let record = neu.history(&format!("geraet-{t}")).unwrap();
        assert_eq!(record.audio["internal"].len(), 10);
        assert_eq!(record.latest().audio_output("internal").unwrap().delay, Some(0.09));
    }
}

#[test]
fn zeitstempel_steigen_mit_der_historie() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(oeffnen(&dir));

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 0..25 {
                    store.save("geteilt", &audio(f64::from(t * 100 + i), 0.0));
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let inhalt = std::fs::read_to_string(dir.path().join("data/calibration.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&inhalt).unwrap();
    let zeitstempel: Vec<&str> = json["geteilt"]["audio"]["internal"]
        .as_array()
        .unwrap()
        .iter()
        .map(|eintrag| eintrag[0].as_str().unwrap())
        .collect();

    assert_eq!(zeitstempel.len(), 200);
    assert!(
        zeitstempel.windows(2).all(|w| w[0] <= w[1]),
        "Zeitstempel nicht monoton: {zeitstempel:?}"
    );
}
