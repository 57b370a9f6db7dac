//! JSON-Dokumentformat des Bestands
//!
//! Ein Objekt Kennung -> Datensatz. Die reservierte Kennung [`META_KEY`]
//! traegt die Schema-Version und ist nie Teil der Kennungsmenge.
//!
//! Schema 1 (ohne Metadaten) speichert `audio` als eine Historie ganzer
//! Audio-Objekte, entweder mit benannten Ausgaengen
//! (`{"internal": {...}, "external": {...}}`) oder in der Form mit einem
//! Ausgang (`{"delay": 0, "gain": 0}`). Solche Dokumente werden beim Lesen
//! pro Ausgang aufgeteilt; geschrieben wird immer Schema 2.

use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use calistore_core::{audio_outputs_from_value, CalibrationError, NetworkCalibration, Result};

use crate::history::{DeviceRecord, History, HistoryEntry};

/// Reservierte Kennung fuer Bestands-Metadaten
pub const META_KEY: &str = "_calistore";

/// Aktuelle Schema-Version
pub const SCHEMA_VERSION: u32 = 2;

/// Alle Datensaetze in Einfuegereihenfolge der Kennungen
pub type Records = IndexMap<String, DeviceRecord>;

#[derive(Debug, Serialize, Deserialize)]
struct Meta {
    schema: u32,
}

/// Datensatz im Schema 1
#[derive(Debug, Deserialize)]
struct LegacyRecord {
    #[serde(default)]
    audio: Vec<HistoryEntry<Value>>,
    #[serde(default)]
    network: History<NetworkCalibration>,
}

/// Liest ein Dokument; jeder Lese- oder Formatfehler gilt als beschaedigt
pub fn parse(document: &str) -> Result<Records> {
    let mut raw: IndexMap<String, Value> =
        serde_json::from_str(document).map_err(|e| CalibrationError::corrupt(e.to_string()))?;

    let schema = match raw.shift_remove(META_KEY) {
        Some(meta) => {
            serde_json::from_value::<Meta>(meta)
                .map_err(|e| CalibrationError::corrupt(format!("Metadaten: {e}")))?
                .schema
        }
        None => 1,
    };

    if schema == 0 || schema > SCHEMA_VERSION {
        return Err(CalibrationError::corrupt(format!(
            "Unbekannte Schema-Version {schema}"
        )));
    }

    let mut records = Records::with_capacity(raw.len());
    for (identifier, value) in raw {
        let parsed = if schema == 1 {
            convert_legacy(value)
        } else {
            serde_json::from_value::<DeviceRecord>(value)
        };
        let record = parsed
            .map_err(|e| CalibrationError::corrupt(format!("Kennung '{identifier}': {e}")))?;
        records.insert(identifier, record);
    }

    if schema == 1 {
        tracing::info!(
            kennungen = records.len(),
            "Kalibrierungsbestand im Schema 1 gelesen, wird beim naechsten Schreiben migriert"
        );
    }

    Ok(records)
}

/// Schreibt alle Datensaetze inklusive Metadaten als kompaktes JSON
pub fn render(records: &Records) -> Result<String> {
    Ok(serde_json::to_string(&Document(records))?)
}

struct Document<'a>(&'a Records);

impl Serialize for Document<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len() + 1))?;
        map.serialize_entry(
            META_KEY,
            &Meta {
                schema: SCHEMA_VERSION,
            },
        )?;
        for (identifier, record) in self.0 {
            map.serialize_entry(identifier, record)?;
        }
        map.end()
    }
}

fn convert_legacy(value: Value) -> serde_json::Result<DeviceRecord> {
    let legacy: LegacyRecord = serde_json::from_value(value)?;
    let mut record = DeviceRecord {
        network: legacy.network,
        ..DeviceRecord::default()
    };

    for entry in legacy.audio {
        for (output, value) in audio_outputs_from_value(entry.value)? {
            record.push_audio(&output, HistoryEntry::new(entry.timestamp.clone(), value));
        }
    }

    Ok(record)
}
