//! Append-only Historien
//!
//! Ein `HistoryEntry` wird als zweielementiges JSON-Array
//! `[zeitstempel, wert]` gespeichert. Zeitstempel bleiben beim Lesen
//! unveraendert als Zeichenkette erhalten.

use chrono::{SecondsFormat, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use calistore_core::{AudioOutput, AudioOutputs, Calibration, NetworkCalibration};

/// Aktueller Zeitstempel im ISO-8601-Format mit Millisekunden (`...123Z`)
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Eine zeitgestempelte Beobachtung
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry<T> {
    pub timestamp: String,
    pub value: T,
}

impl<T> HistoryEntry<T> {
    pub fn new(timestamp: impl Into<String>, value: T) -> Self {
        Self {
            timestamp: timestamp.into(),
            value,
        }
    }
}

impl<T: Serialize> Serialize for HistoryEntry<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (&self.timestamp, &self.value).serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for HistoryEntry<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (timestamp, value) = <(String, T)>::deserialize(deserializer)?;
        Ok(Self { timestamp, value })
    }
}

/// Geordnete Historie einer Komponente; Einfuegereihenfolge = Zeitfolge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History<T> {
    entries: Vec<HistoryEntry<T>>,
}

impl<T> Default for History<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T> History<T> {
    /// Haengt eine Beobachtung an
    pub fn push(&mut self, entry: HistoryEntry<T>) {
        self.entries.push(entry);
    }

    /// Letzte Beobachtung (= aktueller Wert)
    pub fn latest(&self) -> Option<&HistoryEntry<T>> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Alle Historien einer Geraete-Kennung
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceRecord {
    /// Historie pro Audio-Ausgang
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub audio: IndexMap<String, History<AudioOutput>>,
    /// Netzwerk-Historie
    #[serde(default, skip_serializing_if = "History::is_empty")]
    pub network: History<NetworkCalibration>,
}

impl DeviceRecord {
    /// Haengt eine Audio-Beobachtung fuer `output` an
    pub fn push_audio(&mut self, output: &str, entry: HistoryEntry<AudioOutput>) {
        self.audio.entry(output.to_owned()).or_default().push(entry);
    }

    /// Haengt eine Netzwerk-Beobachtung an
    pub fn push_network(&mut self, entry: HistoryEntry<NetworkCalibration>) {
        self.network.push(entry);
    }

    /// Aktuelle Kalibrierung: pro Komponente der letzte Eintrag
    ///
    /// Ausgaenge ohne Historie werden weggelassen.
    pub fn latest(&self) -> Calibration {
        let audio: AudioOutputs = self
            .audio
            .iter()
            .filter_map(|(name, history)| history.latest().map(|e| (name.clone(), e.value.clone())))
            .collect();

        Calibration {
            audio: (!audio.is_empty()).then_some(audio),
            network: self.network.latest().map(|e| e.value),
        }
    }

    /// Gesamtzahl aller Eintraege ueber alle Komponenten
    pub fn entry_count(&self) -> usize {
        self.audio.values().map(History::len).sum::<usize>() + self.network.len()
    }
}
