//! Kalibrierungstypen
//!
//! Alle Felder sind optional. Fehlende Felder werden beim Serialisieren
//! weggelassen, damit "nicht vorhanden" von "leer" unterscheidbar bleibt.
//! Die leere Kalibrierung `{}` bedeutet "noch nicht kalibriert".
//!
//! `audio` kommt in zwei Formen vor: benannte Ausgaenge
//! (`{"internal": {...}}`) oder ein einzelner, unbenannter Ausgang
//! (`{"delay": 0.01, "gain": -3}`). Die zweite Form wird als Ausgang
//! [`DEFAULT_OUTPUT`] gefuehrt und auch wieder so ausgegeben.

use indexmap::IndexMap;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use calistore_similarity::Distance;

/// Ausgangsname fuer Geraete mit nur einem, unbenannten Audio-Ausgang
pub const DEFAULT_OUTPUT: &str = "default";

/// Kalibrierung eines einzelnen Audio-Ausgangs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AudioOutput {
    /// Verzoegerung in Sekunden
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<f64>,
    /// Verstaerkung in dB
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gain: Option<f64>,
    /// Weitere Parameter des Ausgangs, werden unveraendert mitgefuehrt
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl AudioOutput {
    pub fn new(delay: f64, gain: f64) -> Self {
        Self {
            delay: Some(delay),
            gain: Some(gain),
            extra: IndexMap::new(),
        }
    }

    /// Setzt einen zusaetzlichen Parameter
    pub fn with_extra(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(name.into(), value.into());
        self
    }

    fn has_known_fields(&self) -> bool {
        self.delay.is_some() || self.gain.is_some()
    }
}

/// Audio-Ausgaenge nach Name (`internal`, `external`, ...)
pub type AudioOutputs = IndexMap<String, AudioOutput>;

/// Liest ein `audio`-Objekt in einer der beiden Formen
///
/// Ein Objekt mit numerischem `delay` oder `gain` ist ein einzelner Ausgang
/// und landet unter [`DEFAULT_OUTPUT`]. Sonst ist jeder Schluessel ein
/// benannter Ausgang.
pub fn audio_outputs_from_value(value: Value) -> serde_json::Result<AudioOutputs> {
    match value {
        Value::Object(map) if is_single_output(&map) => {
            let output = serde_json::from_value(Value::Object(map))?;
            Ok(AudioOutputs::from([(DEFAULT_OUTPUT.to_owned(), output)]))
        }
        Value::Object(map) => map
            .into_iter()
            .map(|(name, v)| serde_json::from_value(v).map(|output| (name, output)))
            .collect(),
        other => Err(serde_json::Error::custom(format!(
            "Audio-Eintrag ist kein Objekt: {other}"
        ))),
    }
}

fn is_single_output(map: &serde_json::Map<String, Value>) -> bool {
    ["delay", "gain"]
        .iter()
        .any(|key| map.get(*key).is_some_and(Value::is_number))
}

fn deserialize_audio<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<AudioOutputs>, D::Error> {
    Option::<Value>::deserialize(deserializer)?
        .map(audio_outputs_from_value)
        .transpose()
        .map_err(D::Error::custom)
}

/// Nur `default` mit `delay`/`gain` wird in der Form mit einem Ausgang geschrieben
fn serialize_audio<S: Serializer>(
    audio: &Option<AudioOutputs>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match audio {
        Some(outputs) if outputs.len() == 1 => match outputs.get(DEFAULT_OUTPUT) {
            Some(single) if single.has_known_fields() => single.serialize(serializer),
            _ => outputs.serialize(serializer),
        },
        other => other.serialize(serializer),
    }
}

/// Netzwerk-Kalibrierung
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkCalibration {
    /// Mittlere Verzoegerung in Sekunden
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<f64>,
    /// Maximale Verzoegerung in Sekunden
    #[serde(
        default,
        rename = "delayMax",
        skip_serializing_if = "Option::is_none"
    )]
    pub delay_max: Option<f64>,
}

impl NetworkCalibration {
    pub fn new(delay: f64, delay_max: f64) -> Self {
        Self {
            delay: Some(delay),
            delay_max: Some(delay_max),
        }
    }
}

/// Aktueller Kalibrierungszustand eines Geraets
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    #[serde(
        default,
        deserialize_with = "deserialize_audio",
        serialize_with = "serialize_audio",
        skip_serializing_if = "Option::is_none"
    )]
    pub audio: Option<AudioOutputs>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<NetworkCalibration>,
}

/// Teilweise Kalibrierung fuer `save`; fehlende Komponenten bleiben unberuehrt
pub type CalibrationUpdate = Calibration;

impl Calibration {
    /// Leere Kalibrierung ("noch nicht kalibriert")
    pub fn empty() -> Self {
        Self::default()
    }

    /// Fuegt einen benannten Audio-Ausgang hinzu
    pub fn with_audio_output(mut self, name: impl Into<String>, output: AudioOutput) -> Self {
        self.audio
            .get_or_insert_with(AudioOutputs::new)
            .insert(name.into(), output);
        self
    }

    /// Setzt die Netzwerk-Kalibrierung
    pub fn with_network(mut self, network: NetworkCalibration) -> Self {
        self.network = Some(network);
        self
    }

    /// Audio-Ausgang nach Name
    pub fn audio_output(&self, name: &str) -> Option<&AudioOutput> {
        self.audio.as_ref().and_then(|a| a.get(name))
    }

    /// Anzahl der Komponenten, die `save` anhaengen wuerde
    ///
    /// Jeder benannte Audio-Ausgang zaehlt einzeln, Netzwerk als eine Einheit.
    pub fn component_count(&self) -> usize {
        self.audio.as_ref().map_or(0, IndexMap::len) + usize::from(self.network.is_some())
    }

    /// Gibt true zurueck wenn keine Komponente vorhanden ist
    pub fn is_empty(&self) -> bool {
        self.component_count() == 0
    }
}

/// Ergebnis von `load`
#[derive(Debug, Clone, PartialEq)]
pub struct LoadResult {
    /// Letzte Werte des gefundenen Geraets, `{}` wenn nichts gefunden
    pub calibration: Calibration,
    /// Distanz der Kennung, `Infinite` wenn nichts Brauchbares gefunden
    pub distance: Distance,
}

impl LoadResult {
    /// Kein Ergebnis
    pub fn empty() -> Self {
        Self {
            calibration: Calibration::empty(),
            distance: Distance::Infinite,
        }
    }

    /// Gibt true zurueck wenn die Kalibrierung als Audio-Fallback taugt
    pub fn is_usable(&self) -> bool {
        self.distance.is_finite()
    }
}
