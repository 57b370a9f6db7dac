//! CalibrationStore – versionierter Kalibrierungsbestand
//!
//! Der Bestand liegt vollstaendig im Speicher hinter einem einzigen Mutex.
//! `save` haelt den Lock auch waehrend des Schreibens, damit kein veralteter
//! Stand einen neueren auf dem Medium ueberholt.

use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use calistore_core::{AudioOutput, CalibrationUpdate, Distance, LoadResult, Result, DEFAULT_OUTPUT};
use calistore_similarity::{KeySet, Levenshtein};

use crate::document::{self, Records, META_KEY};
use crate::history::{timestamp_now, DeviceRecord, HistoryEntry};
use crate::medium::PersistenceMedium;

/// Kennung der Vorbelegung bei leerem Bestand
pub const DEFAULT_IDENTIFIER: &str = "default";

/// Optionen beim Oeffnen des Bestands
#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// Legt bei fehlendem Dokument die Kennung `default` mit neutraler
    /// Audio-Kalibrierung an (nur im Speicher bis zum ersten `save`)
    pub seed_default: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self { seed_default: true }
    }
}

struct Inner {
    records: Records,
    levenshtein: Levenshtein,
    pending_write: bool,
}

/// Kennungsmenge des Bestands in Einfuegereihenfolge
///
/// Die Metadaten-Kennung ist nie enthalten.
struct Identifiers<'a>(&'a Records);

impl KeySet for Identifiers<'_> {
    fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.keys().map(String::as_str)
    }
}

/// Kalibrierungsbestand mit `save` / `load`
pub struct CalibrationStore {
    inner: Mutex<Inner>,
    medium: Box<dyn PersistenceMedium>,
}

impl CalibrationStore {
    /// Oeffnet den Bestand aus dem Medium
    ///
    /// Ein fehlendes Dokument ergibt einen leeren Bestand. Jeder andere
    /// Lesefehler und jedes unlesbare Dokument sind fatal.
    pub fn open(medium: impl PersistenceMedium + 'static, options: StoreOptions) -> Result<Self> {
        let records = match medium.read()? {
            Some(doc) => {
                let records = document::parse(&doc)?;
                info!(
                    medium = %medium.describe(),
                    kennungen = records.len(),
                    eintraege = records.values().map(DeviceRecord::entry_count).sum::<usize>(),
                    "Kalibrierungsbestand geladen"
                );
                records
            }
            None => {
                info!(
                    medium = %medium.describe(),
                    vorbelegung = options.seed_default,
                    "Kein Kalibrierungsbestand vorhanden, starte leer"
                );
                let mut records = Records::new();
                if options.seed_default {
                    seed_default(&mut records);
                }
                records
            }
        };

        Ok(Self {
            inner: Mutex::new(Inner {
                records,
                levenshtein: Levenshtein::new(),
                pending_write: false,
            }),
            medium: Box::new(medium),
        })
    }

    /// Haengt die vorhandenen Komponenten von `update` an die Historie an
    ///
    /// Gibt true zurueck wenn mindestens ein Eintrag angehaengt wurde. Ein
    /// Schreibfehler aendert das Ergebnis nicht; der Stand bleibt im
    /// Speicher und wird bei der naechsten Aenderung erneut geschrieben.
    pub fn save(&self, identifier: &str, update: &CalibrationUpdate) -> bool {
        if identifier.is_empty() || update.is_empty() {
            debug!(kennung = identifier, "save ohne Kennung oder Inhalt ignoriert");
            return false;
        }
        if identifier == META_KEY {
            warn!(kennung = identifier, "save auf reservierte Kennung abgelehnt");
            return false;
        }

        // Zeitstempel erst unter dem Lock: Historienreihenfolge = Zeitfolge
        let mut inner = self.inner.lock();
        let timestamp = timestamp_now();

        let record = inner.records.entry(identifier.to_owned()).or_default();
        if let Some(audio) = &update.audio {
            for (output, value) in audio {
                record.push_audio(output, HistoryEntry::new(timestamp.clone(), value.clone()));
            }
        }
        if let Some(network) = update.network {
            record.push_network(HistoryEntry::new(timestamp.clone(), network));
        }

        debug!(
            kennung = identifier,
            zeitpunkt = %timestamp,
            komponenten = update.component_count(),
            "Kalibrierung angehaengt"
        );

        self.persist(&mut inner);
        true
    }

    /// Kalibrierung der exakten oder aehnlichsten Kennung
    ///
    /// Die Distanz ist nur endlich, wenn der gefundene Datensatz mindestens
    /// einen Audio-Wert liefert. Netzwerk-Werte werden immer uebernommen.
    pub fn load(&self, identifier: &str) -> LoadResult {
        if identifier.is_empty() {
            return LoadResult::empty();
        }

        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        if inner.records.is_empty() {
            return LoadResult::empty();
        }

        let found = inner
            .levenshtein
            .closest_key(&Identifiers(&inner.records), identifier);
        let Some(record) = found.key.as_deref().and_then(|k| inner.records.get(k)) else {
            return LoadResult::empty();
        };

        let calibration = record.latest();
        let distance = if calibration.audio.is_some() {
            found.distance
        } else {
            Distance::Infinite
        };

        debug!(
            kennung = identifier,
            treffer = found.key.as_deref().unwrap_or_default(),
            distanz = %found.distance,
            ergebnis = %distance,
            "Kalibrierung geladen"
        );

        LoadResult {
            calibration,
            distance,
        }
    }

    /// Vollstaendige Historie einer Kennung (exakt)
    pub fn history(&self, identifier: &str) -> Option<DeviceRecord> {
        self.inner.lock().records.get(identifier).cloned()
    }

    /// Alle Kennungen in Einfuegereihenfolge
    pub fn identifiers(&self) -> Vec<String> {
        self.inner.lock().records.keys().cloned().collect()
    }

    /// Anzahl der Kennungen
    pub fn len(&self) -> usize {
        self.inner.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().records.is_empty()
    }

    /// Gibt true zurueck wenn der letzte Schreibversuch fehlgeschlagen ist
    pub fn has_pending_write(&self) -> bool {
        self.inner.lock().pending_write
    }

    /// Schreibt den gesamten Bestand; Fehler werden nur geloggt
    fn persist(&self, inner: &mut Inner) {
        let result = document::render(&inner.records)
            .and_then(|doc| self.medium.write(&doc).map_err(Into::into));

        match result {
            Ok(()) => {
                if inner.pending_write {
                    info!(medium = %self.medium.describe(), "Kalibrierungsbestand wieder synchron");
                }
                inner.pending_write = false;
            }
            Err(e) => {
                error!(
                    medium = %self.medium.describe(),
                    fehler = %e,
                    "Kalibrierungsbestand konnte nicht geschrieben werden"
                );
                inner.pending_write = true;
            }
        }
    }
}

fn seed_default(records: &mut Records) {
    let mut record = DeviceRecord::default();
    record.push_audio(
        DEFAULT_OUTPUT,
        HistoryEntry::new(timestamp_now(), AudioOutput::new(0.0, 0.0)),
    );
    records.insert(DEFAULT_IDENTIFIER.to_owned(), record);
}
