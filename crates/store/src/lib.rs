//! calistore-store – Kalibrierungsbestand
//!
//! Append-only Bestand: jede Beobachtung wird mit Zeitstempel an die
//! Historie ihrer Komponente angehaengt, der aktuelle Wert ist immer der
//! letzte Eintrag. Fuer unbekannte Kennungen liefert `load` die
//! Kalibrierung der aehnlichsten bekannten Kennung (Levenshtein).
//!
//! Module:
//! - [`history`]: Historien-Eintraege und Geraete-Datensaetze
//! - [`document`]: JSON-Dokumentformat inkl. Altformat-Konvertierung
//! - [`medium`]: Persistenz-Medien (Datei, Speicher)
//! - [`store`]: `CalibrationStore` mit `save` / `load`
//! - [`session`]: Nachrichten-Dispatch fuer die Session-Schicht

pub mod document;
pub mod history;
pub mod medium;
pub mod session;
pub mod store;

pub use document::META_KEY;
pub use history::{DeviceRecord, History, HistoryEntry};
pub use medium::{JsonFile, MemoryMedium, PersistenceMedium};
pub use session::{CalibrationSession, SessionMessage, SessionResponse};
pub use store::{CalibrationStore, StoreOptions, DEFAULT_IDENTIFIER};
