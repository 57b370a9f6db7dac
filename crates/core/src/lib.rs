//! calistore-core – Gemeinsame Typen und Fehlertypen
//!
//! Dieses Crate stellt die Kalibrierungstypen bereit, die zwischen
//! Bestand, Session-Schicht und Server ausgetauscht werden.

pub mod error;
pub mod types;

// Re-Exporte fuer bequemen Zugriff
pub use calistore_similarity::Distance;
pub use error::{CalibrationError, Result};
pub use types::{
    audio_outputs_from_value, AudioOutput, AudioOutputs, Calibration, CalibrationUpdate, LoadResult, NetworkCalibration,
    DEFAULT_OUTPUT,
};
