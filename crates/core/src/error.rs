//! Fehlertypen fuer Calistore
//!
//! Nur das Oeffnen des Bestands und das Dekodieren von Nachrichten koennen
//! fehlschlagen. `save` und `load` selbst liefern immer einen Wert.

use thiserror::Error;

/// Globaler Result-Alias fuer Calistore
pub type Result<T> = std::result::Result<T, CalibrationError>;

/// Alle moeglichen Fehler im Calistore-System
#[derive(Debug, Error)]
pub enum CalibrationError {
    // --- Persistenz ---
    #[error("IO-Fehler: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON-Fehler: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Kalibrierungsbestand beschaedigt: {0}")]
    CorruptStore(String),

    // --- Session ---
    #[error("Ungueltige Nachricht: {0}")]
    InvalidMessage(String),
}

impl CalibrationError {
    /// Erstellt einen Fehler fuer einen unlesbaren Bestand
    pub fn corrupt(msg: impl Into<String>) -> Self {
        Self::CorruptStore(msg.into())
    }

    /// Gibt true zurueck wenn der Fehler einen Betreiber-Eingriff erfordert
    pub fn ist_fatal(&self) -> bool {
        matches!(self, Self::CorruptStore(_) | Self::Io(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fehler_anzeige() {
        let e = CalibrationError::corrupt("Zeile 3");
        assert_eq!(e.to_string(), "Kalibrierungsbestand beschaedigt: Zeile 3");
    }

    #[test]
    fn fatal_erkennung() {
        assert!(CalibrationError::corrupt("x").ist_fatal());
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        assert!(CalibrationError::from(io).ist_fatal());
        assert!(!CalibrationError::InvalidMessage("x".into()).ist_fatal());
    }

    #[test]
    fn json_fehler_konvertierung() {
        let e: CalibrationError = serde_json::from_str::<u32>("kein json").unwrap_err().into();
        assert!(e.to_string().starts_with("JSON-Fehler"));
    }
}
