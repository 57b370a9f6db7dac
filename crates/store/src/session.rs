//! Session-Dispatch – Routet Kalibrierungsnachrichten an den Bestand
//!
//! Transportunabhaengig: die Session-Schicht liefert dekodierte
//! Nachrichten (oder JSON-Zeilen) und sendet die Antwort, falls eine
//! zurueckkommt, an das Geraet.
//!
//! ## Nachrichten
//! - `calibration:load {id}` -> `calibration:set {calibration}`, nur bei
//!   endlicher Distanz; sonst keine Antwort
//! - `calibration:save {id, calibration}` -> keine Antwort

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use calistore_core::{Calibration, CalibrationError, CalibrationUpdate, Result};

use crate::store::CalibrationStore;

/// Eingehende Nachricht eines Geraets
///
/// Fehlende Felder werden als leer dekodiert und fuehren zu No-Ops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SessionMessage {
    #[serde(rename = "calibration:load")]
    Load {
        #[serde(default)]
        id: String,
    },
    #[serde(rename = "calibration:save")]
    Save {
        #[serde(default)]
        id: String,
        #[serde(default)]
        calibration: CalibrationUpdate,
    },
}

/// Antwort an das Geraet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SessionResponse {
    #[serde(rename = "calibration:set")]
    Set { calibration: Calibration },
}

/// Verbindet die Session-Schicht mit dem Bestand
#[derive(Clone)]
pub struct CalibrationSession {
    store: Arc<CalibrationStore>,
}

impl CalibrationSession {
    pub fn new(store: Arc<CalibrationStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &CalibrationStore {
        &self.store
    }

    /// Verarbeitet eine Nachricht und gibt die Antwort zurueck
    ///
    /// Gibt `None` zurueck wenn nichts gesendet werden soll.
    pub fn handle(&self, message: SessionMessage) -> Option<SessionResponse> {
        match message {
            SessionMessage::Load { id } => {
                let result = self.store.load(&id);
                if !result.is_usable() {
                    tracing::debug!(kennung = %id, "Keine brauchbare Kalibrierung, keine Antwort");
                    return None;
                }
                Some(SessionResponse::Set {
                    calibration: result.calibration,
                })
            }
            SessionMessage::Save { id, calibration } => {
                self.store.save(&id, &calibration);
                None
            }
        }
    }

    /// Dekodiert eine JSON-Zeile, verarbeitet sie und kodiert die Antwort
    pub fn handle_line(&self, line: &str) -> Result<Option<String>> {
        let message: SessionMessage = serde_json::from_str(line)
            .map_err(|e| CalibrationError::InvalidMessage(e.to_string()))?;

        self.handle(message)
            .map(|response| serde_json::to_string(&response))
            .transpose()
            .map_err(CalibrationError::from)
    }
}
