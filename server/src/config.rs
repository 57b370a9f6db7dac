//! Server-Konfiguration
//!
//! Wird beim Start aus einer TOML-Datei geladen. Alle Felder haben
//! sinnvolle Standardwerte, sodass der Server ohne Konfigurationsdatei
//! lauffaehig ist.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::logging::{log_format_gueltig, log_level_gueltig};

/// Vollstaendige Server-Konfiguration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Speicher-Einstellungen fuer den Kalibrierungsbestand
    pub speicher: SpeicherEinstellungen,
    /// Logging-Einstellungen
    pub logging: LoggingEinstellungen,
}

/// Speicher-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeicherEinstellungen {
    /// Datenverzeichnis (wird beim Start angelegt falls noetig)
    pub verzeichnis: PathBuf,
    /// Dateiname des Bestands innerhalb des Verzeichnisses
    pub datei: String,
    /// Vorbelegung `default` bei fehlender Datei
    pub standard_eintrag: bool,
}

impl Default for SpeicherEinstellungen {
    fn default() -> Self {
        Self {
            verzeichnis: PathBuf::from("data"),
            datei: "calibration.json".into(),
            standard_eintrag: true,
        }
    }
}

/// Logging-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingEinstellungen {
    /// Log-Level: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Format: "json" oder "text"
    pub format: String,
}

impl Default for LoggingEinstellungen {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

impl ServerConfig {
    /// Laedt die Konfiguration aus einer TOML-Datei.
    /// Gibt die Standardkonfiguration zurueck wenn die Datei nicht existiert.
    pub fn laden(pfad: &str) -> anyhow::Result<Self> {
        match std::fs::read_to_string(pfad) {
            Ok(inhalt) => {
                let config: Self = toml::from_str(&inhalt)
                    .map_err(|e| anyhow::anyhow!("Konfigurationsfehler in '{pfad}': {e}"))?;
                config.validieren()?;
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Logging ist hier noch nicht initialisiert
                eprintln!("Konfigurationsdatei '{pfad}' nicht gefunden, verwende Standardwerte");
                Ok(Self::default())
            }
            Err(e) => Err(anyhow::anyhow!(
                "Konfigurationsdatei '{pfad}' nicht lesbar: {e}"
            )),
        }
    }

    /// Prueft Werte, die serde allein nicht abfangen kann
    pub fn validieren(&self) -> anyhow::Result<()> {
        if self.speicher.datei.trim().is_empty() {
            anyhow::bail!("speicher.datei darf nicht leer sein");
        }
        if !log_level_gueltig(&self.logging.level) {
            anyhow::bail!("Ungueltiges Log-Level '{}'", self.logging.level);
        }
        if !log_format_gueltig(&self.logging.format) {
            anyhow::bail!("Ungueltiges Log-Format '{}'", self.logging.format);
        }
        Ok(())
    }

    /// Vollstaendiger Pfad der Bestandsdatei
    pub fn bestand_pfad(&self) -> PathBuf {
        self.speicher.verzeichnis.join(&self.speicher.datei)
    }
}
