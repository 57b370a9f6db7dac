//! calistore-server – Bibliotheks-Root
//!
//! Deklariert alle Server-Module und stellt den oeffentlichen Einstiegspunkt
//! fuer Integrationstests bereit.
//!
//! Der Server liest zeilenweise JSON-Nachrichten von stdin und schreibt
//! Antworten als JSON-Zeilen nach stdout. Die eigentliche Transportschicht
//! zwischen Geraeten und Server liegt ausserhalb dieses Crates.

pub mod config;
pub mod logging;

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use calistore_store::{CalibrationSession, CalibrationStore, JsonFile, StoreOptions};
use config::ServerConfig;

/// Haelt den laufenden Server-Zustand zusammen
pub struct Server {
    pub config: ServerConfig,
}

impl Server {
    /// Erstellt einen neuen Server aus der gegebenen Konfiguration
    pub fn neu(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Oeffnet den Kalibrierungsbestand
    ///
    /// Ein beschaedigter Bestand bricht den Start ab.
    pub fn bestand_oeffnen(&self) -> Result<CalibrationStore> {
        let speicher = &self.config.speicher;
        let medium = JsonFile::open(&speicher.verzeichnis, &speicher.datei).with_context(|| {
            format!(
                "Datenverzeichnis '{}' nicht verfuegbar",
                speicher.verzeichnis.display()
            )
        })?;

        let store = CalibrationStore::open(
            medium,
            StoreOptions {
                seed_default: speicher.standard_eintrag,
            },
        )
        .with_context(|| {
            format!(
                "Kalibrierungsbestand '{}' konnte nicht geoeffnet werden",
                self.config.bestand_pfad().display()
            )
        })?;

        Ok(store)
    }

    /// Startet den Server und laeuft bis EOF auf stdin oder Ctrl-C
    ///
    /// Reihenfolge:
    /// 1. Kalibrierungsbestand oeffnen
    /// 2. Nachrichten von stdin verarbeiten
    /// 3. Auf EOF / Ctrl-C warten
    pub async fn starten(self) -> Result<()> {
        let store = self.bestand_oeffnen()?;
        tracing::info!(
            bestand = %self.config.bestand_pfad().display(),
            kennungen = store.len(),
            "Server startet"
        );

        let session = CalibrationSession::new(Arc::new(store));
        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();

        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        tokio::select! {
            ergebnis = bedienen(&session, stdin, stdout) => {
                let verarbeitet = ergebnis?;
                tracing::info!(nachrichten = verarbeitet, "Eingabe beendet, Server wird beendet");
            }
            _ = &mut shutdown => {
                tracing::info!("Shutdown-Signal empfangen, Server wird beendet");
            }
        }

        if session.store().has_pending_write() {
            tracing::warn!("Letzter Schreibversuch fehlgeschlagen, Bestand auf dem Medium ist veraltet");
        }

        Ok(())
    }
}

/// Verarbeitet JSON-Zeilen aus `eingabe` und schreibt Antworten nach `ausgabe`
///
/// Ungueltige Zeilen werden geloggt und uebersprungen. Gibt die Anzahl der
/// verarbeiteten Nachrichten zurueck. `save` schreibt synchron auf das
/// Medium und laeuft deshalb im Blocking-Pool.
pub async fn bedienen<R, W>(session: &CalibrationSession, eingabe: R, mut ausgabe: W) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut zeilen = eingabe.lines();
    let mut verarbeitet = 0usize;

    while let Some(zeile) = zeilen.next_line().await? {
        let zeile = zeile.trim();
        if zeile.is_empty() {
            continue;
        }

        let sitzung = session.clone();
        let zeile = zeile.to_owned();
        let ergebnis = tokio::task::spawn_blocking(move || sitzung.handle_line(&zeile))
            .await
            .context("Verarbeitung der Nachricht abgebrochen")?;

        match ergebnis {
            Ok(Some(antwort)) => {
                ausgabe.write_all(antwort.as_bytes()).await?;
                ausgabe.write_all(b"\n").await?;
                ausgabe.flush().await?;
                verarbeitet += 1;
            }
            Ok(None) => verarbeitet += 1,
            Err(e) => {
                tracing::warn!(fehler = %e, "Nachricht verworfen");
            }
        }
    }

    Ok(verarbeitet)
}
