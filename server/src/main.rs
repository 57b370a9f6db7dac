//! Calistore Server – Einstiegspunkt
//!
//! Laedt die Konfiguration, initialisiert das Logging und startet den Server.

use anyhow::Result;
use calistore_server::{config::ServerConfig, logging::logging_initialisieren, Server};

#[tokio::main]
async fn main() -> Result<()> {
    // Konfigurationsdatei-Pfad aus Umgebungsvariable oder Standard
    let config_pfad = std::env::var("CALISTORE_CONFIG").unwrap_or_else(|_| "config.toml".into());

    // Konfiguration laden (Standardwerte falls Datei fehlt)
    let config = ServerConfig::laden(&config_pfad)?;

    logging_initialisieren(&config.logging.level, &config.logging.format);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %config_pfad,
        "Calistore Server wird initialisiert"
    );

    let server = Server::neu(config);
    if let Err(e) = server.starten().await {
        tracing::error!(fehler = %format!("{e:#}"), "Server-Start fehlgeschlagen");
        return Err(e);
    }

    Ok(())
}
