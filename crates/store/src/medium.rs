//! Persistenz-Medien fuer den Kalibrierungsbestand
//!
//! Das `PersistenceMedium`-Trait abstrahiert den konkreten Speicher. Der
//! Bestand liest das Dokument einmal beim Oeffnen und schreibt es nach
//! jeder Aenderung vollstaendig neu.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

/// Abstraktes Persistenz-Medium fuer ein einzelnes JSON-Dokument
pub trait PersistenceMedium: Send + Sync {
    /// Dokument lesen; `Ok(None)` wenn es noch nicht existiert
    fn read(&self) -> io::Result<Option<String>>;

    /// Dokument vollstaendig ersetzen
    fn write(&self, document: &str) -> io::Result<()>;

    /// Beschreibung fuer Log-Ausgaben
    fn describe(&self) -> String;
}

impl<M: PersistenceMedium + ?Sized> PersistenceMedium for Arc<M> {
    fn read(&self) -> io::Result<Option<String>> {
        (**self).read()
    }

    fn write(&self, document: &str) -> io::Result<()> {
        (**self).write(document)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Datei-basiertes Medium
///
/// Speichert das Dokument unter `verzeichnis/datei`. Geschrieben wird in
/// eine temporaere Datei im selben Verzeichnis, die anschliessend
/// umbenannt wird.
#[derive(Debug, Clone)]
pub struct JsonFile {
    dir: PathBuf,
    path: PathBuf,
}

impl JsonFile {
    /// Medium ohne Dateisystemzugriff anlegen
    pub fn new(dir: impl Into<PathBuf>, file: impl AsRef<Path>) -> Self {
        let dir = dir.into();
        let path = dir.join(file);
        Self { dir, path }
    }

    /// Medium anlegen und das Datenverzeichnis erstellen falls noetig
    pub fn open(dir: impl Into<PathBuf>, file: impl AsRef<Path>) -> io::Result<Self> {
        let medium = Self::new(dir, file);
        medium.prepare()?;
        Ok(medium)
    }

    /// Datenverzeichnis anlegen falls es fehlt
    pub fn prepare(&self) -> io::Result<()> {
        if self.dir.is_dir() {
            tracing::debug!(verzeichnis = %self.dir.display(), "Verwende vorhandenes Datenverzeichnis");
            return Ok(());
        }
        fs::create_dir_all(&self.dir)?;
        tracing::info!(verzeichnis = %self.dir.display(), "Datenverzeichnis angelegt");
        Ok(())
    }

    /// Vollstaendiger Pfad des Dokuments
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl PersistenceMedium for JsonFile {
    fn read(&self) -> io::Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(document) => {
                tracing::debug!(pfad = %self.path.display(), bytes = document.len(), "Dokument gelesen");
                Ok(Some(document))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write(&self, document: &str) -> io::Result<()> {
        let temp = self.temp_path();
        fs::write(&temp, document)?;
        fs::rename(&temp, &self.path)?;
        tracing::debug!(pfad = %self.path.display(), bytes = document.len(), "Dokument geschrieben");
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-Memory-Medium fuer Tests
///
/// Schreibfehler lassen sich per [`MemoryMedium::set_fail_writes`] erzwingen.
#[derive(Debug, Default)]
pub struct MemoryMedium {
    document: Mutex<Option<String>>,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryMedium {
    /// Leeres Medium (Dokument existiert nicht)
    pub fn new() -> Self {
        Self::default()
    }

    /// Medium mit vorhandenem Dokument
    pub fn with_document(document: impl Into<String>) -> Self {
        Self {
            document: Mutex::new(Some(document.into())),
            ..Self::default()
        }
    }

    /// Aktuell gespeichertes Dokument
    pub fn document(&self) -> Option<String> {
        self.document.lock().clone()
    }

    /// Folgende Schreibvorgaenge schlagen fehl (`true`) oder gelingen wieder
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Anzahl erfolgreicher Schreibvorgaenge
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl PersistenceMedium for MemoryMedium {
    fn read(&self) -> io::Result<Option<String>> {
        Ok(self.document.lock().clone())
    }

    fn write(&self, document: &str) -> io::Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                "Medium nicht verfuegbar",
            ));
        }
        *self.document.lock() = Some(document.to_owned());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_medium() -> (JsonFile, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("Temp-Verzeichnis konnte nicht erstellt werden");
        let medium = JsonFile::open(dir.path().join("data"), "calibration.json")
            .expect("Medium konnte nicht geoeffnet werden");
        (medium, dir)
    }

    #[test]
    fn open_legt_verzeichnis_an() {
        let (medium, dir) = temp_medium();
        assert!(dir.path().join("data").is_dir());
        assert_eq!(medium.path(), dir.path().join("data/calibration.json"));
    }

    #[test]
    fn fehlende_datei_ist_kein_fehler() {
        let (medium, _dir) = temp_medium();
        assert_eq!(medium.read().unwrap(), None);
    }

    #[test]
    fn schreiben_und_lesen() {
        let (medium, dir) = temp_medium();
        medium.write(r#"{"a":{}}"#).unwrap();
        assert_eq!(medium.read().unwrap().as_deref(), Some(r#"{"a":{}}"#));
        // Keine temporaere Datei bleibt liegen
        assert!(!dir.path().join("data/calibration.json.tmp").exists());

        medium.write("{}").unwrap();
        assert_eq!(medium.read().unwrap().as_deref(), Some("{}"));
    }

    #[test]
    fn lesefehler_ausser_not_found_wird_gemeldet() {
        let dir = tempfile::tempdir().unwrap();
        // Verzeichnis an Stelle der Datei
        std::fs::create_dir(dir.path().join("calibration.json")).unwrap();
        let medium = JsonFile::new(dir.path(), "calibration.json");
        assert!(medium.read().is_err());
    }

    #[test]
    fn speicher_medium_schreibfehler() {
        let medium = MemoryMedium::new();
        assert_eq!(medium.read().unwrap(), None);

        medium.set_fail_writes(true);
        assert!(medium.write("{}").is_err());
        assert_eq!(medium.write_count(), 0);

        medium.set_fail_writes(false);
        medium.write("{}").unwrap();
        assert_eq!(medium.write_count(), 1);
        assert_eq!(medium.document().as_deref(), Some("{}"));
    }
}
