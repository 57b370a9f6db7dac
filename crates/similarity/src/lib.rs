//! calistore-similarity – Zeichenketten-Aehnlichkeit
//!
//! Berechnet die Levenshtein-Distanz zweier Zeichenketten und sucht in einer
//! Schluesselmenge den Schluessel, der einer Anfrage am naechsten liegt.
//! Wird vom Kalibrierungsbestand fuer den Fallback auf unbekannte
//! Geraete-Kennungen genutzt.
//!
//! Leaf-Crate ohne externe Abhaengigkeiten.

pub mod closest;
pub mod distance;
pub mod key_set;

pub use closest::{closest_key, Match};
pub use distance::{distance, Distance, Levenshtein};
pub use key_set::KeySet;
