//! Suche nach dem naechstgelegenen Schluessel

use crate::distance::{Distance, Levenshtein};
use crate::key_set::KeySet;

/// Ergebnis einer Naechster-Schluessel-Suche
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    /// Naechstgelegener Schluessel, `None` bei leerer Menge
    pub key: Option<String>,
    /// Distanz zum Schluessel, `Infinite` wenn kein Schluessel existiert
    pub distance: Distance,
}

impl Match {
    /// Kein Treffer moeglich
    pub fn none() -> Self {
        Self {
            key: None,
            distance: Distance::Infinite,
        }
    }
}

impl Levenshtein {
    /// Sucht in `keys` den Schluessel mit der kleinsten Distanz zu `query`
    ///
    /// Ein exakter Treffer wird ohne Distanzberechnung zurueckgegeben.
    /// Bei gleicher Distanz gewinnt der erste Schluessel in der
    /// Iterationsreihenfolge von `keys`.
    pub fn closest_key<K: KeySet + ?Sized>(&mut self, keys: &K, query: &str) -> Match {
        if keys.contains_key(query) {
            return Match {
                key: Some(query.to_owned()),
                distance: Distance::Finite(0),
            };
        }

        let mut best: Option<(&str, usize)> = None;
        for key in keys.keys() {
            let d = self.distance(query, key);
            if best.map_or(true, |(_, min)| d < min) {
                best = Some((key, d));
            }
            if d == 0 {
                break;
            }
        }

        match best {
            Some((key, d)) => Match {
                key: Some(key.to_owned()),
                distance: Distance::Finite(d),
            },
            None => Match::none(),
        }
    }
}

/// Naechster Schluessel ohne wiederverwendeten Puffer
pub fn closest_key<K: KeySet + ?Sized>(keys: &K, query: &str) -> Match {
    Levenshtein::new().closest_key(keys, query)
}
