//! Schluesselmengen fuer die Naechster-Schluessel-Suche

/// Menge von Schluesseln mit definierter Iterationsreihenfolge
///
/// Die Reihenfolge von `keys()` entscheidet bei Gleichstand der Distanz:
/// der zuerst gelieferte Schluessel gewinnt.
pub trait KeySet {
    /// Exakter Treffer ohne Distanzberechnung
    fn contains_key(&self, key: &str) -> bool;

    /// Alle Schluessel in Iterationsreihenfolge
    fn keys(&self) -> impl Iterator<Item = &str> + '_;
}

impl<S: AsRef<str>> KeySet for [S] {
    fn contains_key(&self, key: &str) -> bool {
        self.iter().any(|k| k.as_ref() == key)
    }

    fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.iter().map(<S as AsRef<str>>::as_ref)
    }
}

impl<S: AsRef<str>> KeySet for Vec<S> {
    fn contains_key(&self, key: &str) -> bool {
        self.as_slice().contains_key(key)
    }

    fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.as_slice().keys()
    }
}
