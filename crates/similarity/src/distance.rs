//! Levenshtein-Distanz
//!
//! Einzeilige Dynamic-Programming-Variante: Speicherbedarf O(min(|a|, |b|)),
//! Laufzeit O(|a| * |b|). Verglichen werden Unicode-Zeichen (`char`),
//! ohne Normalisierung und mit Beachtung der Gross-/Kleinschreibung.

use std::fmt;

/// Distanz zwischen Anfrage und Treffer
///
/// `Infinite` bedeutet "kein Treffer moeglich" und ist groesser als jede
/// endliche Distanz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Distance {
    Finite(usize),
    Infinite,
}

impl Distance {
    /// Gibt true zurueck wenn die Distanz endlich ist
    pub fn is_finite(&self) -> bool {
        matches!(self, Self::Finite(_))
    }
}

impl From<usize> for Distance {
    fn from(d: usize) -> Self {
        Self::Finite(d)
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Finite(d) => write!(f, "{d}"),
            Self::Infinite => write!(f, "inf"),
        }
    }
}

/// Levenshtein-Rechner mit wiederverwendbarem Zeilenpuffer
///
/// Haelt die DP-Zeile und die Zeichen der kuerzeren Zeichenkette zwischen
/// Aufrufen, damit eine Suche ueber viele Schluessel nicht pro Vergleich
/// allokiert.
#[derive(Debug, Default, Clone)]
pub struct Levenshtein {
    row: Vec<usize>,
    shorter: Vec<char>,
}

impl Levenshtein {
    pub fn new() -> Self {
        Self::default()
    }

    /// Levenshtein-Distanz zwischen `a` und `b`
    ///
    /// 0 bedeutet `a == b`. Ist eine Seite leer, ist das Ergebnis die
    /// Zeichenanzahl der anderen.
    pub fn distance(&mut self, a: &str, b: &str) -> usize {
        if a == b {
            return 0;
        }

        // Die Zeile laeuft ueber die kuerzere Zeichenkette
        let (short, long) = if a.chars().count() <= b.chars().count() {
            (a, b)
        } else {
            (b, a)
        };

        self.shorter.clear();
        self.shorter.extend(short.chars());
        let n = self.shorter.len();
        if n == 0 {
            return long.chars().count();
        }

        // row[i] = Distanz zwischen den ersten i+1 Zeichen von `short`
        // und dem bisher verarbeiteten Praefix von `long`
        self.row.clear();
        self.row.extend(1..=n);

        for (j, c) in long.chars().enumerate() {
            let mut diagonal = j;
            let mut left = j + 1;
            for i in 0..n {
                let substitution = diagonal + usize::from(self.shorter[i] != c);
                let above = self.row[i];
                let value = substitution.min(above + 1).min(left + 1);
                diagonal = above;
                self.row[i] = value;
                left = value;
            }
        }

        self.row[n - 1]
    }
}

/// Levenshtein-Distanz ohne wiederverwendeten Puffer
pub fn distance(a: &str, b: &str) -> usize {
    Levenshtein::new().distance(a, b)
}
