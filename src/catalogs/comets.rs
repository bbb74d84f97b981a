//! Curated comet list
//!
//! Periodic comets with well-known apparitions plus a handful of bright
//! long-period comets. Designations are what Horizons expects after `DES=`.

use super::{BodyCatalog, BodySpec};

/// Pairs of (label, designation) for the default catalog
const COMET_PAIRS: [(&str, &str); 20] = [
    ("1P/Halley", "1P"),
    ("2P/Encke", "2P"),
    ("9P/Tempel 1", "9P"),
    ("10P/Tempel 2", "10P"),
    ("12P/Pons-Brooks", "12P"),
    ("17P/Holmes", "17P"),
    ("19P/Borrelly", "19P"),
    ("21P/Giacobini-Zinner", "21P"),
    ("45P/Honda–Mrkos–Pajdušáková", "45P"),
    ("46P/Wirtanen", "46P"),
    ("55P/Tempel-Tuttle", "55P"),
    ("67P/Churyumov–Gerasimenko", "67P"),
    ("73P/Schwassmann–Wachmann 3", "73P"),
    ("81P/Wild 2", "81P"),
    ("96P/Machholz 1", "96P"),
    ("103P/Hartley 2", "103P"),
    ("C/1995 O1 (Hale–Bopp)", "C/1995 O1"),
    ("C/1996 B2 (Hyakutake)", "C/1996 B2"),
    ("C/2006 P1 (McNaught)", "C/2006 P1"),
    ("C/2020 F3 (NEOWISE)", "C/2020 F3"),
];

/// The default comet catalog
pub fn default_comets() -> BodyCatalog {
    COMET_PAIRS
        .iter()
        .map(|&(label, designation)| BodySpec::new(label, designation))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_default_catalog() {
        let catalog = default_comets();
        assert_eq!(catalog.len(), 20);
        assert_eq!(catalog.bodies()[0].label, "1P/Halley");
        assert_eq!(catalog.bodies()[19].designation, "C/2020 F3");

        let unique: HashSet<&str> = catalog
            .bodies()
            .iter()
            .map(|b| b.designation.as_str())
            .collect();
        assert_eq!(unique.len(), catalog.len(), "designations must be unique");
    }
}
