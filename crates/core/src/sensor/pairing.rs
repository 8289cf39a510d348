//! Derivation of sensor pairs from the registry.

use std::cmp::Ordering;

use super::types::{Sensor, SensorPair};

/// Derives the sensor pairs of a matchup run.
///
/// Every primary is combined with every secondary of a different name whose
/// period overlaps it. When the same two families appear in both role
/// assignments only one pair survives: the one whose primary starts later,
/// ties going to the lexicographically greater name. Pairs found only once
/// keep the roles they were declared with.
///
/// The result is ordered by overlap start, most recent first.
pub fn compute_pairs(primaries: &[Sensor], secondaries: &[Sensor]) -> Vec<SensorPair> {
    let mut pairs: Vec<SensorPair> = Vec::new();

    for primary in primaries {
        for secondary in secondaries {
            let Some(candidate) = SensorPair::new(primary.clone(), secondary.clone()) else {
                continue;
            };

            match pairs.iter_mut().find(|p| p.same_families(&candidate)) {
                Some(existing) => {
                    if prefer_primary(candidate.primary(), existing.primary()) {
                        *existing = candidate;
                    }
                }
                None => pairs.push(candidate),
            }
        }
    }

    pairs.sort_by(|a, b| {
        b.overlap()
            .start()
            .cmp(&a.overlap().start())
            .then_with(|| b.primary_name().cmp(a.primary_name()))
            .then_with(|| b.secondary_name().cmp(a.secondary_name()))
    });
    pairs
}

/// Whether `candidate` should take the primary role over `current`.
fn prefer_primary(candidate: &Sensor, current: &Sensor) -> bool {
    match candidate.period().start().cmp(&current.period().start()) {
        Ordering::Greater => true,
        Ordering::Less => false,
        Ordering::Equal => candidate.name() > current.name(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::period::Period;

    fn sensor(name: &str, start: &str, end: &str) -> Sensor {
        Sensor::new(name, Period::parse(start, end).unwrap())
    }

    fn avhrr_family() -> Vec<Sensor> {
        vec![
            sensor("avhrr.n12", "1991-09-16", "1998-12-14"),
            sensor("avhrr.n11", "1988-11-08", "1994-12-31"),
            sensor("avhrr.n10", "1986-11-17", "1991-09-16"),
        ]
    }

    #[test]
    fn test_symmetric_declaration_deduplicated() {
        let family = avhrr_family();
        let pairs = compute_pairs(&family, &family);

        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].primary_name(), "avhrr.n12");
        assert_eq!(pairs[0].secondary_name(), "avhrr.n11");
        assert_eq!(
            *pairs[0].overlap(),
            Period::parse("1991-09-16", "1994-12-31").unwrap()
        );
        assert_eq!(pairs[1].primary_name(), "avhrr.n11");
        assert_eq!(pairs[1].secondary_name(), "avhrr.n10");
        assert_eq!(
            *pairs[1].overlap(),
            Period::parse("1988-11-08", "1991-09-16").unwrap()
        );
    }

    #[test]
    fn test_declared_roles_kept_without_duplicate() {
        let primaries = vec![sensor("amsub-n15", "1999-01-01", "2000-05-16")];
        let secondaries = vec![sensor("ssmt2-f11", "1999-01-01", "2000-05-16")];

        let pairs = compute_pairs(&primaries, &secondaries);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].primary_name(), "amsub-n15");
        assert_eq!(pairs[0].secondary_name(), "ssmt2-f11");
    }

    #[test]
    fn test_equal_start_tie_broken_by_name() {
        let a = sensor("avhrr-n17", "2005-05-20", "2010-12-31");
        let b = sensor("avhrr-n18", "2005-05-20", "2010-12-31");
        let both = vec![a, b];

        let pairs = compute_pairs(&both, &both);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].primary_name(), "avhrr-n18");
    }

    #[test]
    fn test_non_overlapping_sensors_not_paired() {
        let primaries = vec![
            sensor("avhrr.n11", "1988-11-08", "1994-12-31"),
            sensor("avhrr.n12", "1991-09-16", "1998-12-14"),
        ];
        let secondaries = vec![sensor("avhrr.n10", "1986-11-17", "1991-09-16")];

        let pairs = compute_pairs(&primaries, &secondaries);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].key(), "avhrr.n11+avhrr.n10");
    }

    #[test]
    fn test_empty_roles_give_no_pairs() {
        let family = avhrr_family();
        assert!(compute_pairs(&family, &[]).is_empty());
        assert!(compute_pairs(&[], &family).is_empty());
    }
}
