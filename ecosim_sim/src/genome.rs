// Genome: heritable traits, crossover, and mutation.
//
// A genome carries three `TraitPair`s (max age, hunger rate, thirst rate).
// Each pair holds a dominant allele, which is the expressed stat, and a
// recessive allele, carried silently until passed on.
//
// Crossover takes a dam (the animal that ran the mating process) and a sire
// (its partner). Per pair it draws a source bit (which parent's dominant
// allele leads) and a 4-way roll. Three faces out of four keep the leading
// allele dominant and pair it with the other parent's recessive allele; the
// fourth face swaps the roles. The hunger-rate pair only honors the swap when
// the sire leads; when the dam leads her dominant allele always stays
// dominant. The offspring takes the sire's species tag.
//
// With probability `1 / mutation_one_in` the offspring then mutates: each pair
// is shifted by a signed delta, `round(uniform(dominant, recessive) / 4, 2)`,
// applied to both alleles, so the gap between them is preserved.
//
// See also: `species.rs` for the ranges fresh genomes are rolled from,
// `behavior.rs` which runs crossover when a mating rendezvous completes.
//
// **Critical constraint: determinism.** Every draw comes from the caller's
// `GameRng`, in a fixed order: source bit then roll, per pair in field order;
// then the mutation chance; then delta and sign, per pair.

use crate::species::GenomeRanges;
use crate::types::Species;
use ecosim_prng::GameRng;
use serde::{Deserialize, Serialize};

/// A dominant/recessive allele pair.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TraitPair {
    pub dominant: f64,
    pub recessive: f64,
}

impl TraitPair {
    pub const fn new(dominant: f64, recessive: f64) -> Self {
        Self {
            dominant,
            recessive,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Genome {
    pub species: Species,
    pub max_age: TraitPair,
    pub hunger_rate: TraitPair,
    pub thirst_rate: TraitPair,
}

/// Round to two decimal places.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl Genome {
    /// Roll a fresh genome from a species' ranges. Max-age alleles are whole
    /// numbers; rate alleles are rounded to two decimals.
    pub fn random(species: Species, ranges: &GenomeRanges, rng: &mut GameRng) -> Self {
        let (age_lo, age_hi) = ranges.max_age;
        let (age_lo, age_hi) = (age_lo.min(age_hi) as u64, age_lo.max(age_hi) as u64);
        let mut age = || rng.roll_inclusive(age_lo, age_hi) as f64;
        let max_age = TraitPair::new(age(), age());

        let mut rate = |(a, b): (f64, f64)| round2(rng.uniform(a, b));
        let hunger_rate = TraitPair::new(rate(ranges.hunger_rate), rate(ranges.hunger_rate));
        let thirst_rate = TraitPair::new(rate(ranges.thirst_rate), rate(ranges.thirst_rate));

        Self {
            species,
            max_age,
            hunger_rate,
            thirst_rate,
        }
    }

    /// Produce an offspring genome. Mutates with probability
    /// `1 / mutation_one_in` (0 disables mutation).
    pub fn crossover(dam: &Genome, sire: &Genome, rng: &mut GameRng, mutation_one_in: u64) -> Self {
        let max_age = inherit(dam.max_age, sire.max_age, rng, true);
        let hunger_rate = inherit(dam.hunger_rate, sire.hunger_rate, rng, false);
        let thirst_rate = inherit(dam.thirst_rate, sire.thirst_rate, rng, true);

        let mut child = Self {
            species: sire.species,
            max_age,
            hunger_rate,
            thirst_rate,
        };
        if rng.one_in(mutation_one_in) {
            child.mutate(rng);
        }
        child
    }

    /// Shift every pair by its own signed delta, applied to both alleles.
    pub fn mutate(&mut self, rng: &mut GameRng) {
        for pair in [&mut self.max_age, &mut self.hunger_rate, &mut self.thirst_rate] {
            let delta = round2(rng.uniform(pair.dominant, pair.recessive) / 4.0);
            let delta = if rng.coin() { delta } else { -delta };
            pair.dominant += delta;
            pair.recessive += delta;
        }
    }
}

/// Combine one trait pair from both parents.
///
/// `dam_swaps` controls whether a zero roll demotes the dam's dominant allele
/// when she leads (true for max age and thirst rate, false for hunger rate).
fn inherit(dam: TraitPair, sire: TraitPair, rng: &mut GameRng, dam_swaps: bool) -> TraitPair {
    let dam_leads = rng.roll_inclusive(0, 1) == 1;
    let keep = rng.roll_inclusive(0, 3) >= 1;
    match (dam_leads, keep) {
        (false, true) => TraitPair::new(sire.dominant, dam.recessive),
        (false, false) => TraitPair::new(dam.recessive, sire.dominant),
        (true, false) if dam_swaps => TraitPair::new(sire.recessive, dam.dominant),
        (true, _) => TraitPair::new(dam.dominant, sire.recessive),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;

    fn parents() -> (Genome, Genome) {
        let dam = Genome {
            species: Species::Herbivore,
            max_age: TraitPair::new(510.0, 590.0),
            hunger_rate: TraitPair::new(5.5, 9.25),
            thirst_rate: TraitPair::new(6.0, 7.75),
        };
        let sire = Genome {
            species: Species::Herbivore,
            max_age: TraitPair::new(520.0, 580.0),
            hunger_rate: TraitPair::new(8.5, 6.25),
            thirst_rate: TraitPair::new(9.0, 5.5),
        };
        (dam, sire)
    }

    fn pairs(g: &Genome) -> [TraitPair; 3] {
        [g.max_age, g.hunger_rate, g.thirst_rate]
    }

    #[test]
    fn random_genome_respects_ranges() {
        let config = SimConfig::default();
        let mut rng = GameRng::new(5);
        for species in Species::ALL {
            let ranges = &config.species[&species].genome;
            for _ in 0..200 {
                let g = Genome::random(species, ranges, &mut rng);
                assert_eq!(g.species, species);
                for age in [g.max_age.dominant, g.max_age.recessive] {
                    assert_eq!(age.fract(), 0.0);
                    assert!(age >= ranges.max_age.0 as f64 && age <= ranges.max_age.1 as f64);
                }
                for (pair, (lo, hi)) in [
                    (g.hunger_rate, ranges.hunger_rate),
                    (g.thirst_rate, ranges.thirst_rate),
                ] {
                    for v in [pair.dominant, pair.recessive] {
                        assert!(v >= lo && v <= hi, "{v} outside {lo}..{hi}");
                        assert!(((v * 100.0).round() - v * 100.0).abs() < 1e-6);
                    }
                }
            }
        }
    }

    #[test]
    fn crossover_without_mutation_only_recombines_parent_alleles() {
        let (dam, sire) = parents();
        let mut rng = GameRng::new(77);
        for _ in 0..500 {
            let child = Genome::crossover(&dam, &sire, &mut rng, 0);
            for ((c, d), s) in pairs(&child).into_iter().zip(pairs(&dam)).zip(pairs(&sire)) {
                let offered = [d.dominant, d.recessive, s.dominant, s.recessive];
                assert!(offered.contains(&c.dominant));
                assert!(offered.contains(&c.recessive));
                // One allele from each parent.
                let from_dam = [d.dominant, d.recessive];
                let from_sire = [s.dominant, s.recessive];
                assert!(
                    (from_dam.contains(&c.dominant) && from_sire.contains(&c.recessive))
                        || (from_sire.contains(&c.dominant) && from_dam.contains(&c.recessive))
                );
            }
        }
    }

    #[test]
    fn crossover_reaches_all_four_outcomes_for_max_age() {
        let (dam, sire) = parents();
        let mut rng = GameRng::new(3);
        let mut seen = Vec::new();
        for _ in 0..2000 {
            let child = Genome::crossover(&dam, &sire, &mut rng, 0);
            let pair = (child.max_age.dominant, child.max_age.recessive);
            if !seen.contains(&pair) {
                seen.push(pair);
            }
        }
        seen.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(
            seen,
            vec![(510.0, 580.0), (520.0, 590.0), (580.0, 510.0), (590.0, 520.0)]
        );
    }

    #[test]
    fn hunger_rate_has_three_outcomes() {
        // The dam's dominant allele never gets demoted, so the
        // (sire recessive, dam dominant) pairing cannot occur.
        let (dam, sire) = parents();
        let mut rng = GameRng::new(11);
        let mut seen = Vec::new();
        for _ in 0..2000 {
            let child = Genome::crossover(&dam, &sire, &mut rng, 0);
            let pair = (child.hunger_rate.dominant, child.hunger_rate.recessive);
            if !seen.contains(&pair) {
                seen.push(pair);
            }
        }
        assert_eq!(seen.len(), 3);
        assert!(!seen.contains(&(6.25, 5.5)));
        assert!(seen.contains(&(5.5, 6.25)));
        assert!(seen.contains(&(8.5, 9.25)));
        assert!(seen.contains(&(9.25, 8.5)));
    }

    #[test]
    fn child_takes_sire_species() {
        let (dam, mut sire) = parents();
        sire.species = Species::Omnivore;
        let mut rng = GameRng::new(1);
        let child = Genome::crossover(&dam, &sire, &mut rng, 20);
        assert_eq!(child.species, Species::Omnivore);
    }

    #[test]
    fn mutation_preserves_allele_gap() {
        let (mut g, _) = parents();
        let before = pairs(&g);
        let mut rng = GameRng::new(19);
        g.mutate(&mut rng);
        for (old, new) in before.into_iter().zip(pairs(&g)) {
            let old_gap = old.dominant - old.recessive;
            let new_gap = new.dominant - new.recessive;
            assert!((old_gap - new_gap).abs() < 1e-9);
            // Shift magnitude is at most a quarter of the larger allele.
            let shift = (new.dominant - old.dominant).abs();
            assert!(shift <= old.dominant.max(old.recessive) / 4.0 + 0.006);
        }
    }

    #[test]
    fn always_mutating_crossover_still_preserves_gaps() {
        let (dam, sire) = parents();
        let mut rng = GameRng::new(8);
        let child = Genome::crossover(&dam, &sire, &mut rng, 1);
        // Every resulting gap equals the gap of some unmutated recombination.
        let gaps: Vec<f64> = pairs(&dam)
            .into_iter()
            .zip(pairs(&sire))
            .flat_map(|(d, s)| {
                [
                    s.dominant - d.recessive,
                    d.recessive - s.dominant,
                    d.dominant - s.recessive,
                    s.recessive - d.dominant,
                ]
            })
            .collect();
        for pair in pairs(&child) {
            let gap = pair.dominant - pair.recessive;
            assert!(gaps.iter().any(|g| (g - gap).abs() < 1e-9), "gap {gap}");
        }
    }

    #[test]
    fn crossover_is_deterministic() {
        let (dam, sire) = parents();
        let mut a = GameRng::new(42);
        let mut b = GameRng::new(42);
        for _ in 0..50 {
            assert_eq!(
                Genome::crossover(&dam, &sire, &mut a, 20),
                Genome::crossover(&dam, &sire, &mut b, 20)
            );
        }
    }
}
