//! Bit-string genetic operators.
//!
//! - [`random`] draws a uniform genome
//! - [`crossover`] and [`crossover_at`] splice two parents at a single point
//! - [`mutate`] flips each bit independently

use gensnake_evaluator::genome::Genome;
use rand::Rng;

/// Which parent supplies the bits before the crossover point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossoverOrder {
    FirstLeads,
    SecondLeads,
}

/// Uniformly random genome of `len` bits.
pub fn random<R>(rng: &mut R, len: usize) -> Genome
where
    R: Rng + ?Sized,
{
    (0..len).map(|_| rng.random::<bool>()).collect()
}

/// Single-point crossover with a uniformly chosen point and order.
///
/// # Panics
///
/// Panics if the parents differ in length.
pub fn crossover<R>(first: &Genome, second: &Genome, rng: &mut R) -> Genome
where
    R: Rng + ?Sized,
{
    assert_eq!(first.len(), second.len(), "parents differ in length");
    if first.is_empty() {
        return first.clone();
    }
    let order = if rng.random_bool(0.5) {
        CrossoverOrder::FirstLeads
    } else {
        CrossoverOrder::SecondLeads
    };
    let point = rng.random_range(0..first.len());
    crossover_at(first, second, point, order)
}

/// Splices two parents at `point`.
///
/// The leading parent supplies bits `[0, point)` and the other parent bits
/// `[point, len)`. When `point` is the last index the child is a plain copy
/// of the trailing parent.
///
/// ```
/// use gensnake_evaluator::genome::Genome;
/// use gensnake_training::bits::{CrossoverOrder, crossover_at};
///
/// let a: Genome = "0000".parse().unwrap();
/// let b: Genome = "1111".parse().unwrap();
/// assert_eq!(crossover_at(&a, &b, 1, CrossoverOrder::FirstLeads).to_string(), "0111");
/// assert_eq!(crossover_at(&a, &b, 1, CrossoverOrder::SecondLeads).to_string(), "1000");
/// assert_eq!(crossover_at(&a, &b, 3, CrossoverOrder::FirstLeads), b);
/// ```
///
/// # Panics
///
/// Panics if the parents differ in length or `point` is out of range.
#[must_use]
pub fn crossover_at(first: &Genome, second: &Genome, point: usize, order: CrossoverOrder) -> Genome {
    assert_eq!(first.len(), second.len(), "parents differ in length");
    assert!(point < first.len(), "crossover point out of range");
    let (lead, trail) = match order {
        CrossoverOrder::FirstLeads => (first, second),
        CrossoverOrder::SecondLeads => (second, first),
    };
    if point == first.len() - 1 {
        return trail.clone();
    }
    lead.bits()[..point]
        .iter()
        .chain(&trail.bits()[point..])
        .copied()
        .collect()
}

/// Flips each bit independently with probability `rate`.
///
/// # Panics
///
/// Panics if `rate` is outside `[0, 1]`.
pub fn mutate<R>(genome: &Genome, rate: f64, rng: &mut R) -> Genome
where
    R: Rng + ?Sized,
{
    genome
        .bits()
        .iter()
        .map(|&bit| bit ^ rng.random_bool(rate))
        .collect()
}
