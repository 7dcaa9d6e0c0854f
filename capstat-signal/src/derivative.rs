use capstat_core::models::{GenomicInterval, SignalInterval};
use log::warn;

use crate::errors::ComputationError;

/// Slope of the directionality score between two neighbouring targets.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivativePoint {
    pub chrom: String,
    /// Halfway between the two target midpoints, rounded down.
    pub position: u64,
    pub slope: f64,
}

impl DerivativePoint {
    /// `chrom\tpos\tpos+1\tslope`
    pub fn as_string(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}",
            self.chrom,
            self.position,
            self.position + 1,
            self.slope
        )
    }
}

///
/// Finite-difference derivative of directionality along one chromosome.
///
/// Each input interval is a target with its directionality as the value. Points are sorted
/// by coordinate first; every consecutive pair yields `dD / dx` placed at
/// `floor(start_1 + dx / 2)`, where `dx` is the midpoint spacing. Pairs sharing a midpoint
/// have no slope and are skipped.
///
pub fn directionality_derivative(
    mut points: Vec<SignalInterval>,
) -> Result<Vec<DerivativePoint>, ComputationError> {
    if let Some(first) = points.first() {
        if let Some(other) = points.iter().find(|p| !p.same_chrom(first)) {
            return Err(ComputationError::MixedChromosomes(
                first.chrom().to_string(),
                other.chrom().to_string(),
            ));
        }
    }
    points.sort();

    let mut derivative = Vec::with_capacity(points.len().saturating_sub(1));
    for pair in points.windows(2) {
        let (left, right) = (&pair[0], &pair[1]);
        let dx = right.midpoint() - left.midpoint();
        if dx <= 0.0 {
            warn!(
                "{}:{}-{} and {}-{} share a midpoint, no slope between them",
                left.chrom(),
                left.start(),
                left.end(),
                right.start(),
                right.end()
            );
            continue;
        }

        derivative.push(DerivativePoint {
            chrom: left.chrom().to_string(),
            position: (left.start() as f64 + dx / 2.0).floor() as u64,
            slope: (right.value() - left.value()) / dx,
        });
    }

    Ok(derivative)
}
