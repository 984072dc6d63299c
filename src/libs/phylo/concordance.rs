//! Concordance between an observed distance matrix and the distances
//! implied by a tree.
//!
//! Each pair of taxa contributes a relative difference in `[0, 1]`; the
//! score is their sum over all `n(n-1)/2` pairs. It is not normalised, so
//! scores of matrices with different numbers of taxa are not comparable.

use std::fmt;
use std::str::FromStr;

use itertools::Itertools;

use super::build::{build, Method};
use super::cophenetic::cophenetic;
use super::error::PhyloError;
use super::matrix::DistanceMatrix;
use super::tree::Tree;

/// How the relative excess of one pair is folded into `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Policy {
    /// `min(1, x)`
    Bounded,
    /// `x / (x + 1)`
    #[default]
    Asymptotic,
}

impl FromStr for Policy {
    type Err = PhyloError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bounded" => Ok(Policy::Bounded),
            "asymptotic" => Ok(Policy::Asymptotic),
            _ => Err(PhyloError::UnknownOption(format!(
                "scoring policy {}",
                s
            ))),
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Policy::Bounded => write!(f, "bounded"),
            Policy::Asymptotic => write!(f, "asymptotic"),
        }
    }
}

/// Relative difference between two non-negative distances.
///
/// * both zero: `0`
/// * exactly one zero: `1`
/// * otherwise, with `x = max/min - 1`: `min(1, x)` or `x / (x + 1)`
///
/// # Example
/// ```
/// use treelike::libs::phylo::concordance::{relative_difference, Policy};
///
/// assert_eq!(relative_difference(0.0, 0.0, Policy::Bounded), 0.0);
/// assert_eq!(relative_difference(5.0, 0.0, Policy::Asymptotic), 1.0);
/// assert_eq!(relative_difference(2.0, 4.0, Policy::Bounded), 1.0);
/// assert_eq!(relative_difference(2.0, 4.0, Policy::Asymptotic), 0.5);
/// ```
pub fn relative_difference(a: f64, b: f64, policy: Policy) -> f64 {
    if a == 0.0 && b == 0.0 {
        return 0.0;
    }
    if a == 0.0 || b == 0.0 {
        return 1.0;
    }

    let x = a.max(b) / a.min(b) - 1.0;
    match policy {
        Policy::Bounded => x.min(1.0),
        Policy::Asymptotic => 1.0 - 1.0 / (x + 1.0),
    }
}

/// Sum of relative differences over all unordered pairs of taxa.
///
/// Both matrices must carry the same labels; `implied` may list them in a
/// different order, pairs are matched by label.
pub fn score(
    original: &DistanceMatrix,
    implied: &DistanceMatrix,
    policy: Policy,
) -> Result<f64, PhyloError> {
    if original.len() != implied.len() {
        return Err(PhyloError::LabelMismatch(format!(
            "matrices have {} and {} taxa",
            original.len(),
            implied.len()
        )));
    }
    if !original.same_labels(implied) {
        let missing = original
            .get_names()
            .iter()
            .filter(|name| implied.index_of(name).is_none())
            .join(", ");
        return Err(PhyloError::LabelMismatch(format!(
            "labels missing from the second matrix: {}",
            missing
        )));
    }
    original.validate()?;
    implied.validate()?;

    // Row of each original taxon in the implied matrix
    let order: Vec<usize> = original
        .get_names()
        .iter()
        .filter_map(|name| implied.index_of(name))
        .collect();

    let total: f64 = (0..original.len())
        .tuple_combinations()
        .map(|(i, j)| relative_difference(original[(i, j)], implied[(order[i], order[j])], policy))
        .sum();

    Ok(total)
}

/// Everything produced while scoring one matrix.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub tree: Tree,
    pub cophenetic: DistanceMatrix,
    pub score: f64,
}

/// Build a tree, derive its distances, and score them against `matrix`.
///
/// # Example
/// ```
/// use treelike::libs::phylo::build::Method;
/// use treelike::libs::phylo::concordance::{evaluate, Policy};
/// use treelike::libs::phylo::matrix::DistanceMatrix;
///
/// let names = vec!["A".to_string(), "B".to_string(), "C".to_string()];
/// let matrix = DistanceMatrix::new(
///     names,
///     vec![vec![0.0, 1.0, 1.0], vec![1.0, 0.0, 1.0], vec![1.0, 1.0, 0.0]],
/// )
/// .unwrap();
/// let eval = evaluate(&matrix, Method::Bionj, Policy::Asymptotic).unwrap();
/// assert_eq!(eval.score, 0.0);
/// ```
pub fn evaluate(
    matrix: &DistanceMatrix,
    method: Method,
    policy: Policy,
) -> Result<Evaluation, PhyloError> {
    let tree = build(matrix, method)?;
    let implied = cophenetic(&tree)?;
    let score = score(matrix, &implied, policy)?;

    Ok(Evaluation {
        tree,
        cophenetic: implied,
        score,
    })
}
