use std::collections::HashSet;

use log::debug;
use rayon::prelude::*;

use super::error::PhyloError;
use super::matrix::DistanceMatrix;
use super::node::NodeId;
use super::tree::{traversal, Tree};

/// Tree-implied distances between all pairs of leaves.
///
/// The distance between two leaves is the summed branch length of the
/// path joining them. Rows follow the arena order of the leaves, which for
/// trees from [`build`](super::build::build) is the order of the input
/// matrix.
///
/// Fails with `MalformedTree` if the tree is not a single connected acyclic
/// component or a leaf has no (or a repeated) label.
pub fn cophenetic(tree: &Tree) -> Result<DistanceMatrix, PhyloError> {
    tree.check_structure()?;

    let leaves = tree.get_leaves();
    let mut names = Vec::with_capacity(leaves.len());
    let mut seen = HashSet::new();
    for (&leaf, name) in leaves.iter().zip(tree.get_leaf_names()) {
        let name =
            name.ok_or_else(|| PhyloError::MalformedTree(format!("leaf {} has no label", leaf)))?;
        if !seen.insert(name.clone()) {
            return Err(PhyloError::MalformedTree(format!(
                "leaf label {} appears more than once",
                name
            )));
        }
        names.push(name);
    }

    // Row position of each leaf, indexed by NodeId
    let mut position: Vec<Option<usize>> = vec![None; tree.len()];
    for (pos, &leaf) in leaves.iter().enumerate() {
        position[leaf] = Some(pos);
    }

    // One walk per leaf, each independent of the others
    let rows: Vec<Vec<f64>> = leaves
        .par_iter()
        .map(|&leaf| leaf_row(tree, leaf, &position, leaves.len()))
        .collect();

    let mut matrix = DistanceMatrix::zeros(names)?;
    for i in 0..leaves.len() {
        for j in (i + 1)..leaves.len() {
            // Mirror the upper triangle
            matrix.set_pair(i, j, rows[i][j]);
        }
    }
    debug!("Cophenetic matrix over {} leaves", leaves.len());

    Ok(matrix)
}

fn leaf_row(tree: &Tree, leaf: NodeId, position: &[Option<usize>], n: usize) -> Vec<f64> {
    let mut row = vec![0.0; n];
    for (id, dist) in traversal::walk_from(tree, leaf) {
        if let Some(pos) = position[id] {
            row[pos] = dist;
        }
    }
    row
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::phylo::build::{build, Method};
    use approx::assert_relative_eq;

    fn matrix(names: &[&str], rows: Vec<Vec<f64>>) -> DistanceMatrix {
        DistanceMatrix::new(names.iter().map(|s| s.to_string()).collect(), rows).unwrap()
    }

    #[test]
    fn test_cophenetic_manual_tree() {
        //        v
        //     /  |  \
        //    u   C   D
        //   / \
        //  A   B
        let mut tree = Tree::new();
        let a = tree.add_leaf("A");
        let b = tree.add_leaf("B");
        let c = tree.add_leaf("C");
        let d = tree.add_leaf("D");
        let u = tree.add_node();
        let v = tree.add_node();
        tree.add_child_with_length(u, a, 1.0).unwrap();
        tree.add_child_with_length(u, b, 1.5).unwrap();
        tree.add_child_with_length(v, u, 2.0).unwrap();
        tree.add_child_with_length(v, c, 1.0).unwrap();
        tree.add_child_with_length(v, d, 0.5).unwrap();
        tree.set_root(v);

        let m = cophenetic(&tree).unwrap();
        assert_eq!(m.get_names(), &["A", "B", "C", "D"]);
        assert_eq!(m[(0, 1)], 2.5);
        assert_eq!(m[(0, 2)], 4.0);
        assert_eq!(m[(1, 3)], 4.0);
        assert_eq!(m[(2, 3)], 1.5);
        assert!(m.validate().is_ok());
    }

    #[test]
    fn test_cophenetic_recovers_additive() {
        let input = matrix(
            &["A", "B", "C", "D", "E"],
            vec![
                vec![0., 3., 6., 6., 6.],
                vec![3., 0., 7., 7., 7.],
                vec![6., 7., 0., 6., 6.],
                vec![6., 7., 6., 0., 2.],
                vec![6., 7., 6., 2., 0.],
            ],
        );
        for method in [Method::Nj, Method::Bionj] {
            let tree = build(&input, method).unwrap();
            let implied = cophenetic(&tree).unwrap();
            assert_eq!(implied.get_names(), input.get_names());
            for i in 0..5 {
                for j in 0..5 {
                    assert_relative_eq!(implied[(i, j)], input[(i, j)], epsilon = 1e-9);
                }
            }
        }
    }

    #[test]
    fn test_cophenetic_symmetric() {
        let input = matrix(
            &["A", "B", "C", "D", "E"],
            vec![
                vec![0., 0.31, 0.92, 0.87, 0.55],
                vec![0.31, 0.0, 0.71, 0.66, 0.49],
                vec![0.92, 0.71, 0.0, 0.13, 0.58],
                vec![0.87, 0.66, 0.13, 0.0, 0.61],
                vec![0.55, 0.49, 0.58, 0.61, 0.0],
            ],
        );
        let tree = build(&input, Method::Bionj).unwrap();
        let implied = cophenetic(&tree).unwrap();
        for i in 0..5 {
            assert_eq!(implied[(i, i)], 0.0);
            for j in 0..5 {
                assert_eq!(implied[(i, j)], implied[(j, i)]);
                assert!(implied[(i, j)] >= 0.0);
            }
        }
    }

    #[test]
    fn test_cophenetic_two_taxa() {
        let input = matrix(&["A", "B"], vec![vec![0., 3.], vec![3., 0.]]);
        let tree = build(&input, Method::Nj).unwrap();
        assert_eq!(cophenetic(&tree).unwrap(), input);
    }

    #[test]
    fn test_cophenetic_malformed() {
        // Disconnected
        let mut tree = Tree::new();
        tree.add_leaf("A");
        tree.add_leaf("B");
        assert!(matches!(
            cophenetic(&tree),
            Err(PhyloError::MalformedTree(_))
        ));

        // Unlabeled leaf
        let mut tree = Tree::new();
        let a = tree.add_leaf("A");
        let b = tree.add_node();
        tree.add_child_with_length(a, b, 1.0).unwrap();
        tree.set_root(a);
        assert!(matches!(
            cophenetic(&tree),
            Err(PhyloError::MalformedTree(_))
        ));

        // Repeated label
        let mut tree = Tree::new();
        let a = tree.add_leaf("A");
        let b = tree.add_leaf("A");
        tree.add_child_with_length(a, b, 1.0).unwrap();
        tree.set_root(a);
        assert!(matches!(
            cophenetic(&tree),
            Err(PhyloError::MalformedTree(_))
        ));
    }
}
