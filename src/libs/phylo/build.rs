use std::fmt;
use std::str::FromStr;

use log::{debug, info};
use rayon::prelude::*;

use super::error::PhyloError;
use super::matrix::DistanceMatrix;
use super::node::NodeId;
use super::tree::Tree;

/// Agglomerative tree building method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    /// Neighbor-Joining
    Nj,
    /// BIONJ: Neighbor-Joining with variance-weighted distance updates
    #[default]
    Bionj,
}

impl FromStr for Method {
    type Err = PhyloError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nj" => Ok(Method::Nj),
            "bionj" => Ok(Method::Bionj),
            _ => Err(PhyloError::UnknownOption(format!(
                "tree building method {}",
                s
            ))),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Nj => write!(f, "nj"),
            Method::Bionj => write!(f, "bionj"),
        }
    }
}

/// Scratch state of the agglomeration: one slot per original taxon.
///
/// A merged cluster reuses the slot of its lower-indexed member, the other
/// slot is retired. Scanning live slots in index order fixes the tie-break.
struct Clusters {
    dist: Vec<Vec<f64>>,
    /// BIONJ variance estimates, initialised to the distances
    var: Vec<Vec<f64>>,
    node: Vec<NodeId>,
    alive: Vec<bool>,
    active: usize,
}

impl Clusters {
    fn new(matrix: &DistanceMatrix, leaves: Vec<NodeId>) -> Self {
        let n = matrix.len();
        let dist: Vec<Vec<f64>> = (0..n)
            .map(|i| (0..n).map(|j| matrix.get(i, j)).collect())
            .collect();
        Self {
            var: dist.clone(),
            dist,
            node: leaves,
            alive: vec![true; n],
            active: n,
        }
    }

    fn live(&self) -> Vec<usize> {
        (0..self.alive.len()).filter(|&i| self.alive[i]).collect()
    }

    /// Row sums over live clusters; entries of retired slots are unused.
    fn row_sums(&self, live: &[usize]) -> Vec<f64> {
        let mut sums = vec![0.0; self.alive.len()];
        for &i in live {
            sums[i] = live.iter().map(|&k| self.dist[i][k]).sum();
        }
        sums
    }

    /// Pair minimising `Q(i,j) = (r-2) d(i,j) - S(i) - S(j)`.
    ///
    /// Rows are scanned in parallel; the reduction keeps the smallest
    /// `(Q, i, j)`, so ties go to the first pair in index order.
    fn select_pair(&self, live: &[usize], sums: &[f64]) -> (usize, usize) {
        let r = self.active as f64;
        let best = live
            .par_iter()
            .enumerate()
            .filter_map(|(a, &i)| {
                live[a + 1..]
                    .iter()
                    .map(|&j| ((r - 2.0) * self.dist[i][j] - sums[i] - sums[j], i, j))
                    .reduce(pick_lower)
            })
            .reduce_with(pick_lower);

        // live holds at least three slots here
        best.map(|(_, i, j)| (i, j)).unwrap_or((live[0], live[1]))
    }
}

fn pick_lower(a: (f64, usize, usize), b: (f64, usize, usize)) -> (f64, usize, usize) {
    if b.0 < a.0 || (b.0 == a.0 && (b.1, b.2) < (a.1, a.2)) {
        b
    } else {
        a
    }
}

fn link(tree: &mut Tree, parent: NodeId, child: NodeId, length: f64) -> Result<(), PhyloError> {
    tree.add_child_with_length(parent, child, length.max(0.0))
        .map_err(PhyloError::MalformedTree)
}

/// Build an unrooted tree from a distance matrix.
///
/// The matrix must hold at least two taxa and pass
/// [`DistanceMatrix::validate`]. Leaves are created first, in matrix row
/// order, followed by one internal node per join. Negative branch lengths
/// produced by the formulas are stored as `0.0`.
///
/// # Example
/// ```
/// use treelike::libs::phylo::build::{build, Method};
/// use treelike::libs::phylo::matrix::DistanceMatrix;
///
/// let names = vec!["A".to_string(), "B".to_string(), "C".to_string()];
/// let matrix = DistanceMatrix::new(
///     names,
///     vec![vec![0.0, 1.0, 1.0], vec![1.0, 0.0, 1.0], vec![1.0, 1.0, 0.0]],
/// )
/// .unwrap();
/// let tree = build(&matrix, Method::Nj).unwrap();
/// assert_eq!(tree.to_newick(), "(A:0.5,B:0.5,C:0.5);");
/// ```
pub fn build(matrix: &DistanceMatrix, method: Method) -> Result<Tree, PhyloError> {
    matrix.validate()?;
    let n = matrix.len();
    if n < 2 {
        return Err(PhyloError::DegenerateInput(format!(
            "at least 2 taxa are needed to build a tree, found {}",
            n
        )));
    }
    info!("Building {} tree for {} taxa", method, n);

    let mut tree = Tree::new();
    let leaves: Vec<NodeId> = matrix
        .get_names()
        .iter()
        .map(|name| tree.add_leaf(name.as_str()))
        .collect();
    let mut clusters = Clusters::new(matrix, leaves);

    while clusters.active > 2 {
        let live = clusters.live();
        let sums = clusters.row_sums(&live);
        let (i, j) = clusters.select_pair(&live, &sums);
        join(&mut tree, &mut clusters, &live, &sums, i, j, method)?;
    }

    // The last two clusters share one edge
    let live = clusters.live();
    let (a, b) = (clusters.node[live[0]], clusters.node[live[1]]);
    let length = clusters.dist[live[0]][live[1]];
    // Hang the tree from the newest node, internal whenever n >= 3
    let (top, bottom) = if a > b { (a, b) } else { (b, a) };
    link(&mut tree, top, bottom, length)?;
    tree.set_root(top);

    Ok(tree)
}

/// Replace clusters `i` and `j` (i < j) by a new internal node in slot `i`.
fn join(
    tree: &mut Tree,
    clusters: &mut Clusters,
    live: &[usize],
    sums: &[f64],
    i: usize,
    j: usize,
    method: Method,
) -> Result<(), PhyloError> {
    let r = clusters.active as f64;
    let d_ij = clusters.dist[i][j];

    // Branch lengths from the new node to i and j
    let l_i = 0.5 * (d_ij + (sums[i] - sums[j]) / (r - 2.0));
    let l_j = d_ij - l_i;

    let lambda = match method {
        Method::Nj => 0.5,
        Method::Bionj => bionj_lambda(clusters, live, i, j),
    };

    let u = tree.add_node();
    link(tree, u, clusters.node[i], l_i)?;
    link(tree, u, clusters.node[j], l_j)?;
    debug!(
        "join {} + {} -> {}: {:.6} / {:.6} (lambda {:.4})",
        clusters.node[i], clusters.node[j], u, l_i, l_j, lambda
    );

    let v_ij = clusters.var[i][j];
    for &k in live {
        if k == i || k == j {
            continue;
        }
        let d_uk = match method {
            Method::Nj => 0.5 * (clusters.dist[i][k] + clusters.dist[j][k] - d_ij),
            Method::Bionj => {
                lambda * (clusters.dist[i][k] - l_i) + (1.0 - lambda) * (clusters.dist[j][k] - l_j)
            }
        };
        let v_uk = lambda * clusters.var[i][k] + (1.0 - lambda) * clusters.var[j][k]
            - lambda * (1.0 - lambda) * v_ij;

        clusters.dist[i][k] = d_uk;
        clusters.dist[k][i] = d_uk;
        clusters.var[i][k] = v_uk;
        clusters.var[k][i] = v_uk;
    }

    clusters.node[i] = u;
    clusters.alive[j] = false;
    clusters.active -= 1;

    Ok(())
}

/// Weight of cluster `i` in the BIONJ reduction, clamped to `[0, 1]`.
///
/// `lambda = 1/2 + sum_k (V(j,k) - V(i,k)) / (2 (r-2) V(i,j))`
fn bionj_lambda(clusters: &Clusters, live: &[usize], i: usize, j: usize) -> f64 {
    let v_ij = clusters.var[i][j];
    if v_ij == 0.0 {
        return 0.5;
    }
    let r = clusters.active as f64;
    let spread: f64 = live
        .iter()
        .filter(|&&k| k != i && k != j)
        .map(|&k| clusters.var[j][k] - clusters.var[i][k])
        .sum();
    (0.5 + spread / (2.0 * (r - 2.0) * v_ij)).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn matrix(names: &[&str], rows: Vec<Vec<f64>>) -> DistanceMatrix {
        DistanceMatrix::new(names.iter().map(|s| s.to_string()).collect(), rows).unwrap()
    }

    fn quartet() -> DistanceMatrix {
        matrix(
            &["A", "B", "C", "D"],
            vec![
                vec![0., 2., 4., 4.],
                vec![2., 0., 4., 4.],
                vec![4., 4., 0., 2.],
                vec![4., 4., 2., 0.],
            ],
        )
    }

    // Additive distances of A:1,B:2 | x -2- y | C:3 | y -2- z | D:1,E:1
    fn additive5() -> DistanceMatrix {
        matrix(
            &["A", "B", "C", "D", "E"],
            vec![
                vec![0., 3., 6., 6., 6.],
                vec![3., 0., 7., 7., 7.],
                vec![6., 7., 0., 6., 6.],
                vec![6., 7., 6., 0., 2.],
                vec![6., 7., 6., 2., 0.],
            ],
        )
    }

    #[test]
    fn test_method_from_str() {
        assert_eq!("nj".parse::<Method>().unwrap(), Method::Nj);
        assert_eq!("BIONJ".parse::<Method>().unwrap(), Method::Bionj);
        assert!(matches!(
            "upgma".parse::<Method>(),
            Err(PhyloError::UnknownOption(_))
        ));
        assert_eq!(Method::Bionj.to_string(), "bionj");
    }

    #[test]
    fn test_build_star() {
        let m = matrix(
            &["A", "B", "C"],
            vec![vec![0., 1., 1.], vec![1., 0., 1.], vec![1., 1., 0.]],
        );
        for method in [Method::Nj, Method::Bionj] {
            let tree = build(&m, method).unwrap();
            assert_eq!(tree.len(), 4);
            assert_eq!(tree.edge_count(), 3);
            for len in tree.branch_lengths() {
                assert_relative_eq!(len, 0.5);
            }
            // one internal node joins all three leaves
            let root = tree.get_root().unwrap();
            assert_eq!(tree.get_node(root).unwrap().children.len(), 3);
            assert_eq!(tree.to_newick(), "(A:0.5,B:0.5,C:0.5);");
        }
    }

    #[test]
    fn test_build_quartet() {
        let tree = build(&quartet(), Method::Nj).unwrap();
        assert_eq!(tree.to_newick(), "((A:1,B:1):2,C:1,D:1);");

        // A, B, C, D, then the cherry (A,B)
        let tree = build(&quartet(), Method::Bionj).unwrap();
        let expected = [1.0, 1.0, 1.0, 1.0, 2.0];
        for (len, want) in tree.branch_lengths().into_iter().zip(expected) {
            assert_relative_eq!(len, want, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_build_counts() {
        for method in [Method::Nj, Method::Bionj] {
            let tree = build(&additive5(), method).unwrap();
            assert_eq!(tree.get_leaves().len(), 5);
            assert_eq!(tree.len(), 2 * 5 - 2);
            assert_eq!(tree.edge_count(), 2 * 5 - 3);
            assert!(tree.is_binary());
            assert!(tree.check_structure().is_ok());
            assert_relative_eq!(tree.total_length(), 12.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_build_two_taxa() {
        let m = matrix(&["A", "B"], vec![vec![0., 3.], vec![3., 0.]]);
        let tree = build(&m, Method::Nj).unwrap();
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.edge_count(), 1);
        assert_eq!(tree.branch_lengths(), vec![3.0]);
        assert_eq!(tree.to_newick(), "(A:3)B;");
    }

    #[test]
    fn test_build_negative_lengths_clamped() {
        // Violates the triangle inequality; raw NJ gives B a length of -1.5
        let m = matrix(
            &["A", "B", "C"],
            vec![vec![0., 1., 5.], vec![1., 0., 1.], vec![5., 1., 0.]],
        );
        for method in [Method::Nj, Method::Bionj] {
            let tree = build(&m, method).unwrap();
            assert!(tree.branch_lengths().iter().all(|&l| l >= 0.0));
            let b = tree.get_node(1).unwrap();
            assert_eq!(b.length, Some(0.0));
        }
    }

    #[test]
    fn test_build_deterministic() {
        let m = additive5();
        let first = build(&m, Method::Bionj).unwrap().to_newick();
        for _ in 0..5 {
            assert_eq!(build(&m, Method::Bionj).unwrap().to_newick(), first);
        }
    }

    #[test]
    fn test_build_rejects_degenerate() {
        let one = matrix(&["A"], vec![vec![0.]]);
        assert!(matches!(
            build(&one, Method::Nj),
            Err(PhyloError::DegenerateInput(_))
        ));

        let neg = matrix(&["A", "B"], vec![vec![0., -1.], vec![-1., 0.]]);
        assert!(matches!(
            build(&neg, Method::Bionj),
            Err(PhyloError::DegenerateInput(_))
        ));
    }

    // Non-additive: AB + DE = 6, AD + BE = 12, AE + BD = 14
    fn noisy5() -> DistanceMatrix {
        matrix(
            &["A", "B", "C", "D", "E"],
            vec![
                vec![0., 3., 8., 6., 7.],
                vec![3., 0., 7., 7., 6.],
                vec![8., 7., 0., 5., 6.],
                vec![6., 7., 5., 0., 3.],
                vec![7., 6., 6., 3., 0.],
            ],
        )
    }

    #[test]
    fn test_bionj_lambda() {
        let m = noisy5();
        let clusters = Clusters::new(&m, (0..5).collect());
        let live = clusters.live();
        // 1/2 + ((7-8) + (7-6) + (6-7)) / (2 * 3 * 3)
        assert_relative_eq!(bionj_lambda(&clusters, &live, 0, 1), 4.0 / 9.0, epsilon = 1e-12);

        let skewed = matrix(
            &["A", "B", "C", "D"],
            vec![
                vec![0., 0.1, 1., 1.],
                vec![0.1, 0., 10., 10.],
                vec![1., 10., 0., 1.],
                vec![1., 10., 1., 0.],
            ],
        );
        let clusters = Clusters::new(&skewed, (0..4).collect());
        let live = clusters.live();
        assert_eq!(bionj_lambda(&clusters, &live, 0, 1), 1.0);
        assert_eq!(bionj_lambda(&clusters, &live, 1, 0), 0.0);

        let twins = matrix(
            &["A", "B", "C"],
            vec![vec![0., 0., 2.], vec![0., 0., 3.], vec![2., 3., 0.]],
        );
        let clusters = Clusters::new(&twins, (0..3).collect());
        let live = clusters.live();
        assert_eq!(bionj_lambda(&clusters, &live, 0, 1), 0.5);
    }

    #[test]
    fn test_bionj_differs_on_noisy_input() {
        let m = noisy5();
        let nj = build(&m, Method::Nj).unwrap();
        let bionj = build(&m, Method::Bionj).unwrap();
        assert_eq!(nj.edge_count(), 7);
        assert_eq!(bionj.edge_count(), 7);
        assert_ne!(nj.to_newick(), bionj.to_newick());

        // A, B, C, D, E, (A,B), ((A,B),C)
        let want_nj = [5. / 3., 4. / 3., 3.25, 1.25, 1.75, 2.75, 0.75];
        for (len, want) in nj.branch_lengths().into_iter().zip(want_nj) {
            assert_relative_eq!(len, want, epsilon = 1e-9);
        }

        // Same topology, lambda 4/9 at the first join shifts every later length
        let want_bionj = [
            5. / 3.,
            4. / 3.,
            29. / 9.,
            1.2670349907918967,
            1.7329650092081033,
            74. / 27.,
            7. / 9.,
        ];
        for (len, want) in bionj.branch_lengths().into_iter().zip(want_bionj) {
            assert_relative_eq!(len, want, epsilon = 1e-9);
        }
    }
}
