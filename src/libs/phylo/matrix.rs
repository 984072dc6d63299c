//! A distance matrix is stored as a list of taxon labels together with a
//! square matrix of pairwise dissimilarities.
//!
//! # Example
//!
//! ```rust
//! use treelike::libs::phylo::matrix::DistanceMatrix;
//!
//! let m = DistanceMatrix::new(
//!     vec!["a".to_string(), "b".to_string()],
//!     vec![vec![0.0, 1.0], vec![1.0, 0.0]],
//! )
//! .unwrap();
//! assert_eq!(m[(0, 1)], 1.0);
//! assert!(m.validate().is_ok());
//! ```

use std::collections::{HashMap, HashSet};
use std::io::BufRead;
use std::ops::Index;

use itertools::Itertools;

use super::error::PhyloError;

/// Labeled square matrix of pairwise distances.
/// Corrected distance used for pairs at or beyond JC saturation.
pub const JC_SATURATED: f64 = 25.0;

/// Jukes-Cantor corrected value of a single distance.
pub fn jukes_cantor(d: f64) -> f64 {
    if d == 0.0 {
        0.0
    } else if d >= 0.75 {
        JC_SATURATED
    } else {
        -0.75 * (1.0 - 4.0 / 3.0 * d).ln()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    names: Vec<String>,
    distances: Vec<Vec<f64>>,
}

impl DistanceMatrix {
    /// Create a new DistanceMatrix.
    ///
    /// Labels must be unique and `distances` must have one row of
    /// `names.len()` entries per label. Symmetry is checked by
    /// [`validate`](Self::validate), so asymmetric input can still be
    /// loaded and then [`symmetrize`](Self::symmetrize)d.
    pub fn new(names: Vec<String>, distances: Vec<Vec<f64>>) -> Result<Self, PhyloError> {
        let n = names.len();
        if distances.len() != n {
            return Err(PhyloError::DegenerateInput(format!(
                "{} labels but {} rows",
                n,
                distances.len()
            )));
        }
        if let Some((i, row)) = distances.iter().find_position(|row| row.len() != n) {
            return Err(PhyloError::DegenerateInput(format!(
                "row {} has {} entries, expected {}",
                i + 1,
                row.len(),
                n
            )));
        }
        if let Some(dup) = names.iter().duplicates().next() {
            return Err(PhyloError::DegenerateInput(format!(
                "duplicate label {}",
                dup
            )));
        }

        Ok(Self { names, distances })
    }

    /// A matrix of zeros over the given labels.
    pub fn zeros(names: Vec<String>) -> Result<Self, PhyloError> {
        let n = names.len();
        Self::new(names, vec![vec![0.0; n]; n])
    }

    /// The number of taxa (rows) in the matrix.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn get_names(&self) -> &[String] {
        &self.names
    }

    /// Position of a label.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.distances[i][j]
    }

    /// Set `d[i][j]` and `d[j][i]` together.
    pub fn set_pair(&mut self, i: usize, j: usize, value: f64) {
        self.distances[i][j] = value;
        self.distances[j][i] = value;
    }

    /// Check the invariants every algorithm relies on: square, finite,
    /// non-negative, zero diagonal and symmetric.
    pub fn validate(&self) -> Result<(), PhyloError> {
        let n = self.len();
        if n == 0 {
            return Err(PhyloError::DegenerateInput("matrix has no taxa".to_string()));
        }

        for i in 0..n {
            if self.distances[i][i] != 0.0 {
                return Err(PhyloError::DegenerateInput(format!(
                    "non-zero diagonal for {}: {}",
                    self.names[i], self.distances[i][i]
                )));
            }
            for j in 0..n {
                let d = self.distances[i][j];
                if !d.is_finite() {
                    return Err(PhyloError::DegenerateInput(format!(
                        "non-finite distance between {} and {}",
                        self.names[i], self.names[j]
                    )));
                }
                if d < 0.0 {
                    return Err(PhyloError::DegenerateInput(format!(
                        "negative distance between {} and {}: {}",
                        self.names[i], self.names[j], d
                    )));
                }
                if j > i && d != self.distances[j][i] {
                    return Err(PhyloError::DegenerateInput(format!(
                        "asymmetric distances between {} and {}: {} vs {}",
                        self.names[i], self.names[j], d, self.distances[j][i]
                    )));
                }
            }
        }

        Ok(())
    }

    /// Replace each pair of distances by their mean.
    pub fn symmetrize(&mut self) {
        let n = self.len();
        for (i, j) in (0..n).tuple_combinations() {
            let mean = (self.distances[i][j] + self.distances[j][i]) / 2.0;
            self.set_pair(i, j, mean);
        }
    }

    /// Apply the Jukes-Cantor correction, `-3/4 ln(1 - 4/3 d)`, in place.
    ///
    /// Zero stays zero. The correction diverges at `d = 0.75`, so saturated
    /// distances are set to [`JC_SATURATED`].
    pub fn jukes_cantor(&mut self) {
        for row in self.distances.iter_mut() {
            for d in row.iter_mut() {
                *d = jukes_cantor(*d);
            }
        }
    }

    /// A new matrix restricted to `names`, in that order.
    pub fn subset(&self, names: &[String]) -> Result<Self, PhyloError> {
        let index: HashMap<&str, usize> = self
            .names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.as_str(), i))
            .collect();

        let mut rows = Vec::with_capacity(names.len());
        for name in names {
            if !index.contains_key(name.as_str()) {
                return Err(PhyloError::LabelMismatch(format!(
                    "{} is not in the matrix",
                    name
                )));
            }
        }
        for a in names {
            let i = index[a.as_str()];
            rows.push(names.iter().map(|b| self.distances[i][index[b.as_str()]]).collect());
        }

        Self::new(names.to_vec(), rows)
    }

    /// True if both matrices carry the same set of labels.
    pub fn same_labels(&self, other: &DistanceMatrix) -> bool {
        let a: HashSet<&String> = self.names.iter().collect();
        let b: HashSet<&String> = other.names.iter().collect();
        self.len() == other.len() && a == b
    }

    /// Read a PHYLIP distance matrix from a file, or `stdin`.
    ///
    /// Square rows and lower-triangular rows (with or without the diagonal)
    /// are both accepted.
    pub fn from_phylip(infile: &str) -> Result<Self, PhyloError> {
        let reader = intspan::reader(infile);
        Self::from_phylip_reader(reader)
    }

    /// Read a PHYLIP distance matrix from any buffered reader.
    pub fn from_phylip_reader<R: BufRead>(reader: R) -> Result<Self, PhyloError> {
        let mut count: Option<usize> = None;
        let mut names = Vec::new();
        let mut rows: Vec<Vec<f64>> = Vec::new();
        let mut last_line = 0;

        for (idx, line) in reader.lines().enumerate() {
            let lineno = idx + 1;
            last_line = lineno;
            let line = line.map_err(|e| PhyloError::parse(lineno, e.to_string()))?;
            let mut fields = line.split_whitespace();
            let first = match fields.next() {
                Some(f) => f,
                None => continue,
            };

            let n = match count {
                None => {
                    let n = first.parse::<usize>().map_err(|_| {
                        PhyloError::parse(lineno, format!("expected taxon count, found {}", first))
                    })?;
                    count = Some(n);
                    continue;
                }
                Some(n) => n,
            };

            if names.len() == n {
                return Err(PhyloError::parse(
                    lineno,
                    format!("more than {} rows", n),
                ));
            }

            let values = fields
                .map(|f| {
                    f.parse::<f64>().map_err(|_| {
                        PhyloError::parse(lineno, format!("invalid distance {}", f))
                    })
                })
                .collect::<Result<Vec<f64>, _>>()?;

            let i = names.len();
            if values.len() != n && values.len() != i && values.len() != i + 1 {
                return Err(PhyloError::parse(
                    lineno,
                    format!(
                        "row {} has {} distances, expected {}",
                        first,
                        values.len(),
                        n
                    ),
                ));
            }

            names.push(first.to_string());
            rows.push(values);
        }

        let n = count.ok_or_else(|| PhyloError::parse(1, "empty matrix file"))?;
        if names.len() != n {
            return Err(PhyloError::parse(
                last_line,
                format!("expected {} rows, found {}", n, names.len()),
            ));
        }

        // Fill lower-triangular rows from the lower half
        let mut distances = vec![vec![0.0; n]; n];
        let square = rows.iter().all(|r| r.len() == n);
        for (i, row) in rows.iter().enumerate() {
            if square {
                distances[i].copy_from_slice(row);
            } else {
                for (j, &d) in row.iter().enumerate().take(i) {
                    distances[i][j] = d;
                    distances[j][i] = d;
                }
            }
        }

        Self::new(names, distances).map_err(|e| match e {
            PhyloError::DegenerateInput(msg) => PhyloError::parse(last_line, msg),
            other => other,
        })
    }

    /// Format as a PHYLIP matrix: a count line, then tab-separated rows.
    pub fn to_phylip(&self) -> String {
        let mut out = format!("{}\n", self.len());
        for (name, row) in self.names.iter().zip(&self.distances) {
            out.push_str(name);
            for d in row {
                out.push_str(&format!("\t{:.8}", d));
            }
            out.push('\n');
        }
        out
    }
}

impl Index<(usize, usize)> for DistanceMatrix {
    type Output = f64;
    fn index(&self, (i, j): (usize, usize)) -> &Self::Output {
        &self.distances[i][j]
    }
}
