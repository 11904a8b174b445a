//! Maximum-weight bipartite assignment (Hungarian / Kuhn-Munkres).
//!
//! Used by CEAF to align key clusters with response clusters. The solver
//! pads rectangular inputs to a square matrix with neutral `0.0` cells,
//! converts weights to costs, and runs the O(n³) shortest-augmenting-path
//! formulation with row/column potentials.
//!
//! Only the achieved total is a contract. When several assignments reach the
//! optimum, which one is returned is an implementation detail.
//!
//! # Example
//!
//! ```rust
//! use coref_scorer::assignment::max_weight_assignment;
//!
//! let scores = vec![vec![0.8, 0.4], vec![0.0, 2.0 / 3.0]];
//! let assignment = max_weight_assignment(&scores).unwrap();
//! assert!((assignment.total - (0.8 + 2.0 / 3.0)).abs() < 1e-9);
//! assert_eq!(assignment.pairs, vec![(0, 0), (1, 1)]);
//! ```

use crate::error::{Error, Result};

/// Result of an assignment: chosen `(row, column)` cells and their sum.
///
/// Cells that only exist because of padding are not reported.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Assignment {
    /// Chosen cells, sorted by row.
    pub pairs: Vec<(usize, usize)>,
    /// Sum of the chosen cells.
    pub total: f64,
}

/// Hungarian solver with a cap on matrix dimension.
#[derive(Debug, Clone, Copy)]
pub struct AssignmentSolver {
    max_dim: usize,
}

impl AssignmentSolver {
    /// Default cap on `max(rows, cols)`.
    pub const DEFAULT_MAX_DIM: usize = 4096;

    /// Create a solver with the default dimension cap.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_dim: Self::DEFAULT_MAX_DIM,
        }
    }

    /// Set the dimension cap.
    ///
    /// The solver is cubic in the padded dimension; inputs above the cap are
    /// rejected rather than left to run unbounded.
    #[must_use]
    pub fn with_max_dim(mut self, max_dim: usize) -> Self {
        self.max_dim = max_dim;
        self
    }

    /// Current dimension cap.
    #[must_use]
    pub fn max_dim(&self) -> usize {
        self.max_dim
    }

    /// Find an assignment of rows to columns maximizing the total score.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidInput`] for ragged rows or non-finite cells
    /// - [`Error::Evaluation`] if the padded dimension exceeds the cap
    pub fn solve(&self, scores: &[Vec<f64>]) -> Result<Assignment> {
        let rows = scores.len();
        let cols = scores.first().map_or(0, Vec::len);

        for (i, row) in scores.iter().enumerate() {
            if row.len() != cols {
                return Err(Error::invalid_input(format!(
                    "score matrix row {} has {} columns, expected {}",
                    i,
                    row.len(),
                    cols
                )));
            }
            if let Some(j) = row.iter().position(|x| !x.is_finite()) {
                return Err(Error::invalid_input(format!(
                    "score matrix cell ({}, {}) is not finite",
                    i, j
                )));
            }
        }

        if rows == 0 || cols == 0 {
            return Ok(Assignment::default());
        }

        let n = rows.max(cols);
        if n > self.max_dim {
            return Err(Error::evaluation(format!(
                "assignment dimension {} exceeds cap {}",
                n, self.max_dim
            )));
        }

        let weight = |i: usize, j: usize| -> f64 {
            if i < rows && j < cols {
                scores[i][j]
            } else {
                0.0
            }
        };

        // Maximize weight == minimize (max_w - weight); padding contributes 0.
        let max_w = scores
            .iter()
            .flat_map(|r| r.iter().copied())
            .fold(0.0_f64, f64::max);
        let cost = |i: usize, j: usize| max_w - weight(i, j);

        // 1-indexed potentials; p[j] is the row assigned to column j, 0 = none.
        let mut u = vec![0.0_f64; n + 1];
        let mut v = vec![0.0_f64; n + 1];
        let mut p = vec![0_usize; n + 1];
        let mut way = vec![0_usize; n + 1];

        for i in 1..=n {
            p[0] = i;
            let mut j0 = 0;
            let mut minv = vec![f64::INFINITY; n + 1];
            let mut used = vec![false; n + 1];

            loop {
                used[j0] = true;
                let i0 = p[j0];
                let mut delta = f64::INFINITY;
                let mut j1 = 0;

                for j in 1..=n {
                    if used[j] {
                        continue;
                    }
                    let reduced = cost(i0 - 1, j - 1) - u[i0] - v[j];
                    if reduced < minv[j] {
                        minv[j] = reduced;
                        way[j] = j0;
                    }
                    if minv[j] < delta {
                        delta = minv[j];
                        j1 = j;
                    }
                }

                for j in 0..=n {
                    if used[j] {
                        u[p[j]] += delta;
                        v[j] -= delta;
                    } else {
                        minv[j] -= delta;
                    }
                }

                j0 = j1;
                if p[j0] == 0 {
                    break;
                }
            }

            // Augment along the alternating path back to the virtual column 0.
            loop {
                let j1 = way[j0];
                p[j0] = p[j1];
                j0 = j1;
                if j0 == 0 {
                    break;
                }
            }
        }

        let mut pairs: Vec<(usize, usize)> = (1..=n)
            .filter(|&j| p[j] > 0)
            .map(|j| (p[j] - 1, j - 1))
            .filter(|&(i, j)| i < rows && j < cols)
            .collect();
        pairs.sort_unstable();
        let total = pairs.iter().map(|&(i, j)| scores[i][j]).sum();

        Ok(Assignment { pairs, total })
    }
}

impl Default for AssignmentSolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Solve with the default [`AssignmentSolver`].
///
/// # Errors
///
/// See [`AssignmentSolver::solve`].
pub fn max_weight_assignment(scores: &[Vec<f64>]) -> Result<Assignment> {
    AssignmentSolver::new().solve(scores)
}
