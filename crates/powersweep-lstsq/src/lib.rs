//! Incremental multivariate linear least squares.
//!
//! This crate provides a focused solver for fitting `y = b + w · x` by
//! ordinary least squares, used once per output metric by the modeling
//! phase. The constant bias term is obtained by prepending a fixed 1.0 to
//! every feature vector: the feature space is treated as a homogeneous
//! coordinate of dimension `features + 1` rather than carrying a separate
//! intercept parameter.
//!
//! ## Algorithm
//!
//! Training rows are folded into a QR factorization incrementally via
//! Givens rotations: the accumulator keeps only the upper-triangular factor
//! `R` (size `w × w` for `w` unknowns) and the rotated right-hand side
//! `Qᵀy`, so memory stays constant in the number of training pairs and no
//! normal-equations matrix is formed (squaring the condition number the way
//! `XᵀX` does is avoided).
//!
//! `solve` consumes the accumulator and back-substitutes. Rank deficiency
//! (fewer rows than unknowns, duplicate feature vectors, or collinear
//! features) leaves a (near-)zero diagonal in `R` and surfaces as a
//! [`FitError`] instead of a best-effort garbage model. Prediction is only
//! available on a successfully solved [`Model`], and consuming `solve`
//! makes reuse across metrics a compile error.

use std::fmt;

/// Relative tolerance for declaring a diagonal of `R` numerically zero.
const SINGULAR_TOL: f64 = 1e-10;

/// Why a least-squares system could not be solved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitError {
    /// Fewer training rows than unknowns; the system cannot determine all
    /// coefficients.
    Underdetermined {
        /// Training rows accumulated.
        rows: usize,
        /// Unknowns including the bias term.
        unknowns: usize,
    },
    /// The system is rank deficient: duplicate or linearly dependent
    /// feature vectors left column `column` without a pivot.
    Singular {
        /// Zero-based column of the first (near-)zero diagonal.
        column: usize,
    },
}

impl fmt::Display for FitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FitError::Underdetermined { rows, unknowns } => write!(
                f,
                "underdetermined system: {rows} training rows for \
                 {unknowns} unknowns"
            ),
            FitError::Singular { column } => write!(
                f,
                "singular system: no pivot for coefficient column {column}"
            ),
        }
    }
}

impl std::error::Error for FitError {}

/// Accumulator for one least-squares fit.
///
/// Feed every training pair with [`add`](Self::add), then call
/// [`solve`](Self::solve) exactly once. A fresh accumulator is required per
/// target metric; rows for one target must never leak into another fit.
#[derive(Debug, Clone)]
pub struct LeastSquares {
    /// Number of features, excluding the implicit bias.
    features: usize,
    /// Upper-triangular factor, `width × width`, rows stored dense.
    r: Vec<Vec<f64>>,
    /// Rotated right-hand side `Qᵀy`.
    qtb: Vec<f64>,
    /// Training rows folded in so far.
    rows: usize,
}

impl LeastSquares {
    /// Creates an accumulator for feature vectors of length `features`.
    #[must_use]
    pub fn new(features: usize) -> Self {
        let width = features + 1;
        Self {
            features,
            r: vec![vec![0.0; width]; width],
            qtb: vec![0.0; width],
            rows: 0,
        }
    }

    /// Unknown count: declared features plus the bias term.
    #[must_use]
    pub fn unknowns(&self) -> usize {
        self.features + 1
    }

    /// Folds one training pair into the factorization.
    ///
    /// The bias coordinate is prepended internally; callers pass the raw
    /// encoded feature vector.
    ///
    /// # Panics
    ///
    /// Panics if `features` does not match the declared length.
    pub fn add(&mut self, features: &[f64], target: f64) {
        assert_eq!(
            features.len(),
            self.features,
            "feature vector length mismatch"
        );

        let width = self.unknowns();
        let mut row = Vec::with_capacity(width);
        row.push(1.0);
        row.extend_from_slice(features);
        let mut rhs = target;

        // Annihilate the new row against each pivot in turn. After the
        // loop the row is entirely absorbed into R and Qᵀy.
        for i in 0..width {
            if row[i] == 0.0 {
                continue;
            }
            let (c, s, radius) = givens(self.r[i][i], row[i]);
            for j in i..width {
                let rij = self.r[i][j];
                self.r[i][j] = c * rij + s * row[j];
                row[j] = -s * rij + c * row[j];
            }
            // Counteract rounding on the pivot itself.
            self.r[i][i] = radius;
            let qi = self.qtb[i];
            self.qtb[i] = c * qi + s * rhs;
            rhs = -s * qi + c * rhs;
        }

        self.rows += 1;
    }

    /// Solves the accumulated system, consuming the accumulator.
    ///
    /// Fails if fewer rows than unknowns were added, or if the factor is
    /// rank deficient (duplicate points, collinear features).
    pub fn solve(self) -> Result<Model, FitError> {
        let width = self.unknowns();
        if self.rows < width {
            return Err(FitError::Underdetermined {
                rows: self.rows,
                unknowns: width,
            });
        }

        // Rank check: every diagonal must carry a pivot comparable in
        // magnitude to the largest one. Duplicated rows raise the largest
        // diagonal without creating new pivots, so the relative test
        // catches "many rows, few distinct points".
        let max_diag = (0..width)
            .map(|i| self.r[i][i].abs())
            .fold(0.0f64, f64::max);
        for (i, r_row) in self.r.iter().enumerate() {
            if r_row[i].abs() <= max_diag * SINGULAR_TOL {
                return Err(FitError::Singular { column: i });
            }
        }

        // Back substitution on the triangular system R x = Qᵀy.
        let mut coefficients = vec![0.0; width];
        for i in (0..width).rev() {
            let mut sum = self.qtb[i];
            for j in i + 1..width {
                sum -= self.r[i][j] * coefficients[j];
            }
            coefficients[i] = sum / self.r[i][i];
        }

        if coefficients.iter().any(|c| !c.is_finite()) {
            return Err(FitError::Singular { column: 0 });
        }

        Ok(Model { coefficients })
    }
}

/// Computes a Givens rotation `(c, s, r)` with `c·a + s·b = r` and
/// `-s·a + c·b = 0`.
fn givens(a: f64, b: f64) -> (f64, f64, f64) {
    let radius = a.hypot(b);
    if radius == 0.0 {
        (1.0, 0.0, 0.0)
    } else {
        (a / radius, b / radius, radius)
    }
}

/// A solved least-squares model: bias plus one coefficient per feature.
///
/// Owns no reference to its training data; consumed only through
/// [`predict`](Self::predict).
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    /// `[bias, w_1, .., w_n]`.
    coefficients: Vec<f64>,
}

impl Model {
    /// Predicts the target for one feature vector.
    ///
    /// # Panics
    ///
    /// Panics if `features` does not match the trained length.
    #[must_use]
    pub fn predict(&self, features: &[f64]) -> f64 {
        assert_eq!(
            features.len() + 1,
            self.coefficients.len(),
            "feature vector length mismatch"
        );
        self.coefficients[0]
            + self.coefficients[1..]
                .iter()
                .zip(features)
                .map(|(c, x)| c * x)
                .sum::<f64>()
    }

    /// The fitted coefficients, bias first.
    #[must_use]
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-6;

    /// y = 4 + 2·x1 - 3·x2, noise free.
    fn plane(x1: f64, x2: f64) -> f64 {
        4.0 + 2.0 * x1 - 3.0 * x2
    }

    #[test]
    fn recovers_exact_linear_function() {
        let points =
            [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (2.0, 1.0), (3.0, 5.0)];
        let mut solver = LeastSquares::new(2);
        for (x1, x2) in points {
            solver.add(&[x1, x2], plane(x1, x2));
        }
        let model = solver.solve().unwrap();

        for (x1, x2) in points {
            assert!((model.predict(&[x1, x2]) - plane(x1, x2)).abs() < TOL);
        }
        // And off the training grid.
        assert!((model.predict(&[7.0, -2.0]) - plane(7.0, -2.0)).abs() < TOL);
        assert!((model.coefficients()[0] - 4.0).abs() < TOL);
    }

    #[test]
    fn single_feature_with_bias() {
        let mut solver = LeastSquares::new(1);
        for x in [0.0, 1.0, 2.0] {
            solver.add(&[x], 1.0 + x);
        }
        let model = solver.solve().unwrap();
        assert!((model.predict(&[10.0]) - 11.0).abs() < TOL);
    }

    #[test]
    fn averages_noisy_duplicates() {
        // Two observations per point; least squares lands on the mean.
        let mut solver = LeastSquares::new(1);
        solver.add(&[0.0], 0.9);
        solver.add(&[0.0], 1.1);
        solver.add(&[1.0], 1.9);
        solver.add(&[1.0], 2.1);
        let model = solver.solve().unwrap();
        assert!((model.predict(&[0.0]) - 1.0).abs() < TOL);
        assert!((model.predict(&[1.0]) - 2.0).abs() < TOL);
    }

    #[test]
    fn underdetermined_is_rejected() {
        let mut solver = LeastSquares::new(2);
        solver.add(&[1.0, 2.0], 3.0);
        solver.add(&[2.0, 1.0], 4.0);
        assert_eq!(
            solver.solve(),
            Err(FitError::Underdetermined {
                rows: 2,
                unknowns: 3
            })
        );
    }

    #[test]
    fn duplicate_points_do_not_fake_rank() {
        // Plenty of rows, but only two distinct feature vectors for three
        // unknowns.
        let mut solver = LeastSquares::new(2);
        for _ in 0..10 {
            solver.add(&[1.0, 2.0], 3.0);
            solver.add(&[2.0, 1.0], 4.0);
        }
        assert!(matches!(solver.solve(), Err(FitError::Singular { .. })));
    }

    #[test]
    fn collinear_features_are_rejected() {
        // Second feature is always twice the first.
        let mut solver = LeastSquares::new(2);
        for x in [1.0, 2.0, 3.0, 4.0] {
            solver.add(&[x, 2.0 * x], x);
        }
        assert!(matches!(solver.solve(), Err(FitError::Singular { .. })));
    }

    #[test]
    fn empty_accumulator_is_underdetermined() {
        let solver = LeastSquares::new(3);
        assert!(matches!(
            solver.solve(),
            Err(FitError::Underdetermined { rows: 0, .. })
        ));
    }

    #[test]
    #[should_panic(expected = "length mismatch")]
    fn add_rejects_wrong_arity() {
        let mut solver = LeastSquares::new(2);
        solver.add(&[1.0], 1.0);
    }
}
