use crate::error::{Result, SignalError};

// ---------------------------------------------------------------------------
// Symmetric pentadiagonal systems
// ---------------------------------------------------------------------------

/// Symmetric matrix with two bands on each side of the diagonal.
///
/// `off1[k]` holds entry `(k, k+1)` and `off2[k]` holds `(k, k+2)`; the
/// trailing slots of both are unused.
#[derive(Debug, Clone)]
pub struct Pentadiagonal {
    pub diag: Vec<f64>,
    pub off1: Vec<f64>,
    pub off2: Vec<f64>,
}

impl Pentadiagonal {
    pub fn zeros(n: usize) -> Self {
        Self {
            diag: vec![0.0; n],
            off1: vec![0.0; n],
            off2: vec![0.0; n],
        }
    }

    pub fn len(&self) -> usize {
        self.diag.len()
    }

    /// Penalty `DᵀD` of the second-difference operator on `n` points.
    pub fn second_difference_penalty(n: usize) -> Self {
        let mut m = Self::zeros(n);
        if n < 3 {
            return m;
        }
        const STENCIL: [f64; 3] = [1.0, -2.0, 1.0];
        for j in 0..n - 2 {
            for s in 0..3 {
                m.diag[j + s] += STENCIL[s] * STENCIL[s];
                if s + 1 < 3 {
                    m.off1[j + s] += STENCIL[s] * STENCIL[s + 1];
                }
                if s + 2 < 3 {
                    m.off2[j + s] += STENCIL[s] * STENCIL[s + 2];
                }
            }
        }
        m
    }

    /// Solve `A x = rhs` with an LDLᵀ factorisation.
    ///
    /// Fails with [`SignalError::Singular`] when a pivot is not positive.
    pub fn solve(&self, rhs: &[f64]) -> Result<Vec<f64>> {
        let n = self.len();
        if rhs.len() != n {
            return Err(SignalError::LengthMismatch {
                x: n,
                y: rhs.len(),
            });
        }
        if n == 0 {
            return Ok(Vec::new());
        }

        let mut d = vec![0.0; n];
        let mut l1 = vec![0.0; n];
        let mut l2 = vec![0.0; n];

        for k in 0..n {
            let mut dk = self.diag[k];
            if k >= 1 {
                dk -= l1[k - 1] * l1[k - 1] * d[k - 1];
            }
            if k >= 2 {
                dk -= l2[k - 2] * l2[k - 2] * d[k - 2];
            }
            if !(dk > 0.0) || !dk.is_finite() {
                return Err(SignalError::Singular);
            }
            d[k] = dk;

            if k + 1 < n {
                let mut e = self.off1[k];
                if k >= 1 {
                    e -= l1[k - 1] * l2[k - 1] * d[k - 1];
                }
                l1[k] = e / dk;
            }
            if k + 2 < n {
                l2[k] = self.off2[k] / dk;
            }
        }

        // L z = rhs
        let mut z = rhs.to_vec();
        for k in 0..n {
            if k >= 1 {
                z[k] -= l1[k - 1] * z[k - 1];
            }
            if k >= 2 {
                z[k] -= l2[k - 2] * z[k - 2];
            }
        }
        for k in 0..n {
            z[k] /= d[k];
        }
        // Lᵀ x = z
        for k in (0..n).rev() {
            if k + 1 < n {
                z[k] -= l1[k] * z[k + 1];
            }
            if k + 2 < n {
                z[k] -= l2[k] * z[k + 2];
            }
        }
        Ok(z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dense_mul(m: &Pentadiagonal, x: &[f64]) -> Vec<f64> {
        let n = m.len();
        (0..n)
            .map(|i| {
                let mut acc = m.diag[i] * x[i];
                if i + 1 < n {
                    acc += m.off1[i] * x[i + 1];
                }
                if i + 2 < n {
                    acc += m.off2[i] * x[i + 2];
                }
                if i >= 1 {
                    acc += m.off1[i - 1] * x[i - 1];
                }
                if i >= 2 {
                    acc += m.off2[i - 2] * x[i - 2];
                }
                acc
            })
            .collect()
    }

    #[test]
    fn solves_diagonally_dominant_system() {
        let n = 7;
        let mut m = Pentadiagonal::zeros(n);
        for k in 0..n {
            m.diag[k] = 6.0 + k as f64;
            m.off1[k] = -1.5;
            m.off2[k] = 0.5;
        }
        let expected: Vec<f64> = (0..n).map(|k| (k as f64 * 0.7).sin() + 1.0).collect();
        let rhs = dense_mul(&m, &expected);

        let x = m.solve(&rhs).unwrap();
        for (a, b) in x.iter().zip(expected.iter()) {
            assert!((a - b).abs() < 1e-10, "{a} vs {b}");
        }
    }

    #[test]
    fn second_difference_penalty_annihilates_lines() {
        let p = Pentadiagonal::second_difference_penalty(6);
        let line: Vec<f64> = (0..6).map(|i| 2.0 * i as f64 - 1.0).collect();
        for v in dense_mul(&p, &line) {
            assert!(v.abs() < 1e-12);
        }
        // interior rows carry the 1 -4 6 -4 1 stencil
        assert_eq!(p.diag[2], 6.0);
        assert_eq!(p.off1[2], -4.0);
        assert_eq!(p.off2[2], 1.0);
    }

    #[test]
    fn rejects_indefinite_matrix() {
        let mut m = Pentadiagonal::zeros(3);
        m.diag = vec![1.0, -1.0, 1.0];
        assert_eq!(m.solve(&[1.0, 1.0, 1.0]), Err(SignalError::Singular));
    }
}
