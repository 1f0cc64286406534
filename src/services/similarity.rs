use crate::{
    error::{AppError, AppResult},
    models::UserId,
    services::matrix::NormalizedMatrix,
};

/// Square, symmetric user-to-user cosine similarity matrix
///
/// Row and column order match the normalized matrix the scores were computed
/// from. The diagonal is computed (1 for any user with non-zero preference
/// mass) but every consumer must exclude it: a user is never their own
/// neighbor.
#[derive(Debug)]
pub struct SimilarityMatrix {
    users: Vec<UserId>,
    values: Vec<f64>,
}

impl SimilarityMatrix {
    /// Computes pairwise cosine similarity between all user rows
    ///
    /// Operates over the full item space including zero-filled cells. A user
    /// whose row is all zeros has no angle to measure and scores 0 against
    /// everyone. Neighbor weighting needs at least one peer besides the
    /// target, so fewer than 2 users is an explicit failure here instead of
    /// a division by zero later.
    pub fn compute(normalized: &NormalizedMatrix) -> AppResult<Self> {
        let n = normalized.n_users();
        if n < 2 {
            return Err(AppError::DegenerateNeighborhood(format!(
                "need at least 2 users with usage data, got {}",
                n
            )));
        }

        let norms: Vec<f64> = (0..n)
            .map(|row| {
                normalized
                    .row(row)
                    .iter()
                    .map(|v| v * v)
                    .sum::<f64>()
                    .sqrt()
            })
            .collect();

        let mut values = vec![0.0; n * n];
        for i in 0..n {
            for j in i..n {
                let score = cosine(normalized.row(i), normalized.row(j), norms[i], norms[j]);
                values[i * n + j] = score;
                values[j * n + i] = score;
            }
        }

        Ok(Self {
            users: normalized.users().to_vec(),
            values,
        })
    }

    pub fn n_users(&self) -> usize {
        self.users.len()
    }

    pub fn value(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.users.len() + col]
    }
}

fn cosine(a: &[f64], b: &[f64], norm_a: f64, norm_b: f64) -> f64 {
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    dot / (norm_a * norm_b)
}
