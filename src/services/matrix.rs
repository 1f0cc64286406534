use std::collections::HashMap;

use crate::models::{UsageRecord, UserId};

/// Dense user-by-game matrix of raw hours played
///
/// Rows are users in first-seen record order, columns are game names in
/// first-seen order, and a `None` cell means no record was observed for
/// that (user, game) pair. Input is filtered to positive hours upstream;
/// a zero-hour record carries no preference signal.
pub struct UsageMatrix {
    users: Vec<UserId>,
    items: Vec<String>,
    /// Row-major, `users.len() * items.len()`
    cells: Vec<Option<f64>>,
}

impl UsageMatrix {
    /// Builds the matrix from a flat record set
    ///
    /// Deterministic: row and column order derive purely from the order
    /// owners and games first appear in `records`. Providers report each
    /// (owner, game) pair once; if a duplicate slips through, the last
    /// record wins.
    pub fn build(records: &[UsageRecord]) -> Self {
        let mut users = Vec::new();
        let mut user_index: HashMap<UserId, usize> = HashMap::new();
        let mut items = Vec::new();
        let mut item_index: HashMap<String, usize> = HashMap::new();

        for record in records {
            if !user_index.contains_key(&record.owner) {
                user_index.insert(record.owner.clone(), users.len());
                users.push(record.owner.clone());
            }
            if !item_index.contains_key(&record.item_name) {
                item_index.insert(record.item_name.clone(), items.len());
                items.push(record.item_name.clone());
            }
        }

        let mut cells = vec![None; users.len() * items.len()];
        let n_items = items.len();
        for record in records {
            let row = user_index[&record.owner];
            let col = item_index[&record.item_name];
            cells[row * n_items + col] = Some(record.usage_hours);
        }

        Self {
            users,
            items,
            cells,
        }
    }

    pub fn n_users(&self) -> usize {
        self.users.len()
    }

    pub fn n_items(&self) -> usize {
        self.items.len()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.cells[row * self.items.len() + col]
    }

    /// Rescales raw hours into non-negative preference mass
    ///
    /// Hours-played distributions are heavy-tailed, so each defined cell is
    /// log-compressed to keep a handful of thousand-hour libraries from
    /// dominating similarity. The whole matrix is then shifted by its global
    /// minimum so the smallest defined value lands on exactly zero, and
    /// missing cells are filled with zero after the shift. Cosine similarity
    /// downstream reads negative components as opposing preference, which
    /// observed playtime never is.
    pub fn normalize(&self) -> NormalizedMatrix {
        let logged: Vec<Option<f64>> = self.cells.iter().map(|c| c.map(f64::ln)).collect();

        let global_min = logged
            .iter()
            .flatten()
            .fold(f64::INFINITY, |min, v| min.min(*v));
        // An empty matrix has no defined cells and nothing to shift.
        let shift = if global_min.is_finite() {
            global_min
        } else {
            0.0
        };

        let values = logged
            .into_iter()
            .map(|c| c.map(|v| v - shift).unwrap_or(0.0))
            .collect();

        NormalizedMatrix {
            users: self.users.clone(),
            items: self.items.clone(),
            values,
        }
    }
}

/// Log-scaled, shifted, zero-filled usage matrix
///
/// Same shape and ordering as the [`UsageMatrix`] it came from; every value
/// is defined and ≥ 0.
pub struct NormalizedMatrix {
    users: Vec<UserId>,
    items: Vec<String>,
    values: Vec<f64>,
}

impl NormalizedMatrix {
    pub fn n_users(&self) -> usize {
        self.users.len()
    }

    pub fn n_items(&self) -> usize {
        self.items.len()
    }

    pub fn users(&self) -> &[UserId] {
        &self.users
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn value(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.items.len() + col]
    }

    /// One user's full item vector
    pub fn row(&self, row: usize) -> &[f64] {
        let n = self.items.len();
        &self.values[row * n..(row + 1) * n]
    }

    /// Row index for a user, if they have any usage in the matrix
    pub fn index_of(&self, user: &UserId) -> Option<usize> {
        self.users.iter().position(|u| u == user)
    }
}
