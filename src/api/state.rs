use std::sync::Arc;

use crate::services::recommender::RecommendationService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub recommender: Arc<RecommendationService>,
    /// Recommendations returned when the request doesn't pass `count`
    pub default_top_n: usize,
}

impl AppState {
    pub fn new(recommender: Arc<RecommendationService>, default_top_n: usize) -> Self {
        Self {
            recommender,
            default_top_n,
        }
    }
}
