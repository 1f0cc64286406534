pub mod group_cache;
pub mod matrix;
pub mod predictor;
pub mod providers;
pub mod recommender;
pub mod roster;
pub mod similarity;
