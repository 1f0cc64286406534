use crate::{
    error::{AppError, AppResult},
    models::{PredictionRow, UserId},
    services::{matrix::NormalizedMatrix, similarity::SimilarityMatrix},
};

/// Normalized neighbor weights for the target user
///
/// Takes the target's similarity row, drops the self entry, and rescales so
/// the weights sum to 1. All-orthogonal peers leave nothing to weight by and
/// fail explicitly rather than dividing by zero.
pub fn neighbor_weights(
    target_row: usize,
    similarity: &SimilarityMatrix,
) -> AppResult<Vec<(usize, f64)>> {
    let mut weights: Vec<(usize, f64)> = (0..similarity.n_users())
        .filter(|&peer| peer != target_row)
        .map(|peer| (peer, similarity.value(target_row, peer)))
        .collect();

    let total: f64 = weights.iter().map(|(_, sim)| sim).sum();
    if total == 0.0 {
        return Err(AppError::DegenerateNeighborhood(
            "target user has zero similarity to every peer".to_string(),
        ));
    }

    for (_, weight) in &mut weights {
        *weight /= total;
    }

    Ok(weights)
}

/// Predicts preference scores for every game the target hasn't played
///
/// A game counts as unplayed when the target's normalized value is exactly
/// zero. Each unplayed game's score is the weighted average of the peers'
/// normalized playtime on it, weighted by neighbor similarity. Scores are
/// unbounded and only their relative order is meaningful.
///
/// Returns at most `top_n` rows in descending score order; the sort is
/// stable, so equal scores keep catalog (column first-seen) order. A target
/// who has played every game in the catalog gets an empty list, which is a
/// valid outcome, not an error.
pub fn predict(
    target: &UserId,
    normalized: &NormalizedMatrix,
    similarity: &SimilarityMatrix,
    top_n: usize,
) -> AppResult<Vec<PredictionRow>> {
    let target_row = normalized.index_of(target).ok_or_else(|| {
        AppError::DegenerateNeighborhood(format!("no usage data recorded for user {}", target))
    })?;

    let weights = neighbor_weights(target_row, similarity)?;

    let mut predictions: Vec<PredictionRow> = (0..normalized.n_items())
        .filter(|&col| normalized.value(target_row, col) == 0.0)
        .map(|col| {
            let predicted_score: f64 = weights
                .iter()
                .map(|&(peer, weight)| weight * normalized.value(peer, col))
                .sum();
            PredictionRow {
                item_name: normalized.items()[col].clone(),
                predicted_score,
            }
        })
        .collect();

    predictions.sort_by(|a, b| {
        b.predicted_score
            .partial_cmp(&a.predicted_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    predictions.truncate(top_n);

    Ok(predictions)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::models::UsageRecord;
    use crate::services::matrix::UsageMatrix;

    fn uid(raw: &str) -> UserId {
        UserId::parse(raw).unwrap()
    }

    fn record(owner: &UserId, name: &str, hours: f64) -> UsageRecord {
        UsageRecord {
            item_id: 0,
            item_name: name.to_string(),
            usage_hours: hours,
            owner: owner.clone(),
        }
    }

    fn pipeline(records: &[UsageRecord]) -> (NormalizedMatrix, SimilarityMatrix) {
        let normalized = UsageMatrix::build(records).normalize();
        let similarity = SimilarityMatrix::compute(&normalized).unwrap();
        (normalized, similarity)
    }

    /// The worked end-to-end example: A played x 10h, B played x 20h and
    /// y 5h, C played y 15h (zero-hour entries already dropped).
    fn fixture_records() -> (UserId, Vec<UsageRecord>) {
        let a = uid("76561198000000001");
        let b = uid("76561198000000002");
        let c = uid("76561198000000003");
        let records = vec![
            record(&a, "x", 10.0),
            record(&b, "x", 20.0),
            record(&b, "y", 5.0),
            record(&c, "y", 15.0),
        ];
        (a, records)
    }

    #[test]
    fn test_neighbor_weights_sum_to_one() {
        let a = uid("76561198000000001");
        let b = uid("76561198000000002");
        let c = uid("76561198000000003");
        let records = vec![
            record(&a, "x", 10.0),
            record(&a, "y", 2.0),
            record(&b, "x", 20.0),
            record(&b, "y", 5.0),
            record(&c, "y", 15.0),
            record(&c, "x", 1.5),
        ];
        let (_, similarity) = pipeline(&records);

        let weights = neighbor_weights(0, &similarity).unwrap();

        assert_eq!(weights.len(), 2);
        let total: f64 = weights.iter().map(|(_, w)| w).sum();
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_worked_example_predicts_zero_for_y() {
        let (a, records) = fixture_records();
        let (normalized, similarity) = pipeline(&records);

        let predictions = predict(&a, &normalized, &similarity, 5).unwrap();

        // A's only unplayed game is y. B is A's sole similar peer
        // (sim 1.0 vs C's 0.0), and B's normalized value for y is exactly
        // zero because 5h was the global minimum. The predicted score is
        // therefore exactly 0.
        assert_eq!(predictions.len(), 1);
        assert_eq!(predictions[0].item_name, "y");
        assert!(predictions[0].predicted_score.abs() < 1e-12);
    }

    #[test]
    fn test_more_peer_hours_cannot_lower_a_prediction() {
        let a = uid("76561198000000001");
        let b = uid("76561198000000002");

        // A's sub-hour playtime on w carries the global minimum, so the
        // shared game x keeps positive mass for both users.
        let score_for = |hours_on_y: f64| {
            let records = vec![
                record(&a, "x", 2.0),
                record(&a, "w", 0.5),
                record(&b, "x", 2.0),
                record(&b, "y", hours_on_y),
            ];
            let (normalized, similarity) = pipeline(&records);
            predict(&a, &normalized, &similarity, 5)
                .unwrap()
                .into_iter()
                .find(|p| p.item_name == "y")
                .unwrap()
                .predicted_score
        };

        assert!(score_for(8.0) > score_for(4.0));
    }

    #[test]
    fn test_ranking_is_descending_and_truncated() {
        let a = uid("76561198000000001");
        let b = uid("76561198000000002");
        let records = vec![
            record(&a, "x", 5.0),
            record(&b, "x", 5.0),
            record(&b, "long haul", 100.0),
            record(&b, "mid", 10.0),
            record(&b, "short", 2.0),
        ];
        let (normalized, similarity) = pipeline(&records);

        let predictions = predict(&a, &normalized, &similarity, 2).unwrap();

        assert_eq!(predictions.len(), 2);
        assert_eq!(predictions[0].item_name, "long haul");
        assert_eq!(predictions[1].item_name, "mid");
        assert!(predictions[0].predicted_score > predictions[1].predicted_score);
    }

    #[test]
    fn test_equal_scores_keep_catalog_order() {
        let a = uid("76561198000000001");
        let b = uid("76561198000000002");
        // B's identical hours on both unplayed games produce identical
        // scores; the stable sort keeps first-seen column order. A's 0.5h
        // on w holds the global minimum away from the shared game.
        let records = vec![
            record(&a, "x", 5.0),
            record(&a, "w", 0.5),
            record(&b, "x", 5.0),
            record(&b, "first", 7.0),
            record(&b, "second", 7.0),
        ];
        let (normalized, similarity) = pipeline(&records);

        let predictions = predict(&a, &normalized, &similarity, 5).unwrap();

        assert_eq!(predictions[0].item_name, "first");
        assert_eq!(predictions[1].item_name, "second");
        assert_eq!(
            predictions[0].predicted_score,
            predictions[1].predicted_score
        );
    }

    #[test]
    fn test_target_with_no_unplayed_games_gets_empty_list() {
        let a = uid("76561198000000001");
        let b = uid("76561198000000002");
        // Both users played everything in the catalog; B's 2h on x is the
        // global minimum, so none of A's cells normalize to zero.
        let records = vec![
            record(&a, "x", 4.0),
            record(&a, "y", 6.0),
            record(&b, "x", 2.0),
            record(&b, "y", 12.0),
        ];
        let (normalized, similarity) = pipeline(&records);

        let predictions = predict(&a, &normalized, &similarity, 5).unwrap();
        assert!(predictions.is_empty());
    }

    #[test]
    fn test_all_orthogonal_peers_is_degenerate() {
        let a = uid("76561198000000001");
        let b = uid("76561198000000002");
        // No shared games at all: similarity 0, weight sum 0.
        let records = vec![record(&a, "x", 4.0), record(&b, "y", 9.0)];
        let (normalized, similarity) = pipeline(&records);

        let err = predict(&a, &normalized, &similarity, 5).unwrap_err();
        assert!(matches!(err, AppError::DegenerateNeighborhood(_)));
    }

    #[test]
    fn test_unknown_target_is_degenerate() {
        let (_, records) = fixture_records();
        let (normalized, similarity) = pipeline(&records);

        let stranger = uid("76561198000000009");
        let err = predict(&stranger, &normalized, &similarity, 5).unwrap_err();
        assert!(matches!(err, AppError::DegenerateNeighborhood(_)));
    }
}
