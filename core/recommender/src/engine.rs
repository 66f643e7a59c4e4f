// cobuy/core/recommender/src/engine.rs

use crate::matrix::InteractionMatrix;
use crate::neighbors::nearest_neighbors;
use crate::types::{ProductId, RecommendError, RecommendationRequest, RecommendationResponse};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// Recommender tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommenderConfig {
    /// Upper bound on the neighbor count; the effective k is `min(neighbors, users)`
    #[serde(default = "default_neighbors")]
    pub neighbors: usize,

    /// Maximum number of product ids returned
    #[serde(default = "default_max_recommendations")]
    pub max_recommendations: usize,
}

fn default_neighbors() -> usize {
    3
}

fn default_max_recommendations() -> usize {
    8
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            neighbors: default_neighbors(),
            max_recommendations: default_max_recommendations(),
        }
    }
}

impl RecommenderConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.neighbors == 0 {
            return Err("recommender.neighbors must be at least 1".to_string());
        }
        if self.max_recommendations == 0 {
            return Err("recommender.max_recommendations must be at least 1".to_string());
        }
        Ok(())
    }
}

/// User-based collaborative filtering rebuilt from each request's items
#[derive(Debug, Clone, Copy, Default)]
pub struct Recommender {
    config: RecommenderConfig,
}

impl Recommender {
    pub fn new(config: RecommenderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RecommenderConfig {
        &self.config
    }

    /// Recommend products the target user has not bought yet, ranked by the
    /// summed quantities of the user's nearest neighbors (the user included).
    pub fn recommend(
        &self,
        request: &RecommendationRequest,
    ) -> Result<RecommendationResponse, RecommendError> {
        if request.order_items.is_empty() {
            debug!(user = request.user_id, "No order items, nothing to recommend");
            return Ok(RecommendationResponse::empty());
        }

        let matrix = InteractionMatrix::from_items(&request.order_items)?;

        let Some(target) = matrix.row_index(request.user_id) else {
            debug!(user = request.user_id, "Target user has no order items");
            return Ok(RecommendationResponse::empty());
        };

        debug!(
            users = matrix.num_users(),
            products = matrix.num_products(),
            "Built interaction matrix"
        );

        let k = self.config.neighbors.min(matrix.num_users());
        let neighbors = nearest_neighbors(&matrix, target, k)?;

        debug!(
            user = request.user_id,
            neighbors = ?neighbors
                .iter()
                .map(|n| matrix.user_ids()[n.row])
                .collect::<Vec<_>>(),
            "Selected nearest neighbors"
        );

        let scores = matrix.column_sums(neighbors.iter().map(|n| n.row))?;

        // Stable sort: equal scores stay in ascending product id order
        let mut ranked: Vec<usize> = (0..matrix.num_products()).collect();
        ranked.sort_by(|&a, &b| scores[b].cmp(&scores[a]));

        let owned: HashSet<ProductId> = request
            .order_items
            .iter()
            .filter(|item| item.user_id == request.user_id)
            .map(|item| item.product_id)
            .collect();

        let recommended_product_ids: Vec<ProductId> = ranked
            .into_iter()
            .map(|col| matrix.product_ids()[col])
            .filter(|product| !owned.contains(product))
            .take(self.config.max_recommendations)
            .collect();

        debug!(
            user = request.user_id,
            count = recommended_product_ids.len(),
            "Generated recommendations"
        );

        Ok(RecommendationResponse {
            recommended_product_ids,
        })
    }
}

/// Recommend with the default configuration (3 neighbors, 8 results)
pub fn recommend(
    request: &RecommendationRequest,
) -> Result<RecommendationResponse, RecommendError> {
    Recommender::default().recommend(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OrderItem;

    fn request(user_id: i64, items: &[(i64, i64, u64)]) -> RecommendationRequest {
        RecommendationRequest {
            user_id,
            order_items: items
                .iter()
                .map(|&(u, p, q)| OrderItem::new(u, p, q))
                .collect(),
        }
    }

    fn ids(request: &RecommendationRequest) -> Vec<i64> {
        recommend(request).unwrap().recommended_product_ids
    }

    #[test]
    fn test_empty_items() {
        assert!(ids(&request(1, &[])).is_empty());
    }

    #[test]
    fn test_absent_user() {
        assert!(ids(&request(42, &[(1, 100, 2), (2, 200, 1)])).is_empty());
    }

    #[test]
    fn test_single_user_single_product() {
        assert!(ids(&request(1, &[(1, 100, 2)])).is_empty());
    }

    #[test]
    fn test_two_users_tie_broken_by_product_id() {
        let req = request(1, &[(1, 100, 2), (2, 100, 1), (2, 200, 3)]);
        assert_eq!(ids(&req), vec![200]);
    }

    #[test]
    fn test_ranked_by_neighbor_quantity() {
        // User 1 shares product 100 with users 2 and 3; user 4 is unrelated
        let req = request(
            1,
            &[
                (1, 100, 1),
                (2, 100, 1),
                (2, 300, 2),
                (3, 100, 1),
                (3, 200, 5),
                (4, 400, 9),
            ],
        );
        // Neighbors are users 1, 2 and 3: scores 100=3, 200=5, 300=2, 400=0
        assert_eq!(ids(&req), vec![200, 300, 400]);
    }

    #[test]
    fn test_only_k_nearest_contribute() {
        let req = request(
            1,
            &[
                (1, 100, 1),
                (2, 100, 1),
                (2, 200, 1),
                (3, 100, 1),
                (3, 300, 1),
                (4, 500, 50),
            ],
        );
        // User 4 is not among the 3 nearest, so product 500 scores 0 and ranks last
        assert_eq!(ids(&req), vec![200, 300, 500]);
    }

    #[test]
    fn test_owned_products_filtered_even_with_zero_quantity() {
        let req = request(1, &[(1, 100, 0), (1, 200, 1), (2, 100, 5), (2, 300, 1)]);
        let result = ids(&req);
        assert!(!result.contains(&100));
        assert!(!result.contains(&200));
        assert_eq!(result, vec![300]);
    }

    #[test]
    fn test_truncated_to_max_recommendations() {
        let mut items = vec![(1, 0, 1), (2, 0, 1)];
        for product in 1..=20 {
            items.push((2, product, product as u64));
        }
        let result = ids(&request(1, &items));

        assert_eq!(result.len(), 8);
        assert_eq!(result, vec![20, 19, 18, 17, 16, 15, 14, 13]);
    }

    #[test]
    fn test_custom_config() {
        let recommender = Recommender::new(RecommenderConfig {
            neighbors: 1,
            max_recommendations: 1,
        });
        let req = request(1, &[(1, 100, 1), (2, 100, 1), (2, 200, 1), (2, 300, 4)]);

        // Only user 1 itself is a neighbor, so every candidate scores 0
        let response = recommender.recommend(&req).unwrap();
        assert_eq!(response.recommended_product_ids, vec![200]);
    }

    #[test]
    fn test_deterministic() {
        let req = request(3, &[(3, 10, 1), (1, 10, 2), (1, 20, 1), (2, 30, 4), (3, 40, 2)]);
        assert_eq!(ids(&req), ids(&req));
    }

    #[test]
    fn test_quantities_beyond_u32() {
        let big = u64::from(u32::MAX) + 1;
        let req = request(1, &[(1, 100, big), (1, 100, big), (2, 200, 1)]);
        assert_eq!(ids(&req), vec![200]);
    }

    #[test]
    fn test_quantity_overflow_is_an_error() {
        let req = request(1, &[(1, 100, u64::MAX), (1, 100, 1), (2, 200, 1)]);
        assert_eq!(
            recommend(&req),
            Err(RecommendError::QuantityOverflow {
                user_id: 1,
                product_id: 100,
            })
        );
    }

    #[test]
    fn test_config_validation() {
        assert!(RecommenderConfig::default().validate().is_ok());
        let zero_neighbors = RecommenderConfig {
            neighbors: 0,
            ..Default::default()
        };
        assert!(zero_neighbors.validate().is_err());
        let zero_results = RecommenderConfig {
            max_recommendations: 0,
            ..Default::default()
        };
        assert!(zero_results.validate().is_err());
    }
}
