// cobuy/core/recommender/src/types.rs

use serde::{Deserialize, Serialize};

/// Identifier of a purchasing user
pub type UserId = i64;

/// Identifier of a product
pub type ProductId = i64;

/// One observed (user, product) purchase with its quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: u64,
}

impl OrderItem {
    pub fn new(user_id: UserId, product_id: ProductId, quantity: u64) -> Self {
        Self {
            user_id,
            product_id,
            quantity,
        }
    }
}

/// Recommendation request: the target user plus every order item the
/// similarity model is built from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationRequest {
    pub user_id: UserId,
    pub order_items: Vec<OrderItem>,
}

/// Ordered product recommendations, best first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub recommended_product_ids: Vec<ProductId>,
}

impl RecommendationResponse {
    /// Response with no recommendations
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.recommended_product_ids.is_empty()
    }
}

/// Error types for recommendation operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecommendError {
    #[error("Quantity overflow for user {user_id}, product {product_id}")]
    QuantityOverflow {
        user_id: UserId,
        product_id: ProductId,
    },

    #[error("Score overflow for product {product_id}")]
    ScoreOverflow { product_id: ProductId },

    #[error("Non-finite cosine distance against user {user_id}")]
    NonFiniteDistance { user_id: UserId },
}
