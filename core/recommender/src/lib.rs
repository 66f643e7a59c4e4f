// cobuy/core/recommender/src/lib.rs

//! Cobuy Recommendation Core
//!
//! User-based collaborative filtering computed from a single request. The
//! submitted order items are pivoted into a dense user × product matrix, the
//! target user's cosine nearest neighbors are found by brute force, and their
//! quantities are summed into product scores. Products the target user already
//! bought are dropped and the best remaining ids are returned.
//!
//! Nothing is cached or persisted; every call starts from its own input.

pub mod engine;
pub mod matrix;
pub mod neighbors;
pub mod types;

pub use engine::{recommend, Recommender, RecommenderConfig};
pub use matrix::InteractionMatrix;
pub use neighbors::{cosine_distance, nearest_neighbors, Neighbor};
pub use types::*;
