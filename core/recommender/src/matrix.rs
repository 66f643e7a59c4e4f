// cobuy/core/recommender/src/matrix.rs

//! Dense user × product interaction matrix.
//!
//! Rows are the distinct user ids and columns the distinct product ids of one
//! request, both in ascending order. Repeated (user, product) pairs are summed
//! and absent pairs are zero.

use crate::types::{OrderItem, ProductId, RecommendError, UserId};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionMatrix {
    user_ids: Vec<UserId>,
    product_ids: Vec<ProductId>,
    /// Row-major, `user_ids.len() * product_ids.len()` cells
    cells: Vec<u64>,
}

impl InteractionMatrix {
    /// Pivot order items into a dense matrix
    pub fn from_items(items: &[OrderItem]) -> Result<Self, RecommendError> {
        let mut totals: BTreeMap<(UserId, ProductId), u64> = BTreeMap::new();
        let mut products = BTreeSet::new();

        for item in items {
            let total = totals.entry((item.user_id, item.product_id)).or_insert(0);
            *total = total
                .checked_add(item.quantity)
                .ok_or(RecommendError::QuantityOverflow {
                    user_id: item.user_id,
                    product_id: item.product_id,
                })?;
            products.insert(item.product_id);
        }

        let mut user_ids: Vec<UserId> = totals.keys().map(|(user, _)| *user).collect();
        user_ids.dedup();
        let product_ids: Vec<ProductId> = products.into_iter().collect();

        let width = product_ids.len();
        let mut cells = vec![0u64; user_ids.len() * width];

        // BTreeMap keys are sorted by user first, so rows fill in order
        let mut row = 0;
        for ((user, product), total) in totals {
            while user_ids[row] != user {
                row += 1;
            }
            // Every product came from the same items, so the lookup cannot miss
            if let Ok(col) = product_ids.binary_search(&product) {
                cells[row * width + col] = total;
            }
        }

        Ok(Self {
            user_ids,
            product_ids,
            cells,
        })
    }

    pub fn user_ids(&self) -> &[UserId] {
        &self.user_ids
    }

    pub fn product_ids(&self) -> &[ProductId] {
        &self.product_ids
    }

    pub fn num_users(&self) -> usize {
        self.user_ids.len()
    }

    pub fn num_products(&self) -> usize {
        self.product_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Row position of a user, if the user appears in the matrix
    pub fn row_index(&self, user_id: UserId) -> Option<usize> {
        self.user_ids.binary_search(&user_id).ok()
    }

    /// Quantity vector of one user over all product columns
    ///
    /// Panics if `index >= num_users()`.
    pub fn row(&self, index: usize) -> &[u64] {
        let width = self.product_ids.len();
        &self.cells[index * width..(index + 1) * width]
    }

    /// Summed quantity for a pair, zero when either id is absent
    pub fn get(&self, user_id: UserId, product_id: ProductId) -> u64 {
        match (
            self.row_index(user_id),
            self.product_ids.binary_search(&product_id),
        ) {
            (Some(row), Ok(col)) => self.row(row)[col],
            _ => 0,
        }
    }

    /// Element-wise sum of the given rows, one score per product column
    pub fn column_sums<I>(&self, rows: I) -> Result<Vec<u64>, RecommendError>
    where
        I: IntoIterator<Item = usize>,
    {
        let mut sums = vec![0u64; self.product_ids.len()];
        for row in rows {
            for (col, (sum, value)) in sums.iter_mut().zip(self.row(row)).enumerate() {
                *sum = sum
                    .checked_add(*value)
                    .ok_or(RecommendError::ScoreOverflow {
                        product_id: self.product_ids[col],
                    })?;
            }
        }
        Ok(sums)
    }
}
