//! User-vector aggregation over item embeddings.
//!
//! A user's vector is the component-wise **sum** of the vectors of the items
//! they interacted with — summation, not averaging, so magnitude grows with
//! interaction count. That growth is deliberate and downstream models depend
//! on it; see the superposition test below.

use crate::embed::EmbeddingTable;
use crate::error::{CaminarError, Result};
use crate::graph::ItemId;
use crate::primitives::Vector;
use std::collections::HashMap;

/// User identifier. Opaque, no ordering semantics.
pub type UserId = String;

/// Sum each user's item vectors into a user embedding table.
///
/// Interactions whose item has no embedding (below the trainer's frequency
/// threshold, for instance) are skipped silently; a user with zero
/// qualifying interactions is absent from the output rather than mapped to
/// a zero vector.
///
/// # Errors
///
/// Returns [`CaminarError::MalformedInput`] if an interaction carries an
/// empty user or item id.
///
/// # Examples
///
/// ```
/// use caminar::aggregate::aggregate_users;
/// use caminar::embed::EmbeddingTable;
/// use caminar::primitives::Vector;
///
/// let mut items = EmbeddingTable::new(2);
/// items.insert("m1", Vector::from_slice(&[1.0, 0.0])).unwrap();
/// items.insert("m2", Vector::from_slice(&[0.0, 1.0])).unwrap();
///
/// let interactions = vec![
///     ("u1".to_string(), "m1".to_string()),
///     ("u1".to_string(), "m2".to_string()),
/// ];
/// let users = aggregate_users(&interactions, &items).unwrap();
/// assert_eq!(users.get("u1").unwrap().as_slice(), &[1.0, 1.0]);
/// ```
pub fn aggregate_users(
    interactions: &[(UserId, ItemId)],
    items: &EmbeddingTable,
) -> Result<EmbeddingTable> {
    let dimension = items.dimension();
    let mut accumulators: HashMap<UserId, Vector<f32>> = HashMap::new();

    for (position, (user_id, item_id)) in interactions.iter().enumerate() {
        if user_id.is_empty() {
            return Err(CaminarError::malformed_input(format!(
                "empty user id at interaction {position}"
            )));
        }
        if item_id.is_empty() {
            return Err(CaminarError::malformed_input(format!(
                "empty item id at interaction {position}"
            )));
        }
        let Some(item_vector) = items.get(item_id) else {
            continue;
        };
        accumulators
            .entry(user_id.clone())
            .or_insert_with(|| Vector::zeros(dimension))
            .add_assign(item_vector);
    }

    let mut users = EmbeddingTable::new(dimension);
    for (user_id, vector) in accumulators {
        users.insert(user_id, vector)?;
    }
    Ok(users)
}
