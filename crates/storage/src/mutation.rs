//! Mutation requests and in-batch flattening.

use alloc::vec::Vec;
use hashbrown::HashMap;
use tessel_core::{Op, Scalar};

/// A change to one row, addressed by primary key.
#[derive(Clone, Debug, PartialEq)]
pub enum Mutation {
    /// Inserts the row, or replaces every cell of an existing row.
    Upsert { pkey: Scalar, values: Vec<Scalar> },
    /// Removes the row.
    Delete { pkey: Scalar },
}

impl Mutation {
    pub fn upsert(pkey: impl Into<Scalar>, values: Vec<Scalar>) -> Self {
        Mutation::Upsert {
            pkey: pkey.into(),
            values,
        }
    }

    pub fn delete(pkey: impl Into<Scalar>) -> Self {
        Mutation::Delete { pkey: pkey.into() }
    }

    #[inline]
    pub fn pkey(&self) -> &Scalar {
        match self {
            Mutation::Upsert { pkey, .. } | Mutation::Delete { pkey } => pkey,
        }
    }

    /// Returns the wire operation this mutation is reported as.
    #[inline]
    pub fn op(&self) -> Op {
        match self {
            Mutation::Upsert { .. } => Op::Insert,
            Mutation::Delete { .. } => Op::Delete,
        }
    }
}

/// Collapses a batch to one mutation per primary key.
///
/// The last mutation for a key wins; keys keep the position of their first
/// appearance.
pub fn flatten(mutations: Vec<Mutation>) -> Vec<Mutation> {
    let mut positions: HashMap<Scalar, usize> = HashMap::new();
    let mut flattened: Vec<Mutation> = Vec::with_capacity(mutations.len());

    for mutation in mutations {
        match positions.get(mutation.pkey()) {
            Some(&pos) => flattened[pos] = mutation,
            None => {
                positions.insert(mutation.pkey().clone(), flattened.len());
                flattened.push(mutation);
            }
        }
    }

    flattened
}
