//! Global hash-cons table for [`crate::expr::BoolExpr`].
//!
//! Structurally-equal expressions must map to the *same* allocation so that
//! equality and deduplication across an entire miter instance are pointer
//! comparisons rather than tree walks. The table holds only [`Weak`]
//! references: once every [`Arc`] clone of a node is dropped, the entry
//! disappears on the next insert that happens to hash into the same shard,
//! instead of pinning dead nodes in memory forever.
//!
//! Sharded by key hash so concurrent cone conversions (one task per primary
//! output, see [`crate::cone`]) don't serialize on a single lock.

use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex, Weak};

use once_cell::sync::Lazy;

use crate::expr::ExprNode;

const NUM_SHARDS: usize = 16;

pub(crate) struct InternTable {
    shards: Vec<Mutex<HashMap<u64, Vec<Weak<ExprNode>>>>>,
}

impl InternTable {
    fn new() -> Self {
        Self {
            shards: (0..NUM_SHARDS).map(|_| Mutex::new(HashMap::new())).collect(),
        }
    }

    fn shard_for(&self, key_hash: u64) -> &Mutex<HashMap<u64, Vec<Weak<ExprNode>>>> {
        &self.shards[(key_hash as usize) % self.shards.len()]
    }

    /// Returns the canonical `Arc` for `node`, interning it if this is the
    /// first time this structural shape has been built.
    pub(crate) fn intern(&self, node: ExprNode) -> Arc<ExprNode> {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        node.hash(&mut hasher);
        let key_hash = hasher.finish();

        let shard = self.shard_for(key_hash);
        let mut bucket = shard.lock().unwrap();
        let entries = bucket.entry(key_hash).or_default();

        entries.retain(|weak| weak.strong_count() > 0);
        for weak in entries.iter() {
            if let Some(existing) = weak.upgrade() {
                if *existing == node {
                    return existing;
                }
            }
        }

        let arc = Arc::new(node);
        entries.push(Arc::downgrade(&arc));
        arc
    }
}

static TABLE: Lazy<InternTable> = Lazy::new(InternTable::new);

pub(crate) fn intern(node: ExprNode) -> Arc<ExprNode> {
    TABLE.intern(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::BoolExpr;

    #[test]
    fn test_same_shape_shares_allocation() {
        let a1 = BoolExpr::var(1);
        let b1 = BoolExpr::var(2);
        let and1 = BoolExpr::and([a1.clone(), b1.clone()]);

        let a2 = BoolExpr::var(1);
        let b2 = BoolExpr::var(2);
        let and2 = BoolExpr::and([a2, b2]);

        assert!(and1.ptr_eq(&and2));
    }
}
