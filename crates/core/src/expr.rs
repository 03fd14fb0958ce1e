//! Hash-consed Boolean-expression DAG.
//!
//! Every [`BoolExpr`] is a cheap `Arc` handle into a global, structurally
//! deduplicated table (see [`crate::intern`]): two expressions built the
//! same way, even independently by different threads, always compare equal
//! by pointer. Smart constructors fold constants and cancel complementary
//! operands eagerly, so a [`BoolExpr`] never represents a shape a simplifier
//! would immediately rewrite.
//!
//! Constants are a dedicated variant rather than sentinel-named variables:
//! it keeps `eval`/Tseitin encoding from having to special-case a magic
//! variable index, and it makes "is this expression trivially true/false"
//! a pattern match instead of a name comparison.

use std::fmt::{Display, Formatter};
use std::sync::Arc;

#[derive(Clone)]
pub struct BoolExpr(Arc<ExprNode>);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum ExprNode {
    Var(u32),
    Const(bool),
    Not(BoolExpr),
    And(Vec<BoolExpr>),
    Or(Vec<BoolExpr>),
    Xor(Vec<BoolExpr>),
}

impl PartialEq for BoolExpr {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}
impl Eq for BoolExpr {}

impl std::hash::Hash for BoolExpr {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.0) as usize).hash(state);
    }
}

impl std::fmt::Debug for BoolExpr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

fn ptr_of(e: &BoolExpr) -> usize {
    Arc::as_ptr(&e.0) as usize
}

/// A deterministic ordering key for `e`'s subtree: a structural hash built
/// bottom-up from variable ids and operator shape, never from heap
/// addresses. Two `BoolExpr`s built the same way hash the same in any
/// process, which `ptr_of` cannot promise (allocator addresses aren't
/// reproducible run to run) — load-bearing for emitting the same CNF
/// (modulo variable renaming) across repeated runs on the same netlists.
fn content_key(root: &BoolExpr) -> u64 {
    use std::collections::hash_map::DefaultHasher;
    use std::collections::HashMap;
    use std::hash::{Hash, Hasher};

    let mut memo: HashMap<usize, u64> = HashMap::new();
    let mut stack: Vec<(BoolExpr, bool)> = vec![(root.clone(), false)];

    while let Some((node, expanded)) = stack.pop() {
        let key = ptr_of(&node);
        if memo.contains_key(&key) {
            continue;
        }
        if !expanded {
            stack.push((node.clone(), true));
            let children: Vec<&BoolExpr> = match &*node.0 {
                ExprNode::Var(_) | ExprNode::Const(_) => vec![],
                ExprNode::Not(a) => vec![a],
                ExprNode::And(args) | ExprNode::Or(args) | ExprNode::Xor(args) => args.iter().collect(),
            };
            for child in children {
                if !memo.contains_key(&ptr_of(child)) {
                    stack.push((child.clone(), false));
                }
            }
        } else {
            let mut hasher = DefaultHasher::new();
            match &*node.0 {
                ExprNode::Var(i) => {
                    0u8.hash(&mut hasher);
                    i.hash(&mut hasher);
                }
                ExprNode::Const(b) => {
                    1u8.hash(&mut hasher);
                    b.hash(&mut hasher);
                }
                ExprNode::Not(a) => {
                    2u8.hash(&mut hasher);
                    memo[&ptr_of(a)].hash(&mut hasher);
                }
                ExprNode::And(args) => {
                    3u8.hash(&mut hasher);
                    for a in args {
                        memo[&ptr_of(a)].hash(&mut hasher);
                    }
                }
                ExprNode::Or(args) => {
                    4u8.hash(&mut hasher);
                    for a in args {
                        memo[&ptr_of(a)].hash(&mut hasher);
                    }
                }
                ExprNode::Xor(args) => {
                    5u8.hash(&mut hasher);
                    for a in args {
                        memo[&ptr_of(a)].hash(&mut hasher);
                    }
                }
            }
            memo.insert(key, hasher.finish());
        }
    }

    memo[&ptr_of(root)]
}

fn is_negation_of(a: &BoolExpr, b: &BoolExpr) -> bool {
    match &*a.0 {
        ExprNode::Not(inner) => inner == b,
        _ => match &*b.0 {
            ExprNode::Not(inner) => inner == a,
            _ => false,
        },
    }
}

impl BoolExpr {
    fn make(node: ExprNode) -> Self {
        BoolExpr(crate::intern::intern(node))
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn var(index: u32) -> Self {
        Self::make(ExprNode::Var(index))
    }

    pub fn constant(value: bool) -> Self {
        Self::make(ExprNode::Const(value))
    }

    pub fn is_const(&self, value: bool) -> bool {
        matches!(&*self.0, ExprNode::Const(b) if *b == value)
    }

    pub fn as_const(&self) -> Option<bool> {
        match &*self.0 {
            ExprNode::Const(b) => Some(*b),
            _ => None,
        }
    }

    pub fn not(arg: Self) -> Self {
        match &*arg.0 {
            ExprNode::Const(b) => Self::constant(!b),
            ExprNode::Not(inner) => inner.clone(),
            _ => Self::make(ExprNode::Not(arg)),
        }
    }

    pub fn and<I>(args: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        let mut flat = Vec::new();
        for arg in args {
            match &*arg.0 {
                ExprNode::Const(false) => return Self::constant(false),
                ExprNode::Const(true) => {}
                ExprNode::And(sub) => flat.extend(sub.iter().cloned()),
                _ => flat.push(arg),
            }
        }

        flat.sort_unstable_by_key(content_key);
        flat.dedup_by_key(|e| ptr_of(e));

        for i in 0..flat.len() {
            for j in (i + 1)..flat.len() {
                if is_negation_of(&flat[i], &flat[j]) {
                    return Self::constant(false);
                }
            }
        }

        match flat.len() {
            0 => Self::constant(true),
            1 => flat.into_iter().next().unwrap(),
            _ => Self::make(ExprNode::And(flat)),
        }
    }

    pub fn or<I>(args: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        let mut flat = Vec::new();
        for arg in args {
            match &*arg.0 {
                ExprNode::Const(true) => return Self::constant(true),
                ExprNode::Const(false) => {}
                ExprNode::Or(sub) => flat.extend(sub.iter().cloned()),
                _ => flat.push(arg),
            }
        }

        flat.sort_unstable_by_key(content_key);
        flat.dedup_by_key(|e| ptr_of(e));

        for i in 0..flat.len() {
            for j in (i + 1)..flat.len() {
                if is_negation_of(&flat[i], &flat[j]) {
                    return Self::constant(true);
                }
            }
        }

        match flat.len() {
            0 => Self::constant(false),
            1 => flat.into_iter().next().unwrap(),
            _ => Self::make(ExprNode::Or(flat)),
        }
    }

    pub fn xor<I>(args: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        let mut flat = Vec::new();
        let mut parity = false;
        for arg in args {
            match &*arg.0 {
                ExprNode::Const(b) => parity ^= b,
                ExprNode::Xor(sub) => flat.extend(sub.iter().cloned()),
                _ => flat.push(arg),
            }
        }

        flat.sort_unstable_by_key(content_key);
        // x ^ x cancels: drop pairs of identical pointers.
        let mut pruned: Vec<Self> = Vec::with_capacity(flat.len());
        let mut i = 0;
        while i < flat.len() {
            let mut count = 1;
            while i + count < flat.len() && ptr_of(&flat[i + count]) == ptr_of(&flat[i]) {
                count += 1;
            }
            if count % 2 == 1 {
                pruned.push(flat[i].clone());
            }
            i += count;
        }

        let base = match pruned.len() {
            0 => Self::constant(false),
            1 => pruned.into_iter().next().unwrap(),
            _ => Self::make(ExprNode::Xor(pruned)),
        };

        if parity {
            Self::not(base)
        } else {
            base
        }
    }

    /// Iterative (explicit-stack) post-order evaluation, memoized by node
    /// identity, so a deep DAG can't blow the call stack and shared
    /// sub-expressions are only evaluated once.
    pub fn eval(&self, assignment: &impl Fn(u32) -> bool) -> bool {
        use std::collections::HashMap;

        let mut memo: HashMap<usize, bool> = HashMap::new();
        let mut stack: Vec<(BoolExpr, bool)> = vec![(self.clone(), false)];

        while let Some((node, expanded)) = stack.pop() {
            let key = ptr_of(&node);
            if memo.contains_key(&key) {
                continue;
            }
            if !expanded {
                stack.push((node.clone(), true));
                let children: Vec<&BoolExpr> = match &*node.0 {
                    ExprNode::Var(_) | ExprNode::Const(_) => vec![],
                    ExprNode::Not(a) => vec![a],
                    ExprNode::And(args) | ExprNode::Or(args) | ExprNode::Xor(args) => args.iter().collect(),
                };
                for child in children {
                    if !memo.contains_key(&ptr_of(child)) {
                        stack.push((child.clone(), false));
                    }
                }
            } else {
                let value = match &*node.0 {
                    ExprNode::Var(i) => assignment(*i),
                    ExprNode::Const(b) => *b,
                    ExprNode::Not(a) => !memo[&ptr_of(a)],
                    ExprNode::And(args) => args.iter().all(|a| memo[&ptr_of(a)]),
                    ExprNode::Or(args) => args.iter().any(|a| memo[&ptr_of(a)]),
                    ExprNode::Xor(args) => args.iter().fold(false, |acc, a| acc ^ memo[&ptr_of(a)]),
                };
                memo.insert(key, value);
            }
        }

        memo[&ptr_of(self)]
    }

    pub(crate) fn node(&self) -> &ExprNode {
        &self.0
    }

    /// Stable identity for memoizing per-node work (Tseitin encoding, ...)
    /// outside this module. Two equal `BoolExpr`s always share one pointer.
    pub(crate) fn ptr_id(&self) -> usize {
        ptr_of(self)
    }
}

impl Display for BoolExpr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &*self.0 {
            ExprNode::Var(i) => write!(f, "x{i}"),
            ExprNode::Const(b) => write!(f, "{b}"),
            ExprNode::Not(a) => write!(f, "~{a}"),
            ExprNode::And(args) => write!(f, "({})", args.iter().map(|a| a.to_string()).collect::<Vec<_>>().join(" & ")),
            ExprNode::Or(args) => write!(f, "({})", args.iter().map(|a| a.to_string()).collect::<Vec<_>>().join(" | ")),
            ExprNode::Xor(args) => write!(f, "({})", args.iter().map(|a| a.to_string()).collect::<Vec<_>>().join(" ^ ")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_and_const_folding() {
        let a = BoolExpr::var(1);
        let f = BoolExpr::constant(false);
        assert!(BoolExpr::and([a, f]).is_const(false));
    }

    #[test]
    fn test_or_const_folding() {
        let a = BoolExpr::var(1);
        let t = BoolExpr::constant(true);
        assert!(BoolExpr::or([a, t]).is_const(true));
    }

    #[test]
    fn test_and_complementary_pair_is_false() {
        let a = BoolExpr::var(1);
        let not_a = BoolExpr::not(a.clone());
        assert!(BoolExpr::and([a, not_a]).is_const(false));
    }

    #[test]
    fn test_xor_self_cancels() {
        let a = BoolExpr::var(1);
        assert!(BoolExpr::xor([a.clone(), a]).is_const(false));
    }

    #[test]
    fn test_double_negation_eliminated() {
        let a = BoolExpr::var(1);
        let nn = BoolExpr::not(BoolExpr::not(a.clone()));
        assert!(nn.ptr_eq(&a));
    }

    #[test]
    fn test_eval() {
        let a = BoolExpr::var(0);
        let b = BoolExpr::var(1);
        let expr = BoolExpr::and([a, b]);
        assert!(expr.eval(&|i| i == 0 || i == 1));
        assert!(!expr.eval(&|i| i == 0));
    }

    #[test]
    fn test_hash_consing_across_construction_order() {
        let a = BoolExpr::var(10);
        let b = BoolExpr::var(20);
        let lhs = BoolExpr::and([a.clone(), b.clone()]);
        let rhs = BoolExpr::and([b, a]);
        assert!(lhs.ptr_eq(&rhs));
    }
}
