use crate::value::Value;

///
/// FilterOp
///
/// Leaf operator of a compiled filter. `Within` is the dedicated
/// multi-value membership operator and never expands into an OR chain.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[repr(u8)]
pub enum FilterOp {
    Eq = 0x01,
    Neq = 0x02,
    Gt = 0x03,
    Gte = 0x04,
    Lt = 0x05,
    Lte = 0x06,
    Within = 0x07,
}

impl FilterOp {
    #[must_use]
    pub const fn tag(self) -> u8 {
        self as u8
    }

    /// Backend range-bound keyword, for range operators only.
    #[must_use]
    pub const fn range_bound(self) -> Option<&'static str> {
        match self {
            Self::Gt => Some("gt"),
            Self::Gte => Some("gte"),
            Self::Lt => Some("lt"),
            Self::Lte => Some("lte"),
            Self::Eq | Self::Neq | Self::Within => None,
        }
    }
}

///
/// Combinator
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[repr(u8)]
pub enum Combinator {
    And = 0x10,
    Or = 0x11,
    Not = 0x12,
}

impl Combinator {
    #[must_use]
    pub const fn tag(self) -> u8 {
        self as u8
    }
}

///
/// FilterLeaf
///

#[derive(Clone, Debug, PartialEq)]
pub struct FilterLeaf {
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

///
/// FilterNode
///
/// Compiled filter tree, ready to be rendered into the backend's boolean
/// query structure. Immutable once built.
///

#[derive(Clone, Debug, PartialEq)]
pub enum FilterNode {
    Leaf(FilterLeaf),
    Combinator {
        kind: Combinator,
        children: Vec<Self>,
    },
}

impl FilterNode {
    #[must_use]
    pub fn leaf(field: impl Into<String>, op: FilterOp, value: Value) -> Self {
        Self::Leaf(FilterLeaf {
            field: field.into(),
            op,
            value,
        })
    }

    #[must_use]
    pub fn not(inner: Self) -> Self {
        Self::Combinator {
            kind: Combinator::Not,
            children: vec![inner],
        }
    }

    /// Number of leaves in the tree.
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Leaf(_) => 1,
            Self::Combinator { children, .. } => children.iter().map(Self::leaf_count).sum(),
        }
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::Leaf(_) => 1,
            Self::Combinator { children, .. } => {
                1 + children.iter().map(Self::depth).max().unwrap_or(0)
            }
        }
    }

    #[must_use]
    pub const fn as_leaf(&self) -> Option<&FilterLeaf> {
        match self {
            Self::Leaf(leaf) => Some(leaf),
            Self::Combinator { .. } => None,
        }
    }

    /// Children of a combinator of `kind`, empty for anything else.
    #[must_use]
    pub fn children_of(&self, kind: Combinator) -> &[Self] {
        match self {
            Self::Combinator { kind: k, children } if *k == kind => children,
            _ => &[],
        }
    }
}

/// Combine two compiled filters; AND operands are flattened so clause
/// order is preserved left to right.
#[must_use]
pub fn and(left: FilterNode, right: FilterNode) -> FilterNode {
    let mut children = Vec::new();
    push_flattened(&mut children, left, Combinator::And);
    push_flattened(&mut children, right, Combinator::And);

    FilterNode::Combinator {
        kind: Combinator::And,
        children,
    }
}

/// Combine two compiled filters under OR, flattening nested ORs.
#[must_use]
pub fn or(left: FilterNode, right: FilterNode) -> FilterNode {
    let mut children = Vec::new();
    push_flattened(&mut children, left, Combinator::Or);
    push_flattened(&mut children, right, Combinator::Or);

    FilterNode::Combinator {
        kind: Combinator::Or,
        children,
    }
}

pub(super) fn push_flattened(out: &mut Vec<FilterNode>, node: FilterNode, kind: Combinator) {
    match node {
        FilterNode::Combinator { kind: k, children } if k == kind => out.extend(children),
        other => out.push(other),
    }
}
