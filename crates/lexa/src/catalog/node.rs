use std::collections::HashMap;

/// A node in a locale's translation tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// A plain template, e.g. `"Hello, {name}!"`.
    Leaf(String),
    /// An intermediate grouping node.
    Branch(Branch),
    /// A terminal node that picks a template by evaluating arm expressions.
    Conditional(Conditional),
}

impl Node {
    /// Whether this node can be resolved to text (a `Leaf` or `Conditional`).
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Node::Branch(_))
    }

    /// Deep-merge `overlay` on top of `base`.
    ///
    /// Two branches merge child by child: children only in `base` keep their
    /// position, children present in both are merged recursively, and children
    /// only in `overlay` are appended. Any other combination is replaced by
    /// `overlay`.
    pub fn merge(base: &Node, overlay: &Node) -> Node {
        match (base, overlay) {
            (Node::Branch(base), Node::Branch(overlay)) => Node::Branch(base.merge(overlay)),
            (_, overlay) => overlay.clone(),
        }
    }
}

/// Ordered mapping from path segment to child node.
///
/// Children keep their declaration order; lookup by segment is a hash probe.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Branch {
    children: Vec<(String, Node)>,
    index: HashMap<String, usize>,
}

impl Branch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a child by segment.
    pub fn get(&self, segment: &str) -> Option<&Node> {
        self.index.get(segment).map(|&idx| &self.children[idx].1)
    }

    /// Whether a child with this segment exists.
    pub fn contains(&self, segment: &str) -> bool {
        self.index.contains_key(segment)
    }

    /// Insert a child, replacing any existing child with the same segment in
    /// place.
    pub fn upsert(&mut self, segment: String, node: Node) {
        if let Some(&idx) = self.index.get(&segment) {
            self.children[idx].1 = node;
        } else {
            self.index.insert(segment.clone(), self.children.len());
            self.children.push((segment, node));
        }
    }

    /// Iterate over children in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.children.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Child segment names in declaration order.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.children.iter().map(|(k, _)| k.as_str())
    }

    /// Deep-merge `overlay` on top of this branch. See [`Node::merge`].
    pub fn merge(&self, overlay: &Branch) -> Branch {
        let mut merged = self.clone();
        for (segment, child) in overlay.iter() {
            let next = match merged.get(segment) {
                Some(existing) => Node::merge(existing, child),
                None => child.clone(),
            };
            merged.upsert(segment.to_string(), next);
        }
        merged
    }

    /// Number of leaf and conditional nodes below this branch.
    pub fn terminal_count(&self) -> usize {
        self.children
            .iter()
            .map(|(_, child)| match child {
                Node::Branch(nested) => nested.terminal_count(),
                Node::Leaf(_) | Node::Conditional(_) => 1,
            })
            .sum()
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

/// A conditional entry: arms are tried in order, first true arm wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conditional {
    pub arms: Vec<Arm>,
    pub default: Option<String>,
}

/// One `(expression, template)` pair of a conditional.
#[derive(Debug, Clone, PartialEq)]
pub struct Arm {
    /// Expression source, compiled on first use.
    pub when: String,
    pub template: String,
}

impl Arm {
    pub fn new(when: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            when: when.into(),
            template: template.into(),
        }
    }
}
