use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use launchpad_core::{AppError, AppResult};

use crate::procedure::{OperationDescriptor, Procedure};

/// One node of a [`RouteTree`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteNode {
    /// Callable leaf.
    Operation(OperationDescriptor),
    /// Nested namespace.
    Tree(RouteTree),
}

/// Nested namespace of route operations, keyed by path segment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteTree {
    nodes: BTreeMap<String, RouteNode>,
}

impl RouteTree {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a procedure and returns the tree.
    pub fn with<P: Procedure>(mut self) -> AppResult<Self> {
        self.insert(P::descriptor())?;
        Ok(self)
    }

    /// Inserts one operation at its dotted path.
    ///
    /// Rejects empty segments, a second operation at the same path, and any
    /// path that would turn an operation into a namespace or the reverse.
    pub fn insert(&mut self, descriptor: OperationDescriptor) -> AppResult<()> {
        let segments: Vec<&str> = descriptor.path.split('.').collect();
        if segments.iter().any(|segment| segment.trim().is_empty()) {
            return Err(AppError::Validation(format!(
                "route path '{}' contains an empty segment",
                descriptor.path
            )));
        }

        let Some((leaf, namespaces)) = segments.split_last() else {
            return Err(AppError::Validation("route path must not be empty".to_owned()));
        };

        let mut current = self;
        for segment in namespaces {
            let node = current
                .nodes
                .entry((*segment).to_owned())
                .or_insert_with(|| RouteNode::Tree(RouteTree::new()));
            current = match node {
                RouteNode::Tree(tree) => tree,
                RouteNode::Operation(existing) => {
                    return Err(AppError::Conflict(format!(
                        "route '{}' would nest under operation '{}'",
                        descriptor.path, existing.path
                    )));
                }
            };
        }

        match current.nodes.entry((*leaf).to_owned()) {
            Entry::Vacant(slot) => {
                slot.insert(RouteNode::Operation(descriptor));
                Ok(())
            }
            Entry::Occupied(_) => Err(AppError::Conflict(format!(
                "route '{}' is already defined",
                descriptor.path
            ))),
        }
    }

    /// Returns the node at a dotted path.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&RouteNode> {
        let mut segments = path.split('.');
        let mut node = self.nodes.get(segments.next()?)?;
        for segment in segments {
            node = match node {
                RouteNode::Tree(tree) => tree.nodes.get(segment)?,
                RouteNode::Operation(_) => return None,
            };
        }
        Some(node)
    }

    /// Returns the operation at a dotted path.
    #[must_use]
    pub fn operation(&self, path: &str) -> Option<&OperationDescriptor> {
        match self.get(path)? {
            RouteNode::Operation(descriptor) => Some(descriptor),
            RouteNode::Tree(_) => None,
        }
    }

    /// Returns every operation in path order.
    #[must_use]
    pub fn operations(&self) -> Vec<&OperationDescriptor> {
        let mut operations = Vec::new();
        self.collect_operations(&mut operations);
        operations
    }

    fn collect_operations<'a>(&'a self, operations: &mut Vec<&'a OperationDescriptor>) {
        for node in self.nodes.values() {
            match node {
                RouteNode::Operation(descriptor) => operations.push(descriptor),
                RouteNode::Tree(tree) => tree.collect_operations(operations),
            }
        }
    }

    /// Returns every operation path.
    #[must_use]
    pub fn paths(&self) -> Vec<&'static str> {
        self.operations()
            .into_iter()
            .map(|descriptor| descriptor.path)
            .collect()
    }

    /// Returns the number of operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.operations().len()
    }

    /// Returns whether the tree has no operations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Maps every operation to a value, preserving the nesting.
    ///
    /// Both the server binding table and the client endpoint table are built
    /// through this one transform.
    pub fn map<S>(&self, mut transform: impl FnMut(&OperationDescriptor) -> S) -> Shape<S> {
        self.map_nodes(&mut transform)
    }

    fn map_nodes<S>(&self, transform: &mut impl FnMut(&OperationDescriptor) -> S) -> Shape<S> {
        Shape::Branch(
            self.nodes
                .iter()
                .map(|(segment, node)| {
                    let shape = match node {
                        RouteNode::Operation(descriptor) => Shape::Leaf(transform(descriptor)),
                        RouteNode::Tree(tree) => tree.map_nodes(&mut *transform),
                    };
                    (segment.clone(), shape)
                })
                .collect(),
        )
    }
}

/// A value per operation, nested exactly like the [`RouteTree`] it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape<S> {
    /// Value for one operation.
    Leaf(S),
    /// Nested namespace.
    Branch(BTreeMap<String, Shape<S>>),
}

impl<S> Shape<S> {
    /// Returns the leaf value at a dotted path.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&S> {
        let mut shape = self;
        for segment in path.split('.') {
            shape = match shape {
                Self::Branch(children) => children.get(segment)?,
                Self::Leaf(_) => return None,
            };
        }
        match shape {
            Self::Leaf(value) => Some(value),
            Self::Branch(_) => None,
        }
    }

    /// Returns the leaf value at a dotted path for mutation.
    pub fn get_mut(&mut self, path: &str) -> Option<&mut S> {
        let mut shape = self;
        for segment in path.split('.') {
            shape = match shape {
                Self::Branch(children) => children.get_mut(segment)?,
                Self::Leaf(_) => return None,
            };
        }
        match shape {
            Self::Leaf(value) => Some(value),
            Self::Branch(_) => None,
        }
    }

    /// Returns every leaf with its dotted path, in path order.
    #[must_use]
    pub fn entries(&self) -> Vec<(String, &S)> {
        let mut entries = Vec::new();
        self.collect_entries(None, &mut entries);
        entries
    }

    fn collect_entries<'a>(&'a self, prefix: Option<&str>, entries: &mut Vec<(String, &'a S)>) {
        match self {
            Self::Leaf(value) => entries.push((prefix.unwrap_or_default().to_owned(), value)),
            Self::Branch(children) => {
                for (segment, child) in children {
                    let path = match prefix {
                        Some(prefix) => format!("{prefix}.{segment}"),
                        None => segment.clone(),
                    };
                    child.collect_entries(Some(path.as_str()), entries);
                }
            }
        }
    }

    /// Consumes the shape into its leaves with their dotted paths.
    #[must_use]
    pub fn into_entries(self) -> Vec<(String, S)> {
        let mut entries = Vec::new();
        self.drain_entries(None, &mut entries);
        entries
    }

    fn drain_entries(self, prefix: Option<&str>, entries: &mut Vec<(String, S)>) {
        match self {
            Self::Leaf(value) => entries.push((prefix.unwrap_or_default().to_owned(), value)),
            Self::Branch(children) => {
                for (segment, child) in children {
                    let path = match prefix {
                        Some(prefix) => format!("{prefix}.{segment}"),
                        None => segment,
                    };
                    child.drain_entries(Some(path.as_str()), entries);
                }
            }
        }
    }

    /// Returns every leaf path.
    #[must_use]
    pub fn paths(&self) -> Vec<String> {
        self.entries().into_iter().map(|(path, _)| path).collect()
    }

    /// Returns every leaf value in path order.
    #[must_use]
    pub fn leaves(&self) -> Vec<&S> {
        self.entries().into_iter().map(|(_, value)| value).collect()
    }

    /// Returns whether both shapes nest the same segments the same way.
    #[must_use]
    pub fn same_structure<T>(&self, other: &Shape<T>) -> bool {
        match (self, other) {
            (Self::Leaf(_), Shape::Leaf(_)) => true,
            (Self::Branch(left), Shape::Branch(right)) => {
                left.len() == right.len()
                    && left.iter().all(|(segment, child)| {
                        right
                            .get(segment)
                            .is_some_and(|other_child| child.same_structure(other_child))
                    })
            }
            _ => false,
        }
    }
}
