//! Group hierarchy stored as an arena of nodes.
//!
//! Each node holds one [`Group`] plus the ids of its children. A node's
//! composite result combines its own match with its children's composite
//! results according to the group's [`HierarchyContext`].

mod classify;

use crate::groups::{Group, GroupError, GroupResult};
use crate::record::FieldLookup;
use std::collections::HashSet;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct HierarchyNode {
    group: Group,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl HierarchyNode {
    pub fn group(&self) -> &Group {
        &self.group
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Forest of group nodes.
///
/// Removed nodes leave an empty slot, so ids of surviving nodes stay valid,
/// including across [`GroupTree::deep_copy`]. Slots are never reused: the
/// arena (and the per-record scratch buffer used while matching) grows with
/// every node ever added, not with the live node count.
/// `Clone` is a deep copy: every group gets its own compiled matcher.
#[derive(Debug, Clone, Default)]
pub struct GroupTree {
    nodes: Vec<Option<HierarchyNode>>,
    roots: Vec<NodeId>,
}

impl GroupTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_root(&mut self, group: Group) -> NodeId {
        let id = self.push(group, None);
        self.roots.push(id);
        id
    }

    pub fn add_child(&mut self, parent: NodeId, group: Group) -> GroupResult<NodeId> {
        if self.node(parent).is_none() {
            return Err(GroupError::unknown_node(parent.0));
        }
        let id = self.push(group, Some(parent));
        if let Some(node) = self.node_mut(parent) {
            node.children.push(id);
        }
        Ok(id)
    }

    /// Detaches `id` and destroys its whole subtree, returning the removed
    /// groups in pre-order.
    pub fn remove(&mut self, id: NodeId) -> GroupResult<Vec<Group>> {
        let parent = self
            .node(id)
            .ok_or_else(|| GroupError::unknown_node(id.0))?
            .parent;
        if let Some(parent) = parent {
            if let Some(parent_node) = self.node_mut(parent) {
                parent_node.children.retain(|child| *child != id);
            }
        } else {
            self.roots.retain(|root| *root != id);
        }

        let doomed = self.subtree(id);
        let mut removed = Vec::with_capacity(doomed.len());
        for node_id in doomed {
            if let Some(node) = self.nodes.get_mut(node_id.0).and_then(Option::take) {
                removed.push(node.group);
            }
        }
        debug!(node = id.0, removed = removed.len(), "group subtree removed");
        Ok(removed)
    }

    /// Swaps the group held by `id`, keeping the tree shape. Returns the old group.
    pub fn replace_group(&mut self, id: NodeId, group: Group) -> GroupResult<Group> {
        let node = self
            .node_mut(id)
            .ok_or_else(|| GroupError::unknown_node(id.0))?;
        Ok(std::mem::replace(&mut node.group, group))
    }

    /// Recompiles the group at `id` with a new expression. On failure the node
    /// keeps its previous group.
    pub fn update_expression(
        &mut self,
        id: NodeId,
        expression: &str,
        case_sensitive: bool,
    ) -> GroupResult<()> {
        let current = self.get(id).ok_or_else(|| GroupError::unknown_node(id.0))?;
        let updated = current
            .with_expression(expression, case_sensitive)
            .map_err(|err| {
                warn!(group = %current.name(), error = %err, "group edit rejected");
                GroupError::from(err).in_group(current.name())
            })?;
        self.replace_group(id, updated)?;
        Ok(())
    }

    pub fn get(&self, id: NodeId) -> Option<&Group> {
        self.node(id).map(|node| &node.group)
    }

    pub fn node(&self, id: NodeId) -> Option<&HierarchyNode> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|node| node.children()).unwrap_or(&[])
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|node| node.parent)
    }

    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Number of ancestors above `id`; roots have depth 0.
    pub fn depth(&self, id: NodeId) -> Option<usize> {
        let mut current = self.node(id)?;
        let mut depth = 0;
        while let Some(parent) = current.parent.and_then(|p| self.node(p)) {
            depth += 1;
            current = parent;
        }
        Some(depth)
    }

    /// Live node ids in pre-order (roots in insertion order).
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Group)> + '_ {
        self.preorder()
            .into_iter()
            .filter_map(move |id| self.get(id).map(|group| (id, group)))
    }

    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.iter()
            .find(|(_, group)| group.name() == name)
            .map(|(id, _)| id)
    }

    /// Composite result of a single node. Unknown ids never match.
    pub fn node_matches<R: FieldLookup + ?Sized>(&self, id: NodeId, record: &R) -> bool {
        if self.node(id).is_none() {
            return false;
        }
        let mut results = vec![None; self.nodes.len()];
        self.evaluate_into(id, record, &mut results)
    }

    /// Composite result for each root, in root order.
    pub fn matches<R: FieldLookup + ?Sized>(&self, record: &R) -> Vec<bool> {
        self.roots
            .iter()
            .map(|root| self.node_matches(*root, record))
            .collect()
    }

    /// Every node whose composite result is true, in pre-order.
    pub fn matching_groups<R: FieldLookup + ?Sized>(&self, record: &R) -> Vec<NodeId> {
        let mut results = vec![None; self.nodes.len()];
        for root in &self.roots {
            self.evaluate_into(*root, record, &mut results);
        }
        self.preorder()
            .into_iter()
            .filter(|id| results[id.0] == Some(true))
            .collect()
    }

    /// First occurrence of each structurally distinct group, in pre-order.
    pub fn distinct_groups(&self) -> Vec<&Group> {
        let mut seen = HashSet::new();
        self.iter()
            .filter_map(|(_, group)| seen.insert(group).then_some(group))
            .collect()
    }

    /// Nodes whose group equals a group appearing earlier in pre-order.
    pub fn duplicate_groups(&self) -> Vec<NodeId> {
        let mut seen = HashSet::new();
        self.iter()
            .filter_map(|(id, group)| (!seen.insert(group)).then_some(id))
            .collect()
    }

    pub fn deep_copy(&self) -> Self {
        self.clone()
    }

    fn push(&mut self, group: Group, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Some(HierarchyNode {
            group,
            parent,
            children: Vec::new(),
        }));
        id
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut HierarchyNode> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Evaluates the subtree at `id` bottom-up, recording every node's
    /// composite result. Reversed pre-order visits children before parents,
    /// so depth never grows the call stack.
    fn evaluate_into<R: FieldLookup + ?Sized>(
        &self,
        id: NodeId,
        record: &R,
        results: &mut [Option<bool>],
    ) -> bool {
        for current in self.subtree(id).into_iter().rev() {
            let Some(node) = self.node(current) else {
                continue;
            };
            let children = node
                .children
                .iter()
                .map(|child| results[child.0].unwrap_or(false));
            let hit = node
                .group
                .context()
                .combine(node.group.matches(record), children);
            results[current.0] = Some(hit);
        }
        results.get(id.0).copied().flatten().unwrap_or(false)
    }

    fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.node(current) else {
                continue;
            };
            out.push(current);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    fn preorder(&self) -> Vec<NodeId> {
        self.roots
            .iter()
            .flat_map(|root| self.subtree(*root))
            .collect()
    }
}
