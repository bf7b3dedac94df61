//! In-memory page tree with materialized path keys.
//!
//! Each node carries a fixed-width path key (one 4-hex-digit step per
//! level) so a sorted walk over keys yields ancestors before descendants
//! and siblings in insertion order. The host CMS's tree engine owns this
//! data in production; this store mirrors its contract for embedding and
//! testing.

use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{SiteError, SiteResult};

/// Width in characters of one path-key step.
pub const STEP_LEN: usize = 4;

/// Maximum number of children under one parent (one path-key step).
const MAX_SIBLINGS: u32 = 0xFFFF;

/// A tree node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier (UUIDv7).
    pub id: Uuid,

    /// Parent node, `None` for the root.
    pub parent: Option<Uuid>,

    /// Depth in the tree; the root has depth 1.
    pub depth: u32,

    /// Materialized position key, one `STEP_LEN` step per level.
    pub path_key: String,

    /// Unix timestamp when created.
    pub created: i64,
}

/// Page tree store: nodes keyed by id plus a key-ordered index.
#[derive(Debug, Clone)]
pub struct PageTree {
    nodes: HashMap<Uuid, Node>,
    /// path_key → node id, sorted so ancestors precede descendants.
    order: BTreeMap<String, Uuid>,
    root: Uuid,
}

impl PageTree {
    /// Create a tree holding only a root node.
    pub fn new() -> Self {
        let root = Node {
            id: Uuid::now_v7(),
            parent: None,
            depth: 1,
            path_key: "0001".to_string(),
            created: chrono::Utc::now().timestamp(),
        };
        let root_id = root.id;
        let mut order = BTreeMap::new();
        order.insert(root.path_key.clone(), root_id);
        let mut nodes = HashMap::new();
        nodes.insert(root_id, root);
        Self {
            nodes,
            order,
            root: root_id,
        }
    }

    /// Rebuild a tree from a flat node list (snapshot load).
    ///
    /// Validates structural invariants: exactly one root, unique ids and
    /// path keys, parents present, and each child key extending its
    /// parent's key by one step.
    pub fn from_nodes(nodes: Vec<Node>) -> SiteResult<Self> {
        let mut map: HashMap<Uuid, Node> = HashMap::with_capacity(nodes.len());
        let mut order: BTreeMap<String, Uuid> = BTreeMap::new();
        let mut root = None;

        for node in nodes {
            if node.parent.is_none() {
                if root.is_some() {
                    return Err(SiteError::Config("multiple root nodes".into()));
                }
                root = Some(node.id);
            }
            if order.insert(node.path_key.clone(), node.id).is_some() {
                return Err(SiteError::Config(format!(
                    "duplicate path key '{}'",
                    node.path_key
                )));
            }
            if map.insert(node.id, node).is_some() {
                return Err(SiteError::Config("duplicate node id".into()));
            }
        }

        let Some(root) = root else {
            return Err(SiteError::Config("tree has no root node".into()));
        };

        for node in map.values() {
            if node.path_key.len() != node.depth as usize * STEP_LEN {
                return Err(SiteError::Config(format!(
                    "path key '{}' inconsistent with depth {}",
                    node.path_key, node.depth
                )));
            }
            if let Some(parent_id) = node.parent {
                let Some(parent) = map.get(&parent_id) else {
                    return Err(SiteError::Config(format!(
                        "node {} references missing parent {parent_id}",
                        node.id
                    )));
                };
                if !node.path_key.starts_with(&parent.path_key)
                    || node.path_key.len() != parent.path_key.len() + STEP_LEN
                {
                    return Err(SiteError::Config(format!(
                        "path key '{}' does not extend parent key '{}'",
                        node.path_key, parent.path_key
                    )));
                }
            }
        }

        Ok(Self {
            nodes: map,
            order,
            root,
        })
    }

    /// The root node id.
    pub fn root(&self) -> Uuid {
        self.root
    }

    /// Number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree holds only the root.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Whether a node id exists in the tree.
    pub fn contains(&self, id: Uuid) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Look up a node, failing with [`SiteError::UnknownNode`].
    pub fn node(&self, id: Uuid) -> SiteResult<&Node> {
        self.nodes.get(&id).ok_or(SiteError::UnknownNode(id))
    }

    /// Children of a node in sibling order. Empty for unknown ids.
    pub fn children(&self, id: Uuid) -> Vec<Uuid> {
        let Some(parent) = self.nodes.get(&id) else {
            return Vec::new();
        };
        let prefix = parent.path_key.as_str();
        let child_len = prefix.len() + STEP_LEN;
        self.order
            .range::<str, _>((Bound::Excluded(prefix), Bound::Unbounded))
            .take_while(|(key, _)| key.starts_with(prefix))
            .filter(|(key, _)| key.len() == child_len)
            .map(|(_, id)| *id)
            .collect()
    }

    /// All descendants of a node (excluding it), ancestors first.
    pub fn descendants(&self, id: Uuid) -> Vec<Uuid> {
        let Some(node) = self.nodes.get(&id) else {
            return Vec::new();
        };
        let prefix = node.path_key.as_str();
        self.order
            .range::<str, _>((Bound::Excluded(prefix), Bound::Unbounded))
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(_, id)| *id)
            .collect()
    }

    /// Ancestors of a node from root to its parent (excluding the node).
    pub fn ancestors(&self, id: Uuid) -> SiteResult<Vec<Uuid>> {
        let mut chain = Vec::new();
        let mut current = self.node(id)?.parent;
        while let Some(parent_id) = current {
            chain.push(parent_id);
            current = self.node(parent_id)?.parent;
        }
        chain.reverse();
        Ok(chain)
    }

    /// Whether `ancestor` lies on the path from root to `node` (or is it).
    pub fn in_subtree(&self, ancestor: Uuid, node: Uuid) -> bool {
        match (self.nodes.get(&ancestor), self.nodes.get(&node)) {
            (Some(a), Some(n)) => n.path_key.starts_with(&a.path_key),
            _ => false,
        }
    }

    /// Insert a new node as the last child of `parent`.
    pub fn add_child(&mut self, parent: Uuid) -> SiteResult<Uuid> {
        let (parent_key, parent_depth) = {
            let p = self.node(parent)?;
            (p.path_key.clone(), p.depth)
        };
        let path_key = self.next_child_key(&parent_key)?;
        let node = Node {
            id: Uuid::now_v7(),
            parent: Some(parent),
            depth: parent_depth + 1,
            path_key: path_key.clone(),
            created: chrono::Utc::now().timestamp(),
        };
        let id = node.id;
        self.order.insert(path_key, id);
        self.nodes.insert(id, node);
        Ok(id)
    }

    /// Move a node (with its whole subtree) under a new parent, as its
    /// last child. Rewrites path keys and depths for every moved node.
    pub fn move_subtree(&mut self, node: Uuid, new_parent: Uuid) -> SiteResult<()> {
        if node == self.root {
            return Err(SiteError::InvalidOperation(
                "cannot move the root node".into(),
            ));
        }
        let (node_key, node_depth) = {
            let n = self.node(node)?;
            (n.path_key.clone(), n.depth)
        };
        let (parent_key, parent_depth) = {
            let p = self.node(new_parent)?;
            if p.path_key.starts_with(&node_key) {
                return Err(SiteError::InvalidOperation(
                    "cannot move a node under its own subtree".into(),
                ));
            }
            (p.path_key.clone(), p.depth)
        };

        let new_key = self.next_child_key(&parent_key)?;
        let depth_delta = i64::from(parent_depth) + 1 - i64::from(node_depth);

        let mut ids = vec![node];
        ids.extend(self.descendants(node));
        for id in ids {
            let Some(n) = self.nodes.get_mut(&id) else {
                continue;
            };
            let suffix = n.path_key[node_key.len()..].to_string();
            let old_key = std::mem::replace(&mut n.path_key, format!("{new_key}{suffix}"));
            n.depth = u32::try_from(i64::from(n.depth) + depth_delta)
                .map_err(|_| SiteError::InvalidOperation("depth underflow on move".into()))?;
            let rekeyed = n.path_key.clone();
            self.order.remove(&old_key);
            self.order.insert(rekeyed, id);
        }
        if let Some(n) = self.nodes.get_mut(&node) {
            n.parent = Some(new_parent);
        }
        Ok(())
    }

    /// Remove a node and its whole subtree. Returns the removed ids so
    /// the caller can cascade slug and path deletion.
    pub fn remove_subtree(&mut self, node: Uuid) -> SiteResult<Vec<Uuid>> {
        if node == self.root {
            return Err(SiteError::InvalidOperation(
                "cannot remove the root node".into(),
            ));
        }
        self.node(node)?;
        let mut ids = vec![node];
        ids.extend(self.descendants(node));
        for id in &ids {
            if let Some(n) = self.nodes.remove(id) {
                self.order.remove(&n.path_key);
            }
        }
        Ok(ids)
    }

    /// Iterate nodes in path-key order (ancestors before descendants).
    pub fn iter_path_order(&self) -> impl Iterator<Item = &Node> + '_ {
        self.order.values().filter_map(|id| self.nodes.get(id))
    }

    /// Allocate the next free child key under `parent_key`.
    fn next_child_key(&self, parent_key: &str) -> SiteResult<String> {
        let child_len = parent_key.len() + STEP_LEN;
        let last = self
            .order
            .range::<str, _>((Bound::Excluded(parent_key), Bound::Unbounded))
            .take_while(|(key, _)| key.starts_with(parent_key))
            .filter(|(key, _)| key.len() == child_len)
            .last();
        let next = match last {
            None => 1,
            Some((key, _)) => {
                let suffix = &key[key.len() - STEP_LEN..];
                let n = u32::from_str_radix(suffix, 16)
                    .map_err(|_| SiteError::Config(format!("corrupt path key '{key}'")))?;
                n + 1
            }
        };
        if next > MAX_SIBLINGS {
            return Err(SiteError::InvalidOperation(format!(
                "sibling limit reached under key '{parent_key}'"
            )));
        }
        Ok(format!("{parent_key}{next:04x}"))
    }
}

impl Default for PageTree {
    fn default() -> Self {
        Self::new()
    }
}
