//! Unbalanced binary search tree with recorded descent paths.
//!
//! Nodes live in an index arena; a parent owns its children through
//! `Option<usize>` links. Every operation walks the tree iteratively and
//! returns the keys it visited so the walk can be replayed.

/// Keys the gallery tree starts with.
pub const SEED_KEYS: [i64; 12] = [50, 30, 70, 20, 40, 60, 80, 125, 145, 144, 156, 245];

/// Horizontal room reserved per node by [`Bst::layout`].
const NODE_SIZE: f64 = 40.0;
const HORIZONTAL_SPACING: f64 = 20.0;
const VERTICAL_SPACING: f64 = 60.0;

#[derive(Debug, Clone)]
struct Node {
    key: i64,
    left: Option<usize>,
    right: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

/// How a deleted node left the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Removal {
    /// The node had no children and was detached.
    Leaf,
    /// The node's only child took its place.
    Spliced { child: i64 },
    /// The node took its in-order successor's key; the successor node was
    /// removed from its original position.
    Replaced { successor: i64 },
}

/// Result of a tree operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TreeOutcome {
    Inserted,
    /// Insert found an equal key and left the tree unchanged.
    Duplicate,
    Found,
    NotFound,
    Deleted(Removal),
}

/// Keys visited by one operation, root first, plus what happened.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Descent {
    pub key: i64,
    pub path: Vec<i64>,
    pub outcome: TreeOutcome,
}

impl Descent {
    /// Whether the target key is present after the operation.
    pub fn found(&self) -> bool {
        matches!(
            self.outcome,
            TreeOutcome::Found | TreeOutcome::Inserted | TreeOutcome::Duplicate
        )
    }
}

/// Position of one node as computed by [`Bst::layout`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeLayout {
    pub key: i64,
    pub depth: usize,
    pub x: f64,
    pub y: f64,
}

/// Read-only handle to a node.
#[derive(Clone, Copy)]
pub struct NodeView<'a> {
    tree: &'a Bst,
    id: usize,
}

impl<'a> NodeView<'a> {
    pub fn key(&self) -> i64 {
        self.tree.node(self.id).key
    }

    pub fn left(&self) -> Option<NodeView<'a>> {
        self.tree.view(self.tree.node(self.id).left)
    }

    pub fn right(&self) -> Option<NodeView<'a>> {
        self.tree.view(self.tree.node(self.id).right)
    }
}

impl std::fmt::Debug for NodeView<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeView").field("key", &self.key()).finish()
    }
}

/// Binary search tree over `i64` keys.
#[derive(Debug, Clone, Default)]
pub struct Bst {
    slots: Vec<Option<Node>>,
    free: Vec<usize>,
    root: Option<usize>,
    len: usize,
}

impl Bst {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree by inserting keys in order.
    pub fn from_keys<I: IntoIterator<Item = i64>>(keys: I) -> Self {
        let mut tree = Self::new();
        for key in keys {
            tree.insert(key);
        }
        tree
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn root(&self) -> Option<NodeView<'_>> {
        self.view(self.root)
    }

    fn view(&self, id: Option<usize>) -> Option<NodeView<'_>> {
        id.map(|id| NodeView { tree: self, id })
    }

    // Links only ever point at occupied slots.
    fn node(&self, id: usize) -> &Node {
        match &self.slots[id] {
            Some(node) => node,
            None => panic!("dangling tree link to slot {id}"),
        }
    }

    fn node_mut(&mut self, id: usize) -> &mut Node {
        match &mut self.slots[id] {
            Some(node) => node,
            None => panic!("dangling tree link to slot {id}"),
        }
    }

    fn alloc(&mut self, key: i64) -> usize {
        let node = Node {
            key,
            left: None,
            right: None,
        };
        self.len += 1;
        match self.free.pop() {
            Some(id) => {
                self.slots[id] = Some(node);
                id
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        }
    }

    fn release(&mut self, id: usize) {
        self.slots[id] = None;
        self.free.push(id);
        self.len -= 1;
    }

    fn set_link(&mut self, parent: Option<(usize, Side)>, child: Option<usize>) {
        match parent {
            None => self.root = child,
            Some((id, Side::Left)) => self.node_mut(id).left = child,
            Some((id, Side::Right)) => self.node_mut(id).right = child,
        }
    }

    /// Walk toward `key`. Returns the matching node (if any), the link that
    /// leads to it, and the visited keys.
    fn descend(&self, key: i64) -> (Option<usize>, Option<(usize, Side)>, Vec<i64>) {
        let mut path = Vec::new();
        let mut parent = None;
        let mut cur = self.root;
        while let Some(id) = cur {
            let node = self.node(id);
            path.push(node.key);
            if key < node.key {
                parent = Some((id, Side::Left));
                cur = node.left;
            } else if key > node.key {
                parent = Some((id, Side::Right));
                cur = node.right;
            } else {
                return (Some(id), parent, path);
            }
        }
        (None, parent, path)
    }

    /// Insert `key`. An existing key leaves the tree unchanged.
    pub fn insert(&mut self, key: i64) -> Descent {
        let (existing, parent, mut path) = self.descend(key);
        if existing.is_some() {
            return Descent {
                key,
                path,
                outcome: TreeOutcome::Duplicate,
            };
        }
        let id = self.alloc(key);
        self.set_link(parent, Some(id));
        path.push(key);
        Descent {
            key,
            path,
            outcome: TreeOutcome::Inserted,
        }
    }

    /// Look up `key`.
    pub fn search(&self, key: i64) -> Descent {
        let (found, _, path) = self.descend(key);
        Descent {
            key,
            path,
            outcome: if found.is_some() {
                TreeOutcome::Found
            } else {
                TreeOutcome::NotFound
            },
        }
    }

    pub fn contains(&self, key: i64) -> bool {
        self.descend(key).0.is_some()
    }

    /// Delete `key`.
    ///
    /// The returned path is the descent to the target; the walk to the
    /// in-order successor is not included.
    pub fn delete(&mut self, key: i64) -> Descent {
        let (target, parent, path) = self.descend(key);
        let Some(target) = target else {
            return Descent {
                key,
                path,
                outcome: TreeOutcome::NotFound,
            };
        };

        let (left, right) = {
            let node = self.node(target);
            (node.left, node.right)
        };

        let removal = match (left, right) {
            (None, None) => {
                self.set_link(parent, None);
                self.release(target);
                Removal::Leaf
            }
            (Some(child), None) | (None, Some(child)) => {
                let child_key = self.node(child).key;
                self.set_link(parent, Some(child));
                self.release(target);
                Removal::Spliced { child: child_key }
            }
            (Some(_), Some(right)) => {
                let mut succ_parent = (target, Side::Right);
                let mut succ = right;
                while let Some(next) = self.node(succ).left {
                    succ_parent = (succ, Side::Left);
                    succ = next;
                }
                let successor = self.node(succ).key;
                let succ_right = self.node(succ).right;
                self.node_mut(target).key = successor;
                self.set_link(Some(succ_parent), succ_right);
                self.release(succ);
                Removal::Replaced { successor }
            }
        };

        Descent {
            key,
            path,
            outcome: TreeOutcome::Deleted(removal),
        }
    }

    /// Keys in ascending order.
    pub fn in_order(&self) -> Vec<i64> {
        let mut keys = Vec::with_capacity(self.len);
        let mut stack = Vec::new();
        let mut cur = self.root;
        while cur.is_some() || !stack.is_empty() {
            while let Some(id) = cur {
                stack.push(id);
                cur = self.node(id).left;
            }
            if let Some(id) = stack.pop() {
                keys.push(self.node(id).key);
                cur = self.node(id).right;
            }
        }
        keys
    }

    /// Number of levels; an empty tree has height 0.
    pub fn height(&self) -> usize {
        let mut best = 0;
        let mut stack: Vec<(usize, usize)> = self.root.map(|id| (id, 1)).into_iter().collect();
        while let Some((id, depth)) = stack.pop() {
            best = best.max(depth);
            let node = self.node(id);
            stack.extend(node.left.map(|c| (c, depth + 1)));
            stack.extend(node.right.map(|c| (c, depth + 1)));
        }
        best
    }

    fn subtree_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.slots.len()];
        // Reverse pre-order visits every child before its parent.
        let mut order = Vec::with_capacity(self.len);
        let mut stack: Vec<usize> = self.root.into_iter().collect();
        while let Some(id) = stack.pop() {
            order.push(id);
            let node = self.node(id);
            stack.extend(node.left);
            stack.extend(node.right);
        }
        for &id in order.iter().rev() {
            let node = self.node(id);
            sizes[id] = 1
                + node.left.map_or(0, |c| sizes[c])
                + node.right.map_or(0, |c| sizes[c]);
        }
        sizes
    }

    /// Assign `(x, y)` positions for drawing.
    ///
    /// Each node sits inside its horizontal band at a fraction given by the
    /// size of its left subtree; depth maps to rows.
    pub fn layout(&self) -> Vec<NodeLayout> {
        let sizes = self.subtree_sizes();
        let size_of = |id: Option<usize>| id.map_or(0, |c| sizes[c]);
        let width = self.len as f64 * (NODE_SIZE + HORIZONTAL_SPACING);

        let mut out = Vec::with_capacity(self.len);
        let mut stack: Vec<(usize, usize, f64, f64)> =
            self.root.map(|id| (id, 0, 0.0, width)).into_iter().collect();
        while let Some((id, depth, lo, hi)) = stack.pop() {
            let node = self.node(id);
            let left_count = size_of(node.left) as f64;
            let total = sizes[id] as f64;
            let x = lo + (hi - lo) * ((left_count + 0.5) / total);
            out.push(NodeLayout {
                key: node.key,
                depth,
                x,
                y: depth as f64 * VERTICAL_SPACING,
            });
            if let Some(left) = node.left {
                stack.push((left, depth + 1, lo, x - HORIZONTAL_SPACING / 2.0));
            }
            if let Some(right) = node.right {
                stack.push((right, depth + 1, x + HORIZONTAL_SPACING / 2.0, hi));
            }
        }
        out
    }
}
