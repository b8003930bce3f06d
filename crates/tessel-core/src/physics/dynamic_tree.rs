// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! # Dynamic AABB Tree
//!
//! A binary tree of axis-aligned boxes for broad-phase collision detection.
//! Leaves carry a key (typically an entity handle) and its box; every internal
//! node stores the merge of its two children. New leaves are placed with a
//! surface-area heuristic and ancestors are refitted on the way back up.
//!
//! Nodes live in a pool of slots addressed by `i32` index. Free slots are
//! chained through [`DynamicTreeNode::next`], and the pool grows by a fixed
//! increment when the chain runs dry. A side map tracks which key owns which
//! leaf so callers work with keys, never with raw node indices.

use bytemuck::Zeroable;

use crate::collections::{LinearMap, ResizeableArray};
use crate::math::Aabb;
use crate::CoreError;

/// Index value meaning "no node".
pub const NULL_NODE: i32 = -1;

/// Node pool size used by [`DynamicTree::new`].
pub const DEFAULT_CAPACITY: usize = 16;

/// A node in the dynamic tree.
#[derive(Debug, Clone, Copy)]
pub struct DynamicTreeNode<K> {
    /// Box of the leaf, or merge of the children for an internal node.
    pub aabb: Aabb,
    /// Key of the leaf. Meaningless on internal and free nodes.
    pub owner: K,
    /// Index of the parent node.
    pub parent: i32,
    /// Indices of child nodes (if internal).
    pub children: [i32; 2],
    /// Next free node, while this node sits in the free list.
    pub next: i32,
}

// SAFETY: every field is plain data whose all-zero pattern is valid when `K`'s is.
unsafe impl<K: Zeroable> Zeroable for DynamicTreeNode<K> {}

impl<K: Zeroable> DynamicTreeNode<K> {
    /// Returns true if this node is a leaf (has no children).
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children[0] == NULL_NODE
    }

    fn vacant(next: i32) -> Self {
        Self {
            aabb: Aabb::ZERO,
            owner: K::zeroed(),
            parent: NULL_NODE,
            children: [NULL_NODE, NULL_NODE],
            next,
        }
    }
}

/// A dynamic AABB tree keyed by `K`.
pub struct DynamicTree<K> {
    nodes: ResizeableArray<DynamicTreeNode<K>>,
    leaves: LinearMap<K, i32>,
    root: i32,
    free_list: i32,
    node_count: usize,
    growth: usize,
}

impl<K> Default for DynamicTree<K>
where
    K: Copy + PartialEq + Zeroable,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> DynamicTree<K>
where
    K: Copy + PartialEq + Zeroable,
{
    /// Creates an empty tree with a pool of [`DEFAULT_CAPACITY`] nodes.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY, DEFAULT_CAPACITY)
    }

    /// Creates an empty tree with `initial_nodes` pooled nodes that grows by
    /// `growth` nodes whenever the pool is exhausted.
    pub fn with_capacity(initial_nodes: usize, growth: usize) -> Self {
        let mut tree = Self {
            nodes: ResizeableArray::with_capacity(0),
            leaves: LinearMap::with_capacity(0),
            root: NULL_NODE,
            free_list: NULL_NODE,
            node_count: 0,
            growth: growth.max(1),
        };
        tree.extend_pool(initial_nodes.max(1));
        tree
    }

    /// Inserts a new leaf for `key` and returns its node index.
    ///
    /// Fails with [`CoreError::DuplicateKey`] if `key` already has a leaf.
    pub fn insert(&mut self, key: K, aabb: Aabb) -> Result<i32, CoreError> {
        if self.leaves.contains_key(&key) {
            return Err(CoreError::DuplicateKey);
        }

        let leaf = self.allocate_node();
        self.nodes[leaf as usize].aabb = aabb;
        self.nodes[leaf as usize].owner = key;
        if let Err(err) = self.leaves.insert(key, leaf) {
            self.deallocate_node(leaf);
            return Err(err);
        }

        self.insert_leaf(leaf);
        log::trace!("DynamicTree: inserted leaf {leaf} ({} leaves)", self.leaves.len());
        Ok(leaf)
    }

    /// Removes the leaf of `key`.
    pub fn remove(&mut self, key: K) -> Result<(), CoreError> {
        let leaf = self.leaves.remove(&key).ok_or(CoreError::KeyNotFound)?;
        self.remove_leaf(leaf);
        self.deallocate_node(leaf);
        Ok(())
    }

    /// Moves the leaf of `key` to `aabb`.
    ///
    /// When the stored box already contains `aabb` nothing changes and `false`
    /// is returned. Otherwise the leaf is detached, given the new box and
    /// reinserted, keeping its node index, and `true` is returned.
    pub fn update(&mut self, key: K, aabb: Aabb) -> Result<bool, CoreError> {
        let leaf = self.leaves.get(&key).ok_or(CoreError::KeyNotFound)?;
        if self.nodes[leaf as usize].aabb.contains(&aabb) {
            return Ok(false);
        }

        self.remove_leaf(leaf);
        self.nodes[leaf as usize].aabb = aabb;
        self.insert_leaf(leaf);
        Ok(true)
    }

    /// Returns the keys of every other leaf whose box overlaps the stored box of `key`.
    ///
    /// After an [`update`](Self::update) that kept a larger stored box, this
    /// can report leaves the key's current box no longer touches; use
    /// [`query_overlaps_with`](Self::query_overlaps_with) for those.
    pub fn query_overlaps(&self, key: K) -> Result<Vec<K>, CoreError> {
        let leaf = self.leaves.get(&key).ok_or(CoreError::KeyNotFound)?;
        let probe = self.nodes[leaf as usize].aabb;
        Ok(self.overlaps_except(leaf, &probe))
    }

    /// Returns the keys of every other leaf whose box overlaps `aabb`, the
    /// current box of `key`.
    pub fn query_overlaps_with(&self, key: K, aabb: &Aabb) -> Result<Vec<K>, CoreError> {
        let leaf = self.leaves.get(&key).ok_or(CoreError::KeyNotFound)?;
        Ok(self.overlaps_except(leaf, aabb))
    }

    fn overlaps_except(&self, leaf: i32, probe: &Aabb) -> Vec<K> {
        let mut hits = Vec::new();
        let mut stack = Vec::with_capacity(64);
        stack.push(self.root);

        while let Some(node_id) = stack.pop() {
            let node = &self.nodes[node_id as usize];
            if !node.aabb.overlaps(probe) {
                continue;
            }
            if node.is_leaf() {
                if node_id != leaf {
                    hits.push(node.owner);
                }
            } else {
                stack.push(node.children[0]);
                stack.push(node.children[1]);
            }
        }
        hits
    }

    /// Queries the tree for leaves overlapping the given AABB.
    ///
    /// The traversal stops as soon as `callback` returns `false`.
    pub fn query<F>(&self, aabb: &Aabb, mut callback: F)
    where
        F: FnMut(&K) -> bool,
    {
        if self.root == NULL_NODE {
            return;
        }

        let mut stack = Vec::with_capacity(64);
        stack.push(self.root);

        while let Some(node_id) = stack.pop() {
            let node = &self.nodes[node_id as usize];
            if node.aabb.overlaps(aabb) {
                if node.is_leaf() {
                    if !callback(&node.owner) {
                        return;
                    }
                } else {
                    stack.push(node.children[0]);
                    stack.push(node.children[1]);
                }
            }
        }
    }

    /// Returns `true` if `key` has a leaf in the tree.
    pub fn contains(&self, key: K) -> bool {
        self.leaves.contains_key(&key)
    }

    /// Node index of the leaf of `key`.
    pub fn node_of(&self, key: K) -> Option<i32> {
        self.leaves.get(&key)
    }

    /// Stored box of the leaf of `key`.
    pub fn leaf_aabb(&self, key: K) -> Option<Aabb> {
        self.leaves.get(&key).map(|leaf| self.nodes[leaf as usize].aabb)
    }

    /// Returns the node at `index`, if it lies inside the pool.
    pub fn node(&self, index: i32) -> Option<&DynamicTreeNode<K>> {
        usize::try_from(index)
            .ok()
            .filter(|&i| i < self.nodes.capacity())
            .map(|i| &self.nodes[i])
    }

    /// Index of the root node, or [`NULL_NODE`] when empty.
    pub fn root(&self) -> i32 {
        self.root
    }

    /// Number of leaves.
    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    /// Returns `true` if the tree has no leaf.
    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// Number of nodes in use, leaves and internal nodes together.
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Size of the node pool.
    pub fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    /// Iterates over `(key, box)` for every leaf.
    pub fn leaves(&self) -> DynamicTreeIterator<'_, K> {
        let mut stack = Vec::new();
        if self.root != NULL_NODE {
            stack.push(self.root);
        }
        DynamicTreeIterator { tree: self, stack }
    }

    /// Removes every leaf. The node pool keeps its size.
    pub fn clear(&mut self) {
        let capacity = self.nodes.capacity();
        for index in 0..capacity {
            let next = if index + 1 < capacity {
                (index + 1) as i32
            } else {
                NULL_NODE
            };
            self.nodes[index] = DynamicTreeNode::vacant(next);
        }
        self.free_list = if capacity > 0 { 0 } else { NULL_NODE };
        self.leaves.clear();
        self.root = NULL_NODE;
        self.node_count = 0;
    }

    /// Checks the structural invariants of the tree.
    ///
    /// Every internal node has two children pointing back at it and stores the
    /// exact merge of their boxes, every reachable leaf is registered under its
    /// owner, and the reachable node count matches the allocated count.
    pub fn validate(&self) -> bool {
        if self.root == NULL_NODE {
            return self.leaves.is_empty() && self.node_count == 0;
        }
        if self.nodes[self.root as usize].parent != NULL_NODE {
            return false;
        }

        let mut reached = 0;
        let mut leaf_count = 0;
        let mut stack = vec![self.root];
        while let Some(index) = stack.pop() {
            reached += 1;
            if reached > self.node_count {
                return false;
            }

            let node = &self.nodes[index as usize];
            if node.is_leaf() {
                if node.children[1] != NULL_NODE || self.leaves.get(&node.owner) != Some(index) {
                    return false;
                }
                leaf_count += 1;
                continue;
            }

            let [left, right] = node.children;
            if right == NULL_NODE {
                return false;
            }
            let (l, r) = (&self.nodes[left as usize], &self.nodes[right as usize]);
            if l.parent != index || r.parent != index || node.aabb != l.aabb.merge(&r.aabb) {
                return false;
            }
            stack.push(left);
            stack.push(right);
        }

        reached == self.node_count && leaf_count == self.leaves.len()
    }

    // --- Internal Leaf Management ---

    fn insert_leaf(&mut self, leaf: i32) {
        if self.root == NULL_NODE {
            self.root = leaf;
            self.nodes[leaf as usize].parent = NULL_NODE;
            return;
        }

        // Find the best sibling for the new leaf
        let leaf_aabb = self.nodes[leaf as usize].aabb;
        let mut index = self.root;
        while !self.nodes[index as usize].is_leaf() {
            let node = &self.nodes[index as usize];
            let [child1, child2] = node.children;

            let area = node.aabb.area();
            let combined_area = node.aabb.merge(&leaf_aabb).area();

            // Cost of creating a new parent for this node and the new leaf
            let cost = 2.0 * combined_area;

            // Minimum cost of pushing the leaf further down the tree
            let inheritance_cost = 2.0 * (combined_area - area);

            let cost1 = self.descent_cost(child1, &leaf_aabb, inheritance_cost);
            let cost2 = self.descent_cost(child2, &leaf_aabb, inheritance_cost);

            if cost < cost1 && cost < cost2 {
                break;
            }

            index = if cost1 < cost2 { child1 } else { child2 };
        }

        let sibling = index;

        // Create a new parent
        let old_parent = self.nodes[sibling as usize].parent;
        let new_parent = self.allocate_node();
        {
            let sibling_aabb = self.nodes[sibling as usize].aabb;
            let parent = &mut self.nodes[new_parent as usize];
            parent.parent = old_parent;
            parent.aabb = leaf_aabb.merge(&sibling_aabb);
            parent.children = [sibling, leaf];
        }
        self.nodes[sibling as usize].parent = new_parent;
        self.nodes[leaf as usize].parent = new_parent;

        if old_parent == NULL_NODE {
            self.root = new_parent;
        } else if self.nodes[old_parent as usize].children[0] == sibling {
            self.nodes[old_parent as usize].children[0] = new_parent;
        } else {
            self.nodes[old_parent as usize].children[1] = new_parent;
        }

        self.fix_upwards(new_parent);
    }

    fn descent_cost(&self, child: i32, leaf_aabb: &Aabb, inheritance_cost: f32) -> f32 {
        let child_node = &self.nodes[child as usize];
        let new_area = child_node.aabb.merge(leaf_aabb).area();
        if child_node.is_leaf() {
            new_area + inheritance_cost
        } else {
            (new_area - child_node.aabb.area()) + inheritance_cost
        }
    }

    fn remove_leaf(&mut self, leaf: i32) {
        if leaf == self.root {
            self.root = NULL_NODE;
            return;
        }

        let parent = self.nodes[leaf as usize].parent;
        let grand_parent = self.nodes[parent as usize].parent;
        let sibling = if self.nodes[parent as usize].children[0] == leaf {
            self.nodes[parent as usize].children[1]
        } else {
            self.nodes[parent as usize].children[0]
        };

        self.nodes[sibling as usize].parent = grand_parent;
        if grand_parent == NULL_NODE {
            self.root = sibling;
        } else if self.nodes[grand_parent as usize].children[0] == parent {
            self.nodes[grand_parent as usize].children[0] = sibling;
        } else {
            self.nodes[grand_parent as usize].children[1] = sibling;
        }
        self.deallocate_node(parent);
        self.nodes[leaf as usize].parent = NULL_NODE;

        self.fix_upwards(grand_parent);
    }

    /// Refits the boxes of `index` and all its ancestors.
    fn fix_upwards(&mut self, mut index: i32) {
        while index != NULL_NODE {
            let [child1, child2] = self.nodes[index as usize].children;
            debug_assert!(child1 != NULL_NODE && child2 != NULL_NODE);

            self.nodes[index as usize].aabb = self.nodes[child1 as usize]
                .aabb
                .merge(&self.nodes[child2 as usize].aabb);
            index = self.nodes[index as usize].parent;
        }
    }

    // --- Node Allocation ---

    fn allocate_node(&mut self) -> i32 {
        if self.free_list == NULL_NODE {
            self.extend_pool(self.growth);
        }
        let index = self.free_list;
        self.free_list = self.nodes[index as usize].next;
        self.nodes[index as usize] = DynamicTreeNode::vacant(NULL_NODE);
        self.node_count += 1;
        index
    }

    fn deallocate_node(&mut self, index: i32) {
        debug_assert!(index != NULL_NODE);
        self.nodes[index as usize] = DynamicTreeNode::vacant(self.free_list);
        self.free_list = index;
        self.node_count -= 1;
    }

    /// Adds `additional` nodes to the pool and chains them in front of the free list.
    fn extend_pool(&mut self, additional: usize) {
        let old = self.nodes.capacity();
        let new = old + additional;
        self.nodes.resize(new);
        self.leaves.resize(new);
        for index in old..new {
            let next = if index + 1 < new {
                (index + 1) as i32
            } else {
                self.free_list
            };
            self.nodes[index] = DynamicTreeNode::vacant(next);
        }
        self.free_list = old as i32;
        if old > 0 {
            log::debug!("DynamicTree: node pool grown from {old} to {new}");
        }
    }
}

/// Iterator over the `(key, box)` pairs stored in the tree's leaves.
pub struct DynamicTreeIterator<'a, K> {
    tree: &'a DynamicTree<K>,
    stack: Vec<i32>,
}

impl<'a, K> Iterator for DynamicTreeIterator<'a, K>
where
    K: Copy + PartialEq + Zeroable,
{
    type Item = (K, Aabb);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node_id) = self.stack.pop() {
            let node = &self.tree.nodes[node_id as usize];
            if node.is_leaf() {
                return Some((node.owner, node.aabb));
            }
            self.stack.push(node.children[0]);
            self.stack.push(node.children[1]);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(mut keys: Vec<u32>) -> Vec<u32> {
        keys.sort_unstable();
        keys
    }

    #[test]
    fn test_single_leaf_becomes_root() {
        let mut tree = DynamicTree::<u32>::new();
        let leaf = tree.insert(1, Aabb::new(0.0, 0.0, 1.0, 1.0)).unwrap();
        assert_eq!(tree.root(), leaf);
        assert_eq!(tree.node_count(), 1);
        assert!(tree.validate());
        assert_eq!(tree.query_overlaps(1).unwrap(), Vec::<u32>::new());
    }

    #[test]
    fn test_overlap_scenario() {
        let mut tree = DynamicTree::<u32>::new();
        tree.insert(1, Aabb::new(0.0, 0.0, 10.0, 10.0)).unwrap();
        tree.insert(2, Aabb::new(5.0, 5.0, 15.0, 15.0)).unwrap();
        tree.insert(3, Aabb::new(100.0, 100.0, 110.0, 110.0)).unwrap();
        assert!(tree.validate());

        assert_eq!(tree.query_overlaps(1).unwrap(), vec![2]);
        assert_eq!(tree.query_overlaps(2).unwrap(), vec![1]);
        assert!(tree.query_overlaps(3).unwrap().is_empty());
        assert_eq!(tree.node_count(), 5, "Three leaves need two internal nodes");
    }

    #[test]
    fn test_update_inside_stored_box_is_a_noop() {
        let mut tree = DynamicTree::<u32>::new();
        tree.insert(1, Aabb::new(0.0, 0.0, 10.0, 10.0)).unwrap();
        tree.insert(2, Aabb::new(20.0, 0.0, 30.0, 10.0)).unwrap();
        let leaf = tree.node_of(1).unwrap();
        let parent = tree.node(leaf).unwrap().parent;

        let restructured = tree.update(1, Aabb::new(2.0, 2.0, 8.0, 8.0)).unwrap();

        assert!(!restructured);
        assert_eq!(tree.node_of(1), Some(leaf));
        assert_eq!(tree.node(leaf).unwrap().parent, parent);
        assert_eq!(
            tree.leaf_aabb(1),
            Some(Aabb::new(0.0, 0.0, 10.0, 10.0)),
            "The stored box is kept when it still contains the new one"
        );
    }

    #[test]
    fn test_update_outside_stored_box_reinserts() {
        let mut tree = DynamicTree::<u32>::new();
        tree.insert(1, Aabb::new(0.0, 0.0, 10.0, 10.0)).unwrap();
        tree.insert(2, Aabb::new(50.0, 50.0, 60.0, 60.0)).unwrap();
        let leaf = tree.node_of(1).unwrap();

        assert!(tree.update(1, Aabb::new(45.0, 45.0, 55.0, 55.0)).unwrap());

        assert_eq!(tree.node_of(1), Some(leaf), "Leaves keep their node index");
        assert!(tree.validate());
        assert_eq!(tree.query_overlaps(2).unwrap(), vec![1]);
    }

    #[test]
    fn test_remove_and_errors() {
        let mut tree = DynamicTree::<u32>::new();
        let a = Aabb::new(0.0, 0.0, 10.0, 10.0);
        tree.insert(1, a).unwrap();
        tree.insert(2, a).unwrap();

        assert_eq!(tree.insert(1, a), Err(CoreError::DuplicateKey));
        tree.remove(1).unwrap();
        assert_eq!(tree.remove(1), Err(CoreError::KeyNotFound));
        assert_eq!(tree.update(1, a), Err(CoreError::KeyNotFound));
        assert_eq!(tree.query_overlaps(1), Err(CoreError::KeyNotFound));

        assert!(tree.validate());
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.node_count(), 1);
        assert!(tree.query_overlaps(2).unwrap().is_empty());
    }

    #[test]
    fn test_pool_grows_by_increment() {
        let mut tree = DynamicTree::<u32>::with_capacity(2, 3);
        assert_eq!(tree.capacity(), 2);
        for key in 0..10 {
            let x = key as f32 * 2.0;
            tree.insert(key, Aabb::new(x, 0.0, x + 3.0, 3.0)).unwrap();
        }
        // 10 leaves + 9 internal nodes.
        assert_eq!(tree.node_count(), 19);
        assert_eq!(tree.capacity(), 20);
        assert!(tree.validate());
        assert_eq!(sorted(tree.query_overlaps(4).unwrap()), vec![3, 5]);
    }

    #[test]
    fn test_query_stops_early() {
        let mut tree = DynamicTree::<u32>::new();
        for key in 0..8 {
            tree.insert(key, Aabb::new(0.0, 0.0, 1.0, 1.0)).unwrap();
        }
        let mut visited = 0;
        tree.query(&Aabb::new(0.5, 0.5, 2.0, 2.0), |_| {
            visited += 1;
            visited < 3
        });
        assert_eq!(visited, 3);
    }

    #[test]
    fn test_leaves_and_clear() {
        let mut tree = DynamicTree::<u32>::new();
        tree.insert(7, Aabb::new(0.0, 0.0, 1.0, 1.0)).unwrap();
        tree.insert(9, Aabb::new(4.0, 4.0, 5.0, 5.0)).unwrap();

        let keys = sorted(tree.leaves().map(|(k, _)| k).collect());
        assert_eq!(keys, vec![7, 9]);

        tree.clear();
        assert!(tree.is_empty());
        assert_eq!(tree.leaves().count(), 0);
        assert!(tree.validate());
        tree.insert(7, Aabb::new(0.0, 0.0, 1.0, 1.0)).unwrap();
        assert!(tree.validate());
    }

    fn random_box(rng: &mut fastrand::Rng) -> Aabb {
        let x = rng.f32() * 200.0;
        let y = rng.f32() * 200.0;
        Aabb::new(x, y, x + 1.0 + rng.f32() * 30.0, y + 1.0 + rng.f32() * 30.0)
    }

    /// Keys other than `key` whose box in `boxes` overlaps `probe`.
    fn brute_force_overlaps(
        boxes: impl Iterator<Item = (u32, Aabb)>,
        key: u32,
        probe: &Aabb,
    ) -> Vec<u32> {
        sorted(
            boxes
                .filter(|(other, aabb)| *other != key && aabb.overlaps(probe))
                .map(|(other, _)| other)
                .collect(),
        )
    }

    /// Shrinks or shifts `aabb` so the result stays inside it.
    fn shrunk_box(rng: &mut fastrand::Rng, aabb: Aabb) -> Aabb {
        let dx = rng.f32() * aabb.width() * 0.5;
        let dy = rng.f32() * aabb.height() * 0.5;
        Aabb::new(aabb.min.x + dx, aabb.min.y + dy, aabb.max.x, aabb.max.y)
    }

    #[test]
    fn test_random_operations_keep_invariants() {
        let mut rng = fastrand::Rng::with_seed(0x7E55E1);
        let mut tree = DynamicTree::<u32>::with_capacity(4, 4);
        // Every live key with the box it currently has, which may be smaller
        // than the box the tree kept for it.
        let mut live: Vec<(u32, Aabb)> = Vec::new();
        let mut next_key = 1;

        for _ in 0..2000 {
            match rng.u8(0..10) {
                0..=3 => {
                    let aabb = random_box(&mut rng);
                    tree.insert(next_key, aabb).unwrap();
                    live.push((next_key, aabb));
                    next_key += 1;
                }
                4..=5 if !live.is_empty() => {
                    let (key, _) = live.swap_remove(rng.usize(0..live.len()));
                    tree.remove(key).unwrap();
                }
                6..=7 if !live.is_empty() => {
                    let slot = rng.usize(0..live.len());
                    let aabb = shrunk_box(&mut rng, live[slot].1);
                    assert!(!tree.update(live[slot].0, aabb).unwrap());
                    live[slot].1 = aabb;
                }
                _ if !live.is_empty() => {
                    let slot = rng.usize(0..live.len());
                    let aabb = random_box(&mut rng);
                    tree.update(live[slot].0, aabb).unwrap();
                    live[slot].1 = aabb;
                }
                _ => {}
            }
            assert!(tree.validate(), "Tree invariants broken");
            assert_eq!(tree.len(), live.len());
        }

        for &(key, aabb) in &live {
            let hits = sorted(tree.query_overlaps_with(key, &aabb).unwrap());
            assert_eq!(
                hits,
                brute_force_overlaps(tree.leaves(), key, &aabb),
                "Tree query disagrees with brute force for key {key}"
            );
            // Stored boxes enclose current ones, so no real overlap is missed.
            for other in brute_force_overlaps(live.iter().copied(), key, &aabb) {
                assert!(hits.contains(&other), "{key} misses {other}");
            }
        }
    }

    #[test]
    fn test_query_with_current_box_after_shrink() {
        let mut tree = DynamicTree::<u32>::new();
        tree.insert(1, Aabb::new(0.0, 0.0, 10.0, 10.0)).unwrap();
        tree.insert(2, Aabb::new(12.0, 0.0, 20.0, 10.0)).unwrap();

        let shrunk = Aabb::new(0.0, 0.0, 5.0, 5.0);
        assert!(!tree.update(1, shrunk).unwrap());
        let grown = Aabb::new(8.0, 0.0, 20.0, 10.0);
        assert!(tree.update(2, grown).unwrap());

        // The stored box of 1 still reaches 2, its current box does not.
        assert_eq!(tree.query_overlaps(1).unwrap(), vec![2]);
        assert!(tree.query_overlaps_with(1, &shrunk).unwrap().is_empty());
        // Seen from 2 the match is against what the tree stores for 1.
        assert_eq!(tree.query_overlaps_with(2, &grown).unwrap(), vec![1]);
        assert_eq!(
            tree.query_overlaps_with(3, &shrunk),
            Err(CoreError::KeyNotFound)
        );
    }
}
