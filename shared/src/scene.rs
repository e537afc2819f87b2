/*!
Transform tree.

Nodes live in an arena owned by [`Scene`]. A node's `children` list holds the owning
handles; its `parent` field is a non-owning back-reference. Removing a node from its
parent destroys the whole subtree immediately and bumps the slot generation, so any
handle still pointing at it goes stale instead of aliasing a later node.

World matrices are only refreshed by [`Scene::update_world_matrices`]. After any local
mutation they stay stale until that pass runs; collision code reads local positions
and does not depend on them.
*/

use std::sync::Arc;

use nalgebra as na;

use crate::collision::{body::Body, ray::TriMesh};
use crate::math::{Mat4, Quat, Vec3};

/// Generational handle to a node in a [`Scene`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

/// A node in the transform tree.
pub struct Node {
    /// Position relative to the parent.
    pub position: Vec3,
    /// Orientation relative to the parent.
    pub rotation: Quat,
    /// Scale relative to the parent (unit by default).
    pub scale: Vec3,
    /// Physics body attached to this node, if any.
    pub body: Option<Body>,
    /// Triangle geometry used by pick queries, if any.
    pub mesh: Option<Arc<TriMesh>>,
    local: Mat4,
    world: Mat4,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    fn new() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
            body: None,
            mesh: None,
            local: Mat4::identity(),
            world: Mat4::identity(),
            parent: None,
            children: Vec::new(),
        }
    }

    /// Local transform as of the last world-matrix pass.
    #[inline]
    pub fn local_matrix(&self) -> &Mat4 {
        &self.local
    }

    /// World transform as of the last world-matrix pass.
    #[inline]
    pub fn world_matrix(&self) -> &Mat4 {
        &self.world
    }

    /// World-space position as of the last world-matrix pass.
    #[inline]
    pub fn world_position(&self) -> Vec3 {
        Vec3::new(self.world[(0, 3)], self.world[(1, 3)], self.world[(2, 3)])
    }

    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[inline]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    fn compose_local(&self) -> Mat4 {
        let translation = na::Translation3::from(self.position).to_homogeneous();
        let rotation = self.rotation.to_homogeneous();
        let scale = Mat4::new_nonuniform_scaling(&self.scale);
        translation * rotation * scale
    }
}

struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Arena-backed transform tree with a single root.
pub struct Scene {
    slots: Vec<Slot>,
    free: Vec<u32>,
    root: NodeId,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        let mut scene = Self {
            slots: Vec::new(),
            free: Vec::new(),
            root: NodeId {
                index: 0,
                generation: 0,
            },
        };
        scene.root = scene.create();
        scene
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Create a detached node. It is not reachable from the root until [`Scene::add`].
    pub fn create(&mut self) -> NodeId {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(Node::new());
            return NodeId {
                index,
                generation: slot.generation,
            };
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            node: Some(Node::new()),
        });
        NodeId {
            index,
            generation: 0,
        }
    }

    /// Create a node and attach it under `parent`.
    pub fn spawn(&mut self, parent: NodeId) -> NodeId {
        let id = self.create();
        self.add(parent, id);
        id
    }

    #[inline]
    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    /// Local position of `id`, the space bodies collide in.
    pub fn position(&self, id: NodeId) -> Option<Vec3> {
        self.get(id).map(|node| node.position)
    }

    pub fn set_position(&mut self, id: NodeId, position: Vec3) {
        match self.get_mut(id) {
            Some(node) => node.position = position,
            None => log::warn!("set_position on stale node {id:?}"),
        }
    }

    pub fn set_local(&mut self, id: NodeId, position: Vec3, rotation: Quat, scale: Vec3) {
        match self.get_mut(id) {
            Some(node) => {
                node.position = position;
                node.rotation = rotation;
                node.scale = scale;
            }
            None => log::warn!("set_local on stale node {id:?}"),
        }
    }

    /// Attach `child` under `parent`, detaching it from any previous parent first.
    ///
    /// Ignored (with a warning) when either handle is stale or when the move would
    /// create a cycle.
    pub fn add(&mut self, parent: NodeId, child: NodeId) {
        if !self.contains(parent) || !self.contains(child) {
            log::warn!("add: stale handle (parent {parent:?}, child {child:?})");
            return;
        }
        if self.is_ancestor_or_self(child, parent) {
            log::warn!("add: {child:?} is an ancestor of {parent:?}, refusing to create a cycle");
            return;
        }

        let old_parent = self.get(child).and_then(|node| node.parent);
        if let Some(old) = old_parent {
            self.detach(old, child);
        }

        if let Some(node) = self.get_mut(parent) {
            node.children.push(child);
        }
        if let Some(node) = self.get_mut(child) {
            node.parent = Some(parent);
        }
    }

    /// Remove `child` from `parent`'s child list and destroy its subtree.
    ///
    /// Returns `false` if `child` was not a child of `parent`.
    pub fn remove(&mut self, parent: NodeId, child: NodeId) -> bool {
        if !self.detach(parent, child) {
            return false;
        }

        for id in self.descendants(child) {
            let slot = &mut self.slots[id.index as usize];
            slot.node = None;
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(id.index);
        }
        true
    }

    /// Unlink `child` from `parent` without destroying it.
    fn detach(&mut self, parent: NodeId, child: NodeId) -> bool {
        let Some(node) = self.get_mut(parent) else {
            return false;
        };
        let Some(at) = node.children.iter().position(|&c| c == child) else {
            return false;
        };
        node.children.remove(at);

        if let Some(node) = self.get_mut(child) {
            node.parent = None;
        }
        true
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, mut id: NodeId) -> bool {
        loop {
            if id == ancestor {
                return true;
            }
            match self.get(id).and_then(|node| node.parent) {
                Some(parent) => id = parent,
                None => return false,
            }
        }
    }

    /// Pre-order list of `root` and every node below it.
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.traverse(root, |id, _| out.push(id));
        out
    }

    /// Visit `root` and its subtree in pre-order.
    pub fn traverse(&self, root: NodeId, mut visit: impl FnMut(NodeId, &Node)) {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.get(id) else {
                continue;
            };
            visit(id, node);
            // Reverse so the first child is visited first.
            stack.extend(node.children.iter().rev().copied());
        }
    }

    /// Recompute local and world matrices for `root` and everything below it.
    ///
    /// `root` composes against its parent's current world matrix (identity if detached).
    pub fn update_world_matrices(&mut self, root: NodeId) {
        let parent_world = self
            .get(root)
            .and_then(|node| node.parent)
            .and_then(|parent| self.get(parent))
            .map(|parent| parent.world)
            .unwrap_or_else(Mat4::identity);

        let mut stack = vec![(root, parent_world)];
        while let Some((id, parent_world)) = stack.pop() {
            let Some(node) = self.get_mut(id) else {
                continue;
            };
            node.local = node.compose_local();
            node.world = parent_world * node.local;

            let world = node.world;
            stack.extend(node.children.iter().rev().map(|&child| (child, world)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).norm() < 1.0e-5
    }

    #[test]
    fn world_position_composes_parent_chain() {
        let mut scene = Scene::new();
        let a = scene.spawn(scene.root());
        let b = scene.spawn(a);
        scene.set_position(a, Vec3::new(10.0, 0.0, 0.0));
        scene.set_position(b, Vec3::new(0.0, 5.0, 0.0));

        scene.update_world_matrices(scene.root());

        let b_world = scene.get(b).map(|n| n.world_position()).expect("live node");
        assert!(approx(b_world, Vec3::new(10.0, 5.0, 0.0)));
    }

    #[test]
    fn rotation_and_scale_propagate() {
        let mut scene = Scene::new();
        let a = scene.spawn(scene.root());
        let b = scene.spawn(a);
        let quarter_turn = Quat::from_axis_angle(&Vec3::y_axis(), std::f32::consts::FRAC_PI_2);
        scene.set_local(a, Vec3::zeros(), quarter_turn, Vec3::new(2.0, 2.0, 2.0));
        scene.set_position(b, Vec3::new(1.0, 0.0, 0.0));

        scene.update_world_matrices(scene.root());

        // +X rotated a quarter turn about +Y lands on -Z, then doubled.
        let b_world = scene.get(b).map(|n| n.world_position()).expect("live node");
        assert!(approx(b_world, Vec3::new(0.0, 0.0, -2.0)));
    }

    #[test]
    fn world_matrix_is_stale_until_update() {
        let mut scene = Scene::new();
        let a = scene.spawn(scene.root());
        scene.update_world_matrices(scene.root());
        scene.set_position(a, Vec3::new(3.0, 0.0, 0.0));

        let stale = scene.get(a).map(|n| n.world_position()).expect("live node");
        assert!(approx(stale, Vec3::zeros()));

        scene.update_world_matrices(scene.root());
        let fresh = scene.get(a).map(|n| n.world_position()).expect("live node");
        assert!(approx(fresh, Vec3::new(3.0, 0.0, 0.0)));
    }

    #[test]
    fn remove_destroys_subtree_and_invalidates_handles() {
        let mut scene = Scene::new();
        let a = scene.spawn(scene.root());
        let b = scene.spawn(a);

        assert!(scene.remove(scene.root(), a));
        assert!(!scene.contains(a));
        assert!(!scene.contains(b));
        assert!(scene.get(scene.root()).is_some_and(|n| n.children().is_empty()));

        // Reused slots hand out fresh generations.
        let c = scene.create();
        assert_ne!(c, a);
        assert_ne!(c, b);
        assert!(!scene.contains(a));
    }

    #[test]
    fn remove_from_wrong_parent_is_a_no_op() {
        let mut scene = Scene::new();
        let a = scene.spawn(scene.root());
        let b = scene.spawn(scene.root());
        assert!(!scene.remove(a, b));
        assert!(scene.contains(b));
    }

    #[test]
    fn add_reparents_and_clears_old_link() {
        let mut scene = Scene::new();
        let a = scene.spawn(scene.root());
        let b = scene.spawn(scene.root());
        let c = scene.spawn(a);

        scene.add(b, c);

        assert!(scene.get(a).is_some_and(|n| n.children().is_empty()));
        assert_eq!(scene.get(b).map(|n| n.children().to_vec()), Some(vec![c]));
        assert_eq!(scene.get(c).and_then(|n| n.parent()), Some(b));
    }

    #[test]
    fn add_refuses_cycles() {
        let mut scene = Scene::new();
        let a = scene.spawn(scene.root());
        let b = scene.spawn(a);

        scene.add(b, a);

        assert_eq!(scene.get(a).and_then(|n| n.parent()), Some(scene.root()));
        assert!(scene.get(b).is_some_and(|n| n.children().is_empty()));
    }

    #[test]
    fn traversal_is_pre_order() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = scene.spawn(root);
        let a1 = scene.spawn(a);
        let b = scene.spawn(root);

        assert_eq!(scene.descendants(root), vec![root, a, a1, b]);
    }
}
