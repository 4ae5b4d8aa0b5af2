use super::{ArcIdx, Arcs, BeachLine};
use crate::sites::SiteSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Branch {
    Left = 0,
    Right = 1,
}

impl Branch {
    fn inv(self) -> Self {
        match self {
            Branch::Left => Branch::Right,
            Branch::Right => Branch::Left,
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct Node {
    children: [Option<ArcIdx>; 2],
    parent: Option<ArcIdx>,
}

/// A beach line stored in a self-adjusting binary search tree.
///
/// The tree isn't keyed by anything stored in it: breakpoints move as the
/// sweep line moves, so the search compares against breakpoint positions
/// computed on the fly. What makes this work is that the in-order sequence
/// of the tree is always the left-to-right order of the arcs. Nodes live in
/// a vector indexed by arc, so an arc's node can be found (and splayed to
/// the root) without searching.
#[derive(Clone, Debug, Default)]
pub struct SplayTree {
    nodes: Vec<Node>,
    root: Option<ArcIdx>,
}

impl SplayTree {
    fn fresh_node(&mut self, arc: ArcIdx) {
        if self.nodes.len() <= arc.0 {
            self.nodes.resize(arc.0 + 1, Node::default());
        }
        self.nodes[arc.0] = Node::default();
    }

    fn child(&self, node: ArcIdx, branch: Branch) -> Option<ArcIdx> {
        self.nodes[node.0].children[branch as usize]
    }

    fn parent(&self, node: ArcIdx) -> Option<ArcIdx> {
        self.nodes[node.0].parent
    }

    fn attach(&mut self, node: ArcIdx, branch: Branch, child: Option<ArcIdx>) {
        debug_assert_ne!(Some(node), child);
        self.nodes[node.0].children[branch as usize] = child;
        if let Some(child) = child {
            self.nodes[child.0].parent = Some(node);
        }
    }

    fn detach(&mut self, node: ArcIdx, branch: Branch) -> Option<ArcIdx> {
        let child = self.nodes[node.0].children[branch as usize].take()?;
        self.nodes[child.0].parent = None;
        Some(child)
    }

    /// Which child of its parent is `node`? Must not be called on a root.
    fn branch(&self, node: ArcIdx) -> Branch {
        let parent = self.parent(node);
        debug_assert!(parent.is_some());
        match parent.and_then(|p| self.child(p, Branch::Left)) {
            Some(left) if left == node => Branch::Left,
            _ => Branch::Right,
        }
    }

    /// Moves `node` up one level, keeping the in-order sequence.
    fn rotate(&mut self, node: ArcIdx) {
        let Some(parent) = self.parent(node) else {
            return;
        };
        let branch = self.branch(node);

        let inner = self.detach(node, branch.inv());
        self.attach(parent, branch, inner);

        match self.parent(parent) {
            Some(grandparent) => {
                let parent_branch = self.branch(parent);
                self.attach(grandparent, parent_branch, Some(node));
            }
            None => self.nodes[node.0].parent = None,
        }
        self.attach(node, branch.inv(), Some(parent));
    }

    /// Moves `node` to the root of the tree containing it.
    fn splay(&mut self, node: ArcIdx) {
        while let Some(parent) = self.parent(node) {
            if self.parent(parent).is_some() {
                if self.branch(parent) == self.branch(node) {
                    self.rotate(parent);
                } else {
                    self.rotate(node);
                }
            }
            self.rotate(node);
        }
        self.root = Some(node);
    }

    /// The arcs, in the tree's in-order sequence.
    fn in_order(&self) -> Vec<ArcIdx> {
        let mut out = Vec::new();
        let mut stack = Vec::new();
        let mut cur = self.root;
        loop {
            while let Some(node) = cur {
                stack.push(node);
                cur = self.child(node, Branch::Left);
            }
            let Some(node) = stack.pop() else {
                break;
            };
            out.push(node);
            cur = self.child(node, Branch::Right);
        }
        out
    }
}

impl BeachLine for SplayTree {
    fn locate(&mut self, arcs: &Arcs, sites: &SiteSet, x: f64, sweep_y: f64) -> Option<ArcIdx> {
        let mut node = self.root?;
        loop {
            let next = if x <= arcs.left_break_x(sites, node, sweep_y) {
                self.child(node, Branch::Left)
            } else if x > arcs.right_break_x(sites, node, sweep_y) {
                self.child(node, Branch::Right)
            } else {
                None
            };
            match next {
                Some(next) => node = next,
                None => break,
            }
        }
        self.splay(node);
        Some(node)
    }

    fn insert_first(&mut self, _arcs: &Arcs, arc: ArcIdx) {
        assert!(self.root.is_none(), "inserting a first arc twice");
        self.fresh_node(arc);
        self.root = Some(arc);
    }

    fn insert_after(&mut self, _arcs: &Arcs, after: ArcIdx, arc: ArcIdx) {
        self.fresh_node(arc);
        self.splay(after);
        let right = self.detach(after, Branch::Right);
        self.attach(arc, Branch::Right, right);
        self.attach(after, Branch::Right, Some(arc));
    }

    fn remove(&mut self, _arcs: &Arcs, arc: ArcIdx) {
        self.splay(arc);
        let left = self.detach(arc, Branch::Left);
        let right = self.detach(arc, Branch::Right);
        self.root = match left {
            None => right,
            Some(left) => {
                // The rightmost node of the left subtree becomes the new root,
                // and it has no right child for the right subtree to replace.
                let mut max = left;
                while let Some(child) = self.child(max, Branch::Right) {
                    max = child;
                }
                self.splay(max);
                self.attach(max, Branch::Right, right);
                Some(max)
            }
        };
        self.nodes[arc.0] = Node::default();
    }

    fn check_invariants(&self, arcs: &Arcs) {
        if let Some(root) = self.root {
            assert_eq!(self.parent(root), None, "the root {root:?} has a parent");
        }
        let order = self.in_order();
        for &node in &order {
            for branch in [Branch::Left, Branch::Right] {
                if let Some(child) = self.child(node, branch) {
                    assert_eq!(
                        self.parent(child),
                        Some(node),
                        "{child:?}'s parent pointer doesn't point to {node:?}"
                    );
                }
            }
        }
        assert_eq!(
            order,
            arcs.iter().collect::<Vec<_>>(),
            "the tree is out of order"
        );
    }
}
