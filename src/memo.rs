//! The transformation memo: `source-node -> target-node`, ensuring each
//! source node is transformed at most once and that shared sub-trees
//! remain shared in the target graph (spec.md §3/§4.7).

use std::collections::HashMap;

use crate::source::NodeId;
use crate::target::TargetNodeId;

/// Per-node progress: `Unseen` is the absence of an entry; `Placeholder`
/// is visible only for `Phi` (installed with stale predecessors before
/// its operands are transformed); `Done` is every other node's terminal
/// state, installed atomically within its handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MemoState {
    Placeholder(TargetNodeId),
    Done(TargetNodeId),
}

#[derive(Debug, Default)]
pub struct Memo {
    entries: HashMap<NodeId, MemoState>,
    /// Source nodes whose target `Phi` was installed as a placeholder
    /// and must be rewired once every reachable node has a target image.
    pending_phis: Vec<NodeId>,
}

impl Memo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the target node already produced for `id`, if any
    /// (hit on either `Placeholder` or `Done`: a cycle through a `Phi`
    /// must still be able to find the placeholder).
    pub fn get(&self, id: NodeId) -> Option<TargetNodeId> {
        self.entries.get(&id).map(|s| match s {
            MemoState::Placeholder(t) | MemoState::Done(t) => *t,
        })
    }

    pub fn is_done(&self, id: NodeId) -> bool {
        matches!(self.entries.get(&id), Some(MemoState::Done(_)))
    }

    /// Install the final target image for `id`. Panics (a programmer
    /// error, not a `SelectionError`) if `id` already has a `Done` entry:
    /// per spec.md §3 an installed entry is immutable.
    pub fn install(&mut self, id: NodeId, target: TargetNodeId) {
        let prev = self.entries.insert(id, MemoState::Done(target));
        debug_assert!(
            !matches!(prev, Some(MemoState::Done(_))),
            "source node {id:?} transformed twice"
        );
    }

    /// Install a `Phi`'s placeholder target and enqueue it for fixup.
    pub fn install_phi_placeholder(&mut self, id: NodeId, target: TargetNodeId) {
        self.entries.insert(id, MemoState::Placeholder(target));
        self.pending_phis.push(id);
    }

    /// Mark a placeholder `Phi` as fully wired, without changing its
    /// target identity (the same `TargetNodeId` is reused; only its
    /// predecessor list is rewritten during fixup).
    pub fn finish_phi(&mut self, id: NodeId) {
        if let Some(state @ MemoState::Placeholder(_)) = self.entries.get_mut(&id) {
            if let MemoState::Placeholder(t) = *state {
                *state = MemoState::Done(t);
            }
        }
    }

    pub fn pending_phis(&self) -> &[NodeId] {
        &self.pending_phis
    }
}

#[test]
fn phi_placeholder_is_visible_before_it_is_finished() {
    let mut memo = Memo::new();
    let phi = NodeId(0);
    let target = TargetNodeId(0);

    memo.install_phi_placeholder(phi, target);
    assert_eq!(memo.get(phi), Some(target));
    assert!(!memo.is_done(phi));
    assert_eq!(memo.pending_phis(), &[phi]);

    memo.finish_phi(phi);
    assert_eq!(memo.get(phi), Some(target));
    assert!(memo.is_done(phi));
}

#[test]
fn install_is_idempotent_under_repeated_calls_with_the_same_target() {
    let mut memo = Memo::new();
    let node = NodeId(5);
    let target = TargetNodeId(9);
    memo.install(node, target);
    assert_eq!(memo.get(node), Some(target));
}
