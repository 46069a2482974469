//! Pass Driver: orchestrates transformation of one source graph into a
//! target graph (spec.md §4.1).

use std::collections::HashMap;

use crate::debug::CHANNEL;
use crate::dispatch::DispatchTable;
use crate::error::{NodeContext, SelectionError};
use crate::memo::Memo;
use crate::source::{Graph, NodeId};
use crate::target::{TargetGraph, TargetNodeId};

pub struct Pass<'a> {
    pub src: &'a Graph,
    pub tgt: TargetGraph,
    pub memo: Memo,
    pub dispatch: DispatchTable,
    /// `set_Proj_proj`'s in-place renumbering, realised as a side table
    /// instead of mutating the (read-only) source graph: `gen_SwitchJmp`
    /// records `Cond node -> translation` here, and the generic `Proj`
    /// fallback in `handlers::control::gen_proj` applies it when
    /// building a switch's out-Projs.
    pub switch_translations: HashMap<NodeId, i64>,
}

impl<'a> Pass<'a> {
    pub fn new(src: &'a Graph) -> Self {
        Self {
            src,
            tgt: TargetGraph::new(),
            memo: Memo::new(),
            dispatch: DispatchTable::register_transformers(),
            switch_translations: HashMap::new(),
        }
    }

    /// `be_transform_node`: return the memoized target image of `id`,
    /// transforming it (and recursively, whatever it needs) if this is
    /// the first visit. A `Phi`'s handler installs its own placeholder
    /// before recursing into anything, which is what lets this function
    /// terminate on cycles that pass through a `Phi`.
    pub fn transform_node(&mut self, id: NodeId) -> Result<TargetNodeId, SelectionError> {
        if let Some(target) = self.memo.get(id) {
            return Ok(target);
        }

        let opcode = self.src.opcode(id);
        let handler = self.dispatch.get(opcode).ok_or(SelectionError::MissingHandler {
            ctx: NodeContext { node: id, opcode },
        })?;

        let result = handler(self, id)?;

        if self.memo.get(id).is_none() {
            self.memo.install(id, result);
        }

        Ok(result)
    }

    /// The post-pass fixup of spec.md §4.1/§4.6: every `Phi` enqueued
    /// during the main traversal gets its placeholder predecessor list
    /// replaced by the memo image of each original source predecessor.
    /// This is also where a Phi's operands first get transformed if
    /// nothing else in the graph referenced them directly.
    fn fixup_phis(&mut self) -> Result<(), SelectionError> {
        let pending: Vec<NodeId> = self.memo.pending_phis().to_vec();
        for phi_id in pending {
            let target_phi = self
                .memo
                .get(phi_id)
                .expect("pending phi must have a placeholder target");
            let source_preds: Vec<NodeId> = self.src.preds(phi_id).to_vec();
            for (i, pred) in source_preds.into_iter().enumerate() {
                let new_pred = self.transform_node(pred)?;
                self.tgt.node_mut(target_phi).preds[i] = new_pred;
            }
            self.memo.finish_phi(phi_id);
        }
        Ok(())
    }

    /// `sparc_transform_graph`: transform every node reachable from the
    /// graph's roots, then fix up Phis, then hand back the finished
    /// target graph.
    pub fn run(mut self) -> Result<TargetGraph, SelectionError> {
        let roots = self.src.roots.clone();
        for root in roots {
            self.transform_node(root)?;
        }
        self.fixup_phis()?;
        Ok(self.tgt)
    }
}

/// `sparc_init_transform`: one-shot pass initialisation. Registers the
/// debug channel diagnostics are written through; idempotent and cheap
/// enough to call unconditionally.
pub fn init() {
    CHANNEL.trace("sparc instruction selection initialised");
}

/// `sparc_transform_graph`: transform a whole source graph, reporting
/// (and logging) the first fatal error encountered, if any.
pub fn transform_graph(src: &Graph) -> Result<TargetGraph, SelectionError> {
    Pass::new(src).run().inspect_err(|err| {
        CHANNEL.error(&err.to_string());
    })
}
