//! The SPARC-specific target SSA IR this pass produces.

use crate::backend::RegisterRequirement;
use crate::source::{BlockId, Entity, Mode, NodeId as SourceNodeId};

/// Closed set of SPARC target opcodes this pass can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SparcOpcode {
    AddReg,
    AddImm,
    SubReg,
    SubImm,
    SllReg,
    SllImm,
    SlrReg,
    SlrImm,
    SraReg,
    SraImm,
    Ld,
    St,
    MovImm,
    MovReg,
    HiImm,
    LoImm,
    SymConst,
    FrameAddr,
    SubSp,
    AddSp,
    CmpReg,
    Bxx,
    Ba,
    SwitchJmp,
    MulReg,
    MulImm,
    MulhReg,
    MulhImm,
    DivReg,
    DivImm,
    AndReg,
    AndImm,
    OrReg,
    OrImm,
    XorReg,
    XorImm,
    Not,
    Minus,
    FsTOd,
    FdTOs,
    FsTOi,
    FdTOi,
    FiTOs,
    FiTOd,
    FMul,
    /// Generic projection, same shape as the source IR's `Proj`.
    Proj,
    Phi,
    /// Backend-virtual call; preds and results are opaque to this pass
    /// (calling-convention lowering lives in the register allocator, not
    /// here), so this is a structural duplicate of the source `Call`.
    Call,
    /// `be_NoMem`: the memory-mode placeholder fed to nodes that need a
    /// memory-shaped predecessor but touch no real memory, e.g. the
    /// stack-pointer adjustments `gen_add_sp`/`gen_sub_sp` emit.
    NoMem,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetNodeId(pub u32);

/// Opcode-specific attributes a `TargetNode` may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetPayload {
    None,
    /// `_imm` binops, `Mov_imm`, `HiImm`: the simm13 (or raw 32-bit
    /// value for Hi/LoImm, which do not fit the 13-bit field by design).
    Imm(i64),
    SymConst(Entity),
    FrameAddr(Entity),
    /// `SwitchJmp`'s `(n_projs, default_proj)`.
    SwitchJmp { n_projs: i64, default_proj: i64 },
    /// `BXX`'s flag-relation selector (the original `Proj` number off
    /// the `Cmp`).
    Bxx { relation: i64 },
    /// Generic `Proj`'s selector, reused verbatim from the source node
    /// it was duplicated from (or renumbered, for switches).
    Proj { selector: i64 },
}

#[derive(Debug, Clone)]
pub struct TargetNode {
    pub opcode: SparcOpcode,
    pub mode: Mode,
    pub block: BlockId,
    pub preds: Vec<TargetNodeId>,
    pub payload: TargetPayload,
    /// Root-positioned nodes (constants, SymConst) must not float above
    /// frame establishment; `be_dep_on_frame` in the original.
    pub frame_dependent: bool,
    /// `arch_irn_flags_modify_flags`: the node clobbers condition codes.
    pub modify_flags: bool,
    pub out_req: RegisterRequirement,
    /// Preserved purely for debugging, mirroring `new_r_Proj(...)
    /// ->node_nr = node->node_nr` in the original `gen_Proj`.
    pub debug_id: u32,
    /// The source node this target node was built from, if any (Phi
    /// fixup and tests rely on this to find Phi nodes after the pass).
    pub source: Option<SourceNodeId>,
    /// Whether a `Load`/`Store` is pinned to its program-order position,
    /// carried over from the source node (`set_irn_pinned`).
    pub pinned: bool,
}

impl TargetNode {
    pub fn new(opcode: SparcOpcode, mode: Mode, block: BlockId, preds: Vec<TargetNodeId>) -> Self {
        Self {
            opcode,
            mode,
            block,
            preds,
            payload: TargetPayload::None,
            frame_dependent: false,
            modify_flags: false,
            out_req: RegisterRequirement::None,
            debug_id: 0,
            source: None,
            pinned: false,
        }
    }
}

/// Append-only arena for the target graph. No subsystem other than this
/// pass may mutate it while the pass is running (spec.md §5).
#[derive(Debug, Default)]
pub struct TargetGraph {
    nodes: Vec<TargetNode>,
}

impl TargetGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: TargetNode) -> TargetNodeId {
        let id = TargetNodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub fn node(&self, id: TargetNodeId) -> &TargetNode {
        &self.nodes[id.0 as usize]
    }

    pub fn node_mut(&mut self, id: TargetNodeId) -> &mut TargetNode {
        &mut self.nodes[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TargetNodeId, &TargetNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (TargetNodeId(i as u32), n))
    }
}
