//! The source (target-independent) SSA IR, exposed only through the
//! narrow read-only query surface this pass actually needs.
//!
//! The real generic IR container (nodes, modes, blocks, tarvals, edges)
//! is an external collaborator this pass consumes and never owns. Since
//! no such crate exists to depend on here, this module stands in for it:
//! a small arena-based graph that supports exactly the accessors the
//! pass uses and nothing more. It is deliberately not a general-purpose
//! IR library.

use std::fmt;

use num_enum::IntoPrimitive;

/// Closed set of source-graph opcodes this pass knows how to dispatch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive)]
#[repr(u8)]
pub enum Opcode {
    Add,
    Sub,
    Mul,
    Mulh,
    Div,
    And,
    Or,
    Xor,
    Eor,
    Not,
    Shl,
    Shr,
    Shrs,
    Minus,
    Abs,
    Load,
    Store,
    Const,
    SymConst,
    Conv,
    Cmp,
    Cond,
    Jmp,
    Phi,
    Proj,
    Unknown,
    /// Backend-virtual: stack pointer increment (generic IR convention;
    /// lowers to a SPARC `SubSp` because the stack grows downward).
    AddSp,
    /// Backend-virtual: stack pointer decrement.
    SubSp,
    Call,
    Copy,
    FrameAddr,
}

impl Opcode {
    pub const COUNT: usize = 31;

    /// Dense index for dispatch-table lookups.
    pub fn index(self) -> usize {
        u8::from(self) as usize
    }
}

/// A node's value domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    IntS(u8),
    IntU(u8),
    Reference,
    Float(u8),
    Memory,
    /// Boolean condition-code result of a `Cmp`.
    Flag,
}

impl Mode {
    pub fn is_float(self) -> bool {
        matches!(self, Mode::Float(_))
    }

    pub fn is_int(self) -> bool {
        matches!(self, Mode::IntS(_) | Mode::IntU(_))
    }

    pub fn is_reference(self) -> bool {
        matches!(self, Mode::Reference)
    }

    /// `mode_needs_gp_reg` in the original: integer or reference modes
    /// are carried in general-purpose registers.
    pub fn needs_gp_reg(self) -> bool {
        self.is_int() || self.is_reference()
    }

    pub fn is_signed(self) -> bool {
        matches!(self, Mode::IntS(_))
    }

    pub fn size_bits(self) -> u8 {
        match self {
            Mode::IntS(n) | Mode::IntU(n) => n,
            Mode::Reference => 32,
            Mode::Float(n) => n,
            Mode::Memory | Mode::Flag => 0,
        }
    }

    /// The canonical 32-bit unsigned GP mode every target integer value
    /// is normalized to.
    pub const IU: Mode = Mode::IntU(32);
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::IntS(n) => write!(f, "Is{n}"),
            Mode::IntU(n) => write!(f, "Iu{n}"),
            Mode::Reference => write!(f, "P"),
            Mode::Float(n) => write!(f, "F{n}"),
            Mode::Memory => write!(f, "M"),
            Mode::Flag => write!(f, "b"),
        }
    }
}

/// A target-aware constant value paired with its mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tarval {
    pub value: i64,
    pub mode: Mode,
}

impl Tarval {
    pub fn new(value: i64, mode: Mode) -> Self {
        Self { value, mode }
    }

    /// `tarval_convert_to(tv, mode_Iu)` followed by `get_tarval_long`: on
    /// the 32-bit SPARC target a reference tarval is just reinterpreted
    /// as 32-bit unsigned before its long value is read.
    pub fn as_unsigned_32_long(&self) -> i64 {
        if self.mode.is_reference() {
            self.value & 0xFFFF_FFFF
        } else {
            self.value
        }
    }
}

/// A named program object referenced by `SymConst`/`FrameAddr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Entity(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockId(pub u32);

/// Opcode-specific data a generic `Node` carries alongside its
/// predecessor list.
#[derive(Debug, Clone)]
pub enum Payload {
    None,
    Const(Tarval),
    SymConst(Entity),
    /// `Load`'s result mode (the value mode, not the node's own mode).
    Load { mode: Mode },
    /// `Cond`'s default projection number (the selector is `preds[0]`).
    Cond { default_proj: i64 },
    /// `Proj`'s selector (the predecessor is `preds[0]`).
    Proj { selector: i64 },
    /// `FrameAddr`'s referenced frame entity.
    FrameAddr(Entity),
}

#[derive(Debug, Clone)]
pub struct Node {
    pub opcode: Opcode,
    pub mode: Mode,
    pub block: BlockId,
    pub preds: Vec<NodeId>,
    pub payload: Payload,
    /// Whether a `Load`/`Store` is pinned to its program-order position.
    pub pinned: bool,
    /// Debug info identity, carried through purely for diagnostics.
    pub debug_id: u32,
}

/// The source SSA graph: an arena of nodes plus the roots the pass must
/// reach everything live from.
#[derive(Debug, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    /// Keep-alive / end roots the driver seeds its worklist from.
    pub roots: Vec<NodeId>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0 as usize]
    }

    // --- Query Adapter: read-only accessors mirroring spec.md §6 ---

    pub fn opcode(&self, id: NodeId) -> Opcode {
        self.node(id).opcode
    }

    pub fn mode(&self, id: NodeId) -> Mode {
        self.node(id).mode
    }

    pub fn block(&self, id: NodeId) -> BlockId {
        self.node(id).block
    }

    pub fn preds(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).preds
    }

    pub fn debug_id(&self, id: NodeId) -> u32 {
        self.node(id).debug_id
    }

    pub fn pinned(&self, id: NodeId) -> bool {
        self.node(id).pinned
    }

    /// `get_binop_left`/`get_binop_right`: operand 0 / operand 1.
    pub fn binop_left(&self, id: NodeId) -> NodeId {
        self.preds(id)[0]
    }

    pub fn binop_right(&self, id: NodeId) -> NodeId {
        self.preds(id)[1]
    }

    /// `get_Abs_op`/`get_Not_op`/`get_Minus_op`: the sole operand.
    pub fn unop_operand(&self, id: NodeId) -> NodeId {
        self.preds(id)[0]
    }

    pub fn const_tarval(&self, id: NodeId) -> Tarval {
        match &self.node(id).payload {
            Payload::Const(tv) => *tv,
            _ => unreachable!("const_tarval called on non-Const node"),
        }
    }

    pub fn symconst_entity(&self, id: NodeId) -> Entity {
        match &self.node(id).payload {
            Payload::SymConst(e) => *e,
            _ => unreachable!("symconst_entity called on non-SymConst node"),
        }
    }

    pub fn frame_addr_entity(&self, id: NodeId) -> Entity {
        match &self.node(id).payload {
            Payload::FrameAddr(e) => *e,
            _ => unreachable!("frame_addr_entity called on non-FrameAddr node"),
        }
    }

    /// `get_Load_mode`/`get_Load_ptr`/`get_Load_mem`.
    pub fn load_mode(&self, id: NodeId) -> Mode {
        match &self.node(id).payload {
            Payload::Load { mode } => *mode,
            _ => unreachable!("load_mode called on non-Load node"),
        }
    }

    pub fn load_ptr(&self, id: NodeId) -> NodeId {
        self.preds(id)[0]
    }

    pub fn load_mem(&self, id: NodeId) -> NodeId {
        self.preds(id)[1]
    }

    /// `get_Store_ptr`/`get_Store_value`/`get_Store_mem`.
    pub fn store_ptr(&self, id: NodeId) -> NodeId {
        self.preds(id)[0]
    }

    pub fn store_value(&self, id: NodeId) -> NodeId {
        self.preds(id)[1]
    }

    pub fn store_mem(&self, id: NodeId) -> NodeId {
        self.preds(id)[2]
    }

    /// `get_Cmp_left`/`get_Cmp_right`.
    pub fn cmp_left(&self, id: NodeId) -> NodeId {
        self.preds(id)[0]
    }

    pub fn cmp_right(&self, id: NodeId) -> NodeId {
        self.preds(id)[1]
    }

    /// `get_Cond_selector`/`get_Cond_default_proj`.
    pub fn cond_selector(&self, id: NodeId) -> NodeId {
        self.preds(id)[0]
    }

    pub fn cond_default_proj(&self, id: NodeId) -> i64 {
        match &self.node(id).payload {
            Payload::Cond { default_proj } => *default_proj,
            _ => unreachable!("cond_default_proj called on non-Cond node"),
        }
    }

    /// `get_Proj_pred`/`get_Proj_proj`.
    pub fn proj_pred(&self, id: NodeId) -> NodeId {
        self.preds(id)[0]
    }

    pub fn proj_selector(&self, id: NodeId) -> i64 {
        match &self.node(id).payload {
            Payload::Proj { selector } => *selector,
            _ => unreachable!("proj_selector called on non-Proj node"),
        }
    }

    /// `get_irn_n(node, be_pos_AddSP_size)`/`..._old_sp`: for both
    /// `AddSp` and `SubSp` the generic convention is `(old_sp, size)`.
    pub fn stack_op_old_sp(&self, id: NodeId) -> NodeId {
        self.preds(id)[0]
    }

    pub fn stack_op_size(&self, id: NodeId) -> NodeId {
        self.preds(id)[1]
    }

    /// `be_get_FrameAddr_frame`.
    pub fn frame_addr_frame(&self, id: NodeId) -> NodeId {
        self.preds(id)[0]
    }

    /// All outgoing `Proj` edges of a node, found by linear scan (the
    /// arena has no reverse-edge index; `spec.md` only asks for this on
    /// `Cond`/`SwitchJmp`, a cold path run once per switch).
    pub fn out_projs(&self, id: NodeId) -> Vec<NodeId> {
        (0..self.nodes.len())
            .map(|i| NodeId(i as u32))
            .filter(|&pid| {
                matches!(self.nodes[pid.0 as usize].opcode, Opcode::Proj)
                    && self.proj_pred(pid) == id
            })
            .collect()
    }
}
