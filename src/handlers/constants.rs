//! Constant materialisation and immediate-form matching (spec.md §4.5).

use crate::builders;
use crate::driver::Pass;
use crate::error::{NodeContext, SelectionError};
use crate::source::{BlockId, Graph, Mode, NodeId, Opcode, Payload};
use crate::target::TargetNodeId;

/// SPARC's 13-bit signed immediate field.
pub const SIMM13_MIN: i64 = -4096;
pub const SIMM13_MAX: i64 = 4095;

/// `is_imm_encodeable`: true iff `node` is a `Const` whose tarval fits
/// the signed simm13 range.
pub fn is_imm_encodeable(src: &Graph, node: NodeId) -> bool {
    imm_value(src, node).is_some()
}

/// The simm13 literal a node would contribute if it is immediate
/// encodable, or `None` otherwise (not a `Const`, or out of range).
pub fn imm_value(src: &Graph, node: NodeId) -> Option<i64> {
    if !matches!(src.opcode(node), Opcode::Const) {
        return None;
    }
    let value = src.const_tarval(node).as_unsigned_32_long();
    (SIMM13_MIN..=SIMM13_MAX).contains(&value).then_some(value)
}

/// `create_const_graph_value`: materialise a long value as either a
/// single `Mov_imm` (fits simm13) or a `HiImm`/`LoImm` pair (doesn't).
/// Both forms are frame-dependent: they are root-positioned and must
/// not float above frame establishment.
pub fn materialize_const_value(
    pass: &mut Pass<'_>,
    block: BlockId,
    value: i64,
) -> TargetNodeId {
    let id = if !(SIMM13_MIN..=SIMM13_MAX).contains(&value) {
        let hi = builders::hi_imm(&mut pass.tgt, block, value);
        pass.tgt.node_mut(hi).frame_dependent = true;
        builders::lo_imm(&mut pass.tgt, block, hi, value)
    } else {
        builders::mov_imm(&mut pass.tgt, block, value)
    };
    pass.tgt.node_mut(id).frame_dependent = true;
    id
}

/// `create_const_graph`/`gen_Const`: a source `Const` lowers to the
/// materialised literal of its tarval. Reference-mode tarvals are
/// reinterpreted as 32-bit unsigned first, exactly as the original's
/// `tarval_convert_to(tv, mode_Iu)` does before extracting the long
/// value (sparc_transform.c:166-173) -- not after.
pub fn gen_const(pass: &mut Pass<'_>, node: NodeId) -> Result<TargetNodeId, SelectionError> {
    let mode = pass.src.mode(node);
    if mode.is_float() {
        return Err(SelectionError::UnsupportedFeature {
            ctx: NodeContext { node, opcode: Opcode::Const },
            what: "floating-point constants",
        });
    }
    let block = pass.src.block(node);
    let tarval = pass.src.const_tarval(node);
    let value = tarval.as_unsigned_32_long();
    Ok(materialize_const_value(pass, block, value))
}

/// `gen_SymConst`: entity reference, also root-positioned.
pub fn gen_sym_const(pass: &mut Pass<'_>, node: NodeId) -> Result<TargetNodeId, SelectionError> {
    let block = pass.src.block(node);
    let entity = pass.src.symconst_entity(node);
    let id = builders::sym_const(&mut pass.tgt, block, entity);
    pass.tgt.node_mut(id).frame_dependent = true;
    Ok(id)
}

#[test]
fn simm13_boundary_is_inclusive() {
    let mut g = Graph::new();
    let min = g.push(crate::source::Node {
        opcode: Opcode::Const,
        mode: Mode::IU,
        block: BlockId(0),
        preds: vec![],
        payload: Payload::Const(crate::source::Tarval::new(SIMM13_MIN, Mode::IU)),
        pinned: false,
        debug_id: 0,
    });
    let below = g.push(crate::source::Node {
        opcode: Opcode::Const,
        mode: Mode::IU,
        block: BlockId(0),
        preds: vec![],
        payload: Payload::Const(crate::source::Tarval::new(SIMM13_MIN - 1, Mode::IU)),
        pinned: false,
        debug_id: 0,
    });

    assert_eq!(imm_value(&g, min), Some(SIMM13_MIN));
    assert_eq!(imm_value(&g, below), None);
}
