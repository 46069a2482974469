//! Control flow handler family (spec.md §4.6).

use crate::backend;
use crate::builders;
use crate::driver::Pass;
use crate::error::{NodeContext, SelectionError};
use crate::handlers::constants::materialize_const_value;
use crate::handlers::convert::gen_extension;
use crate::selectors::{
    PnBeAddSp, PnBeSubSp, PnDiv, PnLoad, PnSparcAddSp, PnSparcDiv, PnSparcLd, PnSparcSubSp, PnStore,
};
use crate::source::{Mode, NodeId, Opcode};
use crate::target::TargetNodeId;

/// `gen_Cmp`: compares are always integer here (FP is unsupported); both
/// sides are widened to 32 bits via `gen_extension` first. The original
/// carries a commented-out `Tst`-based shortcut for comparisons against
/// a zero constant; it is intentionally not implemented here either.
pub fn gen_cmp(pass: &mut Pass<'_>, node: NodeId) -> Result<TargetNodeId, SelectionError> {
    let left = pass.src.cmp_left(node);
    let right = pass.src.cmp_right(node);
    let cmp_mode = pass.src.mode(left);

    if cmp_mode.is_float() {
        return Err(SelectionError::UnsupportedFeature {
            ctx: NodeContext { node, opcode: Opcode::Cmp },
            what: "floating-point comparison",
        });
    }
    if pass.src.mode(right) != cmp_mode {
        return Err(SelectionError::InvariantViolation {
            ctx: NodeContext { node, opcode: Opcode::Cmp },
            what: "Cmp operands must share a mode",
            mode: Some(cmp_mode),
        });
    }

    let block = pass.src.block(node);
    let is_unsigned = !cmp_mode.is_signed();

    let new_left = pass.transform_node(left)?;
    let new_left = if cmp_mode.size_bits() < 32 {
        gen_extension(pass, node, block, new_left, cmp_mode)?
    } else {
        new_left
    };
    let new_right = pass.transform_node(right)?;
    let new_right = if cmp_mode.size_bits() < 32 {
        gen_extension(pass, node, block, new_right, cmp_mode)?
    } else {
        new_right
    };

    Ok(builders::cmp_reg(&mut pass.tgt, block, new_left, new_right, is_unsigned))
}

/// `gen_Cond`: a boolean selector (the `Proj` of a `Cmp`) lowers to a
/// flag-relation branch; any other selector mode is a switch.
pub fn gen_cond(pass: &mut Pass<'_>, node: NodeId) -> Result<TargetNodeId, SelectionError> {
    let selector = pass.src.cond_selector(node);
    let selector_mode = pass.src.mode(selector);

    if selector_mode != Mode::Flag {
        return gen_switch_jmp(pass, node);
    }

    if !matches!(pass.src.opcode(selector), Opcode::Proj) {
        return Err(SelectionError::InvariantViolation {
            ctx: NodeContext { node, opcode: Opcode::Cond },
            what: "boolean Cond selector must be a Proj of a Cmp",
            mode: Some(selector_mode),
        });
    }

    let cmp = pass.src.proj_pred(selector);
    let relation = pass.src.proj_selector(selector);
    let new_flag = pass.transform_node(cmp)?;
    let block = pass.src.block(node);
    Ok(builders::bxx(&mut pass.tgt, block, new_flag, relation))
}

/// `gen_SwitchJmp`: scans the `Cond`'s out-`Proj`s for the selector
/// range, records the translation so later `Proj` transforms can apply
/// it, and emits `selector - translation` followed by the switch.
pub fn gen_switch_jmp(pass: &mut Pass<'_>, node: NodeId) -> Result<TargetNodeId, SelectionError> {
    let block = pass.src.block(node);
    let selector = pass.src.cond_selector(node);
    let new_selector = pass.transform_node(selector)?;

    let projs = pass.src.out_projs(node);
    let mut min = i64::MAX;
    let mut max = i64::MIN;
    for &p in &projs {
        let pn = pass.src.proj_selector(p);
        min = min.min(pn);
        max = max.max(pn);
    }
    if projs.is_empty() {
        return Err(SelectionError::InvariantViolation {
            ctx: NodeContext { node, opcode: Opcode::Cond },
            what: "SwitchJmp Cond must have at least one out-Proj",
            mode: None,
        });
    }

    let translation = min;
    let n_projs = max - translation + 1;
    pass.switch_translations.insert(node, translation);

    let const_graph = crate::handlers::constants::materialize_const_value(pass, block, translation);
    let sub = builders::sub_reg(&mut pass.tgt, block, new_selector, const_graph);
    let default_proj = pass.src.cond_default_proj(node) - translation;
    Ok(builders::switch_jmp(&mut pass.tgt, block, sub, n_projs, default_proj))
}

/// `gen_Jmp`: unconditional branch.
pub fn gen_jmp(pass: &mut Pass<'_>, node: NodeId) -> Result<TargetNodeId, SelectionError> {
    let block = pass.src.block(node);
    Ok(builders::ba(&mut pass.tgt, block))
}

/// `gen_Phi`: installs a placeholder with the source node's arity
/// *before* recursing into any operand -- `driver::Pass::fixup_phis`
/// rewires the real predecessors afterward. This is what lets a cycle
/// through a `Phi` terminate without an explicit worklist.
pub fn gen_phi(pass: &mut Pass<'_>, node: NodeId) -> Result<TargetNodeId, SelectionError> {
    let source_mode = pass.src.mode(node);
    let block = pass.src.block(node);
    let arity = pass.src.preds(node).len();

    let (mode, out_req) = if source_mode.needs_gp_reg() {
        (Mode::IU, backend::gp_register_requirement())
    } else {
        (source_mode, backend::no_register_requirement())
    };

    let id = builders::phi_placeholder(&mut pass.tgt, block, arity, mode, out_req);
    pass.memo.install_phi_placeholder(node, id);
    Ok(id)
}

fn unsupported_proj(node: NodeId, selector: i64) -> SelectionError {
    SelectionError::UnsupportedProjection {
        ctx: NodeContext { node, opcode: Opcode::Proj },
        selector,
    }
}

/// `gen_Proj_Load`: renumbers a generic `Load`'s result/memory Projs
/// onto the matching `sparc_Ld` selectors.
fn gen_proj_load(pass: &mut Pass<'_>, node: NodeId) -> Result<TargetNodeId, SelectionError> {
    let load = pass.src.proj_pred(node);
    let new_load = pass.transform_node(load)?;
    let selector = pass.src.proj_selector(node);
    let block = pass.src.block(node);

    if selector == i64::from(PnLoad::Res) {
        Ok(builders::proj(&mut pass.tgt, block, new_load, Mode::IU, i64::from(PnSparcLd::Res)))
    } else if selector == i64::from(PnLoad::M) {
        Ok(builders::proj(&mut pass.tgt, block, new_load, Mode::Memory, i64::from(PnSparcLd::M)))
    } else {
        Err(unsupported_proj(node, selector))
    }
}

/// `gen_Proj_be_AddSP`: the stack-pointer/result/memory Projs of a
/// source `AddSp` map onto the `sparc_SubSP` it lowered to (note: both
/// `sp` and `res` land on the same `Stack` selector, matching the
/// original).
fn gen_proj_be_add_sp(pass: &mut Pass<'_>, node: NodeId) -> Result<TargetNodeId, SelectionError> {
    let pred = pass.src.proj_pred(node);
    let new_pred = pass.transform_node(pred)?;
    let selector = pass.src.proj_selector(node);
    let block = pass.src.block(node);

    if selector == i64::from(PnBeAddSp::Sp) {
        let id = builders::proj(&mut pass.tgt, block, new_pred, Mode::IU, i64::from(PnSparcSubSp::Stack));
        pass.tgt.node_mut(id).out_req = backend::stack_pointer_requirement();
        Ok(id)
    } else if selector == i64::from(PnBeAddSp::Res) {
        Ok(builders::proj(&mut pass.tgt, block, new_pred, Mode::IU, i64::from(PnSparcSubSp::Stack)))
    } else if selector == i64::from(PnBeAddSp::M) {
        Ok(builders::proj(&mut pass.tgt, block, new_pred, Mode::Memory, i64::from(PnSparcSubSp::M)))
    } else {
        Err(unsupported_proj(node, selector))
    }
}

/// `gen_Proj_be_SubSP`: mirror image of `gen_proj_be_add_sp` -- a
/// source `SubSp` lowered to `sparc_AddSP`.
fn gen_proj_be_sub_sp(pass: &mut Pass<'_>, node: NodeId) -> Result<TargetNodeId, SelectionError> {
    let pred = pass.src.proj_pred(node);
    let new_pred = pass.transform_node(pred)?;
    let selector = pass.src.proj_selector(node);
    let block = pass.src.block(node);

    if selector == i64::from(PnBeSubSp::Sp) {
        let id = builders::proj(&mut pass.tgt, block, new_pred, Mode::IU, i64::from(PnSparcAddSp::Stack));
        pass.tgt.node_mut(id).out_req = backend::stack_pointer_requirement();
        Ok(id)
    } else if selector == i64::from(PnBeSubSp::M) {
        Ok(builders::proj(&mut pass.tgt, block, new_pred, Mode::Memory, i64::from(PnSparcAddSp::M)))
    } else {
        Err(unsupported_proj(node, selector))
    }
}

/// `gen_Proj_Cmp`: unconditionally unimplemented in the original --
/// boolean `Cmp` results only ever flow into `Cond`, never stand alone.
fn gen_proj_cmp(node: NodeId) -> Result<TargetNodeId, SelectionError> {
    Err(SelectionError::UnsupportedFeature {
        ctx: NodeContext { node, opcode: Opcode::Proj },
        what: "Proj directly from Cmp (boolean results flow only through Cond)",
    })
}

/// `gen_Proj_Div`.
fn gen_proj_div(pass: &mut Pass<'_>, node: NodeId) -> Result<TargetNodeId, SelectionError> {
    let pred = pass.src.proj_pred(node);
    let new_pred = pass.transform_node(pred)?;
    let selector = pass.src.proj_selector(node);
    let mode = pass.src.mode(node);
    let block = pass.src.block(node);

    if selector == i64::from(PnDiv::Res) {
        Ok(builders::proj(&mut pass.tgt, block, new_pred, mode, i64::from(PnSparcDiv::Res)))
    } else {
        Err(unsupported_proj(node, selector))
    }
}

/// `gen_Proj`: dispatches by the predecessor's opcode class; a
/// predecessor outside the recognized set (here, only `Cond`) falls
/// through to a generic duplicate that keeps the node's own mode and
/// selector, applying the `SwitchJmp` renumbering recorded in
/// `Pass::switch_translations` if one was made. The original carries a
/// dead branch for `Start`-predecessor Projs (initial-exec / TLS) that
/// this pass's closed opcode set has no `Start` node to reach anyway.
pub fn gen_proj(pass: &mut Pass<'_>, node: NodeId) -> Result<TargetNodeId, SelectionError> {
    let pred = pass.src.proj_pred(node);

    match pass.src.opcode(pred) {
        Opcode::Store => {
            let selector = pass.src.proj_selector(node);
            if selector == i64::from(PnStore::M) {
                pass.transform_node(pred)
            } else {
                Err(unsupported_proj(node, selector))
            }
        }
        Opcode::Load => gen_proj_load(pass, node),
        Opcode::SubSp => gen_proj_be_sub_sp(pass, node),
        Opcode::AddSp => gen_proj_be_add_sp(pass, node),
        Opcode::Cmp => gen_proj_cmp(node),
        Opcode::Div => gen_proj_div(pass, node),
        _ => {
            let new_pred = pass.transform_node(pred)?;
            let translation = pass.switch_translations.get(&pred).copied().unwrap_or(0);
            let selector = pass.src.proj_selector(node) - translation;
            let mode = pass.src.mode(node);
            let block = pass.src.block(node);
            let out_mode = if mode.needs_gp_reg() { Mode::IU } else { mode };
            let id = builders::proj(&mut pass.tgt, block, new_pred, out_mode, selector);
            pass.tgt.node_mut(id).debug_id = pass.src.debug_id(node);
            Ok(id)
        }
    }
}

#[test]
fn signed_16_bit_compare_sign_extends_both_operands() {
    use crate::source::{BlockId, Graph, Node, Payload, Tarval};
    use crate::target::{SparcOpcode, TargetPayload};

    let mut g = Graph::new();
    let a = g.push(Node {
        opcode: Opcode::Const,
        mode: Mode::IntS(16),
        block: BlockId(0),
        preds: vec![],
        payload: Payload::Const(Tarval::new(3, Mode::IntS(16))),
        pinned: false,
        debug_id: 0,
    });
    let b = g.push(Node {
        opcode: Opcode::Const,
        mode: Mode::IntS(16),
        block: BlockId(0),
        preds: vec![],
        payload: Payload::Const(Tarval::new(-3, Mode::IntS(16))),
        pinned: false,
        debug_id: 0,
    });
    let cmp = g.push(Node {
        opcode: Opcode::Cmp,
        mode: Mode::Flag,
        block: BlockId(0),
        preds: vec![a, b],
        payload: Payload::None,
        pinned: false,
        debug_id: 0,
    });

    let mut pass = Pass::new(&g);
    let result = gen_cmp(&mut pass, cmp).unwrap();

    let cmp_node = pass.tgt.node(result);
    assert_eq!(cmp_node.opcode, SparcOpcode::CmpReg);
    assert_eq!(cmp_node.payload, TargetPayload::Imm(0));

    for &pred in &cmp_node.preds {
        let sra = pass.tgt.node(pred);
        assert_eq!(sra.opcode, SparcOpcode::SraImm);
        assert_eq!(sra.payload, TargetPayload::Imm(16));
        let shl = pass.tgt.node(sra.preds[0]);
        assert_eq!(shl.opcode, SparcOpcode::SllImm);
        assert_eq!(shl.payload, TargetPayload::Imm(16));
    }
}

#[test]
fn boolean_cond_selector_lowers_to_bxx() {
    use crate::source::{BlockId, Graph, Node, Payload, Tarval};
    use crate::target::SparcOpcode;

    let mut g = Graph::new();
    let a = g.push(Node {
        opcode: Opcode::Const,
        mode: Mode::IU,
        block: BlockId(0),
        preds: vec![],
        payload: Payload::Const(Tarval::new(1, Mode::IU)),
        pinned: false,
        debug_id: 0,
    });
    let b = g.push(Node {
        opcode: Opcode::Const,
        mode: Mode::IU,
        block: BlockId(0),
        preds: vec![],
        payload: Payload::Const(Tarval::new(2, Mode::IU)),
        pinned: false,
        debug_id: 0,
    });
    let cmp = g.push(Node {
        opcode: Opcode::Cmp,
        mode: Mode::Flag,
        block: BlockId(0),
        preds: vec![a, b],
        payload: Payload::None,
        pinned: false,
        debug_id: 0,
    });
    let selector = g.push(Node {
        opcode: Opcode::Proj,
        mode: Mode::Flag,
        block: BlockId(0),
        preds: vec![cmp],
        payload: Payload::Proj { selector: 4 },
        pinned: false,
        debug_id: 0,
    });
    let cond = g.push(Node {
        opcode: Opcode::Cond,
        mode: Mode::Memory,
        block: BlockId(0),
        preds: vec![selector],
        payload: Payload::Cond { default_proj: 0 },
        pinned: false,
        debug_id: 0,
    });

    let mut pass = Pass::new(&g);
    let result = gen_cond(&mut pass, cond).unwrap();

    let bxx = pass.tgt.node(result);
    assert_eq!(bxx.opcode, SparcOpcode::Bxx);
    assert_eq!(pass.tgt.node(bxx.preds[0]).opcode, SparcOpcode::CmpReg);
}
