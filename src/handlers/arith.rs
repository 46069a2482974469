//! Arithmetic/logical binary handler family (spec.md §4.3) plus the
//! single-operand nodes that live alongside it in the original
//! (`gen_Not`, `gen_Minus`, `gen_Abs`).

use bitflags::bitflags;

use crate::builders;
use crate::driver::Pass;
use crate::error::{NodeContext, SelectionError};
use crate::handlers::constants::imm_value;
use crate::selectors::{PnSparcMul, PnSparcMulh};
use crate::source::{BlockId, NodeId, Opcode};
use crate::target::{TargetGraph, TargetNodeId};

bitflags! {
    /// `match_flags_t`. `SIZE_NEUTRAL` is carried for documentation only
    /// (it records which operators don't care about dirty upper bits);
    /// the original `gen_helper_binop` never actually branches on it, and
    /// this crate preserves that rather than inventing an extension step
    /// the source never performs (see DESIGN.md).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MatchFlags: u8 {
        const NONE = 0;
        const COMMUTATIVE = 1 << 0;
        const SIZE_NEUTRAL = 1 << 1;
    }
}

type BinopReg = fn(&mut TargetGraph, BlockId, TargetNodeId, TargetNodeId) -> TargetNodeId;
type BinopImm = fn(&mut TargetGraph, BlockId, TargetNodeId, i64) -> TargetNodeId;

fn float_unsupported(node: NodeId, opcode: Opcode, what: &'static str) -> SelectionError {
    SelectionError::UnsupportedFeature {
        ctx: NodeContext { node, opcode },
        what,
    }
}

/// `gen_helper_binop`: fold an immediate-encodable right operand into
/// the `_imm` form; for commutative operators, also try the left
/// operand; otherwise transform both sides and emit the `_reg` form.
pub fn gen_helper_binop(
    pass: &mut Pass<'_>,
    node: NodeId,
    flags: MatchFlags,
    new_reg: BinopReg,
    new_imm: BinopImm,
) -> Result<TargetNodeId, SelectionError> {
    let block = pass.src.block(node);
    let op1 = pass.src.binop_left(node);
    let op2 = pass.src.binop_right(node);

    if let Some(v) = imm_value(pass.src, op2) {
        let new_op1 = pass.transform_node(op1)?;
        return Ok(new_imm(&mut pass.tgt, block, new_op1, v));
    }

    let new_op2 = pass.transform_node(op2)?;

    if flags.contains(MatchFlags::COMMUTATIVE) {
        if let Some(v) = imm_value(pass.src, op1) {
            return Ok(new_imm(&mut pass.tgt, block, new_op2, v));
        }
    }

    let new_op1 = pass.transform_node(op1)?;
    Ok(new_reg(&mut pass.tgt, block, new_op1, new_op2))
}

pub fn gen_add(pass: &mut Pass<'_>, node: NodeId) -> Result<TargetNodeId, SelectionError> {
    if pass.src.mode(node).is_float() {
        return Err(float_unsupported(node, Opcode::Add, "floating-point add"));
    }
    gen_helper_binop(
        pass,
        node,
        MatchFlags::COMMUTATIVE | MatchFlags::SIZE_NEUTRAL,
        builders::add_reg,
        builders::add_imm,
    )
}

pub fn gen_sub(pass: &mut Pass<'_>, node: NodeId) -> Result<TargetNodeId, SelectionError> {
    if pass.src.mode(node).is_float() {
        return Err(float_unsupported(node, Opcode::Sub, "floating-point sub"));
    }
    gen_helper_binop(
        pass,
        node,
        MatchFlags::SIZE_NEUTRAL,
        builders::sub_reg,
        builders::sub_imm,
    )
}

pub fn gen_and(pass: &mut Pass<'_>, node: NodeId) -> Result<TargetNodeId, SelectionError> {
    if pass.src.mode(node).is_float() {
        return Err(float_unsupported(node, Opcode::And, "floating-point and"));
    }
    gen_helper_binop(pass, node, MatchFlags::COMMUTATIVE, builders::and_reg, builders::and_imm)
}

pub fn gen_or(pass: &mut Pass<'_>, node: NodeId) -> Result<TargetNodeId, SelectionError> {
    if pass.src.mode(node).is_float() {
        return Err(float_unsupported(node, Opcode::Or, "floating-point or"));
    }
    gen_helper_binop(pass, node, MatchFlags::COMMUTATIVE, builders::or_reg, builders::or_imm)
}

pub fn gen_xor(pass: &mut Pass<'_>, node: NodeId) -> Result<TargetNodeId, SelectionError> {
    if pass.src.mode(node).is_float() {
        return Err(float_unsupported(node, Opcode::Xor, "floating-point xor"));
    }
    gen_helper_binop(pass, node, MatchFlags::COMMUTATIVE, builders::xor_reg, builders::xor_imm)
}

pub fn gen_shl(pass: &mut Pass<'_>, node: NodeId) -> Result<TargetNodeId, SelectionError> {
    gen_helper_binop(pass, node, MatchFlags::SIZE_NEUTRAL, builders::sll_reg, builders::sll_imm)
}

pub fn gen_shr(pass: &mut Pass<'_>, node: NodeId) -> Result<TargetNodeId, SelectionError> {
    gen_helper_binop(pass, node, MatchFlags::SIZE_NEUTRAL, builders::slr_reg, builders::slr_imm)
}

pub fn gen_shra(pass: &mut Pass<'_>, node: NodeId) -> Result<TargetNodeId, SelectionError> {
    gen_helper_binop(pass, node, MatchFlags::SIZE_NEUTRAL, builders::sra_reg, builders::sra_imm)
}

/// `gen_Mul`: returns the low 32 bits of the 64-bit multiply result.
pub fn gen_mul(pass: &mut Pass<'_>, node: NodeId) -> Result<TargetNodeId, SelectionError> {
    if pass.src.mode(node).is_float() {
        return Err(float_unsupported(node, Opcode::Mul, "floating-point mul"));
    }
    let mul = gen_helper_binop(
        pass,
        node,
        MatchFlags::COMMUTATIVE | MatchFlags::SIZE_NEUTRAL,
        builders::mul_reg,
        builders::mul_imm,
    )?;
    pass.tgt.node_mut(mul).modify_flags = true;
    let block = pass.src.block(node);
    Ok(builders::proj(
        &mut pass.tgt,
        block,
        mul,
        crate::source::Mode::IU,
        i64::from(PnSparcMul::Low),
    ))
}

/// `gen_Mulh`: returns the high 32 bits of the 64-bit multiply result.
pub fn gen_mulh(pass: &mut Pass<'_>, node: NodeId) -> Result<TargetNodeId, SelectionError> {
    if pass.src.mode(node).is_float() {
        return Err(float_unsupported(node, Opcode::Mulh, "floating-point mulh"));
    }
    let mul = gen_helper_binop(
        pass,
        node,
        MatchFlags::COMMUTATIVE | MatchFlags::SIZE_NEUTRAL,
        builders::mulh_reg,
        builders::mulh_imm,
    )?;
    let block = pass.src.block(node);
    Ok(builders::proj(
        &mut pass.tgt,
        block,
        mul,
        crate::source::Mode::IU,
        i64::from(PnSparcMulh::Low),
    ))
}

pub fn gen_div(pass: &mut Pass<'_>, node: NodeId) -> Result<TargetNodeId, SelectionError> {
    if pass.src.mode(node).is_float() {
        return Err(float_unsupported(node, Opcode::Div, "floating-point div"));
    }
    gen_helper_binop(pass, node, MatchFlags::SIZE_NEUTRAL, builders::div_reg, builders::div_imm)
}

pub fn gen_not(pass: &mut Pass<'_>, node: NodeId) -> Result<TargetNodeId, SelectionError> {
    let block = pass.src.block(node);
    let op = pass.src.unop_operand(node);
    let new_op = pass.transform_node(op)?;
    Ok(builders::not(&mut pass.tgt, block, new_op))
}

pub fn gen_minus(pass: &mut Pass<'_>, node: NodeId) -> Result<TargetNodeId, SelectionError> {
    if pass.src.mode(node).is_float() {
        return Err(float_unsupported(node, Opcode::Minus, "floating-point minus"));
    }
    let block = pass.src.block(node);
    let op = pass.src.unop_operand(node);
    let new_op = pass.transform_node(op)?;
    Ok(builders::minus(&mut pass.tgt, block, new_op))
}

/// `gen_Abs`: branch-free absolute value.
///
/// ```text
/// mov a, b
/// sra b, 31 -> mask
/// xor a, mask -> x
/// sub mask, x
/// ```
pub fn gen_abs(pass: &mut Pass<'_>, node: NodeId) -> Result<TargetNodeId, SelectionError> {
    if pass.src.mode(node).is_float() {
        return Err(float_unsupported(node, Opcode::Abs, "floating-point abs"));
    }
    let block = pass.src.block(node);
    let op = pass.src.unop_operand(node);
    let new_op = pass.transform_node(op)?;

    let mov = builders::mov_reg(&mut pass.tgt, block, new_op);
    let sra = builders::sra_imm(&mut pass.tgt, block, mov, 31);
    let xor = builders::xor_reg(&mut pass.tgt, block, new_op, sra);
    let sub = builders::sub_reg(&mut pass.tgt, block, sra, xor);
    Ok(sub)
}

#[test]
fn commutative_immediate_folds_the_left_operand() {
    use crate::driver::Pass;
    use crate::source::{BlockId, Graph, Mode, Node, Payload, Tarval};

    let mut g = Graph::new();
    let left_const = g.push(Node {
        opcode: Opcode::Const,
        mode: Mode::IU,
        block: BlockId(0),
        preds: vec![],
        payload: Payload::Const(Tarval::new(7, Mode::IU)),
        pinned: false,
        debug_id: 0,
    });
    let right_sym = g.push(Node {
        opcode: Opcode::SymConst,
        mode: Mode::Reference,
        block: BlockId(0),
        preds: vec![],
        payload: Payload::SymConst(crate::source::Entity(1)),
        pinned: false,
        debug_id: 0,
    });
    let add = g.push(Node {
        opcode: Opcode::Add,
        mode: Mode::IU,
        block: BlockId(0),
        preds: vec![left_const, right_sym],
        payload: Payload::None,
        pinned: false,
        debug_id: 0,
    });

    let mut pass = Pass::new(&g);
    let result = gen_add(&mut pass, add).unwrap();
    assert_eq!(pass.tgt.node(result).opcode, crate::target::SparcOpcode::AddImm);
    assert_eq!(pass.tgt.node(result).payload, crate::target::TargetPayload::Imm(7));
}

fn two_operand_binop(opcode: Opcode, left: i64, right: i64) -> (crate::source::Graph, NodeId) {
    use crate::source::{BlockId, Graph, Mode, Node, Payload, Tarval};

    let mut g = Graph::new();
    let l = g.push(Node {
        opcode: Opcode::Const,
        mode: Mode::IU,
        block: BlockId(0),
        preds: vec![],
        payload: Payload::Const(Tarval::new(left, Mode::IU)),
        pinned: false,
        debug_id: 0,
    });
    let r = g.push(Node {
        opcode: Opcode::Const,
        mode: Mode::IU,
        block: BlockId(0),
        preds: vec![],
        payload: Payload::Const(Tarval::new(right, Mode::IU)),
        pinned: false,
        debug_id: 0,
    });
    let node = g.push(Node {
        opcode,
        mode: Mode::IU,
        block: BlockId(0),
        preds: vec![l, r],
        payload: Payload::None,
        pinned: false,
        debug_id: 0,
    });
    (g, node)
}

#[test]
fn div_lowers_to_a_plain_binop() {
    use crate::driver::Pass;
    use crate::target::SparcOpcode;

    let (g, node) = two_operand_binop(Opcode::Div, 100, 3);
    let mut pass = Pass::new(&g);
    let result = gen_div(&mut pass, node).unwrap();
    assert_eq!(pass.tgt.node(result).opcode, SparcOpcode::DivReg);
}

#[test]
fn mul_extracts_the_low_result_projection() {
    use crate::driver::Pass;
    use crate::target::SparcOpcode;

    let (g, node) = two_operand_binop(Opcode::Mul, 6, 7);
    let mut pass = Pass::new(&g);
    let result = gen_mul(&mut pass, node).unwrap();

    let proj = pass.tgt.node(result);
    assert_eq!(proj.opcode, SparcOpcode::Proj);
    let mul = pass.tgt.node(proj.preds[0]);
    assert_eq!(mul.opcode, SparcOpcode::MulReg);
    assert!(mul.modify_flags);
}

#[test]
fn mulh_extracts_the_low_selector_for_the_high_result() {
    use crate::driver::Pass;
    use crate::target::SparcOpcode;

    let (g, node) = two_operand_binop(Opcode::Mulh, 6, 7);
    let mut pass = Pass::new(&g);
    let result = gen_mulh(&mut pass, node).unwrap();

    let proj = pass.tgt.node(result);
    assert_eq!(proj.opcode, SparcOpcode::Proj);
    let mulh = pass.tgt.node(proj.preds[0]);
    assert_eq!(mulh.opcode, SparcOpcode::MulhReg);
    assert!(!mulh.modify_flags);
}
