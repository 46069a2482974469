//! Extension and conversion handler family (spec.md §4.5).

use crate::builders;
use crate::driver::Pass;
use crate::error::{NodeContext, SelectionError};
use crate::handlers::constants::materialize_const_value;
use crate::source::{BlockId, Mode, NodeId, Opcode};
use crate::target::TargetNodeId;

/// `upper_bits_clean`: the original always returns false here (a
/// documented TODO in the source -- no dataflow analysis backs this
/// check), so every narrowing conversion pays for its extension even
/// when the producer's upper bits happen to already be clean.
fn upper_bits_clean() -> bool {
    false
}

/// `gen_zero_extension`: mask to the narrower width with `And_imm`. Only
/// defined for 8/16-bit widths -- the original panics outside that set,
/// since a zero extension is always a sub-word byte/halfword conversion.
pub fn gen_zero_extension(
    pass: &mut Pass<'_>,
    node: NodeId,
    block: BlockId,
    op: TargetNodeId,
    from_bits: u8,
) -> Result<TargetNodeId, SelectionError> {
    if from_bits != 8 && from_bits != 16 {
        return Err(SelectionError::UnsupportedFeature {
            ctx: NodeContext { node, opcode: Opcode::Conv },
            what: "zero extension width other than 8/16 bits",
        });
    }
    let mask = (1i64 << from_bits) - 1;
    Ok(builders::and_imm(&mut pass.tgt, block, op, mask))
}

/// `gen_sign_extension`: shift the narrower width up to bit 31, then
/// arithmetic-shift it back down, duplicating the sign bit across the
/// cleared high bits. Works for any width below 32 -- unlike zero
/// extension, the original never restricts this to 8/16 bits.
pub fn gen_sign_extension(
    pass: &mut Pass<'_>,
    block: BlockId,
    op: TargetNodeId,
    from_bits: u8,
) -> Result<TargetNodeId, SelectionError> {
    let shift = i64::from(32 - from_bits);
    let shl = builders::sll_imm(&mut pass.tgt, block, op, shift);
    Ok(builders::sra_imm(&mut pass.tgt, block, shl, shift))
}

/// `gen_extension`: dispatches on the source mode's signedness. Only the
/// zero-extension path is limited to 8/16-bit widths; sign extension is
/// unrestricted (n < 32), matching `gen_Conv`'s un-gated call into
/// `gen_sign_extension`.
pub fn gen_extension(
    pass: &mut Pass<'_>,
    node: NodeId,
    block: BlockId,
    op: TargetNodeId,
    from_mode: Mode,
) -> Result<TargetNodeId, SelectionError> {
    let bits = from_mode.size_bits();
    if from_mode.is_signed() {
        gen_sign_extension(pass, block, op, bits)
    } else {
        gen_zero_extension(pass, node, block, op, bits)
    }
}

/// `gen_Conv`: identity for same-mode conversions; same-bit-width
/// conversions (e.g. a signedness-only change) are also a no-op in the
/// generic-IR encoding. Otherwise extends via `gen_extension`, keyed on
/// whichever of the two modes is narrower, unless `upper_bits_clean`
/// says otherwise (it never does). Floating-point conversions of any
/// shape are unsupported here.
pub fn gen_conv(pass: &mut Pass<'_>, node: NodeId) -> Result<TargetNodeId, SelectionError> {
    let dest_mode = pass.src.mode(node);
    let op = pass.src.unop_operand(node);
    let src_mode = pass.src.mode(op);

    if src_mode == dest_mode {
        return pass.transform_node(op);
    }

    if src_mode.is_float() || dest_mode.is_float() {
        return Err(SelectionError::UnsupportedFeature {
            ctx: NodeContext { node, opcode: Opcode::Conv },
            what: "floating-point conversion",
        });
    }

    let block = pass.src.block(node);
    let new_op = pass.transform_node(op)?;

    let src_bits = src_mode.size_bits();
    let dst_bits = dest_mode.size_bits();
    if src_bits == dst_bits {
        return Ok(new_op);
    }

    let min_mode = if src_bits < dst_bits { src_mode } else { dest_mode };

    if upper_bits_clean() {
        return Ok(new_op);
    }

    gen_extension(pass, node, block, new_op, min_mode)
}

/// `gen_Unknown`: an integer/reference `Unknown` materialises as the
/// constant zero; any other mode is unsupported (the original only
/// defines this for GP-register-class modes).
pub fn gen_unknown(pass: &mut Pass<'_>, node: NodeId) -> Result<TargetNodeId, SelectionError> {
    let mode = pass.src.mode(node);
    if !mode.needs_gp_reg() {
        return Err(SelectionError::UnsupportedFeature {
            ctx: NodeContext { node, opcode: Opcode::Unknown },
            what: "Unknown outside the general-purpose register class",
        });
    }
    let block = pass.src.block(node);
    Ok(materialize_const_value(pass, block, 0))
}

#[test]
fn extension_is_structurally_idempotent() {
    use crate::source::Graph;
    use crate::target::{SparcOpcode, TargetPayload};

    let g = Graph::new();
    let mut pass = Pass::new(&g);
    let block = BlockId(0);
    let leaf = builders::mov_imm(&mut pass.tgt, block, 7);
    let dummy = NodeId(0);

    let once = gen_extension(&mut pass, dummy, block, leaf, Mode::IntS(16)).unwrap();
    let twice = gen_extension(&mut pass, dummy, block, once, Mode::IntS(16)).unwrap();

    let once_sra = pass.tgt.node(once);
    let twice_sra = pass.tgt.node(twice);
    assert_eq!(once_sra.opcode, SparcOpcode::SraImm);
    assert_eq!(once_sra.opcode, twice_sra.opcode);
    assert_eq!(once_sra.payload, twice_sra.payload);
    assert_eq!(once_sra.payload, TargetPayload::Imm(16));

    let once_shl = pass.tgt.node(once_sra.preds[0]);
    let twice_shl = pass.tgt.node(twice_sra.preds[0]);
    assert_eq!(once_shl.opcode, twice_shl.opcode);
    assert_eq!(once_shl.payload, twice_shl.payload);
}
