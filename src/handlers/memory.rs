//! Memory, address, and stack handler family (spec.md §4.4).

use crate::builders;
use crate::driver::Pass;
use crate::error::SelectionError;
use crate::source::NodeId;
use crate::target::TargetNodeId;

pub fn gen_load(pass: &mut Pass<'_>, node: NodeId) -> Result<TargetNodeId, SelectionError> {
    let block = pass.src.block(node);
    let mode = pass.src.load_mode(node);
    let ptr = pass.src.load_ptr(node);
    let mem = pass.src.load_mem(node);
    let pinned = pass.src.pinned(node);
    let new_ptr = pass.transform_node(ptr)?;
    let new_mem = pass.transform_node(mem)?;
    let id = builders::ld(&mut pass.tgt, block, new_ptr, new_mem, mode);
    pass.tgt.node_mut(id).pinned = pinned;
    Ok(id)
}

pub fn gen_store(pass: &mut Pass<'_>, node: NodeId) -> Result<TargetNodeId, SelectionError> {
    let block = pass.src.block(node);
    let ptr = pass.src.store_ptr(node);
    let value = pass.src.store_value(node);
    let mem = pass.src.store_mem(node);
    let new_ptr = pass.transform_node(ptr)?;
    let new_value = pass.transform_node(value)?;
    let new_mem = pass.transform_node(mem)?;
    let value_mode = pass.src.mode(value);
    Ok(builders::st(&mut pass.tgt, block, new_ptr, new_value, new_mem, value_mode))
}

/// `gen_be_FrameAddr`: the frame base is resolved at emission time, not
/// here, so the handler just duplicates the node over its transformed
/// frame operand.
pub fn gen_frame_addr(pass: &mut Pass<'_>, node: NodeId) -> Result<TargetNodeId, SelectionError> {
    let block = pass.src.block(node);
    let frame = pass.src.frame_addr_frame(node);
    let entity = pass.src.frame_addr_entity(node);
    let new_frame = pass.transform_node(frame)?;
    Ok(builders::frame_addr(&mut pass.tgt, block, new_frame, entity))
}

/// `gen_be_AddSP`: SPARC's stack grows downward, so a generic stack
/// *increment* lowers to a SPARC `SubSp`. The memory input is a fresh
/// `NoMem`, never the transformed memory predecessor of the source node
/// -- threading the real memory edge through here would serialize the
/// stack adjustment against unrelated loads/stores that don't need it.
pub fn gen_add_sp(pass: &mut Pass<'_>, node: NodeId) -> Result<TargetNodeId, SelectionError> {
    let block = pass.src.block(node);
    let old_sp = pass.src.stack_op_old_sp(node);
    let size = pass.src.stack_op_size(node);
    let new_old_sp = pass.transform_node(old_sp)?;
    let new_size = pass.transform_node(size)?;
    let nomem = builders::no_mem(&mut pass.tgt, block);
    Ok(builders::sub_sp(&mut pass.tgt, block, new_old_sp, new_size, nomem))
}

/// `gen_be_SubSP`: the mirror image of `gen_add_sp` -- a generic stack
/// *decrement* lowers to a SPARC `AddSp`.
pub fn gen_sub_sp(pass: &mut Pass<'_>, node: NodeId) -> Result<TargetNodeId, SelectionError> {
    let block = pass.src.block(node);
    let old_sp = pass.src.stack_op_old_sp(node);
    let size = pass.src.stack_op_size(node);
    let new_old_sp = pass.transform_node(old_sp)?;
    let new_size = pass.transform_node(size)?;
    let nomem = builders::no_mem(&mut pass.tgt, block);
    Ok(builders::add_sp(&mut pass.tgt, block, new_old_sp, new_size, nomem))
}

/// `gen_be_Copy`: a plain register-to-register move.
pub fn gen_copy(pass: &mut Pass<'_>, node: NodeId) -> Result<TargetNodeId, SelectionError> {
    let block = pass.src.block(node);
    let op = pass.src.unop_operand(node);
    let new_op = pass.transform_node(op)?;
    Ok(builders::mov_reg(&mut pass.tgt, block, new_op))
}

/// `gen_be_Call`: calling-convention lowering (argument/result register
/// assignment) is the register allocator's job, not this pass's; the
/// node is carried over structurally with its operands transformed.
pub fn gen_call(pass: &mut Pass<'_>, node: NodeId) -> Result<TargetNodeId, SelectionError> {
    let block = pass.src.block(node);
    let mode = pass.src.mode(node);
    let mut new_preds = Vec::with_capacity(pass.src.preds(node).len());
    for pred in pass.src.preds(node).to_vec() {
        new_preds.push(pass.transform_node(pred)?);
    }
    Ok(builders::call(&mut pass.tgt, block, mode, new_preds))
}

#[test]
fn load_propagates_pinned_attribute() {
    use crate::source::{BlockId, Graph, Mode, Node, Opcode, Payload, Tarval};
    use crate::target::SparcOpcode;

    let mut g = Graph::new();
    let ptr = g.push(Node {
        opcode: Opcode::Const,
        mode: Mode::Reference,
        block: BlockId(0),
        preds: vec![],
        payload: Payload::Const(Tarval::new(0x1000, Mode::Reference)),
        pinned: false,
        debug_id: 0,
    });
    let mem = g.push(Node {
        opcode: Opcode::Const,
        mode: Mode::IU,
        block: BlockId(0),
        preds: vec![],
        payload: Payload::Const(Tarval::new(0, Mode::IU)),
        pinned: false,
        debug_id: 0,
    });
    let load = g.push(Node {
        opcode: Opcode::Load,
        mode: Mode::IU,
        block: BlockId(0),
        preds: vec![ptr, mem],
        payload: Payload::Load { mode: Mode::IU },
        pinned: true,
        debug_id: 0,
    });

    let mut pass = Pass::new(&g);
    let result = gen_load(&mut pass, load).unwrap();

    let node = pass.tgt.node(result);
    assert_eq!(node.opcode, SparcOpcode::Ld);
    assert!(node.pinned);
}

#[test]
fn store_duplicates_pointer_value_and_memory_operands() {
    use crate::source::{BlockId, Graph, Mode, Node, Opcode, Payload, Tarval};
    use crate::target::SparcOpcode;

    let mut g = Graph::new();
    let ptr = g.push(Node {
        opcode: Opcode::Const,
        mode: Mode::Reference,
        block: BlockId(0),
        preds: vec![],
        payload: Payload::Const(Tarval::new(0x2000, Mode::Reference)),
        pinned: false,
        debug_id: 0,
    });
    let value = g.push(Node {
        opcode: Opcode::Const,
        mode: Mode::IU,
        block: BlockId(0),
        preds: vec![],
        payload: Payload::Const(Tarval::new(42, Mode::IU)),
        pinned: false,
        debug_id: 0,
    });
    let mem = g.push(Node {
        opcode: Opcode::Const,
        mode: Mode::IU,
        block: BlockId(0),
        preds: vec![],
        payload: Payload::Const(Tarval::new(0, Mode::IU)),
        pinned: false,
        debug_id: 0,
    });
    let store = g.push(Node {
        opcode: Opcode::Store,
        mode: Mode::Memory,
        block: BlockId(0),
        preds: vec![ptr, value, mem],
        payload: Payload::None,
        pinned: true,
        debug_id: 0,
    });

    let mut pass = Pass::new(&g);
    let result = gen_store(&mut pass, store).unwrap();

    let node = pass.tgt.node(result);
    assert_eq!(node.opcode, SparcOpcode::St);
    assert_eq!(node.preds.len(), 3);
}
