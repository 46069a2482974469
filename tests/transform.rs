//! Whole-graph scenario tests, mirroring `tests/test_bitcode_reader.rs`'s
//! fixture-driven style: build a small source graph by hand, run
//! `transform_graph`, and assert on the shape of the result.

use sparc_isel::source::{BlockId, Entity, Graph, Mode, Node, NodeId, Opcode, Payload, Tarval};
use sparc_isel::target::{SparcOpcode, TargetPayload};
use sparc_isel::transform_graph;

const BLOCK: BlockId = BlockId(0);

fn const_node(value: i64) -> Node {
    Node {
        opcode: Opcode::Const,
        mode: Mode::IU,
        block: BLOCK,
        preds: vec![],
        payload: Payload::Const(Tarval::new(value, Mode::IU)),
        pinned: false,
        debug_id: 0,
    }
}

fn binop(opcode: Opcode, left: NodeId, right: NodeId) -> Node {
    Node {
        opcode,
        mode: Mode::IU,
        block: BLOCK,
        preds: vec![left, right],
        payload: Payload::None,
        pinned: false,
        debug_id: 0,
    }
}

#[test]
fn add_folds_in_range_immediate() {
    let mut g = Graph::new();
    let c3 = g.push(const_node(3));
    let c10 = g.push(const_node(10));
    let add = g.push(binop(Opcode::Add, c3, c10));
    g.roots = vec![add];

    let tgt = transform_graph(&g).unwrap();

    let (add_id, add_node) = tgt.iter().find(|(_, n)| n.opcode == SparcOpcode::AddImm).unwrap();
    assert_eq!(add_node.payload, TargetPayload::Imm(10));
    assert_eq!(add_node.preds.len(), 1);
    assert_eq!(tgt.node(add_node.preds[0]).opcode, SparcOpcode::MovImm);
    assert_eq!(tgt.node(add_node.preds[0]).payload, TargetPayload::Imm(3));
    // No node left over beyond the two materialised here.
    assert_eq!(tgt.len(), 2);
    let _ = add_id;
}

#[test]
fn out_of_range_constant_uses_hi_lo_pair() {
    let mut g = Graph::new();
    let big = g.push(const_node(1_000_000));
    g.roots = vec![big];

    let tgt = transform_graph(&g).unwrap();

    assert_eq!(tgt.len(), 2);
    let (hi_id, hi) = tgt.iter().find(|(_, n)| n.opcode == SparcOpcode::HiImm).unwrap();
    let (_, lo) = tgt.iter().find(|(_, n)| n.opcode == SparcOpcode::LoImm).unwrap();
    assert!(hi.frame_dependent);
    assert!(lo.frame_dependent);
    assert_eq!(lo.preds, vec![hi_id]);
}

#[test]
fn abs_lowers_to_the_branch_free_four_node_chain() {
    let mut g = Graph::new();
    let op = g.push(const_node(5));
    let abs = g.push(Node {
        opcode: Opcode::Abs,
        mode: Mode::IU,
        block: BLOCK,
        preds: vec![op],
        payload: Payload::None,
        pinned: false,
        debug_id: 0,
    });
    g.roots = vec![abs];

    let tgt = transform_graph(&g).unwrap();

    let (sub_id, sub) = tgt.iter().find(|(_, n)| n.opcode == SparcOpcode::SubReg).unwrap();
    let sra_id = sub.preds[0];
    let xor_id = sub.preds[1];
    assert_eq!(tgt.node(sra_id).opcode, SparcOpcode::SraImm);
    assert_eq!(tgt.node(sra_id).payload, TargetPayload::Imm(31));
    let xor = tgt.node(xor_id);
    assert_eq!(xor.opcode, SparcOpcode::XorReg);
    // Xor's second operand is the same Sra the final Sub reads from, and
    // its first operand is the same materialised value Sra's Mov reads.
    assert_eq!(xor.preds[1], sra_id);
    assert_eq!(tgt.node(tgt.node(sra_id).preds[0]).preds, vec![xor.preds[0]]);
    let _ = sub_id;
}

#[test]
fn add_sp_and_sub_sp_invert_stack_direction() {
    let mut g = Graph::new();
    let old_sp = g.push(const_node(0));
    let size = g.push(const_node(16));
    let add_sp = g.push(Node {
        opcode: Opcode::AddSp,
        mode: Mode::IU,
        block: BLOCK,
        preds: vec![old_sp, size],
        payload: Payload::None,
        pinned: false,
        debug_id: 0,
    });
    g.roots = vec![add_sp];
    let tgt = transform_graph(&g).unwrap();
    assert!(tgt.iter().any(|(_, n)| n.opcode == SparcOpcode::SubSp));
    assert!(!tgt.iter().any(|(_, n)| n.opcode == SparcOpcode::AddSp));

    let mut g2 = Graph::new();
    let old_sp2 = g2.push(const_node(0));
    let size2 = g2.push(const_node(16));
    let sub_sp = g2.push(Node {
        opcode: Opcode::SubSp,
        mode: Mode::IU,
        block: BLOCK,
        preds: vec![old_sp2, size2],
        payload: Payload::None,
        pinned: false,
        debug_id: 0,
    });
    g2.roots = vec![sub_sp];
    let tgt2 = transform_graph(&g2).unwrap();
    assert!(tgt2.iter().any(|(_, n)| n.opcode == SparcOpcode::AddSp));
    assert!(!tgt2.iter().any(|(_, n)| n.opcode == SparcOpcode::SubSp));
}

#[test]
fn switch_jmp_renumbers_projs_to_a_contiguous_zero_based_range() {
    let mut g = Graph::new();
    let selector = g.push(const_node(2));
    let cond = g.push(Node {
        opcode: Opcode::Cond,
        mode: Mode::Memory,
        block: BLOCK,
        preds: vec![selector],
        payload: Payload::Cond { default_proj: 8 },
        pinned: false,
        debug_id: 0,
    });
    let mut proj = |selector: i64| {
        g.push(Node {
            opcode: Opcode::Proj,
            mode: Mode::Memory,
            block: BLOCK,
            preds: vec![cond],
            payload: Payload::Proj { selector },
            pinned: false,
            debug_id: 0,
        })
    };
    let p5 = proj(5);
    let p6 = proj(6);
    let p7 = proj(7);
    g.roots = vec![cond, p5, p6, p7];

    let tgt = transform_graph(&g).unwrap();

    let (_, switch) = tgt.iter().find(|(_, n)| n.opcode == SparcOpcode::SwitchJmp).unwrap();
    assert_eq!(
        switch.payload,
        TargetPayload::SwitchJmp { n_projs: 3, default_proj: 3 }
    );

    let selectors: Vec<i64> = tgt
        .iter()
        .filter(|(_, n)| n.opcode == SparcOpcode::Proj)
        .filter_map(|(_, n)| match n.payload {
            TargetPayload::Proj { selector } => Some(selector),
            _ => None,
        })
        .collect();
    assert!(selectors.contains(&0));
    assert!(selectors.contains(&1));
    assert!(selectors.contains(&2));
}

#[test]
fn phi_cycle_is_resolved_after_the_main_pass() {
    // const0 -> phi <-> add(phi, const1); roots only reach `add`, so
    // `phi`'s placeholder must be installed before `add` recurses into it.
    let mut g = Graph::new();
    let const0 = g.push(const_node(0));
    let const1 = g.push(const_node(1));
    // Reserve ids: phi will be index 2, add will be index 3.
    let phi = g.push(Node {
        opcode: Opcode::Phi,
        mode: Mode::IU,
        block: BLOCK,
        preds: vec![const0, NodeId(3)],
        payload: Payload::None,
        pinned: false,
        debug_id: 0,
    });
    let add = g.push(binop(Opcode::Add, phi, const1));
    assert_eq!(add, NodeId(3));
    g.roots = vec![add];

    let tgt = transform_graph(&g).unwrap();

    let (_, phi_target) = tgt.iter().find(|(_, n)| n.opcode == SparcOpcode::Phi).unwrap();
    assert_eq!(phi_target.preds.len(), 2);
    for pred in &phi_target.preds {
        assert_ne!(pred.0, u32::MAX, "phi placeholder predecessor was never fixed up");
    }
}

#[test]
fn shared_subtree_is_transformed_once() {
    let mut g = Graph::new();
    let entity = Entity(7);
    let shared = g.push(Node {
        opcode: Opcode::SymConst,
        mode: Mode::Reference,
        block: BLOCK,
        preds: vec![],
        payload: Payload::SymConst(entity),
        pinned: false,
        debug_id: 0,
    });
    let c1 = g.push(const_node(1));
    let c2 = g.push(const_node(2));
    let add1 = g.push(binop(Opcode::Add, shared, c1));
    let add2 = g.push(binop(Opcode::Add, shared, c2));
    g.roots = vec![add1, add2];

    let tgt = transform_graph(&g).unwrap();

    let sym_const_count = tgt.iter().filter(|(_, n)| n.opcode == SparcOpcode::SymConst).count();
    assert_eq!(sym_const_count, 1, "shared SymConst must be materialised only once");
}

#[test]
fn transform_is_deterministic() {
    let mut g = Graph::new();
    let c1 = g.push(const_node(1));
    let c2 = g.push(const_node(2));
    let add = g.push(binop(Opcode::Add, c1, c2));
    g.roots = vec![add];

    let first: Vec<SparcOpcode> = transform_graph(&g).unwrap().iter().map(|(_, n)| n.opcode).collect();
    let second: Vec<SparcOpcode> = transform_graph(&g).unwrap().iter().map(|(_, n)| n.opcode).collect();
    assert_eq!(first, second);
}

#[test]
fn float_abs_is_rejected() {
    let _ = env_logger::builder().is_test(true).try_init();
    sparc_isel::init();

    let mut g = Graph::new();
    let op = g.push(Node {
        opcode: Opcode::Const,
        mode: Mode::Float(32),
        block: BLOCK,
        preds: vec![],
        payload: Payload::Const(Tarval::new(0, Mode::Float(32))),
        pinned: false,
        debug_id: 0,
    });
    let abs = g.push(Node {
        opcode: Opcode::Abs,
        mode: Mode::Float(32),
        block: BLOCK,
        preds: vec![op],
        payload: Payload::None,
        pinned: false,
        debug_id: 0,
    });
    g.roots = vec![abs];

    assert!(transform_graph(&g).is_err());
}
