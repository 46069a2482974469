//! Dispatch Table: opcode -> handler. Registration happens once per pass
//! initialisation and is idempotent (spec.md §4.2); an opcode missing an
//! entry is fatal when it is actually encountered, not at registration
//! time.

use crate::driver::Pass;
use crate::error::SelectionError;
use crate::handlers;
use crate::source::{NodeId, Opcode};
use crate::target::TargetNodeId;

pub type Handler = fn(&mut Pass<'_>, NodeId) -> Result<TargetNodeId, SelectionError>;

pub struct DispatchTable {
    handlers: [Option<Handler>; Opcode::COUNT],
}

impl DispatchTable {
    pub fn get(&self, opcode: Opcode) -> Option<Handler> {
        self.handlers[opcode.index()]
    }

    /// `sparc_register_transformers`: binds every known source opcode to
    /// its handler. Idempotent: constructing a new table always starts
    /// from the same fixed bindings.
    pub fn register_transformers() -> Self {
        let mut handlers: [Option<Handler>; Opcode::COUNT] = [None; Opcode::COUNT];

        let mut set = |op: Opcode, h: Handler| handlers[op.index()] = Some(h);

        set(Opcode::Add, handlers::arith::gen_add);
        set(Opcode::Sub, handlers::arith::gen_sub);
        set(Opcode::And, handlers::arith::gen_and);
        set(Opcode::Or, handlers::arith::gen_or);
        set(Opcode::Xor, handlers::arith::gen_xor);
        set(Opcode::Eor, handlers::arith::gen_xor);
        set(Opcode::Shl, handlers::arith::gen_shl);
        set(Opcode::Shr, handlers::arith::gen_shr);
        set(Opcode::Shrs, handlers::arith::gen_shra);
        set(Opcode::Mul, handlers::arith::gen_mul);
        set(Opcode::Mulh, handlers::arith::gen_mulh);
        set(Opcode::Div, handlers::arith::gen_div);
        set(Opcode::Abs, handlers::arith::gen_abs);
        set(Opcode::Not, handlers::arith::gen_not);
        set(Opcode::Minus, handlers::arith::gen_minus);

        set(Opcode::Load, handlers::memory::gen_load);
        set(Opcode::Store, handlers::memory::gen_store);
        set(Opcode::FrameAddr, handlers::memory::gen_frame_addr);
        set(Opcode::AddSp, handlers::memory::gen_add_sp);
        set(Opcode::SubSp, handlers::memory::gen_sub_sp);
        set(Opcode::Copy, handlers::memory::gen_copy);
        set(Opcode::Call, handlers::memory::gen_call);

        set(Opcode::Const, handlers::constants::gen_const);
        set(Opcode::SymConst, handlers::constants::gen_sym_const);

        set(Opcode::Conv, handlers::convert::gen_conv);
        set(Opcode::Unknown, handlers::convert::gen_unknown);

        set(Opcode::Cmp, handlers::control::gen_cmp);
        set(Opcode::Cond, handlers::control::gen_cond);
        set(Opcode::Jmp, handlers::control::gen_jmp);
        set(Opcode::Phi, handlers::control::gen_phi);
        set(Opcode::Proj, handlers::control::gen_proj);

        Self { handlers }
    }
}
