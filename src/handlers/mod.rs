//! Per-opcode transform handlers, grouped the way `sparc_transform.c`
//! groups its `gen_*` functions: arithmetic, memory/stack, constants,
//! conversions, control flow.

pub mod arith;
pub mod constants;
pub mod control;
pub mod convert;
pub mod memory;
