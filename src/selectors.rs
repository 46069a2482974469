//! Numeric projection selectors, closed sets in the same spirit as the
//! original's `pn_Load_*`/`pn_sparc_*` generated constants. Modeled with
//! `num_enum` the way the teacher models closed numeric code sets
//! (`schema/enums.rs`, `ir/codes.rs`).

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Source-side `Load` projection numbers (`pn_Load_res`/`pn_Load_M`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(i64)]
pub enum PnLoad {
    Res = 0,
    M = 1,
}

/// Source-side `Store` projection numbers (`pn_Store_M`, the only one).
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(i64)]
pub enum PnStore {
    M = 0,
}

/// Source-side `Div` projection numbers (`pn_Div_res`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(i64)]
pub enum PnDiv {
    Res = 0,
}

/// Source-side `be_AddSP` projection numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(i64)]
pub enum PnBeAddSp {
    Sp = 0,
    Res = 1,
    M = 2,
}

/// Source-side `be_SubSP` projection numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(i64)]
pub enum PnBeSubSp {
    Sp = 0,
    M = 1,
}

/// Target-side `sparc_Ld` projection numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(i64)]
pub enum PnSparcLd {
    Res = 0,
    M = 1,
}

/// Target-side `sparc_SubSP` projection numbers (the lowering target for
/// a source `AddSp`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(i64)]
pub enum PnSparcSubSp {
    Stack = 0,
    M = 1,
}

/// Target-side `sparc_AddSP` projection numbers (the lowering target for
/// a source `SubSp`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(i64)]
pub enum PnSparcAddSp {
    Stack = 0,
    M = 1,
}

/// Target-side `sparc_Div` result projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(i64)]
pub enum PnSparcDiv {
    Res = 0,
}

/// Target-side `sparc_Mul` low-result projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(i64)]
pub enum PnSparcMul {
    Low = 0,
}

/// Target-side `sparc_Mulh` projection. The original names this constant
/// `pn_sparc_Mulh_low` even though `gen_Mulh` uses it to extract the
/// *high* 32 bits of the multiply (there is no separate `..._high`
/// constant in the source); kept verbatim rather than "corrected" since
/// it is the wire-compatible selector a downstream consumer expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(i64)]
pub enum PnSparcMulh {
    Low = 0,
}
