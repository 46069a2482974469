//! Fatal-only error taxonomy for instruction selection.
//!
//! Every variant here corresponds to a `panic()`/`assert()` call in the
//! original C pass. There is no recoverable path: a selection failure
//! means unsound machine code, so the pass aborts rather than returning
//! a partial target graph (spec.md §7).

use std::{error, fmt};

use crate::source::{Mode, NodeId, Opcode};

/// Identifies the source node a fatal diagnostic is about, for the
/// "name the node kind ... and the source-node identity" requirement in
/// spec.md §7.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeContext {
    pub node: NodeId,
    pub opcode: Opcode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionError {
    /// FP where integer is expected, quad FP, FP `Unknown`, FP `Cmp`,
    /// 64-bit modes outside Phi canonicalisation, or an extension width
    /// other than 8/16.
    UnsupportedFeature {
        ctx: NodeContext,
        what: &'static str,
    },
    /// Source opcode with no entry in the dispatch table.
    MissingHandler { ctx: NodeContext },
    /// A `Proj` whose predecessor class is not handled, or a selector
    /// outside the defined set.
    UnsupportedProjection { ctx: NodeContext, selector: i64 },
    /// A mode/shape invariant the pass assumes was violated (e.g. a
    /// `Cmp`'s two sides do not share a mode).
    InvariantViolation {
        ctx: NodeContext,
        what: &'static str,
        mode: Option<Mode>,
    },
}

impl fmt::Display for SelectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedFeature { ctx, what } => write!(
                f,
                "selection failed: unsupported feature `{what}` at {:?} node#{}",
                ctx.opcode, ctx.node.0
            ),
            Self::MissingHandler { ctx } => write!(
                f,
                "selection failed: no transform handler registered for {:?} node#{}",
                ctx.opcode, ctx.node.0
            ),
            Self::UnsupportedProjection { ctx, selector } => write!(
                f,
                "selection failed: unsupported projection {selector} from {:?} node#{}",
                ctx.opcode, ctx.node.0
            ),
            Self::InvariantViolation { ctx, what, mode } => {
                write!(
                    f,
                    "selection failed: invariant violated (`{what}`) at {:?} node#{}",
                    ctx.opcode, ctx.node.0
                )?;
                if let Some(mode) = mode {
                    write!(f, " (mode {mode})")?;
                }
                Ok(())
            }
        }
    }
}

impl error::Error for SelectionError {}
