//! SSA-graph instruction selection for the SPARC backend.
//!
//! Lowers a target-independent SSA graph (`source`) into a SPARC-specific
//! one (`target`) by walking the graph once, memoizing each source node's
//! target image so shared sub-trees stay shared, and dispatching on
//! opcode through a dense per-instance table.

pub mod backend;
pub mod builders;
pub mod debug;
pub mod dispatch;
pub mod driver;
pub mod error;
mod handlers;
pub mod memo;
pub mod selectors;
pub mod source;
pub mod target;

pub use crate::dispatch::DispatchTable;
pub use crate::driver::{init, transform_graph};
pub use crate::error::SelectionError;

/// `sparc_register_transformers`: builds the opcode-to-handler binding
/// table a fresh `driver::Pass` uses. Exposed at the crate root for
/// callers that want to inspect or reuse the table without driving a
/// full pass.
pub fn register_transformers() -> DispatchTable {
    DispatchTable::register_transformers()
}
