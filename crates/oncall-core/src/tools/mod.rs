//! Investigation tools
//!
//! A fixed catalogue the oracle may pick from, a pluggable source of
//! results, and the executor that turns a request into a ledger record.

pub mod registry;
pub mod source;

pub use registry::{no_data, ToolDescriptor, ToolExecutor, ToolRegistry};
pub use source::{StaticToolTable, ToolResultSource};
