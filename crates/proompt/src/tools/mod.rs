//! Executable tools and the shapes sections accept as tools.
//!
//! # Submodules
//!
//! - [`core`]: [`Tool`] trait, [`FnTool`] for closure-based tools, and the
//!   ordered [`Toolset`].
//! - [`source`]: [`ToolSource`], the normalization step that turns
//!   contexts, definitions, raw JSON, tools, and toolsets into
//!   [`ToolContext`](crate::context::ToolContext)s.

pub mod core;
pub mod source;

pub use self::core::{
    DEFAULT_MAX_RESULT_BYTES, FnTool, Tool, ToolFuture, Toolset, parse_tool_args,
    truncate_result, validate_tool_arguments,
};
pub use self::source::{ToolSource, load_tool_sources};
