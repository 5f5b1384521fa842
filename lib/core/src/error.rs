//! Error handling foundation for flowkit.
//!
//! Only the `Result` alias lives here. Each crate defines its own error
//! enums and adds layer-appropriate context with rootcause's `.context()`
//! as reports propagate up the stack.

use rootcause::Report;

/// A Result type alias using rootcause's Report for error handling.
pub type Result<T, C = ()> = std::result::Result<T, Report<C>>;
