//! Console output for the search pipeline.
//!
//! Everything here returns a `String`; the caller decides where it goes.

mod console;

pub use console::{format_completion, format_listing, format_outcomes, format_paper_line};
