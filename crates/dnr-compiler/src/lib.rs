//! DNR Rule Set Compiler
//!
//! This crate compiles parsed filter rules into declarative rules for a
//! static request-interception engine, with a source map back to the filter
//! rules and enforcement of the engine's rule count limits.

pub mod badfilter;
pub mod converter;
pub mod converters;
pub mod error;
pub mod grouper;
pub mod limits;
pub mod source_map;

pub use converter::{convert, ConverterOptions, FilterRules, START_DECLARATIVE_RULE_ID};
pub use error::{ConversionError, LimitationError};
pub use limits::ConversionResult;
pub use source_map::Source;
