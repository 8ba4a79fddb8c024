//! The altrace player (§4.6, §6): reads a binary trace produced by
//! `altrace-record` and dispatches its events to a [`Visitor`].
//!
//! This crate owns none of the wire encoding (that's `altrace-wire`) and
//! nothing about *producing* a trace (that's `altrace-record`); it only
//! resolves the raw bytes back into meaningful, dense, symbolicated
//! events for a front-end to consume.

mod caller_info;
mod labels;
mod reader;
mod symbols;
mod threads;
mod visitor;

pub use caller_info::CallerInfo;
pub use labels::LabelMaps;
pub use reader::{play, PlayResult};
pub use symbols::SymbolMap;
pub use threads::ThreadIdMap;
pub use visitor::Visitor;
