//! Core pipeline orchestration and domain logic for the rules generator.
//!
//! This crate ties together fragment discovery, category grouping, operator
//! selection, document assembly, and writing into the end-to-end
//! [`pipeline::generate`] workflow.

pub mod assembler;
pub mod group;
pub mod pipeline;
pub mod prompt;
pub mod selector;
pub mod writer;
