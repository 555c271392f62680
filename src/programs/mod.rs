//! Instruction builders for the programs the flows talk to

pub mod metadata;
pub mod token;
