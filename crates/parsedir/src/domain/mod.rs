//! Core types shared by the expansion engine and its collaborators.

pub mod errors;
pub mod model;
pub mod policy;
