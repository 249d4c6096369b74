//! Application layer: the expansion engine and the run that wraps it with I/O.

pub mod demux;
pub mod expand;
pub mod generate;
pub mod markers;
pub mod rename;
pub mod render;
pub mod scan;
