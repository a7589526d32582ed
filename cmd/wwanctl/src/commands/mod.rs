//! A thin module wrapper that contains all the different files that each
//! handle one command.

mod procedure;

pub use procedure::*;
