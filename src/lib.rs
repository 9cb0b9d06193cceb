//! Strips `TEST.IMPORT_FAILURES:` ... `TEST.END_IMPORT_FAILURES:` blocks from
//! generated test files so they can be imported again.
//!
//! The pure text transformation lives in [`builders::blocks`]; the
//! [`core::engine::CleanEngine`] applies it to files on disk.

pub mod builders;
pub mod core;
pub mod utils;
