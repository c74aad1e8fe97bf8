//! Expose folio's internal API for use in integration tests. It is not meant
//! to be a stable library interface.
pub mod assets;
pub mod build;
pub mod cli;
#[cfg(feature = "serve")]
pub mod serve;
