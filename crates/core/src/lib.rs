//! Domain types shared between the concurrency-control engine
//! (`ssi-sim-engine`) and the driver (`ssi-sim-cli`).
//!
//! This crate is deliberately inert: it defines identifiers, the
//! instruction AST, commit outcomes, and the internal error type, but
//! holds no state and runs no logic of its own.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod ids;
pub mod instruction;
pub mod outcome;

pub use error::{Error, Result};
pub use ids::{SiteId, TxnId, VarId, NUM_SITES, NUM_VARS};
pub use instruction::Instruction;
pub use outcome::{AbortCause, Outcome};
