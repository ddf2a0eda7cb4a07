//! CAUSA Core Types
//!
//! Causal chains: immutable, ordered lists of the objects that led to an
//! occurrence, plus the builder used to assemble them.
//! This crate is pure data and logic with no I/O.
//!
//! Construction comes in two flavours that behave differently on purpose:
//!
//! - dedup paths ([`CausalChain::of_iter`], [`CausalChain::with`],
//!   [`CausalChain::with_iter`], [`ChainBuilder::append`]) drop an element
//!   that is identical to the one right before it;
//! - bulk paths ([`CausalChain::of_many`], [`CausalChain::of_vec`],
//!   [`CausalChain::of_chain`], [`CausalChain::with_many`],
//!   [`CausalChain::merge`], [`ChainBuilder::append_all`]) keep every
//!   element as given.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod builder;
pub mod chain;
pub mod element;
pub mod error;

// Re-exports
pub use builder::ChainBuilder;
pub use chain::CausalChain;
pub use element::{CauseElement, Element};
pub use error::{CauseError, CauseResult};
