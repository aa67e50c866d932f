//! # types
//!
//! `types` is the module containing the model of a system definition: the core tree,
//! its UI mirror, the index types addressing them and the error types of the crate.

pub mod bus;
pub mod container;
pub mod datapool;
pub mod errors;
pub mod hash;
pub mod index;
pub mod message;
pub mod node;
pub mod paired;
pub mod protocol;
pub mod shared;
pub mod signal;
pub mod system;
