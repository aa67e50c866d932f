//! # sysdef
//!
//! `sysdef` is the module holding the consistency engine: verification, drift repair,
//! message sorting, handler configuration and the load/save handler.

pub mod config;
pub mod handler;
pub mod repair;
pub mod sort;
pub mod verify;

#[cfg(test)]
pub(crate) fn init_test_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
