//! Business logic: classification, reconciliation, run state, and the
//! run controller

pub mod classify;
pub mod reconcile;
pub mod runner;
pub mod state;
