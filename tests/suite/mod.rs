//! Integration test modules

mod evaluation;
mod failures;
mod session;
