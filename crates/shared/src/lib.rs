//! State, persistence entities and DIDComm plumbing shared by the
//! connector's protocol crates.

pub mod constants;
pub mod midlw;
pub mod problem_report;
pub mod repository;
pub mod state;
pub mod utils;
