//! Types, wire messages and TCP plumbing shared by the laundry order server
//! and its terminal client.

pub mod constants;
pub mod errors;
pub mod logger;
pub mod messages;
pub mod network;
pub mod types;
pub mod utils;
