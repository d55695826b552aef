//! Interactive terminal client for the laundry order server.

pub mod client_actors;
pub mod messages;
