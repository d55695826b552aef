pub mod client;
pub mod ui_handler;
