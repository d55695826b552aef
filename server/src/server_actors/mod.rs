pub mod order_state_machine;
pub mod server_actor;
pub mod services;
pub mod storage;
