pub mod actor_role;
pub mod dtos;
pub mod order_status;
