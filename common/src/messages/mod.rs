pub mod order_messages;
pub mod shared_messages;

pub use order_messages::*;
pub use shared_messages::*;
