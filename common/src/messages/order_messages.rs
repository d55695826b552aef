use crate::types::dtos::{Metadata, OtpPurpose};
use crate::types::order_status::OrderStatus;
use actix::Message;
use serde::{Deserialize, Serialize};

/////////////////////////////////////////////////////////////////////
// Customer requests
/////////////////////////////////////////////////////////////////////

/// Places a new order into a pickup timeslot.
#[derive(Message, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[rtype(result = "()")]
pub struct PlaceOrder {
    pub center_id: String,
    pub timeslot_id: String,
    pub garments: Vec<String>,
}

#[derive(Message, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[rtype(result = "()")]
pub struct CancelOrder {
    pub order_id: u64,
    pub reason: Option<String>,
}

/// Asks the server to resend the code of an order's current trip.
#[derive(Message, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[rtype(result = "()")]
pub struct RequestOtp {
    pub order_id: u64,
    pub purpose: OtpPurpose,
}

/////////////////////////////////////////////////////////////////////
// Staff and center requests
/////////////////////////////////////////////////////////////////////

/// Staff-driven transition to any status.
///
/// When `target` is one of the assignment statuses, `metadata` must carry the
/// `delivery_person_id` of the partner taking the trip.
#[derive(Message, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[rtype(result = "()")]
pub struct UpdateOrderStatus {
    pub order_id: u64,
    pub target: OrderStatus,
    pub metadata: Metadata,
}

/// Center operator moving an order between processing stages.
#[derive(Message, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[rtype(result = "()")]
pub struct UpdateStage {
    pub order_id: u64,
    pub target: OrderStatus,
    pub metadata: Metadata,
}

/////////////////////////////////////////////////////////////////////
// Delivery person requests
/////////////////////////////////////////////////////////////////////

#[derive(Message, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[rtype(result = "()")]
pub struct StartDelivery {
    pub order_id: u64,
}

#[derive(Message, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[rtype(result = "()")]
pub struct VerifyPickup {
    pub order_id: u64,
    pub code: String,
}

#[derive(Message, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[rtype(result = "()")]
pub struct VerifyDelivery {
    pub order_id: u64,
    pub code: String,
}

#[derive(Message, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[rtype(result = "()")]
pub struct ReportPickupFailed {
    pub order_id: u64,
    pub reason: String,
}

#[derive(Message, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[rtype(result = "()")]
pub struct ReportDeliveryFailed {
    pub order_id: u64,
    pub reason: String,
}

/////////////////////////////////////////////////////////////////////
// Queries
/////////////////////////////////////////////////////////////////////

#[derive(Message, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[rtype(result = "()")]
pub struct GetOrder {
    pub order_id: u64,
}

#[derive(Message, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[rtype(result = "()")]
pub struct GetOrderHistory {
    pub order_id: u64,
}

#[derive(Message, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[rtype(result = "()")]
pub struct ListTimeslots {
    pub center_id: String,
}

#[derive(Message, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[rtype(result = "()")]
pub struct AllowedTransitions {
    pub status: OrderStatus,
}
