use actix::prelude::*;
use common::errors::OrderError;
use common::messages::shared_messages::NetworkMessage;
use common::types::dtos::{ActorDTO, Metadata, OrderDTO, OrderLogDTO, OtpDTO, OtpPurpose, TimeslotDTO};
use common::types::order_status::OrderStatus;
use std::net::SocketAddr;

/////////////////////////////////////////////////////////////////////
// Mensajes del Storage
/////////////////////////////////////////////////////////////////////

/// Registers a pickup window. Replaces any timeslot with the same id.
#[derive(Message, Debug, Clone)]
#[rtype(result = "()")]
pub struct AddTimeslot {
    pub timeslot: TimeslotDTO,
}

#[derive(Message, Debug, Clone)]
#[rtype(result = "Option<TimeslotDTO>")]
pub struct GetTimeslot {
    pub timeslot_id: String,
}

/// Timeslots of a center, earliest first.
#[derive(Message, Debug, Clone)]
#[rtype(result = "Vec<TimeslotDTO>")]
pub struct GetCenterTimeslots {
    pub center_id: String,
}

/// Reserves timeslot capacity, inserts the order as PLACED and writes its
/// first audit row, all in one step.
#[derive(Message, Debug, Clone)]
#[rtype(result = "Result<OrderDTO, OrderError>")]
pub struct CreateOrder {
    pub customer: ActorDTO,
    pub center_id: String,
    pub timeslot_id: String,
    pub garments: Vec<String>,
}

/// Moves an order to `target` through the state machine.
///
/// `delivery_person_id`, when present, is recorded on the order in the same
/// step. Moving an order to CANCELLED gives its timeslot capacity back.
#[derive(Message, Debug, Clone)]
#[rtype(result = "Result<OrderDTO, OrderError>")]
pub struct TransitionOrder {
    pub order_id: u64,
    pub target: OrderStatus,
    pub actor: ActorDTO,
    pub metadata: Metadata,
    pub delivery_person_id: Option<String>,
}

#[derive(Message, Debug, Clone)]
#[rtype(result = "Result<OrderDTO, OrderError>")]
pub struct FetchOrder {
    pub order_id: u64,
}

/// Audit rows of an order in the order they were written.
#[derive(Message, Debug, Clone)]
#[rtype(result = "Result<Vec<OrderLogDTO>, OrderError>")]
pub struct FetchOrderLogs {
    pub order_id: u64,
}

/////////////////////////////////////////////////////////////////////
// Mensajes del OtpService
/////////////////////////////////////////////////////////////////////

/// Issues a fresh code, replacing any previous one for the same trip.
#[derive(Message, Debug, Clone)]
#[rtype(result = "OtpDTO")]
pub struct IssueOtp {
    pub order_id: u64,
    pub purpose: OtpPurpose,
}

/// Checks a code. A successful check consumes it.
#[derive(Message, Debug, Clone)]
#[rtype(result = "Result<(), OrderError>")]
pub struct VerifyOtp {
    pub order_id: u64,
    pub purpose: OtpPurpose,
    pub code: String,
}

#[derive(Message, Debug, Clone)]
#[rtype(result = "Option<OtpDTO>")]
pub struct LookupOtp {
    pub order_id: u64,
    pub purpose: OtpPurpose,
}

/// Drops every code of an order.
#[derive(Message, Debug, Clone)]
#[rtype(result = "()")]
pub struct RevokeOtps {
    pub order_id: u64,
}

#[derive(Message, Debug, Clone)]
#[rtype(result = "()")]
pub struct ExpireOtp {
    pub order_id: u64,
    pub purpose: OtpPurpose,
}

/////////////////////////////////////////////////////////////////////
// Mensajes del OrderService
/////////////////////////////////////////////////////////////////////

/// Entry point a session uses to reach an order; decides the target status
/// and who may take it.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderRoute {
    /// Floor manager or admin, any target.
    Staff { target: OrderStatus },
    /// Center operator, processing stages only.
    CenterStage { target: OrderStatus },
    /// Customer (own order) or staff.
    Cancel { reason: Option<String> },
    StartDelivery,
    VerifyPickup { code: String },
    VerifyDelivery { code: String },
    ReportPickupFailed { reason: String },
    ReportDeliveryFailed { reason: String },
}

impl OrderRoute {
    pub fn target(&self) -> OrderStatus {
        match self {
            OrderRoute::Staff { target } | OrderRoute::CenterStage { target } => *target,
            OrderRoute::Cancel { .. } => OrderStatus::Cancelled,
            OrderRoute::StartDelivery => OrderStatus::OutForDelivery,
            OrderRoute::VerifyPickup { .. } => OrderStatus::PickedUp,
            OrderRoute::VerifyDelivery { .. } => OrderStatus::Delivered,
            OrderRoute::ReportPickupFailed { .. } => OrderStatus::PickupFailed,
            OrderRoute::ReportDeliveryFailed { .. } => OrderStatus::DeliveryFailed,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            OrderRoute::Staff { .. } => "update order status",
            OrderRoute::CenterStage { .. } => "update center stage",
            OrderRoute::Cancel { .. } => "cancel order",
            OrderRoute::StartDelivery => "start delivery",
            OrderRoute::VerifyPickup { .. } => "verify pickup",
            OrderRoute::VerifyDelivery { .. } => "verify delivery",
            OrderRoute::ReportPickupFailed { .. } => "report pickup failure",
            OrderRoute::ReportDeliveryFailed { .. } => "report delivery failure",
        }
    }
}

#[derive(Message, Debug, Clone)]
#[rtype(result = "Result<OrderDTO, OrderError>")]
pub struct RouteTransition {
    pub actor: ActorDTO,
    pub order_id: u64,
    pub route: OrderRoute,
    pub metadata: Metadata,
}

#[derive(Message, Debug, Clone)]
#[rtype(result = "Result<OrderDTO, OrderError>")]
pub struct SubmitOrder {
    pub actor: ActorDTO,
    pub center_id: String,
    pub timeslot_id: String,
    pub garments: Vec<String>,
}

#[derive(Message, Debug, Clone)]
#[rtype(result = "Result<OrderDTO, OrderError>")]
pub struct ReadOrder {
    pub actor: ActorDTO,
    pub order_id: u64,
}

#[derive(Message, Debug, Clone)]
#[rtype(result = "Result<Vec<OrderLogDTO>, OrderError>")]
pub struct ReadOrderHistory {
    pub actor: ActorDTO,
    pub order_id: u64,
}

#[derive(Message, Debug, Clone)]
#[rtype(result = "Result<OtpDTO, OrderError>")]
pub struct ResendOtp {
    pub actor: ActorDTO,
    pub order_id: u64,
    pub purpose: OtpPurpose,
}

#[derive(Message, Debug, Clone)]
#[rtype(result = "Vec<TimeslotDTO>")]
pub struct ReadTimeslots {
    pub center_id: String,
}

/// Issues a fresh code for an order and pushes it to its customer.
#[derive(Message, Debug, Clone)]
#[rtype(result = "()")]
pub struct DeliverOtp {
    pub order_id: u64,
    pub customer_id: String,
    pub purpose: OtpPurpose,
}

/// A session announcing who is on the other end of it, so that updates
/// about that actor's orders can be pushed. `session_id` is the peer
/// address of the connection.
#[derive(Message, Clone)]
#[rtype(result = "()")]
pub struct RegisterSession {
    pub actor_id: String,
    pub session_id: SocketAddr,
    pub session: Recipient<Notify>,
}

/// A message the server pushes to a session, to be written to its peer.
#[derive(Message, Debug, Clone)]
#[rtype(result = "()")]
pub struct Notify(pub NetworkMessage);

#[derive(Message, Debug, Clone)]
#[rtype(result = "()")]
pub struct UnregisterSession {
    pub actor_id: String,
    pub session_id: SocketAddr,
}
