use crate::errors::OrderError;
use crate::messages::order_messages::*;
use crate::types::actor_role::ActorRole;
use crate::types::dtos::{OrderDTO, OrderLogDTO, OtpDTO, TimeslotDTO};
use crate::types::order_status::OrderStatus;
use actix::prelude::*;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Every message exchanged between the server and its peers.
///
/// Serialized as one JSON object per line, tagged by `type`.
#[derive(Serialize, Deserialize, Debug, Message, Clone, PartialEq)]
#[serde(tag = "type")]
#[rtype(result = "()")]
pub enum NetworkMessage {
    /// Declares the identity of the peer. Must be the first request.
    Register(Register),

    // Customer
    PlaceOrder(PlaceOrder),
    CancelOrder(CancelOrder),
    RequestOtp(RequestOtp),

    // Staff / center
    UpdateOrderStatus(UpdateOrderStatus),
    UpdateStage(UpdateStage),

    // Delivery person
    StartDelivery(StartDelivery),
    VerifyPickup(VerifyPickup),
    VerifyDelivery(VerifyDelivery),
    ReportPickupFailed(ReportPickupFailed),
    ReportDeliveryFailed(ReportDeliveryFailed),

    // Queries
    GetOrder(GetOrder),
    GetOrderHistory(GetOrderHistory),
    ListTimeslots(ListTimeslots),
    AllowedTransitions(AllowedTransitions),

    // Responses and pushes from the server
    Registered(Registered),
    /// An order was created or changed status, or was requested by id.
    OrderUpdated(OrderUpdated),
    OrderHistory(OrderHistory),
    Timeslots(Timeslots),
    Transitions(Transitions),
    OtpIssued(OtpIssued),
    RequestRejected(RequestRejected),

    /// Notifies that a TCP connection has been closed.
    ConnectionClosed(ConnectionClosed),
}

impl NetworkMessage {
    /// Short name of the message, used in logs and rejections.
    pub fn kind(&self) -> &'static str {
        match self {
            NetworkMessage::Register(_) => "Register",
            NetworkMessage::PlaceOrder(_) => "PlaceOrder",
            NetworkMessage::CancelOrder(_) => "CancelOrder",
            NetworkMessage::RequestOtp(_) => "RequestOtp",
            NetworkMessage::UpdateOrderStatus(_) => "UpdateOrderStatus",
            NetworkMessage::UpdateStage(_) => "UpdateStage",
            NetworkMessage::StartDelivery(_) => "StartDelivery",
            NetworkMessage::VerifyPickup(_) => "VerifyPickup",
            NetworkMessage::VerifyDelivery(_) => "VerifyDelivery",
            NetworkMessage::ReportPickupFailed(_) => "ReportPickupFailed",
            NetworkMessage::ReportDeliveryFailed(_) => "ReportDeliveryFailed",
            NetworkMessage::GetOrder(_) => "GetOrder",
            NetworkMessage::GetOrderHistory(_) => "GetOrderHistory",
            NetworkMessage::ListTimeslots(_) => "ListTimeslots",
            NetworkMessage::AllowedTransitions(_) => "AllowedTransitions",
            NetworkMessage::Registered(_) => "Registered",
            NetworkMessage::OrderUpdated(_) => "OrderUpdated",
            NetworkMessage::OrderHistory(_) => "OrderHistory",
            NetworkMessage::Timeslots(_) => "Timeslots",
            NetworkMessage::Transitions(_) => "Transitions",
            NetworkMessage::OtpIssued(_) => "OtpIssued",
            NetworkMessage::RequestRejected(_) => "RequestRejected",
            NetworkMessage::ConnectionClosed(_) => "ConnectionClosed",
        }
    }
}

#[derive(Message, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[rtype(result = "()")]
pub struct Register {
    pub actor_id: String,
    pub role: ActorRole,
}

#[derive(Message, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[rtype(result = "()")]
pub struct Registered {
    pub actor_id: String,
    pub role: ActorRole,
}

#[derive(Message, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[rtype(result = "()")]
pub struct OrderUpdated {
    pub order: OrderDTO,
}

#[derive(Message, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[rtype(result = "()")]
pub struct OrderHistory {
    pub order_id: u64,
    pub logs: Vec<OrderLogDTO>,
}

#[derive(Message, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[rtype(result = "()")]
pub struct Timeslots {
    pub center_id: String,
    pub timeslots: Vec<TimeslotDTO>,
}

#[derive(Message, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[rtype(result = "()")]
pub struct Transitions {
    pub status: OrderStatus,
    pub allowed: Vec<OrderStatus>,
    pub is_exception_state: bool,
}

#[derive(Message, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[rtype(result = "()")]
pub struct OtpIssued {
    pub otp: OtpDTO,
}

/// A request failed; `request` is the [`NetworkMessage::kind`] of it.
#[derive(Message, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[rtype(result = "()")]
pub struct RequestRejected {
    pub request: String,
    pub error: OrderError,
}

#[derive(Message, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[rtype(result = "()")]
pub struct ConnectionClosed {
    pub remote_addr: SocketAddr,
}

/// Stops a [`crate::network::tcp_sender::TCPSender`].
#[derive(Message, Debug, Clone)]
#[rtype(result = "()")]
pub struct Shutdown;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::dtos::Metadata;

    #[test]
    fn test_wire_format_is_tagged() {
        let msg = NetworkMessage::UpdateStage(UpdateStage {
            order_id: 7,
            target: OrderStatus::Qc,
            metadata: Metadata::new(),
        });
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "UpdateStage");
        assert_eq!(json["target"], "QC");
        assert_eq!(json["order_id"], 7);
    }

    #[test]
    fn test_parse_raw_line() {
        let line = r#"{"type":"Register","actor_id":"ana","role":"CUSTOMER"}"#;
        let msg: NetworkMessage = serde_json::from_str(line).unwrap();
        assert_eq!(
            msg,
            NetworkMessage::Register(Register {
                actor_id: "ana".into(),
                role: ActorRole::Customer,
            })
        );
        assert_eq!(msg.kind(), "Register");
    }
}
