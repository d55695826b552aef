use crate::types::actor_role::ActorRole;
use crate::types::dtos::OtpPurpose;
use crate::types::order_status::OrderStatus;
use serde::{Deserialize, Serialize};

/// Every way an order request can be rejected.
///
/// Serializable so that the server can send the rejection back to the peer
/// unchanged inside a `RequestRejected` message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum OrderError {
    #[error("order {0} not found")]
    OrderNotFound(u64),

    #[error("invalid transition from terminal state {from} to {to}")]
    TerminalState { from: OrderStatus, to: OrderStatus },

    #[error("invalid transition from {from} to {to}; allowed: {}", list(.allowed))]
    InvalidTransition {
        from: OrderStatus,
        to: OrderStatus,
        allowed: Vec<OrderStatus>,
    },

    #[error("timeslot {0} not found")]
    TimeslotNotFound(String),

    #[error("timeslot {timeslot_id} does not belong to center {center_id}")]
    TimeslotCenterMismatch {
        timeslot_id: String,
        center_id: String,
    },

    #[error("timeslot {0} is full")]
    TimeslotFull(String),

    #[error("an order needs at least one garment")]
    EmptyOrder,

    #[error("moving an order to {0} requires a delivery_person_id")]
    MissingDeliveryPerson(OrderStatus),

    #[error("{role} is not allowed to {action}")]
    Forbidden { role: ActorRole, action: String },

    #[error("register before sending requests")]
    NotRegistered,

    #[error("no {purpose} code issued for order {order_id}")]
    OtpMissing { order_id: u64, purpose: OtpPurpose },

    #[error("{purpose} code for order {order_id} has expired")]
    OtpExpired { order_id: u64, purpose: OtpPurpose },

    #[error("wrong {purpose} code for order {order_id}, {attempts_left} attempts left")]
    OtpMismatch {
        order_id: u64,
        purpose: OtpPurpose,
        attempts_left: u32,
    },

    #[error("internal error: {0}")]
    Internal(String),
}

fn list(statuses: &[OrderStatus]) -> String {
    if statuses.is_empty() {
        return "none".to_string();
    }
    statuses
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

impl OrderError {
    /// HTTP-style status code for the rejection.
    pub fn status_code(&self) -> u16 {
        match self {
            OrderError::OrderNotFound(_) | OrderError::TimeslotNotFound(_) => 404,
            OrderError::TerminalState { .. }
            | OrderError::InvalidTransition { .. }
            | OrderError::TimeslotCenterMismatch { .. }
            | OrderError::EmptyOrder
            | OrderError::MissingDeliveryPerson(_) => 400,
            OrderError::NotRegistered
            | OrderError::OtpMissing { .. }
            | OrderError::OtpExpired { .. }
            | OrderError::OtpMismatch { .. } => 401,
            OrderError::Forbidden { .. } => 403,
            OrderError::TimeslotFull(_) => 409,
            OrderError::Internal(_) => 500,
        }
    }

    pub fn forbidden(role: ActorRole, action: impl Into<String>) -> Self {
        OrderError::Forbidden {
            role,
            action: action.into(),
        }
    }
}

impl From<actix::MailboxError> for OrderError {
    fn from(err: actix::MailboxError) -> Self {
        OrderError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_transition_lists_alternatives() {
        let err = OrderError::InvalidTransition {
            from: OrderStatus::Placed,
            to: OrderStatus::PickedUp,
            allowed: OrderStatus::Placed.allowed_transitions().to_vec(),
        };
        assert_eq!(
            err.to_string(),
            "invalid transition from PLACED to PICKED_UP; allowed: ASSIGNED_FOR_PICKUP, CANCELLED"
        );
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_terminal_message() {
        let err = OrderError::TerminalState {
            from: OrderStatus::Cancelled,
            to: OrderStatus::Placed,
        };
        assert!(err.to_string().contains("terminal state"));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(OrderError::OrderNotFound(3).status_code(), 404);
        assert_eq!(OrderError::TimeslotFull("t".into()).status_code(), 409);
        assert_eq!(
            OrderError::forbidden(ActorRole::Customer, "update stage").status_code(),
            403
        );
    }

    #[test]
    fn test_survives_the_wire() {
        let err = OrderError::OtpMismatch {
            order_id: 9,
            purpose: OtpPurpose::Delivery,
            attempts_left: 2,
        };
        let json = serde_json::to_string(&err).unwrap();
        let back: OrderError = serde_json::from_str(&json).unwrap();
        assert_eq!(back, err);
    }
}
