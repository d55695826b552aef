use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a laundry order.
///
/// The legal moves between statuses form a fixed directed graph, see
/// [`OrderStatus::allowed_transitions`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Placed,              // El cliente creó el pedido
    AssignedForPickup,   // Hay un repartidor asignado para el retiro
    PickedUp,            // El repartidor retiró las prendas
    AtCenter,            // Las prendas llegaron al centro
    Processing,          // Lavado / planchado en curso
    Qc,                  // Control de calidad
    ReadyForDelivery,    // Listo para entregar
    AssignedForDelivery, // Hay un repartidor asignado para la entrega
    OutForDelivery,      // En camino al cliente
    Delivered,           // Entregado, falta cerrar
    Completed,
    Cancelled,
    PickupFailed,
    DeliveryFailed,
    RefundRequested,
}

impl OrderStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [OrderStatus; 15] = [
        OrderStatus::Placed,
        OrderStatus::AssignedForPickup,
        OrderStatus::PickedUp,
        OrderStatus::AtCenter,
        OrderStatus::Processing,
        OrderStatus::Qc,
        OrderStatus::ReadyForDelivery,
        OrderStatus::AssignedForDelivery,
        OrderStatus::OutForDelivery,
        OrderStatus::Delivered,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
        OrderStatus::PickupFailed,
        OrderStatus::DeliveryFailed,
        OrderStatus::RefundRequested,
    ];

    /// Statuses a center operator is allowed to move an order into.
    pub const CENTER_STAGES: [OrderStatus; 4] = [
        OrderStatus::AtCenter,
        OrderStatus::Processing,
        OrderStatus::Qc,
        OrderStatus::ReadyForDelivery,
    ];

    /// Returns the statuses reachable from `self` in one step.
    pub fn allowed_transitions(&self) -> &'static [OrderStatus] {
        use OrderStatus::*;
        match self {
            Placed => &[AssignedForPickup, Cancelled],
            AssignedForPickup => &[PickedUp, PickupFailed, Cancelled],
            PickedUp => &[AtCenter],
            AtCenter => &[Processing],
            Processing => &[Qc],
            Qc => &[ReadyForDelivery],
            ReadyForDelivery => &[AssignedForDelivery],
            AssignedForDelivery => &[OutForDelivery, DeliveryFailed],
            OutForDelivery => &[Delivered, DeliveryFailed],
            Delivered => &[Completed],
            Completed | Cancelled | PickupFailed | DeliveryFailed | RefundRequested => &[],
        }
    }

    /// Whether `self -> target` is an edge of the status graph.
    pub fn can_transition_to(&self, target: OrderStatus) -> bool {
        self.allowed_transitions().contains(&target)
    }

    /// Exception states end the lifecycle abnormally.
    pub fn is_exception_state(&self) -> bool {
        matches!(
            self,
            OrderStatus::Cancelled
                | OrderStatus::PickupFailed
                | OrderStatus::DeliveryFailed
                | OrderStatus::RefundRequested
        )
    }

    /// No transition leaves a terminal status.
    pub fn is_terminal(&self) -> bool {
        self.allowed_transitions().is_empty()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Placed => "PLACED",
            OrderStatus::AssignedForPickup => "ASSIGNED_FOR_PICKUP",
            OrderStatus::PickedUp => "PICKED_UP",
            OrderStatus::AtCenter => "AT_CENTER",
            OrderStatus::Processing => "PROCESSING",
            OrderStatus::Qc => "QC",
            OrderStatus::ReadyForDelivery => "READY_FOR_DELIVERY",
            OrderStatus::AssignedForDelivery => "ASSIGNED_FOR_DELIVERY",
            OrderStatus::OutForDelivery => "OUT_FOR_DELIVERY",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Cancelled => "CANCELLED",
            OrderStatus::PickupFailed => "PICKUP_FAILED",
            OrderStatus::DeliveryFailed => "DELIVERY_FAILED",
            OrderStatus::RefundRequested => "REFUND_REQUESTED",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown order status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase().replace(['-', ' '], "_");
        OrderStatus::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == wanted)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exception_states_have_no_outgoing_edges() {
        for status in OrderStatus::ALL {
            if status.is_exception_state() {
                assert!(status.is_terminal(), "{} should be terminal", status);
            }
        }
        assert!(OrderStatus::Completed.is_terminal());
        assert!(!OrderStatus::Completed.is_exception_state());
    }

    #[test]
    fn test_exactly_four_exception_states() {
        let exceptions: Vec<OrderStatus> = OrderStatus::ALL
            .into_iter()
            .filter(|s| s.is_exception_state())
            .collect();
        assert_eq!(
            exceptions,
            vec![
                OrderStatus::Cancelled,
                OrderStatus::PickupFailed,
                OrderStatus::DeliveryFailed,
                OrderStatus::RefundRequested,
            ]
        );
    }

    #[test]
    fn test_no_status_transitions_to_itself() {
        for status in OrderStatus::ALL {
            assert!(!status.can_transition_to(status));
        }
    }

    #[test]
    fn test_placed_edges() {
        assert_eq!(
            OrderStatus::Placed.allowed_transitions(),
            &[OrderStatus::AssignedForPickup, OrderStatus::Cancelled]
        );
        assert!(!OrderStatus::Placed.can_transition_to(OrderStatus::PickedUp));
    }

    #[test]
    fn test_delivered_only_completes() {
        assert_eq!(
            OrderStatus::Delivered.allowed_transitions(),
            &[OrderStatus::Completed]
        );
    }

    #[test]
    fn test_happy_path_is_connected() {
        let path = [
            OrderStatus::Placed,
            OrderStatus::AssignedForPickup,
            OrderStatus::PickedUp,
            OrderStatus::AtCenter,
            OrderStatus::Processing,
            OrderStatus::Qc,
            OrderStatus::ReadyForDelivery,
            OrderStatus::AssignedForDelivery,
            OrderStatus::OutForDelivery,
            OrderStatus::Delivered,
            OrderStatus::Completed,
        ];
        for pair in path.windows(2) {
            assert!(pair[0].can_transition_to(pair[1]), "{} -> {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_queries_are_stable() {
        for status in OrderStatus::ALL {
            assert_eq!(status.allowed_transitions(), status.allowed_transitions());
            assert_eq!(status.is_exception_state(), status.is_exception_state());
        }
    }

    #[test]
    fn test_parse_accepts_wire_and_loose_forms() {
        assert_eq!(
            "OUT_FOR_DELIVERY".parse::<OrderStatus>(),
            Ok(OrderStatus::OutForDelivery)
        );
        assert_eq!("at-center".parse::<OrderStatus>(), Ok(OrderStatus::AtCenter));
        assert!("SHRUNK".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_serde_uses_screaming_snake_case() {
        let json = serde_json::to_string(&OrderStatus::ReadyForDelivery).unwrap();
        assert_eq!(json, "\"READY_FOR_DELIVERY\"");
        for status in OrderStatus::ALL {
            assert_eq!(format!("\"{}\"", status), serde_json::to_string(&status).unwrap());
        }
    }
}
