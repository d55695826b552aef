use crate::types::actor_role::ActorRole;
use crate::types::order_status::OrderStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Free-form key/value data attached to a status transition.
pub type Metadata = BTreeMap<String, serde_json::Value>;

/// Who is performing an operation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ActorDTO {
    /// ID único del actor (cliente, repartidor, operador...).
    pub actor_id: String,
    /// Rol declarado al registrarse.
    pub role: ActorRole,
}

impl ActorDTO {
    pub fn new(actor_id: impl Into<String>, role: ActorRole) -> Self {
        Self {
            actor_id: actor_id.into(),
            role,
        }
    }
}

impl fmt::Display for ActorDTO {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.actor_id, self.role)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDTO {
    /// ID de la orden.
    pub order_id: u64,
    /// ID del cliente que realizó la orden.
    pub customer_id: String,
    /// Centro que procesa las prendas.
    pub center_id: String,
    /// Franja horaria de retiro reservada.
    pub timeslot_id: String,
    /// Descripción libre de las prendas.
    pub garments: Vec<String>,
    /// Estado de la orden.
    pub status: OrderStatus,
    /// Repartidor asignado al viaje en curso, si hay uno.
    pub delivery_person_id: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Marca de tiempo de la última transición.
    pub updated_at: DateTime<Utc>,
}

impl Eq for OrderDTO {}

impl PartialEq for OrderDTO {
    fn eq(&self, other: &Self) -> bool {
        self.order_id == other.order_id
    }
}

impl std::hash::Hash for OrderDTO {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.order_id.hash(state);
    }
}

/// One immutable audit row, written for every status change of an order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderLogDTO {
    pub log_id: Uuid,
    pub order_id: u64,
    /// `None` only for the row written when the order is placed.
    pub from_status: Option<OrderStatus>,
    pub to_status: OrderStatus,
    pub actor_id: String,
    pub actor_role: ActorRole,
    pub metadata: Metadata,
    pub created_at: DateTime<Utc>,
}

/// A bounded-capacity pickup window at a processing center.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeslotDTO {
    pub timeslot_id: String,
    pub center_id: String,
    pub starts_at: DateTime<Utc>,
    pub capacity: u32,
    pub remaining_capacity: u32,
}

/// What a one-time code confirms.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OtpPurpose {
    Pickup,
    Delivery,
}

impl fmt::Display for OtpPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OtpPurpose::Pickup => write!(f, "PICKUP"),
            OtpPurpose::Delivery => write!(f, "DELIVERY"),
        }
    }
}

/// A code handed to the customer, shown to the delivery person at the door.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OtpDTO {
    pub order_id: u64,
    pub purpose: OtpPurpose,
    pub code: String,
    pub expires_at: DateTime<Utc>,
}
