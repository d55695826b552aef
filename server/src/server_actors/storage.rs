use crate::messages::internal_messages::{
    AddTimeslot, CreateOrder, FetchOrder, FetchOrderLogs, GetCenterTimeslots, GetTimeslot,
    TransitionOrder,
};
use crate::server_actors::order_state_machine;
use actix::prelude::*;
use chrono::{DateTime, Duration, Utc};
use colored::Color;
use common::constants::{
    SEEDED_CENTERS, TIMESLOTS_PER_CENTER, TIMESLOT_CAPACITY, TIMESLOT_SPACING_HOURS,
};
use common::errors::OrderError;
use common::logger::Logger;
use common::types::dtos::{Metadata, OrderDTO, OrderLogDTO, TimeslotDTO};
use common::types::order_status::OrderStatus;
use std::collections::HashMap;

/// The `Storage` actor owns every order, its audit log, and the pickup
/// timeslots.
///
/// # Responsibilities
/// - Creates orders, reserving timeslot capacity and writing the PLACED row.
/// - Applies status transitions through the state machine, writing exactly
///   one audit row per successful transition.
/// - Gives capacity back when an order is cancelled.
///
/// Each of these runs inside a single handler, so no other request can
/// observe or interleave with a half-applied change.
pub struct Storage {
    /// Dictionary of orders.
    pub orders: HashMap<u64, OrderDTO>,
    /// Audit rows per order, append-only.
    pub order_logs: HashMap<u64, Vec<OrderLogDTO>>,
    /// Pickup windows by id.
    pub timeslots: HashMap<String, TimeslotDTO>,
    /// ID for the next order created.
    pub next_order_id: u64,
    pub logger: Logger,
}

impl Default for Storage {
    fn default() -> Self {
        Self::new()
    }
}

impl Storage {
    pub fn new() -> Self {
        Self {
            orders: HashMap::new(),
            order_logs: HashMap::new(),
            timeslots: HashMap::new(),
            next_order_id: 1,
            logger: Logger::new("Storage", Color::White),
        }
    }

    fn append_log(&mut self, log: OrderLogDTO) {
        self.order_logs.entry(log.order_id).or_default().push(log);
    }

    /// Takes one unit of capacity from a timeslot of `center_id`.
    fn reserve_capacity(&mut self, center_id: &str, timeslot_id: &str) -> Result<(), OrderError> {
        let timeslot = self
            .timeslots
            .get_mut(timeslot_id)
            .ok_or_else(|| OrderError::TimeslotNotFound(timeslot_id.to_string()))?;
        if timeslot.center_id != center_id {
            return Err(OrderError::TimeslotCenterMismatch {
                timeslot_id: timeslot_id.to_string(),
                center_id: center_id.to_string(),
            });
        }
        if timeslot.remaining_capacity == 0 {
            return Err(OrderError::TimeslotFull(timeslot_id.to_string()));
        }
        timeslot.remaining_capacity -= 1;
        Ok(())
    }

    fn release_capacity(&mut self, timeslot_id: &str) {
        match self.timeslots.get_mut(timeslot_id) {
            Some(timeslot) if timeslot.remaining_capacity < timeslot.capacity => {
                timeslot.remaining_capacity += 1;
            }
            Some(_) => self
                .logger
                .warn(format!("Timeslot {} already at full capacity", timeslot_id)),
            None => self
                .logger
                .warn(format!("Timeslot not found on release: {}", timeslot_id)),
        }
    }
}

impl Actor for Storage {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        self.logger.info("Storage started");
    }
}

/// Pickup windows every server starts with: `TIMESLOTS_PER_CENTER` slots per
/// seeded center, `TIMESLOT_SPACING_HOURS` apart, starting one spacing after
/// `now`.
pub fn seeded_timeslots(now: DateTime<Utc>) -> Vec<TimeslotDTO> {
    SEEDED_CENTERS
        .iter()
        .flat_map(|center_id| {
            (0..TIMESLOTS_PER_CENTER).map(move |i| TimeslotDTO {
                timeslot_id: format!("{}-{}", center_id, i),
                center_id: center_id.to_string(),
                starts_at: now + Duration::hours(TIMESLOT_SPACING_HOURS * (i as i64 + 1)),
                capacity: TIMESLOT_CAPACITY,
                remaining_capacity: TIMESLOT_CAPACITY,
            })
        })
        .collect()
}

// --------------- TIMESLOTS ------------------ //

impl Handler<AddTimeslot> for Storage {
    type Result = ();

    fn handle(&mut self, msg: AddTimeslot, _ctx: &mut Self::Context) -> Self::Result {
        self.logger.info(format!(
            "Timeslot added: {} (center {}, capacity {})",
            msg.timeslot.timeslot_id, msg.timeslot.center_id, msg.timeslot.capacity
        ));
        self.timeslots
            .insert(msg.timeslot.timeslot_id.clone(), msg.timeslot);
    }
}

impl Handler<GetTimeslot> for Storage {
    type Result = MessageResult<GetTimeslot>;

    fn handle(&mut self, msg: GetTimeslot, _ctx: &mut Self::Context) -> Self::Result {
        MessageResult(self.timeslots.get(&msg.timeslot_id).cloned())
    }
}

impl Handler<GetCenterTimeslots> for Storage {
    type Result = MessageResult<GetCenterTimeslots>;

    fn handle(&mut self, msg: GetCenterTimeslots, _ctx: &mut Self::Context) -> Self::Result {
        let mut timeslots: Vec<TimeslotDTO> = self
            .timeslots
            .values()
            .filter(|t| t.center_id == msg.center_id)
            .cloned()
            .collect();
        timeslots.sort_by(|a, b| {
            a.starts_at
                .cmp(&b.starts_at)
                .then_with(|| a.timeslot_id.cmp(&b.timeslot_id))
        });
        MessageResult(timeslots)
    }
}

// --------------- ORDERS ------------------ //

impl Handler<CreateOrder> for Storage {
    type Result = Result<OrderDTO, OrderError>;

    fn handle(&mut self, msg: CreateOrder, _ctx: &mut Self::Context) -> Self::Result {
        if msg.garments.is_empty() {
            return Err(OrderError::EmptyOrder);
        }
        self.reserve_capacity(&msg.center_id, &msg.timeslot_id)?;

        let now = Utc::now();
        let order = OrderDTO {
            order_id: self.next_order_id,
            customer_id: msg.customer.actor_id.clone(),
            center_id: msg.center_id,
            timeslot_id: msg.timeslot_id,
            garments: msg.garments,
            status: OrderStatus::Placed,
            delivery_person_id: None,
            created_at: now,
            updated_at: now,
        };
        self.next_order_id += 1;

        let mut metadata = Metadata::new();
        metadata.insert(
            "timeslot_id".to_string(),
            serde_json::Value::String(order.timeslot_id.clone()),
        );
        let log = order_state_machine::placed_log(&order, &msg.customer, metadata);
        self.append_log(log);
        self.orders.insert(order.order_id, order.clone());

        self.logger.info(format!(
            "Order added: {} for {} in timeslot {}",
            order.order_id, order.customer_id, order.timeslot_id
        ));
        Ok(order)
    }
}

impl Handler<TransitionOrder> for Storage {
    type Result = Result<OrderDTO, OrderError>;

    fn handle(&mut self, msg: TransitionOrder, _ctx: &mut Self::Context) -> Self::Result {
        let order = self
            .orders
            .get_mut(&msg.order_id)
            .ok_or(OrderError::OrderNotFound(msg.order_id))?;
        let from = order.status;

        let log = match order_state_machine::transition(
            order,
            msg.target,
            &msg.actor,
            msg.metadata,
            Utc::now(),
        ) {
            Ok(log) => log,
            Err(e) => {
                self.logger
                    .warn(format!("Order {} rejected: {}", msg.order_id, e));
                return Err(e);
            }
        };
        if let Some(delivery_person_id) = msg.delivery_person_id {
            order.delivery_person_id = Some(delivery_person_id);
        }
        let updated = order.clone();

        self.append_log(log);
        if updated.status == OrderStatus::Cancelled {
            self.release_capacity(&updated.timeslot_id);
        }

        self.logger.info(format!(
            "Order {}: {} -> {} by {}",
            updated.order_id, from, updated.status, msg.actor
        ));
        Ok(updated)
    }
}

impl Handler<FetchOrder> for Storage {
    type Result = Result<OrderDTO, OrderError>;

    fn handle(&mut self, msg: FetchOrder, _ctx: &mut Self::Context) -> Self::Result {
        self.orders
            .get(&msg.order_id)
            .cloned()
            .ok_or(OrderError::OrderNotFound(msg.order_id))
    }
}

impl Handler<FetchOrderLogs> for Storage {
    type Result = Result<Vec<OrderLogDTO>, OrderError>;

    fn handle(&mut self, msg: FetchOrderLogs, _ctx: &mut Self::Context) -> Self::Result {
        if !self.orders.contains_key(&msg.order_id) {
            return Err(OrderError::OrderNotFound(msg.order_id));
        }
        Ok(self
            .order_logs
            .get(&msg.order_id)
            .cloned()
            .unwrap_or_default())
    }
}
