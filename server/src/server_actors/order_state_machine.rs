//! Legal order-lifecycle transitions and the audit rows they produce.
//!
//! Everything here is synchronous and works on plain values; the
//! [`Storage`](crate::server_actors::storage::Storage) actor is what makes a
//! transition and its audit row a single step for the rest of the server.

use chrono::{DateTime, Utc};
use common::errors::OrderError;
use common::types::dtos::{ActorDTO, Metadata, OrderDTO, OrderLogDTO};
use common::types::order_status::OrderStatus;
use uuid::Uuid;

/// Checks `from -> to` against the status graph.
///
/// Leaving an exception state is reported as [`OrderError::TerminalState`];
/// any other missing edge, including `from == to`, as
/// [`OrderError::InvalidTransition`] with the allowed alternatives.
pub fn validate_transition(from: OrderStatus, to: OrderStatus) -> Result<(), OrderError> {
    if from.is_exception_state() && from != to {
        return Err(OrderError::TerminalState { from, to });
    }
    if !from.can_transition_to(to) {
        return Err(OrderError::InvalidTransition {
            from,
            to,
            allowed: from.allowed_transitions().to_vec(),
        });
    }
    Ok(())
}

/// Moves `order` to `target` and returns the audit row describing the move.
///
/// `order` is left untouched when the transition is rejected.
pub fn transition(
    order: &mut OrderDTO,
    target: OrderStatus,
    actor: &ActorDTO,
    metadata: Metadata,
    now: DateTime<Utc>,
) -> Result<OrderLogDTO, OrderError> {
    let from = order.status;
    validate_transition(from, target)?;

    order.status = target;
    order.updated_at = now;

    Ok(OrderLogDTO {
        log_id: Uuid::new_v4(),
        order_id: order.order_id,
        from_status: Some(from),
        to_status: target,
        actor_id: actor.actor_id.clone(),
        actor_role: actor.role,
        metadata,
        created_at: now,
    })
}

/// Audit row written when an order is created.
pub fn placed_log(order: &OrderDTO, actor: &ActorDTO, metadata: Metadata) -> OrderLogDTO {
    OrderLogDTO {
        log_id: Uuid::new_v4(),
        order_id: order.order_id,
        from_status: None,
        to_status: OrderStatus::Placed,
        actor_id: actor.actor_id.clone(),
        actor_role: actor.role,
        metadata,
        created_at: order.created_at,
    }
}
