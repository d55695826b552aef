use crate::messages::internal_messages::{
    CreateOrder, DeliverOtp, FetchOrder, FetchOrderLogs, GetCenterTimeslots, IssueOtp, LookupOtp, Notify,
    OrderRoute, ReadOrder, ReadOrderHistory, ReadTimeslots, RegisterSession, ResendOtp, RevokeOtps,
    RouteTransition, SubmitOrder, TransitionOrder, UnregisterSession, VerifyOtp,
};
use crate::server_actors::order_state_machine;
use crate::server_actors::services::otp_service::OtpService;
use crate::server_actors::storage::Storage;
use actix::prelude::*;
use colored::Color;
use common::errors::OrderError;
use common::logger::Logger;
use common::messages::shared_messages::{NetworkMessage, OrderUpdated, OtpIssued};
use common::types::actor_role::ActorRole;
use common::types::dtos::{ActorDTO, Metadata, OrderDTO, OrderLogDTO, OtpDTO, OtpPurpose, TimeslotDTO};
use common::types::order_status::OrderStatus;
use std::collections::HashMap;
use std::net::SocketAddr;

/// Metadata key carrying the partner assigned to a trip.
pub const DELIVERY_PERSON_KEY: &str = "delivery_person_id";
/// Metadata key carrying the reason of a cancellation or failed trip.
pub const REASON_KEY: &str = "reason";

/// OrderService es responsable de:
/// 1. Decidir quién puede mover una orden por cada ruta.
/// 2. Verificar los códigos OTP antes de un retiro o una entrega.
/// 3. Reenviar las transiciones al Storage.
/// 4. Emitir códigos y notificar al cliente de cada cambio de estado.
pub struct OrderService {
    pub storage_address: Addr<Storage>,
    pub otp_address: Addr<OtpService>,
    /// Live sessions by actor id, one entry per open connection.
    pub sessions: HashMap<String, HashMap<SocketAddr, Recipient<Notify>>>,
    pub logger: Logger,
}

impl OrderService {
    pub fn new(storage_address: Addr<Storage>, otp_address: Addr<OtpService>) -> Self {
        Self {
            storage_address,
            otp_address,
            sessions: HashMap::new(),
            logger: Logger::new("OrderService", Color::Green),
        }
    }

    fn push_to(&self, actor_id: &str, message: NetworkMessage) {
        if let Some(sessions) = self.sessions.get(actor_id) {
            for session in sessions.values() {
                session.do_send(Notify(message.clone()));
            }
        }
    }

    /// Follow-up work once a transition has been stored: codes for the
    /// trips that need one and a push to the customer.
    fn after_transition(&self, order: &OrderDTO, ctx: &mut Context<Self>) {
        self.push_to(
            &order.customer_id,
            NetworkMessage::OrderUpdated(OrderUpdated {
                order: order.clone(),
            }),
        );

        let purpose = match order.status {
            OrderStatus::AssignedForPickup => Some(OtpPurpose::Pickup),
            OrderStatus::OutForDelivery => Some(OtpPurpose::Delivery),
            _ => None,
        };
        if let Some(purpose) = purpose {
            ctx.notify(DeliverOtp {
                order_id: order.order_id,
                customer_id: order.customer_id.clone(),
                purpose,
            });
        }

        if order.status.is_terminal() {
            self.otp_address.do_send(RevokeOtps {
                order_id: order.order_id,
            });
        }
    }
}

impl Actor for OrderService {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        self.logger.info("OrderService started");
    }
}

/// Whether `actor` may take `route` on `order`.
pub fn authorize(actor: &ActorDTO, route: &OrderRoute, order: &OrderDTO) -> Result<(), OrderError> {
    let is_assigned_partner = actor.role == ActorRole::DeliveryPerson
        && order.delivery_person_id.as_deref() == Some(actor.actor_id.as_str());

    let allowed = match route {
        OrderRoute::Staff { .. } => actor.role.is_staff(),
        OrderRoute::CenterStage { target } => {
            matches!(actor.role, ActorRole::CenterOperator | ActorRole::Admin)
                && OrderStatus::CENTER_STAGES.contains(target)
        }
        OrderRoute::Cancel { .. } => {
            actor.role.is_staff()
                || (actor.role == ActorRole::Customer && order.customer_id == actor.actor_id)
        }
        OrderRoute::StartDelivery
        | OrderRoute::VerifyPickup { .. }
        | OrderRoute::VerifyDelivery { .. }
        | OrderRoute::ReportPickupFailed { .. }
        | OrderRoute::ReportDeliveryFailed { .. } => is_assigned_partner,
    };

    if allowed {
        Ok(())
    } else {
        Err(OrderError::forbidden(
            actor.role,
            format!("{} on order {}", route.name(), order.order_id),
        ))
    }
}

/// Whether `actor` may read `order` and its history.
pub fn can_read(actor: &ActorDTO, order: &OrderDTO) -> bool {
    match actor.role {
        ActorRole::Customer => order.customer_id == actor.actor_id,
        ActorRole::DeliveryPerson => {
            order.delivery_person_id.as_deref() == Some(actor.actor_id.as_str())
        }
        ActorRole::FloorManager | ActorRole::CenterOperator | ActorRole::Admin => true,
    }
}

/// Builds the storage request for a route, pulling the delivery person out
/// of the metadata for assignment targets.
fn transition_request(msg: &RouteTransition) -> Result<TransitionOrder, OrderError> {
    let target = msg.route.target();
    let mut metadata: Metadata = msg.metadata.clone();

    let delivery_person_id = match target {
        OrderStatus::AssignedForPickup | OrderStatus::AssignedForDelivery => {
            let id = metadata
                .get(DELIVERY_PERSON_KEY)
                .and_then(|v| v.as_str())
                .filter(|id| !id.is_empty())
                .map(str::to_string)
                .ok_or(OrderError::MissingDeliveryPerson(target))?;
            Some(id)
        }
        _ => None,
    };

    match &msg.route {
        OrderRoute::Cancel { reason: Some(reason) }
        | OrderRoute::ReportPickupFailed { reason }
        | OrderRoute::ReportDeliveryFailed { reason } => {
            metadata.insert(REASON_KEY.to_string(), serde_json::Value::String(reason.clone()));
        }
        _ => {}
    }

    Ok(TransitionOrder {
        order_id: msg.order_id,
        target,
        actor: msg.actor.clone(),
        metadata,
        delivery_person_id,
    })
}

impl Handler<RouteTransition> for OrderService {
    type Result = ResponseActFuture<Self, Result<OrderDTO, OrderError>>;

    fn handle(&mut self, msg: RouteTransition, _ctx: &mut Self::Context) -> Self::Result {
        self.logger.info(format!(
            "{} requested {} on order {}",
            msg.actor,
            msg.route.name(),
            msg.order_id
        ));
        let storage = self.storage_address.clone();
        let otp = self.otp_address.clone();

        let fut = async move {
            let mut consumed = None;
            let result = async {
                let order = storage
                    .send(FetchOrder {
                        order_id: msg.order_id,
                    })
                    .await??;
                authorize(&msg.actor, &msg.route, &order)?;
                // El estado se valida antes que la metadata y que el código
                order_state_machine::validate_transition(order.status, msg.route.target())?;
                let request = transition_request(&msg)?;

                let verification = match &msg.route {
                    OrderRoute::VerifyPickup { code } => Some((OtpPurpose::Pickup, code.clone())),
                    OrderRoute::VerifyDelivery { code } => {
                        Some((OtpPurpose::Delivery, code.clone()))
                    }
                    _ => None,
                };
                if let Some((purpose, code)) = verification {
                    otp.send(VerifyOtp {
                        order_id: msg.order_id,
                        purpose,
                        code,
                    })
                    .await??;
                    consumed = Some(DeliverOtp {
                        order_id: order.order_id,
                        customer_id: order.customer_id.clone(),
                        purpose,
                    });
                }

                storage.send(request).await?
            }
            .await;
            (result, consumed)
        };

        Box::pin(fut.into_actor(self).map(|(res, consumed), act, ctx| {
            match &res {
                Ok(order) => act.after_transition(order, ctx),
                Err(e) => {
                    act.logger.warn(format!("Transition rejected: {}", e));
                    if let Some(reissue) = consumed {
                        // El código ya se consumió pero la orden no se movió
                        act.logger.warn(format!(
                            "{} code of order {} spent without a transition, issuing a new one",
                            reissue.purpose, reissue.order_id
                        ));
                        ctx.notify(reissue);
                    }
                }
            }
            res
        }))
    }
}

impl Handler<DeliverOtp> for OrderService {
    type Result = ();

    fn handle(&mut self, msg: DeliverOtp, ctx: &mut Self::Context) -> Self::Result {
        let customer_id = msg.customer_id;
        let issue = self
            .otp_address
            .send(IssueOtp {
                order_id: msg.order_id,
                purpose: msg.purpose,
            })
            .into_actor(self)
            .map(move |res, act, _ctx| match res {
                Ok(otp) => act.push_to(&customer_id, NetworkMessage::OtpIssued(OtpIssued { otp })),
                Err(e) => act.logger.error(format!("Could not issue code: {}", e)),
            });
        ctx.spawn(issue);
    }
}

impl Handler<SubmitOrder> for OrderService {
    type Result = ResponseActFuture<Self, Result<OrderDTO, OrderError>>;

    fn handle(&mut self, msg: SubmitOrder, _ctx: &mut Self::Context) -> Self::Result {
        let storage = self.storage_address.clone();
        let fut = async move {
            if msg.actor.role != ActorRole::Customer {
                return Err(OrderError::forbidden(msg.actor.role, "place orders"));
            }
            storage
                .send(CreateOrder {
                    customer: msg.actor,
                    center_id: msg.center_id,
                    timeslot_id: msg.timeslot_id,
                    garments: msg.garments,
                })
                .await?
        };

        Box::pin(fut.into_actor(self).map(|res, act, _ctx| {
            match &res {
                Ok(order) => act.logger.info(format!(
                    "Order {} placed by {}",
                    order.order_id, order.customer_id
                )),
                Err(e) => act.logger.warn(format!("Order rejected: {}", e)),
            }
            res
        }))
    }
}

impl Handler<ReadOrder> for OrderService {
    type Result = ResponseFuture<Result<OrderDTO, OrderError>>;

    fn handle(&mut self, msg: ReadOrder, _ctx: &mut Self::Context) -> Self::Result {
        let storage = self.storage_address.clone();
        Box::pin(async move {
            let order = storage
                .send(FetchOrder {
                    order_id: msg.order_id,
                })
                .await??;
            if !can_read(&msg.actor, &order) {
                return Err(OrderError::forbidden(
                    msg.actor.role,
                    format!("read order {}", msg.order_id),
                ));
            }
            Ok(order)
        })
    }
}

impl Handler<ReadOrderHistory> for OrderService {
    type Result = ResponseFuture<Result<Vec<OrderLogDTO>, OrderError>>;

    fn handle(&mut self, msg: ReadOrderHistory, _ctx: &mut Self::Context) -> Self::Result {
        let storage = self.storage_address.clone();
        Box::pin(async move {
            let order = storage
                .send(FetchOrder {
                    order_id: msg.order_id,
                })
                .await??;
            if !can_read(&msg.actor, &order) {
                return Err(OrderError::forbidden(
                    msg.actor.role,
                    format!("read history of order {}", msg.order_id),
                ));
            }
            storage
                .send(FetchOrderLogs {
                    order_id: msg.order_id,
                })
                .await?
        })
    }
}

impl Handler<ResendOtp> for OrderService {
    type Result = ResponseFuture<Result<OtpDTO, OrderError>>;

    fn handle(&mut self, msg: ResendOtp, _ctx: &mut Self::Context) -> Self::Result {
        let storage = self.storage_address.clone();
        let otp = self.otp_address.clone();
        Box::pin(async move {
            let order = storage
                .send(FetchOrder {
                    order_id: msg.order_id,
                })
                .await??;
            if msg.actor.role != ActorRole::Customer || order.customer_id != msg.actor.actor_id {
                return Err(OrderError::forbidden(
                    msg.actor.role,
                    format!("see codes of order {}", msg.order_id),
                ));
            }
            otp.send(LookupOtp {
                order_id: msg.order_id,
                purpose: msg.purpose,
            })
            .await?
            .ok_or(OrderError::OtpMissing {
                order_id: msg.order_id,
                purpose: msg.purpose,
            })
        })
    }
}

impl Handler<ReadTimeslots> for OrderService {
    type Result = ResponseFuture<Vec<TimeslotDTO>>;

    fn handle(&mut self, msg: ReadTimeslots, _ctx: &mut Self::Context) -> Self::Result {
        let storage = self.storage_address.clone();
        Box::pin(async move {
            storage
                .send(GetCenterTimeslots {
                    center_id: msg.center_id,
                })
                .await
                .unwrap_or_default()
        })
    }
}

impl Handler<RegisterSession> for OrderService {
    type Result = ();

    fn handle(&mut self, msg: RegisterSession, _ctx: &mut Self::Context) -> Self::Result {
        self.logger.info(format!(
            "Session {} registered for {}",
            msg.session_id, msg.actor_id
        ));
        self.sessions
            .entry(msg.actor_id)
            .or_default()
            .insert(msg.session_id, msg.session);
    }
}

impl Handler<UnregisterSession> for OrderService {
    type Result = ();

    fn handle(&mut self, msg: UnregisterSession, _ctx: &mut Self::Context) -> Self::Result {
        if let Some(sessions) = self.sessions.get_mut(&msg.actor_id) {
            sessions.remove(&msg.session_id);
            if sessions.is_empty() {
                self.sessions.remove(&msg.actor_id);
            }
        }
    }
}
