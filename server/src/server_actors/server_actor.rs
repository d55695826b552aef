use crate::messages::internal_messages::{
    Notify, OrderRoute, ReadOrder, ReadOrderHistory, ReadTimeslots, RegisterSession, ResendOtp,
    RouteTransition, SubmitOrder, UnregisterSession,
};
use crate::server_actors::services::orders_services::OrderService;
use actix::dev::ToEnvelope;
use actix::prelude::*;
use colored::Color;
use common::errors::OrderError;
use common::logger::Logger;
use common::messages::shared_messages::{
    NetworkMessage, OrderHistory, OrderUpdated, OtpIssued, Registered, RequestRejected, Shutdown,
    Timeslots, Transitions,
};
use common::network::communicator::Communicator;
use common::types::dtos::{ActorDTO, Metadata};
use std::net::SocketAddr;
use tokio::net::TcpStream;

/// One connected peer. Decodes its requests, tags them with the identity it
/// registered with and hands them to the [`OrderService`].
pub struct Server {
    communicator: Communicator<Server>,
    /// Quién está del otro lado. `None` hasta recibir `Register`.
    identity: Option<ActorDTO>,
    order_service: Addr<OrderService>,
    peer_addr: SocketAddr,
    logger: Logger,
}

impl Server {
    pub fn new(
        stream: TcpStream,
        peer_addr: SocketAddr,
        order_service: Addr<OrderService>,
    ) -> Addr<Self> {
        Server::create(move |ctx| Server {
            communicator: Communicator::new(stream, peer_addr, ctx.address()),
            identity: None,
            order_service,
            peer_addr,
            logger: Logger::new("Session", Color::Blue).child(peer_addr.to_string()),
        })
    }

    fn reject(&self, request: &str, error: OrderError) {
        self.logger.warn(format!("{} rejected: {}", request, error));
        self.communicator
            .send(NetworkMessage::RequestRejected(RequestRejected {
                request: request.to_string(),
                error,
            }));
    }

    /// Sends `msg` to the order service and answers the peer with
    /// `into_reply` or with a rejection.
    fn forward<M, T>(
        &self,
        msg: M,
        request: &'static str,
        ctx: &mut Context<Self>,
        into_reply: impl FnOnce(T) -> NetworkMessage + 'static,
    ) where
        M: Message<Result = Result<T, OrderError>> + Send + 'static,
        T: Send + 'static,
        OrderService: Handler<M>,
        Context<OrderService>: ToEnvelope<OrderService, M>,
    {
        let fut = self
            .order_service
            .send(msg)
            .into_actor(self)
            .map(move |res, act, _ctx| match res.map_err(OrderError::from).and_then(|r| r) {
                Ok(value) => act.communicator.send(into_reply(value)),
                Err(error) => act.reject(request, error),
            });
        ctx.spawn(fut);
    }

    fn register(&mut self, actor: ActorDTO, ctx: &mut Context<Self>) {
        if let Some(previous) = self.identity.take() {
            self.order_service.do_send(UnregisterSession {
                actor_id: previous.actor_id,
                session_id: self.peer_addr,
            });
        }
        self.order_service.do_send(RegisterSession {
            actor_id: actor.actor_id.clone(),
            session_id: self.peer_addr,
            session: ctx.address().recipient(),
        });
        self.logger.info(format!("Registered as {}", actor));
        self.communicator
            .send(NetworkMessage::Registered(Registered {
                actor_id: actor.actor_id.clone(),
                role: actor.role,
            }));
        self.identity = Some(actor);
    }

    fn handle_request(&mut self, actor: ActorDTO, msg: NetworkMessage, ctx: &mut Context<Self>) {
        let request = msg.kind();
        let updated = |order| NetworkMessage::OrderUpdated(OrderUpdated { order });

        if let Some((order_id, route, metadata)) = route_for(&msg) {
            let transition = RouteTransition {
                actor,
                order_id,
                route,
                metadata,
            };
            self.forward(transition, request, ctx, updated);
            return;
        }

        match msg {
            NetworkMessage::PlaceOrder(place) => {
                let submit = SubmitOrder {
                    actor,
                    center_id: place.center_id,
                    timeslot_id: place.timeslot_id,
                    garments: place.garments,
                };
                self.forward(submit, request, ctx, updated);
            }
            NetworkMessage::GetOrder(get) => {
                let read = ReadOrder {
                    actor,
                    order_id: get.order_id,
                };
                self.forward(read, request, ctx, updated);
            }
            NetworkMessage::GetOrderHistory(get) => {
                let order_id = get.order_id;
                let read = ReadOrderHistory { actor, order_id };
                self.forward(read, request, ctx, move |logs| {
                    NetworkMessage::OrderHistory(OrderHistory { order_id, logs })
                });
            }
            NetworkMessage::RequestOtp(otp_request) => {
                let resend = ResendOtp {
                    actor,
                    order_id: otp_request.order_id,
                    purpose: otp_request.purpose,
                };
                self.forward(resend, request, ctx, |otp| {
                    NetworkMessage::OtpIssued(OtpIssued { otp })
                });
            }
            NetworkMessage::ListTimeslots(list) => {
                let center_id = list.center_id;
                let fut = self
                    .order_service
                    .send(ReadTimeslots {
                        center_id: center_id.clone(),
                    })
                    .into_actor(self)
                    .map(move |res, act, _ctx| match res {
                        Ok(timeslots) => act.communicator.send(NetworkMessage::Timeslots(
                            Timeslots {
                                center_id,
                                timeslots,
                            },
                        )),
                        Err(e) => act.reject(request, e.into()),
                    });
                ctx.spawn(fut);
            }
            NetworkMessage::AllowedTransitions(query) => {
                self.communicator
                    .send(NetworkMessage::Transitions(Transitions {
                        status: query.status,
                        allowed: query.status.allowed_transitions().to_vec(),
                        is_exception_state: query.status.is_exception_state(),
                    }));
            }
            other => {
                self.logger
                    .warn(format!("Ignoring unexpected {} from peer", other.kind()));
            }
        }
    }
}

/// Maps the wire requests that move an order onto their [`OrderRoute`].
pub fn route_for(msg: &NetworkMessage) -> Option<(u64, OrderRoute, Metadata)> {
    let routed = match msg {
        NetworkMessage::UpdateOrderStatus(m) => (
            m.order_id,
            OrderRoute::Staff { target: m.target },
            m.metadata.clone(),
        ),
        NetworkMessage::UpdateStage(m) => (
            m.order_id,
            OrderRoute::CenterStage { target: m.target },
            m.metadata.clone(),
        ),
        NetworkMessage::CancelOrder(m) => (
            m.order_id,
            OrderRoute::Cancel {
                reason: m.reason.clone(),
            },
            Metadata::new(),
        ),
        NetworkMessage::StartDelivery(m) => (m.order_id, OrderRoute::StartDelivery, Metadata::new()),
        NetworkMessage::VerifyPickup(m) => (
            m.order_id,
            OrderRoute::VerifyPickup {
                code: m.code.clone(),
            },
            Metadata::new(),
        ),
        NetworkMessage::VerifyDelivery(m) => (
            m.order_id,
            OrderRoute::VerifyDelivery {
                code: m.code.clone(),
            },
            Metadata::new(),
        ),
        NetworkMessage::ReportPickupFailed(m) => (
            m.order_id,
            OrderRoute::ReportPickupFailed {
                reason: m.reason.clone(),
            },
            Metadata::new(),
        ),
        NetworkMessage::ReportDeliveryFailed(m) => (
            m.order_id,
            OrderRoute::ReportDeliveryFailed {
                reason: m.reason.clone(),
            },
            Metadata::new(),
        ),
        _ => return None,
    };
    Some(routed)
}

impl Actor for Server {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        self.logger.info("Session started");
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        self.logger.info("Session closed");
    }
}

impl Handler<NetworkMessage> for Server {
    type Result = ();

    fn handle(&mut self, msg: NetworkMessage, ctx: &mut Self::Context) -> Self::Result {
        match msg {
            NetworkMessage::Register(register) => {
                self.register(ActorDTO::new(register.actor_id, register.role), ctx);
            }
            NetworkMessage::ConnectionClosed(closed) => {
                self.logger
                    .info(format!("Peer {} disconnected", closed.remote_addr));
                if let Some(actor) = self.identity.take() {
                    self.order_service.do_send(UnregisterSession {
                        actor_id: actor.actor_id,
                        session_id: self.peer_addr,
                    });
                }
                self.communicator.sender.do_send(Shutdown);
                ctx.stop();
            }
            msg => match self.identity.clone() {
                Some(actor) => self.handle_request(actor, msg, ctx),
                None => self.reject(msg.kind(), OrderError::NotRegistered),
            },
        }
    }
}

impl Handler<Notify> for Server {
    type Result = ();

    fn handle(&mut self, msg: Notify, _ctx: &mut Self::Context) -> Self::Result {
        self.communicator.send(msg.0);
    }
}
