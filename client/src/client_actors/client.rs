use crate::messages::internal_messages::{Quit, SendRequest};
use actix::prelude::*;
use colored::Color;
use common::logger::Logger;
use common::messages::shared_messages::{NetworkMessage, Register, Shutdown};
use common::network::communicator::Communicator;
use common::types::dtos::ActorDTO;
use std::net::SocketAddr;
use tokio::net::TcpStream;
use tokio::sync::oneshot;

pub struct Client {
    /// Identidad con la que se registra en el servidor.
    pub actor: ActorDTO,
    /// Comunicador asociado al servidor.
    pub communicator: Communicator<Client>,
    /// Avisa a `main` que la sesión terminó.
    pub on_quit: Option<oneshot::Sender<()>>,
    pub logger: Logger,
}

impl Client {
    pub fn new(
        stream: TcpStream,
        server_addr: SocketAddr,
        actor: ActorDTO,
        on_quit: oneshot::Sender<()>,
    ) -> Addr<Self> {
        Client::create(move |ctx| Client {
            logger: Logger::new(format!("Client {}", actor.actor_id), Color::Green),
            communicator: Communicator::new(stream, server_addr, ctx.address()),
            on_quit: Some(on_quit),
            actor,
        })
    }

    fn show(&self, msg: NetworkMessage) {
        match msg {
            NetworkMessage::Registered(registered) => self.logger.info(format!(
                "Registered as {} ({})",
                registered.actor_id, registered.role
            )),
            NetworkMessage::OrderUpdated(updated) => {
                let order = updated.order;
                let partner = order
                    .delivery_person_id
                    .as_deref()
                    .map(|id| format!(", partner {}", id))
                    .unwrap_or_default();
                self.logger.info(format!(
                    "Order {} is {} (center {}, slot {}{})",
                    order.order_id, order.status, order.center_id, order.timeslot_id, partner
                ));
            }
            NetworkMessage::OrderHistory(history) => {
                self.logger
                    .info(format!("History of order {}:", history.order_id));
                for log in history.logs {
                    let from = log
                        .from_status
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| "-".to_string());
                    self.logger.info(format!(
                        "  {} {} -> {} by {} ({}) {}",
                        log.created_at.format("%Y-%m-%d %H:%M:%S"),
                        from,
                        log.to_status,
                        log.actor_id,
                        log.actor_role,
                        serde_json::to_string(&log.metadata).unwrap_or_default()
                    ));
                }
            }
            NetworkMessage::Timeslots(list) => {
                if list.timeslots.is_empty() {
                    self.logger
                        .warn(format!("No timeslots for center {}", list.center_id));
                }
                for slot in list.timeslots {
                    self.logger.info(format!(
                        "  {} starts {} ({}/{} free)",
                        slot.timeslot_id,
                        slot.starts_at.format("%Y-%m-%d %H:%M"),
                        slot.remaining_capacity,
                        slot.capacity
                    ));
                }
            }
            NetworkMessage::Transitions(transitions) => {
                let allowed: Vec<&str> = transitions.allowed.iter().map(|s| s.as_str()).collect();
                let allowed = if allowed.is_empty() {
                    "none".to_string()
                } else {
                    allowed.join(", ")
                };
                self.logger.info(format!(
                    "{} -> {}{}",
                    transitions.status,
                    allowed,
                    if transitions.is_exception_state {
                        " (exception state)"
                    } else {
                        ""
                    }
                ));
            }
            NetworkMessage::OtpIssued(issued) => self.logger.info(format!(
                "{} code for order {}: {} (valid until {})",
                issued.otp.purpose,
                issued.otp.order_id,
                issued.otp.code,
                issued.otp.expires_at.format("%H:%M:%S")
            )),
            NetworkMessage::RequestRejected(rejected) => self.logger.error(format!(
                "[{}] {}: {}",
                rejected.error.status_code(),
                rejected.request,
                rejected.error
            )),
            other => self
                .logger
                .warn(format!("Unexpected {} from server", other.kind())),
        }
    }
}

impl Actor for Client {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        self.logger.info(format!(
            "Connected to {}, registering as {}",
            self.communicator.peer_address, self.actor
        ));
        self.communicator.send(NetworkMessage::Register(Register {
            actor_id: self.actor.actor_id.clone(),
            role: self.actor.role,
        }));
    }
}

impl Handler<NetworkMessage> for Client {
    type Result = ();

    fn handle(&mut self, msg: NetworkMessage, ctx: &mut Self::Context) -> Self::Result {
        if let NetworkMessage::ConnectionClosed(_) = msg {
            self.logger.warn("Server closed the connection");
            ctx.notify(Quit);
            return;
        }
        self.show(msg);
    }
}

impl Handler<SendRequest> for Client {
    type Result = ();

    fn handle(&mut self, msg: SendRequest, _ctx: &mut Self::Context) -> Self::Result {
        self.logger.debug(format!("Sending {}", msg.request.kind()));
        self.communicator.send(msg.request);
    }
}

impl Handler<Quit> for Client {
    type Result = ();

    fn handle(&mut self, _msg: Quit, ctx: &mut Self::Context) -> Self::Result {
        self.communicator.sender.do_send(Shutdown);
        if let Some(on_quit) = self.on_quit.take() {
            let _ = on_quit.send(());
        }
        ctx.stop();
    }
}
