use crate::server_actors::server_actor::Server;
use crate::server_actors::services::orders_services::OrderService;
use actix::prelude::*;
use colored::Color;
use common::logger::Logger;
use std::net::SocketAddr;
use tokio::net::TcpListener;

/// Listens for peers and starts one [`Server`] session per connection.
pub struct Acceptor {
    pub addr: SocketAddr,
    pub order_service: Addr<OrderService>,
    pub logger: Logger,
}

impl Acceptor {
    pub fn new(addr: SocketAddr, order_service: Addr<OrderService>) -> Self {
        Self {
            addr,
            order_service,
            logger: Logger::new("ACCEPTOR", Color::Cyan),
        }
    }

    pub async fn start(&self) -> std::io::Result<()> {
        let listener = TcpListener::bind(self.addr).await?;
        self.logger
            .info(format!("Acceptor started, listening on {}", self.addr));
        self.accept_connections(listener).await
    }

    async fn accept_connections(&self, listener: TcpListener) -> std::io::Result<()> {
        loop {
            match listener.accept().await {
                Ok((stream, peer_addr)) => {
                    self.logger
                        .info(format!("Accepted connection from {}", peer_addr));
                    Server::new(stream, peer_addr, self.order_service.clone());
                }
                Err(e) => {
                    self.logger
                        .warn(format!("Failed to accept connection: {}", e));
                }
            }
        }
    }
}
