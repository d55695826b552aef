mod messages;
mod server_acceptor;
mod server_actors;

use crate::messages::internal_messages::AddTimeslot;
use crate::server_acceptor::acceptor::Acceptor;
use crate::server_actors::services::orders_services::OrderService;
use crate::server_actors::services::otp_service::OtpService;
use crate::server_actors::storage::{Storage, seeded_timeslots};
use actix::prelude::*;
use chrono::Utc;
use colored::Color;
use common::constants::{BASE_PORT, SERVER_IP_ADDRESS};
use common::logger::Logger;
use std::net::SocketAddr;

/// Uso: `server [port]`
#[actix::main]
async fn main() -> std::io::Result<()> {
    let logger = Logger::new("MAIN", Color::White);

    let port = match std::env::args().nth(1) {
        Some(arg) => arg.parse::<u16>().map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid port {}: {}", arg, e),
            )
        })?,
        None => BASE_PORT,
    };
    let addr: SocketAddr = format!("{}:{}", SERVER_IP_ADDRESS, port)
        .parse()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

    let storage = Storage::new().start();
    for timeslot in seeded_timeslots(Utc::now()) {
        logger.debug(format!(
            "Seeding timeslot {} at {}",
            timeslot.timeslot_id, timeslot.center_id
        ));
        storage
            .send(AddTimeslot { timeslot })
            .await
            .map_err(|e| std::io::Error::other(e.to_string()))?;
    }

    let otp_service = OtpService::default().start();
    let order_service = OrderService::new(storage, otp_service).start();

    logger.info(format!("Starting laundry order server on {}", addr));
    Acceptor::new(addr, order_service).start().await
}
