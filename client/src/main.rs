use actix::Actor;
use client::client_actors::client::Client;
use client::client_actors::ui_handler::UIHandler;
use common::constants::{BASE_PORT, SERVER_IP_ADDRESS};
use common::network::connections::try_to_connect;
use common::types::actor_role::ActorRole;
use common::types::dtos::ActorDTO;
use common::utils::print_welcome_message;
use std::env;
use std::net::SocketAddr;
use tokio::signal::ctrl_c;
use tokio::sync::oneshot;

const CONNECT_ATTEMPTS: u32 = 3;

#[actix::main]
async fn main() -> std::io::Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("Uso: {} <actor_id> <role> [port]", args[0]);
        std::process::exit(1);
    }

    let role: ActorRole = args[2]
        .parse()
        .map_err(|e: String| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    let port = match args.get(3) {
        Some(arg) => arg.parse::<u16>().map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid port {}: {}", arg, e),
            )
        })?,
        None => BASE_PORT,
    };
    let server_addr: SocketAddr = format!("{}:{}", SERVER_IP_ADDRESS, port)
        .parse()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

    let Some(stream) = try_to_connect(server_addr, CONNECT_ATTEMPTS).await else {
        return Err(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            format!("unable to reach server at {}", server_addr),
        ));
    };

    print_welcome_message();

    let (quit_tx, quit_rx) = oneshot::channel();
    let actor = ActorDTO::new(args[1].clone(), role);
    let client = Client::new(stream, server_addr, actor, quit_tx);
    UIHandler::new(client).start();

    tokio::select! {
        _ = ctrl_c() => {
            println!("Ctrl-C recibido, apagando...");
        }
        _ = quit_rx => {
            println!("Sesión terminada");
        }
    }
    actix::System::current().stop();
    Ok(())
}
