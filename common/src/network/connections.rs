use crate::constants::TIMEOUT_SECONDS;
use crate::logger::Logger;
use colored::Color;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::{sleep, timeout};

/// Tries to connect to `server_addr` up to `attempts` times, waiting
/// `TIMEOUT_SECONDS` between attempts.
pub async fn try_to_connect(server_addr: SocketAddr, attempts: u32) -> Option<TcpStream> {
    let logger = Logger::new("Connections", Color::BrightBlack);
    for attempt in 1..=attempts {
        match timeout(
            Duration::from_secs(TIMEOUT_SECONDS),
            TcpStream::connect(server_addr),
        )
        .await
        {
            Ok(Ok(stream)) => {
                logger.info(format!("Connected to {}", server_addr));
                return Some(stream);
            }
            Ok(Err(e)) => logger.warn(format!(
                "Failed to connect to {} (attempt {}/{}): {}",
                server_addr, attempt, attempts, e
            )),
            Err(_) => logger.warn(format!(
                "Timed out connecting to {} (attempt {}/{})",
                server_addr, attempt, attempts
            )),
        }
        if attempt < attempts {
            sleep(Duration::from_secs(TIMEOUT_SECONDS)).await;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[actix_rt::test]
    async fn test_connects_to_a_listening_server() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        assert!(try_to_connect(addr, 1).await.is_some());
    }

    #[actix_rt::test]
    async fn test_gives_up_on_a_closed_port() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        assert!(try_to_connect(addr, 1).await.is_none());
    }
}
