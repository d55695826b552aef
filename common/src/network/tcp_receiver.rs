use crate::logger::Logger;
use crate::messages::shared_messages::{ConnectionClosed, NetworkMessage};
use actix::dev::ToEnvelope;
use actix::prelude::*;
use colored::Color;
use std::net::SocketAddr;
use tokio::io::{AsyncBufReadExt, BufReader, ReadHalf};
use tokio::net::TcpStream;

/// Reads newline-delimited JSON from the socket and forwards every decoded
/// [`NetworkMessage`] to `destination`. When the peer hangs up the
/// destination receives a [`NetworkMessage::ConnectionClosed`].
pub struct TCPReceiver<A: Actor + Handler<NetworkMessage>> {
    remote_addr: SocketAddr,
    reader: Option<BufReader<ReadHalf<TcpStream>>>,
    destination: Addr<A>,
    logger: Logger,
}

impl<A> TCPReceiver<A>
where
    A: Actor + Handler<NetworkMessage>,
{
    pub fn new(reader: ReadHalf<TcpStream>, remote_addr: SocketAddr, destination: Addr<A>) -> Self {
        Self {
            remote_addr,
            reader: Some(BufReader::new(reader)),
            destination,
            logger: Logger::new("TCPReceiver", Color::BrightBlack).child(remote_addr.to_string()),
        }
    }
}

impl<A> std::fmt::Debug for TCPReceiver<A>
where
    A: Actor + Handler<NetworkMessage>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TCPReceiver")
            .field("remote_addr", &self.remote_addr)
            .finish()
    }
}

impl<A> Actor for TCPReceiver<A>
where
    A: Actor + Handler<NetworkMessage> + 'static,
    A::Context: ToEnvelope<A, NetworkMessage>,
{
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        let addr = self.destination.clone();
        let remote_addr = self.remote_addr;
        let logger = self.logger.clone();
        let Some(reader) = self.reader.take() else {
            ctx.stop();
            return;
        };

        ctx.spawn(
            async move {
                let mut lines = reader.lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    if line.trim().is_empty() {
                        continue;
                    }
                    match serde_json::from_str::<NetworkMessage>(&line) {
                        Ok(msg) => addr.do_send(msg),
                        Err(e) => {
                            logger.warn(format!("Dropping undecodable line: {} ({})", line, e))
                        }
                    }
                }
                logger.debug("Peer hung up");
                addr.do_send(NetworkMessage::ConnectionClosed(ConnectionClosed {
                    remote_addr,
                }));
            }
            .into_actor(self)
            .map(|_, _act, ctx| ctx.stop()),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::shared_messages::Register;
    use crate::types::actor_role::ActorRole;
    use std::time::Duration;
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpListener;

    #[derive(Default)]
    struct Inbox {
        received: Vec<NetworkMessage>,
    }

    impl Actor for Inbox {
        type Context = Context<Self>;
    }

    impl Handler<NetworkMessage> for Inbox {
        type Result = ();

        fn handle(&mut self, msg: NetworkMessage, _ctx: &mut Self::Context) {
            self.received.push(msg);
        }
    }

    #[derive(Message)]
    #[rtype(result = "Vec<NetworkMessage>")]
    struct Take;

    impl Handler<Take> for Inbox {
        type Result = MessageResult<Take>;

        fn handle(&mut self, _msg: Take, _ctx: &mut Self::Context) -> Self::Result {
            MessageResult(std::mem::take(&mut self.received))
        }
    }

    #[actix_rt::test]
    async fn test_skips_garbage_and_reports_hang_up() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let mut peer = TcpStream::connect(listener.local_addr().unwrap())
            .await
            .unwrap();
        let (accepted, remote_addr) = listener.accept().await.unwrap();
        let (read_half, _write_half) = tokio::io::split(accepted);

        let inbox = Inbox::default().start();
        TCPReceiver::new(read_half, remote_addr, inbox.clone()).start();

        let register = NetworkMessage::Register(Register {
            actor_id: "ana".to_string(),
            role: ActorRole::Customer,
        });
        let line = format!("not json\n\n{}\n", serde_json::to_string(&register).unwrap());
        peer.write_all(line.as_bytes()).await.unwrap();
        drop(peer);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(
            inbox.send(Take).await.unwrap(),
            vec![
                register,
                NetworkMessage::ConnectionClosed(ConnectionClosed { remote_addr }),
            ]
        );
    }
}
