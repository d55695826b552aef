use crate::logger::Logger;
use crate::messages::shared_messages::NetworkMessage;
use crate::messages::shared_messages::Shutdown;
use actix::prelude::*;
use colored::Color;
use std::collections::VecDeque;
use tokio::io::{AsyncWriteExt, BufWriter, WriteHalf};
use tokio::net::TcpStream;

/// Serializes [`NetworkMessage`]s as JSON lines and writes them to the
/// socket, one at a time and in the order they were received.
pub struct TCPSender {
    /// The buffered writer; `None` while a write is in flight or after the
    /// socket failed.
    pub writer: Option<BufWriter<WriteHalf<TcpStream>>>,
    /// Messages waiting to be written.
    pub queue: VecDeque<NetworkMessage>,
    logger: Logger,
}

impl TCPSender {
    pub fn new(write_half: WriteHalf<TcpStream>) -> Self {
        Self {
            writer: Some(BufWriter::new(write_half)),
            queue: VecDeque::new(),
            logger: Logger::new("TCPSender", Color::BrightBlack),
        }
    }
}

impl Actor for TCPSender {
    type Context = Context<Self>;
}

struct ProcessQueue;

impl Message for ProcessQueue {
    type Result = ();
}

impl Handler<NetworkMessage> for TCPSender {
    type Result = ();

    fn handle(&mut self, msg: NetworkMessage, ctx: &mut Self::Context) {
        self.queue.push_back(msg);
        if self.queue.len() == 1 {
            ctx.notify(ProcessQueue);
        }
    }
}

impl Handler<ProcessQueue> for TCPSender {
    type Result = ResponseActFuture<Self, ()>;

    fn handle(&mut self, _msg: ProcessQueue, _ctx: &mut Self::Context) -> Self::Result {
        if let (Some(mut writer), Some(msg)) = (self.writer.take(), self.queue.front().cloned()) {
            let fut = async move {
                let serialized = serde_json::to_string(&msg)
                    .map_err(|e| format!("Error serializing {}: {}", msg.kind(), e))?;
                let to_send = format!("{}\n", serialized);

                writer
                    .write_all(to_send.as_bytes())
                    .await
                    .map_err(|e| format!("Error writing to socket: {}", e))?;
                writer
                    .flush()
                    .await
                    .map_err(|e| format!("Error flushing socket: {}", e))?;

                Ok::<_, String>(writer)
            };

            Box::pin(fut.into_actor(self).map(move |res, act, ctx| match res {
                Ok(writer) => {
                    act.writer = Some(writer);
                    act.queue.pop_front();
                    if !act.queue.is_empty() {
                        ctx.notify(ProcessQueue);
                    }
                }
                Err(err_msg) => {
                    // El socket quedó inutilizable: se descarta lo pendiente
                    act.writer = None;
                    act.queue.clear();
                    act.logger.error(err_msg);
                }
            }))
        } else {
            Box::pin(async {}.into_actor(self))
        }
    }
}

impl Handler<Shutdown> for TCPSender {
    type Result = ();

    fn handle(&mut self, _msg: Shutdown, ctx: &mut Self::Context) {
        self.writer = None;
        self.queue.clear();
        ctx.stop();
    }
}
