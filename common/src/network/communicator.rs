use crate::messages::shared_messages::NetworkMessage;
use crate::network::tcp_receiver::TCPReceiver;
use crate::network::tcp_sender::TCPSender;
use actix::prelude::*;
use std::net::SocketAddr;
use tokio::io::split;
use tokio::net::TcpStream;

/// Pair of actors wrapping both halves of a TCP stream: lines read from the
/// socket are decoded and delivered to `A`, messages sent through
/// [`Communicator::send`] are encoded and written out.
pub struct Communicator<A>
where
    A: Actor<Context = Context<A>> + Handler<NetworkMessage>,
{
    pub sender: Addr<TCPSender>,
    pub receiver: Addr<TCPReceiver<A>>,
    pub peer_address: SocketAddr,
}

impl<A> Communicator<A>
where
    A: Actor<Context = Context<A>> + Handler<NetworkMessage>,
{
    pub fn new(tcp_stream: TcpStream, peer_address: SocketAddr, destination_address: Addr<A>) -> Self {
        let (read_half, write_half) = split(tcp_stream);
        Self {
            sender: TCPSender::new(write_half).start(),
            receiver: TCPReceiver::new(read_half, peer_address, destination_address).start(),
            peer_address,
        }
    }

    pub fn send(&self, message: NetworkMessage) {
        self.sender.do_send(message);
    }
}
