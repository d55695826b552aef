use actix::prelude::*;
use common::messages::shared_messages::NetworkMessage;

/// Request typed by the user, to be sent to the server.
#[derive(Message, Debug, Clone)]
#[rtype(result = "()")]
pub struct SendRequest {
    pub request: NetworkMessage,
}

/// One raw line read from stdin.
#[derive(Message, Debug, Clone)]
#[rtype(result = "()")]
pub struct UserInput {
    pub line: String,
}

/// Stdin was closed or the user asked to leave.
#[derive(Message, Debug, Clone)]
#[rtype(result = "()")]
pub struct Quit;
