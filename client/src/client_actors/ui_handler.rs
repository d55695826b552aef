use crate::client_actors::client::Client;
use crate::messages::internal_messages::{Quit, SendRequest, UserInput};
use actix::prelude::*;
use colored::Color;
use common::logger::Logger;
use common::messages::order_messages::*;
use common::messages::shared_messages::NetworkMessage;
use common::types::dtos::{Metadata, OtpPurpose};
use common::types::order_status::OrderStatus;
use common::utils::parse_metadata;
use tokio::io::{AsyncBufReadExt, BufReader};

pub const HELP: &str = "\
commands:
  place <center_id> <timeslot_id> <garment>...
  cancel <order_id> [reason]
  status <order_id> <STATUS> [key=value]...
  stage <order_id> <STATUS> [key=value]...
  start <order_id>
  pickup <order_id> <code>
  deliver <order_id> <code>
  fail-pickup <order_id> <reason>
  fail-delivery <order_id> <reason>
  otp <order_id> <pickup|delivery>
  order <order_id>
  history <order_id>
  slots <center_id>
  allowed <STATUS>
  help
  quit";

/// What a line typed by the user asks for.
#[derive(Debug, PartialEq)]
pub enum Command {
    Send(NetworkMessage),
    Help,
    Quit,
}

fn order_id(arg: Option<&str>) -> Result<u64, String> {
    let arg = arg.ok_or("missing order id")?;
    arg.parse()
        .map_err(|_| format!("invalid order id: {}", arg))
}

fn status(arg: Option<&str>) -> Result<OrderStatus, String> {
    arg.ok_or("missing status")?
        .parse()
        .map_err(|e: common::types::order_status::UnknownStatus| e.to_string())
}

fn required<'a>(arg: Option<&'a str>, what: &str) -> Result<&'a str, String> {
    arg.ok_or_else(|| format!("missing {}", what))
}

fn rest(words: std::str::SplitWhitespace<'_>) -> Option<String> {
    let text = words.collect::<Vec<_>>().join(" ");
    (!text.is_empty()).then_some(text)
}

/// Parses one line of user input.
pub fn parse_command(line: &str) -> Result<Command, String> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Err("empty command".to_string());
    };

    let request = match command.to_ascii_lowercase().as_str() {
        "help" | "?" => return Ok(Command::Help),
        "quit" | "exit" => return Ok(Command::Quit),
        "place" => {
            let center_id = required(words.next(), "center id")?.to_string();
            let timeslot_id = required(words.next(), "timeslot id")?.to_string();
            let garments: Vec<String> = words.map(str::to_string).collect();
            NetworkMessage::PlaceOrder(PlaceOrder {
                center_id,
                timeslot_id,
                garments,
            })
        }
        "cancel" => NetworkMessage::CancelOrder(CancelOrder {
            order_id: order_id(words.next())?,
            reason: rest(words),
        }),
        "status" | "stage" => {
            let order_id = order_id(words.next())?;
            let target = status(words.next())?;
            let metadata: Metadata = parse_metadata(words);
            if command.eq_ignore_ascii_case("status") {
                NetworkMessage::UpdateOrderStatus(UpdateOrderStatus {
                    order_id,
                    target,
                    metadata,
                })
            } else {
                NetworkMessage::UpdateStage(UpdateStage {
                    order_id,
                    target,
                    metadata,
                })
            }
        }
        "start" => NetworkMessage::StartDelivery(StartDelivery {
            order_id: order_id(words.next())?,
        }),
        "pickup" => NetworkMessage::VerifyPickup(VerifyPickup {
            order_id: order_id(words.next())?,
            code: required(words.next(), "code")?.to_string(),
        }),
        "deliver" => NetworkMessage::VerifyDelivery(VerifyDelivery {
            order_id: order_id(words.next())?,
            code: required(words.next(), "code")?.to_string(),
        }),
        "fail-pickup" => NetworkMessage::ReportPickupFailed(ReportPickupFailed {
            order_id: order_id(words.next())?,
            reason: rest(words).ok_or("missing reason")?,
        }),
        "fail-delivery" => NetworkMessage::ReportDeliveryFailed(ReportDeliveryFailed {
            order_id: order_id(words.next())?,
            reason: rest(words).ok_or("missing reason")?,
        }),
        "otp" => {
            let order_id = order_id(words.next())?;
            let purpose = match required(words.next(), "purpose")?.to_ascii_lowercase().as_str() {
                "pickup" => OtpPurpose::Pickup,
                "delivery" => OtpPurpose::Delivery,
                other => return Err(format!("unknown purpose: {}", other)),
            };
            NetworkMessage::RequestOtp(RequestOtp { order_id, purpose })
        }
        "order" => NetworkMessage::GetOrder(GetOrder {
            order_id: order_id(words.next())?,
        }),
        "history" => NetworkMessage::GetOrderHistory(GetOrderHistory {
            order_id: order_id(words.next())?,
        }),
        "slots" => NetworkMessage::ListTimeslots(ListTimeslots {
            center_id: required(words.next(), "center id")?.to_string(),
        }),
        "allowed" => NetworkMessage::AllowedTransitions(AllowedTransitions {
            status: status(words.next())?,
        }),
        other => return Err(format!("unknown command: {} (try `help`)", other)),
    };
    Ok(Command::Send(request))
}

/// Actor UIHandler: Interfaz humano-sistema
pub struct UIHandler {
    /// Canal de envío hacia el actor `Client`
    pub client: Addr<Client>,
    pub logger: Logger,
}

impl UIHandler {
    pub fn new(client: Addr<Client>) -> Self {
        UIHandler {
            client,
            logger: Logger::new("UI", Color::Yellow),
        }
    }
}

impl Actor for UIHandler {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        self.logger.info("UIHandler iniciado!");
        let me = ctx.address();
        ctx.spawn(
            async move {
                let mut lines = BufReader::new(tokio::io::stdin()).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    me.do_send(UserInput { line });
                }
                me.do_send(Quit);
            }
            .into_actor(self),
        );
    }
}

impl Handler<UserInput> for UIHandler {
    type Result = ();

    fn handle(&mut self, msg: UserInput, ctx: &mut Self::Context) -> Self::Result {
        if msg.line.trim().is_empty() {
            return;
        }
        match parse_command(&msg.line) {
            Ok(Command::Send(request)) => self.client.do_send(SendRequest { request }),
            Ok(Command::Help) => println!("{}", HELP),
            Ok(Command::Quit) => ctx.notify(Quit),
            Err(e) => self.logger.warn(e),
        }
    }
}

impl Handler<Quit> for UIHandler {
    type Result = ();

    fn handle(&mut self, _msg: Quit, ctx: &mut Self::Context) -> Self::Result {
        self.client.do_send(Quit);
        ctx.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sent(line: &str) -> NetworkMessage {
        match parse_command(line) {
            Ok(Command::Send(msg)) => msg,
            other => panic!("{} parsed as {:?}", line, other),
        }
    }

    #[test]
    fn test_place_collects_garments() {
        assert_eq!(
            sent("place center-north center-north-0 shirt duvet"),
            NetworkMessage::PlaceOrder(PlaceOrder {
                center_id: "center-north".to_string(),
                timeslot_id: "center-north-0".to_string(),
                garments: vec!["shirt".to_string(), "duvet".to_string()],
            })
        );
    }

    #[test]
    fn test_status_with_metadata() {
        let mut metadata = Metadata::new();
        metadata.insert("delivery_person_id".to_string(), serde_json::json!("dave"));
        metadata.insert("bags".to_string(), serde_json::json!(2));
        assert_eq!(
            sent("status 7 assigned_for_pickup delivery_person_id=dave bags=2"),
            NetworkMessage::UpdateOrderStatus(UpdateOrderStatus {
                order_id: 7,
                target: OrderStatus::AssignedForPickup,
                metadata,
            })
        );
    }

    #[test]
    fn test_stage_goes_to_center_route() {
        assert!(matches!(
            sent("stage 3 PROCESSING"),
            NetworkMessage::UpdateStage(UpdateStage {
                order_id: 3,
                target: OrderStatus::Processing,
                ..
            })
        ));
    }

    #[test]
    fn test_reasons_keep_spaces() {
        assert_eq!(
            sent("fail-pickup 4 nobody at home"),
            NetworkMessage::ReportPickupFailed(ReportPickupFailed {
                order_id: 4,
                reason: "nobody at home".to_string(),
            })
        );
        assert_eq!(
            sent("cancel 4"),
            NetworkMessage::CancelOrder(CancelOrder {
                order_id: 4,
                reason: None,
            })
        );
    }

    #[test]
    fn test_otp_purpose() {
        assert_eq!(
            sent("otp 9 delivery"),
            NetworkMessage::RequestOtp(RequestOtp {
                order_id: 9,
                purpose: OtpPurpose::Delivery,
            })
        );
        assert!(parse_command("otp 9 laundry").is_err());
    }

    #[test]
    fn test_bad_input() {
        assert!(parse_command("").is_err());
        assert!(parse_command("teleport 1").is_err());
        assert!(parse_command("order abc").is_err());
        assert!(parse_command("status 1 FOLDED").is_err());
        assert!(parse_command("fail-delivery 2").is_err());
        assert_eq!(parse_command("help"), Ok(Command::Help));
        assert_eq!(parse_command("QUIT"), Ok(Command::Quit));
    }
}
