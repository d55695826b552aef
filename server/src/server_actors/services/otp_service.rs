use crate::messages::internal_messages::{ExpireOtp, IssueOtp, LookupOtp, RevokeOtps, VerifyOtp};
use actix::prelude::*;
use actix::SpawnHandle;
use chrono::Utc;
use colored::Color;
use common::constants::{OTP_MAX_ATTEMPTS, OTP_TTL_SECONDS};
use common::errors::OrderError;
use common::logger::Logger;
use common::types::dtos::{OtpDTO, OtpPurpose};
use common::utils::generate_otp;
use std::collections::HashMap;
use std::time::Duration;

struct IssuedOtp {
    otp: OtpDTO,
    attempts_left: u32,
    timer: SpawnHandle,
}

/// Issues and checks the one-time codes that confirm a pickup or a delivery
/// at the customer's door. Every code is reaped by a timer once it expires.
pub struct OtpService {
    codes: HashMap<(u64, OtpPurpose), IssuedOtp>,
    ttl: Duration,
    max_attempts: u32,
    logger: Logger,
}

impl Default for OtpService {
    fn default() -> Self {
        Self::new(Duration::from_secs(OTP_TTL_SECONDS), OTP_MAX_ATTEMPTS)
    }
}

impl OtpService {
    pub fn new(ttl: Duration, max_attempts: u32) -> Self {
        Self {
            codes: HashMap::new(),
            ttl,
            max_attempts,
            logger: Logger::new("OtpService", Color::Magenta),
        }
    }

    fn discard(&mut self, key: &(u64, OtpPurpose), ctx: &mut Context<Self>) {
        if let Some(issued) = self.codes.remove(key) {
            ctx.cancel_future(issued.timer);
        }
    }
}

impl Actor for OtpService {
    type Context = Context<Self>;
}

impl Handler<IssueOtp> for OtpService {
    type Result = MessageResult<IssueOtp>;

    fn handle(&mut self, msg: IssueOtp, ctx: &mut Self::Context) -> Self::Result {
        let key = (msg.order_id, msg.purpose);
        self.discard(&key, ctx);

        let ttl = chrono::Duration::from_std(self.ttl).unwrap_or(chrono::Duration::zero());
        let otp = OtpDTO {
            order_id: msg.order_id,
            purpose: msg.purpose,
            code: generate_otp(),
            expires_at: Utc::now() + ttl,
        };
        let timer = ctx.notify_later(
            ExpireOtp {
                order_id: msg.order_id,
                purpose: msg.purpose,
            },
            self.ttl,
        );
        self.codes.insert(
            key,
            IssuedOtp {
                otp: otp.clone(),
                attempts_left: self.max_attempts,
                timer,
            },
        );
        self.logger.info(format!(
            "{} code issued for order {}",
            msg.purpose, msg.order_id
        ));
        MessageResult(otp)
    }
}

impl Handler<VerifyOtp> for OtpService {
    type Result = Result<(), OrderError>;

    fn handle(&mut self, msg: VerifyOtp, ctx: &mut Self::Context) -> Self::Result {
        let key = (msg.order_id, msg.purpose);
        let Some(issued) = self.codes.get_mut(&key) else {
            return Err(OrderError::OtpMissing {
                order_id: msg.order_id,
                purpose: msg.purpose,
            });
        };

        if issued.otp.expires_at <= Utc::now() {
            self.discard(&key, ctx);
            return Err(OrderError::OtpExpired {
                order_id: msg.order_id,
                purpose: msg.purpose,
            });
        }

        if issued.otp.code != msg.code.trim() {
            issued.attempts_left = issued.attempts_left.saturating_sub(1);
            let attempts_left = issued.attempts_left;
            self.logger.warn(format!(
                "Wrong {} code for order {}, {} attempts left",
                msg.purpose, msg.order_id, attempts_left
            ));
            if attempts_left == 0 {
                self.discard(&key, ctx);
            }
            return Err(OrderError::OtpMismatch {
                order_id: msg.order_id,
                purpose: msg.purpose,
                attempts_left,
            });
        }

        self.discard(&key, ctx);
        self.logger.info(format!(
            "{} code verified for order {}",
            msg.purpose, msg.order_id
        ));
        Ok(())
    }
}

impl Handler<LookupOtp> for OtpService {
    type Result = MessageResult<LookupOtp>;

    fn handle(&mut self, msg: LookupOtp, _ctx: &mut Self::Context) -> Self::Result {
        let now = Utc::now();
        MessageResult(
            self.codes
                .get(&(msg.order_id, msg.purpose))
                .filter(|issued| issued.otp.expires_at > now)
                .map(|issued| issued.otp.clone()),
        )
    }
}

impl Handler<RevokeOtps> for OtpService {
    type Result = ();

    fn handle(&mut self, msg: RevokeOtps, ctx: &mut Self::Context) -> Self::Result {
        for purpose in [OtpPurpose::Pickup, OtpPurpose::Delivery] {
            self.discard(&(msg.order_id, purpose), ctx);
        }
    }
}

impl Handler<ExpireOtp> for OtpService {
    type Result = ();

    fn handle(&mut self, msg: ExpireOtp, _ctx: &mut Self::Context) -> Self::Result {
        // El timer ya disparó, no hay nada que cancelar
        if self.codes.remove(&(msg.order_id, msg.purpose)).is_some() {
            self.logger.info(format!(
                "{} code for order {} expired",
                msg.purpose, msg.order_id
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(order_id: u64) -> IssueOtp {
        IssueOtp {
            order_id,
            purpose: OtpPurpose::Pickup,
        }
    }

    fn verify(order_id: u64, code: &str) -> VerifyOtp {
        VerifyOtp {
            order_id,
            purpose: OtpPurpose::Pickup,
            code: code.to_string(),
        }
    }

    fn wrong_code(code: &str) -> String {
        code.chars()
            .map(|c| if c == '0' { '1' } else { '0' })
            .collect()
    }

    #[actix_rt::test]
    async fn test_right_code_verifies_once() {
        let service = OtpService::default().start();
        let otp = service.send(issue(1)).await.unwrap();

        assert_eq!(service.send(verify(1, &otp.code)).await.unwrap(), Ok(()));
        assert_eq!(
            service.send(verify(1, &otp.code)).await.unwrap(),
            Err(OrderError::OtpMissing {
                order_id: 1,
                purpose: OtpPurpose::Pickup
            })
        );
    }

    #[actix_rt::test]
    async fn test_wrong_code_burns_attempts() {
        let service = OtpService::new(Duration::from_secs(60), 2).start();
        let otp = service.send(issue(2)).await.unwrap();
        let bad = wrong_code(&otp.code);

        assert_eq!(
            service.send(verify(2, &bad)).await.unwrap(),
            Err(OrderError::OtpMismatch {
                order_id: 2,
                purpose: OtpPurpose::Pickup,
                attempts_left: 1
            })
        );
        assert!(matches!(
            service.send(verify(2, &bad)).await.unwrap(),
            Err(OrderError::OtpMismatch { attempts_left: 0, .. })
        ));
        // Sin intentos, el código se descarta
        assert!(matches!(
            service.send(verify(2, &otp.code)).await.unwrap(),
            Err(OrderError::OtpMissing { .. })
        ));
    }

    #[actix_rt::test]
    async fn test_codes_expire() {
        let service = OtpService::new(Duration::from_millis(50), 3).start();
        let otp = service.send(issue(3)).await.unwrap();

        tokio::time::sleep(Duration::from_millis(120)).await;

        let result = service.send(verify(3, &otp.code)).await.unwrap();
        assert!(matches!(
            result,
            Err(OrderError::OtpExpired { .. }) | Err(OrderError::OtpMissing { .. })
        ));
        assert_eq!(
            service
                .send(LookupOtp {
                    order_id: 3,
                    purpose: OtpPurpose::Pickup
                })
                .await
                .unwrap(),
            None
        );
    }

    #[actix_rt::test]
    async fn test_reissue_replaces_and_revoke_clears() {
        let service = OtpService::default().start();
        service.send(issue(4)).await.unwrap();
        let second = service.send(issue(4)).await.unwrap();

        let looked_up = service
            .send(LookupOtp {
                order_id: 4,
                purpose: OtpPurpose::Pickup,
            })
            .await
            .unwrap();
        assert_eq!(looked_up, Some(second));

        service.send(RevokeOtps { order_id: 4 }).await.unwrap();
        assert!(matches!(
            service.send(verify(4, "000000")).await.unwrap(),
            Err(OrderError::OtpMissing { .. })
        ));
    }
}
