use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role a connected peer declares when it registers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActorRole {
    /// Places and cancels its own orders.
    Customer,
    /// Runs pickup and delivery trips.
    DeliveryPerson,
    /// Dispatches orders and assigns delivery personnel.
    FloorManager,
    /// Moves orders through the processing stages of a center.
    CenterOperator,
    /// Can do anything a floor manager or center operator can.
    Admin,
}

impl ActorRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActorRole::Customer => "CUSTOMER",
            ActorRole::DeliveryPerson => "DELIVERY_PERSON",
            ActorRole::FloorManager => "FLOOR_MANAGER",
            ActorRole::CenterOperator => "CENTER_OPERATOR",
            ActorRole::Admin => "ADMIN",
        }
    }

    /// Staff may drive any order through the status route.
    pub fn is_staff(&self) -> bool {
        matches!(self, ActorRole::FloorManager | ActorRole::Admin)
    }
}

impl fmt::Display for ActorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ActorRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "CUSTOMER" => Ok(ActorRole::Customer),
            "DELIVERY_PERSON" | "PARTNER" => Ok(ActorRole::DeliveryPerson),
            "FLOOR_MANAGER" => Ok(ActorRole::FloorManager),
            "CENTER_OPERATOR" => Ok(ActorRole::CenterOperator),
            "ADMIN" => Ok(ActorRole::Admin),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partner_alias() {
        assert_eq!("partner".parse::<ActorRole>(), Ok(ActorRole::DeliveryPerson));
        assert_eq!(
            "center-operator".parse::<ActorRole>(),
            Ok(ActorRole::CenterOperator)
        );
        assert!("janitor".parse::<ActorRole>().is_err());
    }

    #[test]
    fn test_staff_roles() {
        assert!(ActorRole::FloorManager.is_staff());
        assert!(ActorRole::Admin.is_staff());
        assert!(!ActorRole::CenterOperator.is_staff());
        assert!(!ActorRole::Customer.is_staff());
    }
}
