//! Order status

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus { #[default] Draft, Confirmed, Cancelled }

impl OrderStatus {
    pub fn can_be_modified(&self) -> bool { matches!(self, Self::Draft) }
    pub fn can_be_confirmed(&self) -> bool { matches!(self, Self::Draft) }
    pub fn can_be_cancelled(&self) -> bool { !matches!(self, Self::Cancelled) }

    pub fn as_str(&self) -> &'static str {
        match self { Self::Draft => "draft", Self::Confirmed => "confirmed", Self::Cancelled => "cancelled" }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for OrderStatus {
    type Err = UnknownStatus;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "confirmed" => Ok(Self::Confirmed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown order status: {0:?}")]
pub struct UnknownStatus(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_predicates() {
        use OrderStatus::*;
        assert!(Draft.can_be_modified() && Draft.can_be_confirmed() && Draft.can_be_cancelled());
        assert!(!Confirmed.can_be_modified() && !Confirmed.can_be_confirmed());
        assert!(Confirmed.can_be_cancelled());
        assert!(!Cancelled.can_be_modified() && !Cancelled.can_be_confirmed() && !Cancelled.can_be_cancelled());
    }

    #[test]
    fn test_text_form() {
        for status in [OrderStatus::Draft, OrderStatus::Confirmed, OrderStatus::Cancelled] {
            assert_eq!(status.as_str().parse::<OrderStatus>(), Ok(status));
        }
        assert!("CONFIRMED".parse::<OrderStatus>().is_err());
        assert_eq!(serde_json::to_string(&OrderStatus::Cancelled).unwrap(), "\"cancelled\"");
    }
}
