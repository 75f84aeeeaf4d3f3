//! Notification channels.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BusError;

/// A named notification stream.
///
/// The wire names must match exactly between producers and consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Channel {
    /// A field's value changed through user interaction.
    #[serde(rename = "field-change")]
    FieldChange,
    /// A field initialized and announces its initial value.
    #[serde(rename = "field-mount")]
    FieldMount,
}

impl Channel {
    /// All channels, in a stable order.
    pub const ALL: [Self; 2] = [Self::FieldChange, Self::FieldMount];

    /// Returns the wire name of the channel.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FieldChange => "field-change",
            Self::FieldMount => "field-mount",
        }
    }

    pub(crate) const fn index(self) -> usize {
        match self {
            Self::FieldChange => 0,
            Self::FieldMount => 1,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = BusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|channel| channel.as_str() == s)
            .ok_or_else(|| BusError::UnknownChannel(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names() {
        assert_eq!(Channel::FieldChange.as_str(), "field-change");
        assert_eq!(Channel::FieldMount.to_string(), "field-mount");
    }

    #[test]
    fn test_parse() {
        assert_eq!("field-change".parse::<Channel>(), Ok(Channel::FieldChange));
        assert_eq!("field-mount".parse::<Channel>(), Ok(Channel::FieldMount));
        assert_eq!(
            "field_change".parse::<Channel>(),
            Err(BusError::UnknownChannel("field_change".into()))
        );
    }

    #[test]
    fn test_serde_uses_wire_names() {
        let json = serde_json::to_string(&Channel::FieldMount).unwrap();
        assert_eq!(json, r#""field-mount""#);
        let channel: Channel = serde_json::from_str(r#""field-change""#).unwrap();
        assert_eq!(channel, Channel::FieldChange);
    }
}
