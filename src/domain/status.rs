//! Parcel lifecycle.
//!
//! ```text
//! PENDING --confirm--> CONFIRMED --start_transit--> IN_TRANSIT --finish_delivery--> DELIVERED
//!    |                     |                            |
//!    +--------cancel-------+-----------cancel-----------+--> CANCELLED
//! ```
//!
//! `DELIVERED` and `CANCELLED` are terminal.

use crate::utils::error::ParcelError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParcelStatus {
    Pending,
    Confirmed,
    InTransit,
    Delivered,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusEvent {
    Confirm,
    StartTransit,
    FinishDelivery,
    Cancel,
}

impl ParcelStatus {
    pub const ALL: [ParcelStatus; 5] = [
        ParcelStatus::Pending,
        ParcelStatus::Confirmed,
        ParcelStatus::InTransit,
        ParcelStatus::Delivered,
        ParcelStatus::Cancelled,
    ];

    pub fn is_active(self) -> bool {
        !matches!(self, ParcelStatus::Delivered | ParcelStatus::Cancelled)
    }

    /// Transition table. `None` means the event is not allowed from `self`.
    pub fn transition(self, event: StatusEvent) -> Option<ParcelStatus> {
        use ParcelStatus::*;
        use StatusEvent::*;

        match (self, event) {
            (Pending, Confirm) => Some(Confirmed),
            (Confirmed, StartTransit) => Some(InTransit),
            (InTransit, FinishDelivery) => Some(Delivered),
            (Pending | Confirmed | InTransit, Cancel) => Some(Cancelled),
            _ => None,
        }
    }

    /// The event that moves an active parcel one step forward.
    pub fn forward_event(self) -> Option<StatusEvent> {
        match self {
            ParcelStatus::Pending => Some(StatusEvent::Confirm),
            ParcelStatus::Confirmed => Some(StatusEvent::StartTransit),
            ParcelStatus::InTransit => Some(StatusEvent::FinishDelivery),
            ParcelStatus::Delivered | ParcelStatus::Cancelled => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ParcelStatus::Pending => "PENDING",
            ParcelStatus::Confirmed => "CONFIRMED",
            ParcelStatus::InTransit => "IN_TRANSIT",
            ParcelStatus::Delivered => "DELIVERED",
            ParcelStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for ParcelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParcelStatus {
    type Err = ParcelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        ParcelStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| ParcelError::validation("status", format!("unknown status '{}'", s)))
    }
}

impl StatusEvent {
    pub fn as_str(self) -> &'static str {
        match self {
            StatusEvent::Confirm => "confirm",
            StatusEvent::StartTransit => "start transit",
            StatusEvent::FinishDelivery => "finish delivery",
            StatusEvent::Cancel => "cancel",
        }
    }
}

impl fmt::Display for StatusEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_sequence() {
        let mut status = ParcelStatus::Pending;
        let mut seen = vec![status];
        while let Some(event) = status.forward_event() {
            status = status.transition(event).unwrap();
            seen.push(status);
        }
        assert_eq!(
            seen,
            vec![
                ParcelStatus::Pending,
                ParcelStatus::Confirmed,
                ParcelStatus::InTransit,
                ParcelStatus::Delivered
            ]
        );
    }

    #[test]
    fn test_cancel_only_from_active() {
        for status in ParcelStatus::ALL {
            let cancelled = status.transition(StatusEvent::Cancel);
            if status.is_active() {
                assert_eq!(cancelled, Some(ParcelStatus::Cancelled));
            } else {
                assert_eq!(cancelled, None);
            }
        }
    }

    #[test]
    fn test_no_skipping_or_going_back() {
        assert_eq!(
            ParcelStatus::Pending.transition(StatusEvent::FinishDelivery),
            None
        );
        assert_eq!(
            ParcelStatus::InTransit.transition(StatusEvent::Confirm),
            None
        );
        assert_eq!(
            ParcelStatus::Delivered.transition(StatusEvent::StartTransit),
            None
        );
    }

    #[test]
    fn test_terminal_states_are_inactive() {
        assert!(!ParcelStatus::Delivered.is_active());
        assert!(!ParcelStatus::Cancelled.is_active());
        assert_eq!(ParcelStatus::Cancelled.forward_event(), None);
    }

    #[test]
    fn test_parse_and_serialize() {
        assert_eq!(
            "in_transit".parse::<ParcelStatus>().unwrap(),
            ParcelStatus::InTransit
        );
        assert_eq!(
            "in-transit".parse::<ParcelStatus>().unwrap(),
            ParcelStatus::InTransit
        );
        assert!("LOST".parse::<ParcelStatus>().is_err());
        assert_eq!(
            serde_json::to_string(&ParcelStatus::InTransit).unwrap(),
            "\"IN_TRANSIT\""
        );
    }
}
