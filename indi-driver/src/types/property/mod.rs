//! The property data model.
//!
//! A device exposes its state as a set of named *vector properties*,
//! each an ordered collection of typed members. The enumerations in
//! this module mirror the protocol's attribute vocabulary; their
//! `Display` and `FromStr` implementations produce and consume the
//! exact wire text.

use super::Error;
use std::fmt;
use std::str::FromStr;

mod vector;

pub use vector::{
    Blob, BlobVector, Light, LightVector, Number, NumberVector, Switch,
    SwitchVector, Text, TextVector,
};

/// The five kinds of property a device can expose. `Light` is
/// output-only: the peer can never write to one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PropertyKind {
    Number,
    Switch,
    Text,
    Light,
    Blob,
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PropertyKind::Number => write!(f, "Number"),
            PropertyKind::Switch => write!(f, "Switch"),
            PropertyKind::Text => write!(f, "Text"),
            PropertyKind::Light => write!(f, "Light"),
            PropertyKind::Blob => write!(f, "BLOB"),
        }
    }
}

/// Who may change a property's values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Permission {
    ReadOnly,
    WriteOnly,
    ReadWrite,
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Permission::ReadOnly => write!(f, "ro"),
            Permission::WriteOnly => write!(f, "wo"),
            Permission::ReadWrite => write!(f, "rw"),
        }
    }
}

impl FromStr for Permission {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ro" => Ok(Permission::ReadOnly),
            "wo" => Ok(Permission::WriteOnly),
            "rw" => Ok(Permission::ReadWrite),
            _ => Err(Error::ParseError(format!("bad permission '{}'", s))),
        }
    }
}

/// The state attribute attached to every vector, rendered by clients
/// as an idle/ok/busy/alert lamp.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PropertyState {
    Idle,
    Ok,
    Busy,
    Alert,
}

impl fmt::Display for PropertyState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PropertyState::Idle => write!(f, "Idle"),
            PropertyState::Ok => write!(f, "Ok"),
            PropertyState::Busy => write!(f, "Busy"),
            PropertyState::Alert => write!(f, "Alert"),
        }
    }
}

impl FromStr for PropertyState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Idle" => Ok(PropertyState::Idle),
            "Ok" => Ok(PropertyState::Ok),
            "Busy" => Ok(PropertyState::Busy),
            "Alert" => Ok(PropertyState::Alert),
            _ => Err(Error::ParseError(format!("bad state '{}'", s))),
        }
    }
}

/// The position of one switch member.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SwitchState {
    On,
    Off,
}

impl fmt::Display for SwitchState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SwitchState::On => write!(f, "On"),
            SwitchState::Off => write!(f, "Off"),
        }
    }
}

impl FromStr for SwitchState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "On" => Ok(SwitchState::On),
            "Off" => Ok(SwitchState::Off),
            _ => Err(Error::ParseError(format!("bad switch state '{}'", s))),
        }
    }
}

/// How the members of a switch vector constrain each other.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SwitchRule {
    /// Exactly one member is on at any time.
    OneOfMany,
    /// At most one member is on; all may be off.
    AtMostOne,
    /// Members are independent.
    AnyOfMany,
}

impl fmt::Display for SwitchRule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SwitchRule::OneOfMany => write!(f, "OneOfMany"),
            SwitchRule::AtMostOne => write!(f, "AtMostOne"),
            SwitchRule::AnyOfMany => write!(f, "AnyOfMany"),
        }
    }
}

impl FromStr for SwitchRule {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OneOfMany" => Ok(SwitchRule::OneOfMany),
            "AtMostOne" => Ok(SwitchRule::AtMostOne),
            "AnyOfMany" => Ok(SwitchRule::AnyOfMany),
            _ => Err(Error::ParseError(format!("bad switch rule '{}'", s))),
        }
    }
}

/// How the server should route another driver's BLOB traffic to us.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlobPolicy {
    /// Never send BLOBs.
    Never,
    /// Send BLOBs along with all other traffic.
    Also,
    /// Send only BLOBs.
    Only,
}

impl fmt::Display for BlobPolicy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BlobPolicy::Never => write!(f, "Never"),
            BlobPolicy::Also => write!(f, "Also"),
            BlobPolicy::Only => write!(f, "Only"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_text_round_trips() {
        for perm in
            [Permission::ReadOnly, Permission::WriteOnly, Permission::ReadWrite]
        {
            assert_eq!(perm.to_string().parse::<Permission>(), Ok(perm));
        }

        for state in [
            PropertyState::Idle,
            PropertyState::Ok,
            PropertyState::Busy,
            PropertyState::Alert,
        ] {
            assert_eq!(state.to_string().parse::<PropertyState>(), Ok(state));
        }

        for rule in [
            SwitchRule::OneOfMany,
            SwitchRule::AtMostOne,
            SwitchRule::AnyOfMany,
        ] {
            assert_eq!(rule.to_string().parse::<SwitchRule>(), Ok(rule));
        }

        assert_eq!("On".parse::<SwitchState>(), Ok(SwitchState::On));
        assert_eq!("Off".parse::<SwitchState>(), Ok(SwitchState::Off));
    }

    #[test]
    fn test_rejects_unknown_wire_text() {
        assert!("rd".parse::<Permission>().is_err());
        assert!("".parse::<Permission>().is_err());
        assert!("OK".parse::<PropertyState>().is_err());
        assert!("on".parse::<SwitchState>().is_err());
        assert!("OneofMany".parse::<SwitchRule>().is_err());
    }
}
