//! IP network values as they appear in GeoLite2 block files.

use std::fmt;
use std::str::FromStr;

use ipnet::IpNet;
use serde::{Serialize, Serializer};
use thiserror::Error;

/// An IPv4 or IPv6 prefix, rendered in canonical CIDR notation.
///
/// Parsing is strict: the address must be the network address of the prefix,
/// so `1.2.3.0/24` is accepted and `1.2.3.4/24` is not. Two networks are equal
/// exactly when their canonical strings are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Network(IpNet);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetworkParseError {
    #[error("invalid network {0:?}")]
    Invalid(String),

    #[error("network {0:?} has host bits set")]
    HostBitsSet(String),
}

impl Network {
    pub fn new(net: IpNet) -> Result<Self, NetworkParseError> {
        if net.trunc() != net {
            return Err(NetworkParseError::HostBitsSet(net.to_string()));
        }
        Ok(Self(net))
    }

    /// Join key used when matching country and AS records.
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl FromStr for Network {
    type Err = NetworkParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let net = s
            .parse::<IpNet>()
            .map_err(|_| NetworkParseError::Invalid(s.to_string()))?;
        Network::new(net)
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl Serialize for Network {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
