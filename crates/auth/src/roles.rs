use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Account role used for route guarding.
///
/// Serialized with the wire names the storefront has always used
/// (`CLIENT_ROLE`, `ADMIN_ROLE`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Role {
    #[default]
    #[serde(rename = "CLIENT_ROLE")]
    Client,
    #[serde(rename = "ADMIN_ROLE")]
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Client => "CLIENT_ROLE",
            Role::Admin => "ADMIN_ROLE",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "CLIENT_ROLE" => Ok(Role::Client),
            "ADMIN_ROLE" => Ok(Role::Admin),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}
