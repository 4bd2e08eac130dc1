//! Repository classification.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AdminError;

/// Processing level of a data repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Level {
    /// Data challenge.
    #[serde(rename = "DC")]
    Dc,
    /// Level 1 (alert production).
    L1,
    /// Level 2 (data release production).
    L2,
    /// Level 3 (user-generated).
    L3,
    /// Development.
    #[serde(rename = "dev")]
    Dev,
}

impl Level {
    /// All levels, in catalog order.
    pub const ALL: [Self; 5] = [Self::Dc, Self::L1, Self::L2, Self::L3, Self::Dev];

    /// Label stored in the catalog.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dc => "DC",
            Self::L1 => "L1",
            Self::L2 => "L2",
            Self::L3 => "L3",
            Self::Dev => "dev",
        }
    }
}

impl FromStr for Level {
    type Err = AdminError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| AdminError::BadCommand(format!("unknown level '{s}'")))
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who may read a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Accessibility {
    /// Publicly released.
    Released,
    /// Not released yet.
    Unreleased,
    /// Owner only.
    Private,
}

impl Accessibility {
    /// Label stored in the catalog.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Released => "released",
            Self::Unreleased => "unreleased",
            Self::Private => "private",
        }
    }
}

impl FromStr for Accessibility {
    type Err = AdminError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "released" => Ok(Self::Released),
            "unreleased" => Ok(Self::Unreleased),
            "private" => Ok(Self::Private),
            _ => Err(AdminError::BadCommand(format!("unknown accessibility '{s}'"))),
        }
    }
}

impl fmt::Display for Accessibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
