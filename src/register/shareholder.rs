use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Swedish share classes. A-shares carry ten votes per share, B-shares one.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ShareClass {
    A,
    B,
}

impl ShareClass {
    pub fn vote_weight(self) -> u64 {
        match self {
            ShareClass::A => 10,
            ShareClass::B => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ShareClass::A => "A",
            ShareClass::B => "B",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_uppercase().as_str() {
            "A" => Some(ShareClass::A),
            "B" => Some(ShareClass::B),
            _ => None,
        }
    }
}

impl fmt::Display for ShareClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One row of the statutory share register (aktiebok).
///
/// `id_number` holds a personnummer for natural persons or an
/// organisationsnummer for legal entities. The share-number range is
/// inclusive on both ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shareholder {
    pub id: Uuid,
    pub name: String,
    pub id_number: String,
    pub shares: u64,
    pub share_class: ShareClass,
    pub share_number_from: u64,
    pub share_number_to: u64,
    pub created_at: DateTime<Utc>,
}

impl Shareholder {
    pub fn new(
        name: impl Into<String>,
        id_number: impl Into<String>,
        shares: u64,
        share_class: ShareClass,
        share_number_from: u64,
        share_number_to: u64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            id_number: id_number.into(),
            shares,
            share_class,
            share_number_from,
            share_number_to,
            created_at: Utc::now(),
        }
    }

    pub fn votes(&self) -> u64 {
        self.shares * self.share_class.vote_weight()
    }
}
