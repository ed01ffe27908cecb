//! Core reward types.

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use time::Date;

use crate::{auth::UserID, database_id::DatabaseId, limit::LimitId};

/// Database identifier for a reward.
pub type RewardId = DatabaseId;

/// What produced a reward.
///
/// Each user can have at most one reward per source, so a limit can only pay
/// out once and a shop item can only be unlocked once.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RewardSource {
    /// Points earned for staying within a spending limit.
    Limit(LimitId),
    /// Points spent unlocking a shop item, identified by the item's ID.
    Unlock(String),
}

impl RewardSource {
    /// The text stored in the database's `source_key` column.
    pub fn key(&self) -> String {
        match self {
            RewardSource::Limit(limit_id) => format!("limit:{limit_id}"),
            RewardSource::Unlock(item_id) => format!("unlock:{item_id}"),
        }
    }

    /// Parse a `source_key` back into a source. Returns `None` for unknown keys.
    pub fn parse(key: &str) -> Option<Self> {
        let (kind, value) = key.split_once(':')?;

        match kind {
            "limit" => value.parse().ok().map(RewardSource::Limit),
            "unlock" if !value.is_empty() => Some(RewardSource::Unlock(value.to_owned())),
            _ => None,
        }
    }
}

impl Display for RewardSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Points a user earned (positive) or spent (negative).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reward {
    pub id: RewardId,
    pub owner: UserID,
    pub source: Option<RewardSource>,
    pub points: i64,
    pub title: String,
    pub description: String,
    pub granted_date: Date,
}

/// A reward that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReward {
    pub owner: UserID,
    pub source: Option<RewardSource>,
    pub points: i64,
    pub title: String,
    pub description: String,
    pub granted_date: Date,
}

impl NewReward {
    /// Attach the ID the store assigned.
    pub fn into_reward(self, id: RewardId) -> Reward {
        Reward {
            id,
            owner: self.owner,
            source: self.source,
            points: self.points,
            title: self.title,
            description: self.description,
            granted_date: self.granted_date,
        }
    }
}
