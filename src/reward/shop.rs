//! Items that can be unlocked with points, and the points balance that pays for them.
//!
//! An unlock is stored as a reward with negative points and an
//! [RewardSource::Unlock] source, so the one-reward-per-source rule also stops
//! an item from being bought twice.

use time::Date;

use crate::{
    Error,
    auth::UserID,
    reward::{NewReward, Reward, RewardSource},
    store::{RecordStore, RewardQuery},
};

/// Something a user can spend points on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShopItem {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub cost: i64,
}

/// Everything in the shop.
pub const SHOP_ITEMS: [ShopItem; 3] = [
    ShopItem {
        id: "avatar_night_owl",
        name: "Night Owl",
        description: "An avatar for late-night budget reviews.",
        cost: 100,
    },
    ShopItem {
        id: "avatar_piggy_bank",
        name: "Piggy Bank",
        description: "An avatar for steady savers.",
        cost: 100,
    },
    ShopItem {
        id: "avatar_golden_coin",
        name: "Golden Coin",
        description: "A shiny avatar for the most disciplined spenders.",
        cost: 120,
    },
];

/// Look up a shop item by its ID.
pub fn find_shop_item(item_id: &str) -> Option<&'static ShopItem> {
    SHOP_ITEMS.iter().find(|item| item.id == item_id)
}

/// A user's points, split into what was earned and what was spent.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PointsSummary {
    /// Points from rewards other than unlocks.
    pub earned: i64,
    /// Points spent on unlocks, as a positive number.
    pub spent: i64,
}

impl PointsSummary {
    /// Tally a user's rewards.
    pub fn from_rewards(rewards: &[Reward]) -> Self {
        rewards
            .iter()
            .fold(PointsSummary::default(), |mut summary, reward| {
                if matches!(reward.source, Some(RewardSource::Unlock(_))) {
                    summary.spent = summary.spent.saturating_add(reward.points.saturating_abs());
                } else {
                    summary.earned = summary.earned.saturating_add(reward.points);
                }

                summary
            })
    }

    /// The points that can still be spent.
    pub fn available(&self) -> i64 {
        self.earned.saturating_sub(self.spent)
    }
}

/// Whether any of `rewards` unlocked the item `item_id`.
pub fn is_unlocked(rewards: &[Reward], item_id: &str) -> bool {
    rewards.iter().any(|reward| {
        matches!(&reward.source, Some(RewardSource::Unlock(unlocked)) if unlocked == item_id)
    })
}

/// Spend `owner`'s points on the item `item_id`.
///
/// Returns the stored unlock record.
///
/// # Errors
///
/// Returns:
/// - [Error::UnknownShopItem] if there is no such item.
/// - [Error::AlreadyUnlocked] if the user already owns the item.
/// - [Error::InsufficientPoints] if the user cannot afford the item.
pub fn redeem(
    store: &impl RecordStore,
    owner: UserID,
    item_id: &str,
    today: Date,
) -> Result<Reward, Error> {
    let item = find_shop_item(item_id).ok_or_else(|| Error::UnknownShopItem(item_id.to_owned()))?;
    let rewards = store.query_rewards(&RewardQuery::for_owner(owner))?;

    if is_unlocked(&rewards, item.id) {
        return Err(Error::AlreadyUnlocked(item.name.to_owned()));
    }

    let available = PointsSummary::from_rewards(&rewards).available();

    if available < item.cost {
        return Err(Error::InsufficientPoints {
            needed: item.cost,
            available,
        });
    }

    let unlock = NewReward {
        owner,
        source: Some(RewardSource::Unlock(item.id.to_owned())),
        points: -item.cost,
        title: format!("Unlocked {}", item.name),
        description: item.description.to_owned(),
        granted_date: today,
    };

    match store.insert_reward(unlock) {
        Ok(reward) => {
            tracing::info!("User {owner} unlocked {} for {} points", item.id, item.cost);
            Ok(reward)
        }
        Err(Error::DuplicateRewardSource) => Err(Error::AlreadyUnlocked(item.name.to_owned())),
        Err(error) => Err(error),
    }
}
