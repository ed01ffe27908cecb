//! Points earned for staying within spending limits, and the shop they are spent in.

mod core;
mod db;
mod evaluator;
mod page;
mod shop;

pub use core::{NewReward, Reward, RewardSource};
pub use db::{create_reward_table, insert_reward, query_rewards};
pub use evaluator::{Evaluation, decide_reward, evaluate_concluded_limits, evaluate_limit};
pub use page::{get_rewards_page, redeem_item_endpoint};
pub use shop::{PointsSummary, SHOP_ITEMS, ShopItem, is_unlocked, redeem};
