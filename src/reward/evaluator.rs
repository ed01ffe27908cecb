//! Awards points once for each concluded limit the user stayed within.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use time::Date;

use crate::{
    Error,
    auth::UserID,
    limit::{BudgetLimit, LimitId},
    money::usage_percentage,
    reward::{NewReward, Reward, RewardSource},
    store::{LimitQuery, RecordStore, RewardQuery},
};

/// Spending at most this fraction of the cap earns [EXCELLENT_POINTS].
const EXCELLENT_USAGE_RATIO: Decimal = dec!(0.80);
const EXCELLENT_POINTS: i64 = 100;
const EXCELLENT_TITLE: &str = "Excellent Control";

/// Spending at most the cap earns [MET_POINTS].
const MET_USAGE_RATIO: Decimal = dec!(1.00);
const MET_POINTS: i64 = 50;
const MET_TITLE: &str = "Limit Met";

/// The result of evaluating one limit.
#[derive(Debug, PartialEq)]
pub enum Evaluation {
    /// The limit earned a reward, which has been stored.
    Granted(Reward),
    /// A reward for the limit already exists.
    AlreadyGranted,
    /// More than the cap was spent, so there is nothing to award.
    NotGrantedOverBudget,
    /// The period has not finished yet.
    Pending,
}

/// The tier a usage ratio falls into, as `(points, title)`.
///
/// Returns `None` when more than the cap was spent.
pub fn decide_reward(usage_ratio: Decimal) -> Option<(i64, &'static str)> {
    if usage_ratio <= EXCELLENT_USAGE_RATIO {
        Some((EXCELLENT_POINTS, EXCELLENT_TITLE))
    } else if usage_ratio <= MET_USAGE_RATIO {
        Some((MET_POINTS, MET_TITLE))
    } else {
        None
    }
}

/// Decide whether one of `owner`'s limits earns a reward, and record it if so.
///
/// A limit only pays out once its last day is before `today`, and never more
/// than once.
///
/// # Errors
///
/// Returns [Error::NotFound] if `owner` has no limit with `limit_id`, or any
/// other error from the store.
pub fn evaluate_limit(
    store: &impl RecordStore,
    owner: UserID,
    limit_id: LimitId,
    today: Date,
) -> Result<Evaluation, Error> {
    let limit = store.get_limit(limit_id, owner)?;
    let source = RewardSource::Limit(limit.id);

    let existing = store.query_rewards(&RewardQuery {
        source: Some(source.clone()),
        ..RewardQuery::for_owner(owner)
    })?;

    if !existing.is_empty() {
        return Ok(Evaluation::AlreadyGranted);
    }

    if !limit.has_concluded(today) {
        return Ok(Evaluation::Pending);
    }

    let Some((points, title)) = decide_reward(limit.usage_ratio()) else {
        return Ok(Evaluation::NotGrantedOverBudget);
    };

    let new_reward = NewReward {
        owner,
        source: Some(source),
        points,
        title: title.to_owned(),
        description: reward_description(&limit),
        granted_date: today,
    };

    match store.insert_reward(new_reward) {
        Ok(reward) => {
            tracing::info!(
                "Granted {} points to user {} for limit {}",
                reward.points,
                owner,
                limit.id
            );
            Ok(Evaluation::Granted(reward))
        }
        // Another request granted the reward between the check and the insert.
        Err(Error::DuplicateRewardSource) => Ok(Evaluation::AlreadyGranted),
        Err(error) => Err(error),
    }
}

fn reward_description(limit: &BudgetLimit) -> String {
    let percentage = usage_percentage(limit.accumulated_spend, limit.cap.as_decimal());

    format!(
        "You kept spending under control, using only {:.1}% of your ${} limit.",
        percentage, limit.cap
    )
}

/// Evaluate every one of `owner`'s limits that finished before `today`.
///
/// Returns the rewards granted by this call. A limit that cannot be evaluated
/// is logged and skipped.
///
/// # Errors
///
/// Returns an error only if the limits themselves could not be queried.
pub fn evaluate_concluded_limits(
    store: &impl RecordStore,
    owner: UserID,
    today: Date,
) -> Result<Vec<Reward>, Error> {
    let limits = store.query_limits(&LimitQuery {
        ended_before: Some(today),
        ..LimitQuery::for_owner(owner)
    })?;

    let mut granted = Vec::new();

    for limit in limits {
        match evaluate_limit(store, owner, limit.id, today) {
            Ok(Evaluation::Granted(reward)) => granted.push(reward),
            Ok(_) => {}
            Err(error) => {
                tracing::warn!("could not evaluate reward for limit {}: {error}", limit.id);
            }
        }
    }

    Ok(granted)
}

#[cfg(test)]
mod evaluator_tests {
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use time::{Date, macros::date};

    use crate::{
        Error,
        auth::UserID,
        expense::NewExpense,
        limit::{BudgetLimit, NewLimit, Period, create_limit, record_expense},
        money::Amount,
        reward::{
            Evaluation, NewReward, RewardSource, decide_reward, evaluate_concluded_limits,
            evaluate_limit,
        },
        store::{MemoryStore, RecordStore, RewardQuery},
    };

    const AFTER_JANUARY: Date = date!(2024 - 02 - 01);

    fn owner() -> UserID {
        UserID::new(1)
    }

    fn january_limit_with_spend(store: &MemoryStore, spent: Decimal) -> BudgetLimit {
        store
            .insert_limit(
                NewLimit {
                    owner: owner(),
                    cap: Amount::new_unchecked(dec!(1000.00)),
                    period: Period::new_unchecked(date!(2024 - 01 - 01), date!(2024 - 01 - 31)),
                },
                spent,
            )
            .unwrap()
    }

    fn reward_count(store: &MemoryStore) -> usize {
        store
            .query_rewards(&RewardQuery::for_owner(owner()))
            .unwrap()
            .len()
    }

    #[test]
    fn tier_boundaries() {
        assert_eq!(decide_reward(dec!(0)), Some((100, "Excellent Control")));
        assert_eq!(decide_reward(dec!(0.80)), Some((100, "Excellent Control")));
        assert_eq!(decide_reward(dec!(0.8000001)), Some((50, "Limit Met")));
        assert_eq!(decide_reward(dec!(1.00)), Some((50, "Limit Met")));
        assert_eq!(decide_reward(dec!(1.0000001)), None);
    }

    #[test]
    fn exactly_eighty_percent_is_excellent() {
        let store = MemoryStore::new();
        let limit = january_limit_with_spend(&store, dec!(800.00));

        let Evaluation::Granted(reward) =
            evaluate_limit(&store, owner(), limit.id, AFTER_JANUARY).unwrap()
        else {
            panic!("expected a reward to be granted");
        };

        assert_eq!(reward.points, 100);
        assert_eq!(reward.title, "Excellent Control");
        assert_eq!(reward.source, Some(RewardSource::Limit(limit.id)));
        assert_eq!(reward.granted_date, AFTER_JANUARY);
        assert_eq!(
            reward.description,
            "You kept spending under control, using only 80.0% of your $1000.00 limit."
        );
    }

    #[test]
    fn exactly_the_cap_meets_the_limit() {
        let store = MemoryStore::new();
        let limit = january_limit_with_spend(&store, dec!(1000.00));

        let Evaluation::Granted(reward) =
            evaluate_limit(&store, owner(), limit.id, AFTER_JANUARY).unwrap()
        else {
            panic!("expected a reward to be granted");
        };

        assert_eq!(reward.points, 50);
        assert_eq!(reward.title, "Limit Met");
    }

    #[test]
    fn over_budget_grants_nothing() {
        let store = MemoryStore::new();
        let limit = january_limit_with_spend(&store, dec!(1050.00));

        assert_eq!(
            evaluate_limit(&store, owner(), limit.id, AFTER_JANUARY),
            Ok(Evaluation::NotGrantedOverBudget)
        );
        assert_eq!(reward_count(&store), 0);
    }

    #[test]
    fn limit_ending_today_is_pending() {
        let store = MemoryStore::new();
        let limit = january_limit_with_spend(&store, Decimal::ZERO);

        assert_eq!(
            evaluate_limit(&store, owner(), limit.id, date!(2024 - 01 - 31)),
            Ok(Evaluation::Pending)
        );
        assert_eq!(reward_count(&store), 0);
    }

    #[test]
    fn evaluating_twice_grants_once() {
        let store = MemoryStore::new();
        let limit = january_limit_with_spend(&store, dec!(100.00));

        let first = evaluate_limit(&store, owner(), limit.id, AFTER_JANUARY).unwrap();
        let second = evaluate_limit(&store, owner(), limit.id, AFTER_JANUARY).unwrap();

        assert!(matches!(first, Evaluation::Granted(_)));
        assert_eq!(second, Evaluation::AlreadyGranted);
        assert_eq!(reward_count(&store), 1);
    }

    #[test]
    fn rewards_are_unique_per_owner_and_source() {
        let store = MemoryStore::new();
        let limit = january_limit_with_spend(&store, dec!(100.00));
        store
            .insert_reward(NewReward {
                owner: UserID::new(2),
                source: Some(RewardSource::Limit(limit.id)),
                points: 100,
                title: String::new(),
                description: String::new(),
                granted_date: AFTER_JANUARY,
            })
            .unwrap();

        let result = evaluate_limit(&store, owner(), limit.id, AFTER_JANUARY).unwrap();

        assert!(matches!(result, Evaluation::Granted(_)));
        assert_eq!(
            store.insert_reward(NewReward {
                owner: owner(),
                source: Some(RewardSource::Limit(limit.id)),
                points: 100,
                title: String::new(),
                description: String::new(),
                granted_date: AFTER_JANUARY,
            }),
            Err(Error::DuplicateRewardSource)
        );
    }

    #[test]
    fn unknown_or_foreign_limit_is_not_found() {
        let store = MemoryStore::new();
        let limit = january_limit_with_spend(&store, Decimal::ZERO);

        assert_eq!(
            evaluate_limit(&store, owner(), 999, AFTER_JANUARY),
            Err(Error::NotFound)
        );
        assert_eq!(
            evaluate_limit(&store, UserID::new(2), limit.id, AFTER_JANUARY),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn january_scenario() {
        let store = MemoryStore::new();
        let today = date!(2024 - 01 - 20);
        let limit = create_limit(
            &store,
            NewLimit {
                owner: owner(),
                cap: Amount::new_unchecked(dec!(1000.00)),
                period: Period::new_unchecked(date!(2024 - 01 - 01), date!(2024 - 01 - 31)),
            },
        )
        .unwrap();
        assert_eq!(limit.accumulated_spend, Decimal::ZERO);

        for (amount, date) in [
            (dec!(300.00), date!(2024 - 01 - 05)),
            (dec!(500.00), date!(2024 - 01 - 20)),
        ] {
            record_expense(
                &store,
                NewExpense {
                    owner: owner(),
                    category_id: None,
                    amount: Amount::new_unchecked(amount),
                    description: String::new(),
                    date,
                },
                today,
            )
            .unwrap();
        }

        let granted = evaluate_concluded_limits(&store, owner(), AFTER_JANUARY).unwrap();

        assert_eq!(
            store.get_limit(limit.id, owner()).unwrap().accumulated_spend,
            dec!(800.00)
        );
        assert_eq!(granted.len(), 1);
        assert_eq!(granted[0].points, 100);
        assert_eq!(
            evaluate_concluded_limits(&store, owner(), AFTER_JANUARY).unwrap(),
            vec![]
        );
    }

    #[test]
    fn concluded_limits_skip_active_and_over_budget_ones() {
        let store = MemoryStore::new();
        january_limit_with_spend(&store, dec!(2000.00));
        let february = store
            .insert_limit(
                NewLimit {
                    owner: owner(),
                    cap: Amount::new_unchecked(dec!(1000.00)),
                    period: Period::new_unchecked(date!(2024 - 02 - 01), date!(2024 - 02 - 29)),
                },
                Decimal::ZERO,
            )
            .unwrap();

        let granted = evaluate_concluded_limits(&store, owner(), date!(2024 - 02 - 10)).unwrap();

        assert_eq!(granted, vec![]);
        assert_eq!(
            evaluate_limit(&store, owner(), february.id, date!(2024 - 02 - 10)),
            Ok(Evaluation::Pending)
        );
    }
}
