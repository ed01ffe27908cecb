//! Templated replies built from aggregates over a user's records.

use std::collections::HashMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use time::Date;

use crate::{
    Error,
    assistant::{Intent, classify},
    auth::UserID,
    category::CategoryId,
    expense::{Expense, category_label, spend_by_category, total_spend},
    html::format_currency,
    limit::{BudgetLimit, LimitStatus, month_containing},
    money::usage_percentage,
    reward::{PointsSummary, Reward, RewardSource},
    store::{ExpenseQuery, LimitQuery, RecordStore, RewardQuery},
};

pub(crate) const HELP_TEXT: &str = "Here is what you can ask me about:\n\
    \n\
    • \"expenses\" for your spending totals and latest expense\n\
    • \"limit\" or \"budget\" for how your current limit is going\n\
    • \"rewards\" or \"points\" for your points balance\n\
    • \"analysis\" or \"summary\" for a breakdown of this month\n\
    • \"advice\" or \"tips\" for ways to save";

pub(crate) const GREETING_TEXT: &str = "Hello! I can answer questions about your expenses, \
    limits and rewards. Type \"help\" to see everything I can do.";

pub(crate) const FALLBACK_TEXT: &str = "Sorry, I did not understand that. Try asking about \
    your expenses, your limit, your rewards, an analysis of this month or some advice. \
    Type \"help\" for examples.";

const NO_EXPENSES_TEXT: &str = "You have not recorded any expenses yet. \
    Add one on the Expenses page and I can tell you more.";

const NO_LIMITS_TEXT: &str = "You have not set any spending limits yet. \
    Create one on the Limits page to start earning points.";

const NO_REWARDS_TEXT: &str = "You have not earned any rewards yet. \
    Stay within a spending limit until it ends to earn points.";

const GENERAL_TIPS: [&str; 7] = [
    "Record every expense on the day you make it.",
    "Base each month's limit on what you spent the month before.",
    "Check your top spending category once a week.",
    "Plan meals ahead to cut down on takeaways.",
    "Wait a day before making a non-essential purchase.",
    "Cancel subscriptions you no longer use.",
    "Put a little aside as soon as you get paid.",
];

/// Usage above this fraction of the active limit's cap triggers a warning in advice replies.
const WARNING_USAGE_RATIO: Decimal = dec!(0.90);

/// Everything the assistant needs to know about one user, read at the time of the message.
#[derive(Debug, Clone)]
pub(crate) struct UserSnapshot {
    pub today: Date,
    /// Newest first.
    pub expenses: Vec<Expense>,
    /// Newest period first.
    pub limits: Vec<BudgetLimit>,
    /// Most recent first.
    pub rewards: Vec<Reward>,
    pub category_names: HashMap<CategoryId, String>,
}

impl UserSnapshot {
    pub fn load(store: &impl RecordStore, owner: UserID, today: Date) -> Result<Self, Error> {
        let expenses = store.query_expenses(&ExpenseQuery {
            newest_first: true,
            ..ExpenseQuery::for_owner(owner)
        })?;
        let limits = store.query_limits(&LimitQuery::for_owner(owner))?;
        let rewards = store.query_rewards(&RewardQuery::for_owner(owner))?;
        let category_names = store
            .get_categories()?
            .into_iter()
            .map(|category| (category.id, category.name.to_string()))
            .collect();

        Ok(Self {
            today,
            expenses,
            limits,
            rewards,
            category_names,
        })
    }

    fn active_limit(&self) -> Option<&BudgetLimit> {
        self.limits
            .iter()
            .find(|limit| limit.is_active_on(self.today))
    }

    fn category_name(&self, category_id: Option<CategoryId>) -> &str {
        category_label(category_id, &self.category_names)
    }
}

/// Answer `message` using `owner`'s records.
///
/// # Errors
///
/// Returns an error if the user's records could not be read.
pub fn respond(
    store: &impl RecordStore,
    owner: UserID,
    message: &str,
    today: Date,
) -> Result<String, Error> {
    let intent = classify(message);

    let reply = match intent {
        Intent::Help => HELP_TEXT.to_owned(),
        Intent::Greeting => GREETING_TEXT.to_owned(),
        Intent::Fallback => FALLBACK_TEXT.to_owned(),
        Intent::Expenses => expenses_reply(&UserSnapshot::load(store, owner, today)?),
        Intent::Limit => limit_reply(&UserSnapshot::load(store, owner, today)?),
        Intent::Rewards => rewards_reply(&UserSnapshot::load(store, owner, today)?),
        Intent::Analysis => analysis_reply(&UserSnapshot::load(store, owner, today)?),
        Intent::Advice => advice_reply(&UserSnapshot::load(store, owner, today)?),
    };

    Ok(reply)
}

fn plural(count: usize, singular: &str) -> String {
    if count == 1 {
        format!("1 {singular}")
    } else {
        format!("{count} {singular}s")
    }
}

fn format_percentage(part: Decimal, whole: Decimal) -> String {
    format!("{:.1}%", usage_percentage(part, whole))
}

pub(crate) fn expenses_reply(snapshot: &UserSnapshot) -> String {
    let Some(latest) = snapshot.expenses.first() else {
        return NO_EXPENSES_TEXT.to_owned();
    };

    let count = snapshot.expenses.len();
    let total = total_spend(&snapshot.expenses);
    let average = total / Decimal::from(count);

    let mut reply = format!(
        "You have recorded {} totalling {}.\nAverage expense: {}",
        plural(count, "expense"),
        format_currency(total),
        format_currency(average),
    );

    if let Some((name, amount)) =
        spend_by_category(&snapshot.expenses, &snapshot.category_names).first()
    {
        reply.push_str(&format!("\nTop category: {name} ({})", format_currency(*amount)));
    }

    let description: &str = if latest.description.is_empty() {
        snapshot.category_name(latest.category_id)
    } else {
        &latest.description
    };
    reply.push_str(&format!(
        "\nMost recent: {} on {} ({description})",
        format_currency(latest.amount.as_decimal()),
        latest.date,
    ));

    reply
}

pub(crate) fn limit_reply(snapshot: &UserSnapshot) -> String {
    let Some(limit) = snapshot.active_limit() else {
        if snapshot.limits.is_empty() {
            return NO_LIMITS_TEXT.to_owned();
        }

        return format!(
            "You have {}, but none of them covers today. \
            Create a new limit on the Limits page to keep tracking your spending.",
            plural(snapshot.limits.len(), "limit"),
        );
    };

    let cap = limit.cap.as_decimal();
    let status = limit.status();
    let advice = match status {
        LimitStatus::Good => "You are well within your limit. Keep it up!",
        LimitStatus::Careful => {
            "You are getting close to your limit. Hold off on anything non-essential."
        }
        LimitStatus::Over => {
            "You have gone over your limit. Try to cut back for the rest of the period."
        }
    };

    format!(
        "Your current limit runs from {} to {}.\n\
        Cap: {}\n\
        Spent: {} ({} of the cap)\n\
        Remaining: {}\n\
        Status: {status}\n\
        \n\
        {advice}",
        limit.period.start(),
        limit.period.end(),
        format_currency(cap),
        format_currency(limit.accumulated_spend),
        format_percentage(limit.accumulated_spend, cap),
        format_currency(limit.remaining()),
    )
}

pub(crate) fn rewards_reply(snapshot: &UserSnapshot) -> String {
    let earned: Vec<&Reward> = snapshot
        .rewards
        .iter()
        .filter(|reward| !matches!(reward.source, Some(RewardSource::Unlock(_))))
        .collect();

    let Some(latest) = earned.first() else {
        return NO_REWARDS_TEXT.to_owned();
    };

    let points = PointsSummary::from_rewards(&snapshot.rewards);

    format!(
        "You have {} points available.\n\
        You have earned {} so far.\n\
        Most recent: {} (+{} points) on {}",
        points.available(),
        plural(earned.len(), "reward"),
        latest.title,
        latest.points,
        latest.granted_date,
    )
}

pub(crate) fn analysis_reply(snapshot: &UserSnapshot) -> String {
    if snapshot.expenses.is_empty() {
        return NO_EXPENSES_TEXT.to_owned();
    }

    let month_start = month_containing(snapshot.today).start();
    let this_month: Vec<&Expense> = snapshot
        .expenses
        .iter()
        .filter(|expense| expense.date >= month_start && expense.date <= snapshot.today)
        .collect();
    let month_total = total_spend(this_month.iter().copied());

    let mut reply = format!(
        "Spending analysis for {} {}\n\
        This month: {} across {}\n\
        All time: {}",
        snapshot.today.month(),
        snapshot.today.year(),
        format_currency(month_total),
        plural(this_month.len(), "expense"),
        format_currency(total_spend(&snapshot.expenses)),
    );

    if this_month.is_empty() {
        reply.push_str("\n\nYou have not recorded any expenses this month yet.");
        return reply;
    }

    reply.push_str("\n\nTop categories this month:");
    for (rank, (name, amount)) in spend_by_category(this_month, &snapshot.category_names)
        .into_iter()
        .take(3)
        .enumerate()
    {
        reply.push_str(&format!(
            "\n{}. {name}: {} ({})",
            rank + 1,
            format_currency(amount),
            format_percentage(amount, month_total),
        ));
    }

    reply
}

pub(crate) fn advice_reply(snapshot: &UserSnapshot) -> String {
    let mut reply = String::new();

    if let Some(limit) = snapshot.active_limit() {
        let cap = limit.cap.as_decimal();

        if limit.is_exceeded() {
            reply.push_str(&format!(
                "Warning: you have spent {} of your limit and are over budget. \
                Pause any spending that can wait until {}.\n\n",
                format_percentage(limit.accumulated_spend, cap),
                limit.period.end(),
            ));
        } else if limit.usage_ratio() > WARNING_USAGE_RATIO {
            reply.push_str(&format!(
                "Warning: you have used {} of your limit with only {} left until {}.\n\n",
                format_percentage(limit.accumulated_spend, cap),
                format_currency(limit.remaining()),
                limit.period.end(),
            ));
        }
    }

    reply.push_str("Some tips for spending less:");
    for tip in GENERAL_TIPS {
        reply.push_str("\n• ");
        reply.push_str(tip);
    }

    reply
}
