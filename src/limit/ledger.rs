//! Keeps each limit's cached spend equal to the sum of the expenses in its period.
//!
//! Every change to an expense triggers a full resum of each limit whose period
//! contains the expense's date. Limits for the same user may overlap and are
//! updated independently.

use rust_decimal::Decimal;
use time::{Date, Month};

use crate::{
    Error,
    auth::UserID,
    expense::{Expense, ExpenseId, NewExpense},
    limit::{BudgetLimit, LimitId, NewLimit, Period},
    money::checked_sum,
    store::{ExpenseQuery, LimitQuery, RecordStore},
};

/// The outcome of recomputing every limit that covers a date.
#[derive(Debug, Default, PartialEq)]
pub struct LedgerUpdate {
    /// The limits that were rewritten, with their new spend.
    pub updated: Vec<BudgetLimit>,
    /// The limits that could not be rewritten.
    pub failures: Vec<(LimitId, Error)>,
}

impl LedgerUpdate {
    /// Whether any rewritten limit is active on `today` and has gone over its cap.
    pub fn limit_exceeded(&self, today: Date) -> bool {
        self.updated
            .iter()
            .any(|limit| limit.is_active_on(today) && limit.is_exceeded())
    }
}

/// An expense that was stored, plus what happened to the limits it touches.
#[derive(Debug, PartialEq)]
pub struct RecordedExpense {
    pub expense: Expense,
    /// `None` if the limits could not be queried after the insert.
    pub ledger: Option<LedgerUpdate>,
    /// Whether the expense pushed a limit that is active today over its cap.
    pub limit_exceeded: bool,
}

/// Sum `owner`'s expenses dated inside `period`.
///
/// # Errors
///
/// Returns an [Error::SpendOverflow] if the total is too large to represent.
pub fn sum_expenses_in_period(
    store: &impl RecordStore,
    owner: UserID,
    period: Period,
) -> Result<Decimal, Error> {
    let expenses = store.query_expenses(&ExpenseQuery {
        date_range: Some(period.start()..=period.end()),
        ..ExpenseQuery::for_owner(owner)
    })?;

    checked_sum(expenses.iter().map(|expense| expense.amount.as_decimal()))
}

/// Resum one limit's spend from scratch and write it back.
///
/// Returns the limit with its new spend.
pub fn recompute_limit(store: &impl RecordStore, limit: BudgetLimit) -> Result<BudgetLimit, Error> {
    let accumulated_spend = sum_expenses_in_period(store, limit.owner, limit.period)?;
    store.update_accumulated_spend(limit.id, accumulated_spend)?;

    Ok(BudgetLimit {
        accumulated_spend,
        ..limit
    })
}

/// Recompute every one of `owner`'s limits whose period contains `date`.
///
/// A limit that fails to update is logged and collected in
/// [LedgerUpdate::failures]. The remaining limits are still updated.
///
/// # Errors
///
/// Returns an error only if the limits themselves could not be queried.
pub fn recompute_limits_for_date(
    store: &impl RecordStore,
    owner: UserID,
    date: Date,
) -> Result<LedgerUpdate, Error> {
    let limits = store.query_limits(&LimitQuery {
        containing_date: Some(date),
        ..LimitQuery::for_owner(owner)
    })?;

    let mut update = LedgerUpdate::default();

    for limit in limits {
        let limit_id = limit.id;

        match recompute_limit(store, limit) {
            Ok(limit) => update.updated.push(limit),
            Err(error) => {
                tracing::warn!("could not update spend for limit {limit_id}: {error}");
                update.failures.push((limit_id, error));
            }
        }
    }

    Ok(update)
}

/// Store a new expense and bring the limits covering its date up to date.
///
/// The expense is kept even if the limits cannot be recomputed afterwards.
/// That failure is logged and `limit_exceeded` is reported as `false`.
///
/// # Errors
///
/// Returns an error if the expense could not be stored.
pub fn record_expense(
    store: &impl RecordStore,
    new_expense: NewExpense,
    today: Date,
) -> Result<RecordedExpense, Error> {
    let expense = store.insert_expense(new_expense)?;

    let ledger = match recompute_limits_for_date(store, expense.owner, expense.date) {
        Ok(ledger) => Some(ledger),
        Err(error) => {
            tracing::warn!(
                "expense {} was saved but limits for {} could not be recomputed: {error}",
                expense.id,
                expense.date
            );
            None
        }
    };

    let limit_exceeded = ledger
        .as_ref()
        .is_some_and(|ledger| ledger.limit_exceeded(today));

    Ok(RecordedExpense {
        expense,
        ledger,
        limit_exceeded,
    })
}

/// Delete one of `owner`'s expenses and recompute the limits covering its date.
///
/// Returns the deleted expense.
///
/// # Errors
///
/// Returns [Error::DeleteMissingExpense] if `owner` has no expense with `expense_id`.
pub fn remove_expense(
    store: &impl RecordStore,
    owner: UserID,
    expense_id: ExpenseId,
) -> Result<Expense, Error> {
    let expense = store.get_expense(expense_id, owner).map_err(|error| match error {
        Error::NotFound => Error::DeleteMissingExpense,
        error => error,
    })?;
    store.delete_expense(expense_id, owner)?;

    if let Err(error) = recompute_limits_for_date(store, owner, expense.date) {
        tracing::warn!(
            "expense {expense_id} was deleted but limits for {} could not be recomputed: {error}",
            expense.date
        );
    }

    Ok(expense)
}

/// Store a new limit with its spend initialised from the expenses already in its period.
pub fn create_limit(store: &impl RecordStore, new_limit: NewLimit) -> Result<BudgetLimit, Error> {
    let accumulated_spend = sum_expenses_in_period(store, new_limit.owner, new_limit.period)?;

    store.insert_limit(new_limit, accumulated_spend)
}

/// The first and last day of the calendar month containing `date`.
pub fn month_containing(date: Date) -> Period {
    let start = date.replace_day(1).unwrap_or(date);
    let next_month_year = match date.month() {
        Month::December => date.year() + 1,
        _ => date.year(),
    };
    let end = Date::from_calendar_date(next_month_year, date.month().next(), 1)
        .ok()
        .and_then(|first_of_next_month| first_of_next_month.previous_day())
        .unwrap_or(date);

    Period::new_unchecked(start, end)
}

/// What `owner` spent during the calendar month before `today`'s month.
///
/// Returns `None` if nothing was spent, so a form can leave the cap blank.
pub fn suggest_cap_from_previous_month(
    store: &impl RecordStore,
    owner: UserID,
    today: Date,
) -> Result<Option<Decimal>, Error> {
    let this_month = month_containing(today);
    let Some(last_day_of_previous_month) = this_month.start().previous_day() else {
        return Ok(None);
    };

    let total = sum_expenses_in_period(
        store,
        owner,
        month_containing(last_day_of_previous_month),
    )?;

    if total.is_zero() {
        Ok(None)
    } else {
        Ok(Some(total))
    }
}

/// The default period for a new limit: the whole of `today`'s month.
pub fn default_limit_period(today: Date) -> Period {
    month_containing(today)
}
