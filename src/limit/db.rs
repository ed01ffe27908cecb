//! Database operations for spending limits.

use rusqlite::{Connection, Row, params_from_iter, types::Value};
use rust_decimal::Decimal;

use crate::{
    Error,
    auth::UserID,
    limit::{BudgetLimit, LimitId, NewLimit, Period},
    money::{Amount, get_decimal},
    store::LimitQuery,
};

/// Create a spending limit with an initial `accumulated_spend` and return it
/// with its generated ID.
pub fn insert_limit(
    limit: NewLimit,
    accumulated_spend: Decimal,
    connection: &Connection,
) -> Result<BudgetLimit, Error> {
    connection.execute(
        "INSERT INTO budget_limit (user_id, cap, period_start, period_end, accumulated_spend)
        VALUES (?1, ?2, ?3, ?4, ?5);",
        (
            limit.owner.as_i64(),
            limit.cap.as_decimal().to_string(),
            limit.period.start(),
            limit.period.end(),
            accumulated_spend.to_string(),
        ),
    )?;

    let id = connection.last_insert_rowid();

    Ok(limit.into_limit(id, accumulated_spend))
}

/// Retrieve one of `owner`'s limits by ID.
pub fn get_limit(
    limit_id: LimitId,
    owner: UserID,
    connection: &Connection,
) -> Result<BudgetLimit, Error> {
    connection
        .prepare(
            "SELECT id, user_id, cap, period_start, period_end, accumulated_spend
            FROM budget_limit WHERE id = :id AND user_id = :user_id;",
        )?
        .query_row(
            &[(":id", &limit_id), (":user_id", &owner.as_i64())],
            map_row,
        )
        .map_err(|error| error.into())
}

/// Overwrite the cached spend of a limit.
///
/// # Errors
///
/// Returns an [Error::UpdateMissingLimit] if there is no limit with `limit_id`.
pub fn update_accumulated_spend(
    limit_id: LimitId,
    accumulated_spend: Decimal,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE budget_limit SET accumulated_spend = ?1 WHERE id = ?2",
        (accumulated_spend.to_string(), limit_id),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingLimit);
    }

    Ok(())
}

/// Query a user's limits, newest period first.
pub fn query_limits(query: &LimitQuery, connection: &Connection) -> Result<Vec<BudgetLimit>, Error> {
    let mut where_clause_parts = vec!["user_id = ?1".to_string()];
    let mut query_parameters = vec![Value::Integer(query.owner.as_i64())];

    if let Some(date) = query.containing_date {
        let index = query_parameters.len() + 1;
        where_clause_parts.push(format!("period_start <= ?{index} AND ?{index} <= period_end"));
        query_parameters.push(Value::Text(date.to_string()));
    }

    if let Some(date) = query.ended_before {
        where_clause_parts.push(format!("period_end < ?{}", query_parameters.len() + 1));
        query_parameters.push(Value::Text(date.to_string()));
    }

    let query_string = format!(
        "SELECT id, user_id, cap, period_start, period_end, accumulated_spend
        FROM budget_limit WHERE {}
        ORDER BY period_start DESC, id DESC",
        where_clause_parts.join(" AND ")
    );

    connection
        .prepare(&query_string)?
        .query_map(params_from_iter(query_parameters.iter()), map_row)?
        .map(|maybe_limit| maybe_limit.map_err(Error::from))
        .collect()
}

/// Initialize the budget limit table and indexes.
pub fn create_limit_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS budget_limit (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            cap TEXT NOT NULL,
            period_start TEXT NOT NULL,
            period_end TEXT NOT NULL,
            accumulated_spend TEXT NOT NULL DEFAULT '0',
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
            CHECK (period_start <= period_end)
        );

        CREATE INDEX IF NOT EXISTS idx_budget_limit_user_period
            ON budget_limit(user_id, period_start, period_end);",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<BudgetLimit, rusqlite::Error> {
    Ok(BudgetLimit {
        id: row.get(0)?,
        owner: UserID::new(row.get(1)?),
        cap: Amount::new_unchecked(get_decimal(row, 2)?),
        period: Period::new_unchecked(row.get(3)?, row.get(4)?),
        accumulated_spend: get_decimal(row, 5)?,
    })
}
