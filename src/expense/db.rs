//! Database operations for expenses.

use rusqlite::{Connection, Row, params_from_iter, types::Value};

use crate::{
    Error,
    auth::UserID,
    expense::{Expense, ExpenseId, NewExpense},
    money::{Amount, get_decimal},
    store::ExpenseQuery,
};

/// Create an expense and return it with its generated ID.
///
/// # Errors
///
/// Returns an [Error::InvalidCategory] if the category ID does not refer to a category.
pub fn insert_expense(expense: NewExpense, connection: &Connection) -> Result<Expense, Error> {
    connection.execute(
        "INSERT INTO expense (user_id, category_id, amount, description, date)
        VALUES (?1, ?2, ?3, ?4, ?5);",
        (
            expense.owner.as_i64(),
            expense.category_id,
            expense.amount.as_decimal().to_string(),
            &expense.description,
            expense.date,
        ),
    )?;

    let id = connection.last_insert_rowid();

    Ok(expense.into_expense(id))
}

/// Retrieve one of `owner`'s expenses by ID.
pub fn get_expense(
    expense_id: ExpenseId,
    owner: UserID,
    connection: &Connection,
) -> Result<Expense, Error> {
    connection
        .prepare(
            "SELECT id, user_id, category_id, amount, description, date
            FROM expense WHERE id = :id AND user_id = :user_id;",
        )?
        .query_row(
            &[(":id", &expense_id), (":user_id", &owner.as_i64())],
            map_row,
        )
        .map_err(|error| error.into())
}

/// Delete one of `owner`'s expenses. Returns an error if the expense doesn't exist.
pub fn delete_expense(
    expense_id: ExpenseId,
    owner: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM expense WHERE id = ?1 AND user_id = ?2",
        (expense_id, owner.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingExpense);
    }

    Ok(())
}

/// Query for expenses in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] there is a SQL error.
pub fn query_expenses(query: &ExpenseQuery, connection: &Connection) -> Result<Vec<Expense>, Error> {
    let mut query_string_parts = vec![
        "SELECT id, user_id, category_id, amount, description, date FROM expense".to_string(),
    ];
    let mut where_clause_parts = vec!["user_id = ?1".to_string()];
    let mut query_parameters = vec![Value::Integer(query.owner.as_i64())];

    if let Some(date_range) = &query.date_range {
        where_clause_parts.push(format!(
            "date BETWEEN ?{} AND ?{}",
            query_parameters.len() + 1,
            query_parameters.len() + 2,
        ));
        query_parameters.push(Value::Text(date_range.start().to_string()));
        query_parameters.push(Value::Text(date_range.end().to_string()));
    }

    query_string_parts.push(String::from("WHERE ") + &where_clause_parts.join(" AND "));

    if query.newest_first {
        query_string_parts.push("ORDER BY date DESC, id DESC".to_string())
    } else {
        query_string_parts.push("ORDER BY id ASC".to_string())
    }

    if let Some(limit) = query.limit {
        query_string_parts.push(format!("LIMIT {limit}"));
    }

    let query_string = query_string_parts.join(" ");

    connection
        .prepare(&query_string)?
        .query_map(params_from_iter(query_parameters.iter()), map_row)?
        .map(|maybe_expense| maybe_expense.map_err(Error::from))
        .collect()
}

/// Initialize the expense table and indexes.
pub fn create_expense_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS expense (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            category_id INTEGER,
            amount TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            date TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
            FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE SET NULL
        );

        CREATE INDEX IF NOT EXISTS idx_expense_user_date ON expense(user_id, date);",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Expense, rusqlite::Error> {
    Ok(Expense {
        id: row.get(0)?,
        owner: UserID::new(row.get(1)?),
        category_id: row.get(2)?,
        amount: Amount::new_unchecked(get_decimal(row, 3)?),
        description: row.get(4)?,
        date: row.get(5)?,
    })
}
