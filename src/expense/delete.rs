//! The endpoint for deleting an expense.

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};

use crate::{
    AppState,
    alert::Alert,
    auth::UserID,
    expense::ExpenseId,
    limit::remove_expense,
    store::SqliteStore,
};

/// The state needed to delete an expense.
#[derive(Debug, Clone)]
pub struct DeleteExpenseState {
    pub store: SqliteStore,
}

impl FromRef<AppState> for DeleteExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            store: SqliteStore::from_ref(state),
        }
    }
}

/// A route handler for deleting an expense, responds with an alert.
///
/// The status code has to be 200 OK or htmx will not remove the table row.
pub async fn delete_expense_endpoint(
    State(state): State<DeleteExpenseState>,
    Extension(user_id): Extension<UserID>,
    Path(expense_id): Path<ExpenseId>,
) -> Response {
    match remove_expense(&state.store, user_id, expense_id) {
        Ok(expense) => {
            tracing::info!("Deleted expense {} dated {}", expense.id, expense.date);

            Alert::Success {
                message: "Expense deleted".to_owned(),
            }
            .into_response()
        }
        Err(error) => {
            tracing::error!("Could not delete expense {expense_id}: {error}");

            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod delete_expense_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
    };
    use rusqlite::Connection;
    use rust_decimal_macros::dec;
    use time::macros::date;

    use crate::{
        Error,
        auth::UserID,
        db::initialize,
        expense::{NewExpense, delete::DeleteExpenseState, delete_expense_endpoint},
        limit::{NewLimit, Period, create_limit, record_expense},
        money::Amount,
        store::{RecordStore, SqliteStore},
    };

    fn get_state() -> DeleteExpenseState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        connection
            .execute_batch(
                "INSERT INTO user (id, name, email, password) VALUES (1, 'Ana', 'ana@example.com', 'x');
                INSERT INTO user (id, name, email, password) VALUES (2, 'Ben', 'ben@example.com', 'x');",
            )
            .unwrap();

        DeleteExpenseState {
            store: SqliteStore::new(Arc::new(Mutex::new(connection))),
        }
    }

    #[tokio::test]
    async fn deletes_expense_and_recomputes_limit() {
        let state = get_state();
        let limit = create_limit(
            &state.store,
            NewLimit {
                owner: UserID::new(1),
                cap: Amount::new_unchecked(dec!(100)),
                period: Period::new_unchecked(date!(2024 - 01 - 01), date!(2024 - 01 - 31)),
            },
        )
        .unwrap();
        let recorded = record_expense(
            &state.store,
            NewExpense {
                owner: UserID::new(1),
                category_id: None,
                amount: Amount::new_unchecked(dec!(42.00)),
                description: String::new(),
                date: date!(2024 - 01 - 10),
            },
            date!(2024 - 01 - 10),
        )
        .unwrap();

        let response = delete_expense_endpoint(
            State(state.clone()),
            Extension(UserID::new(1)),
            Path(recorded.expense.id),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            state.store.get_expense(recorded.expense.id, UserID::new(1)),
            Err(Error::NotFound)
        );
        assert_eq!(
            state
                .store
                .get_limit(limit.id, UserID::new(1))
                .unwrap()
                .accumulated_spend,
            dec!(0)
        );
    }

    #[tokio::test]
    async fn cannot_delete_another_users_expense() {
        let state = get_state();
        let expense = state
            .store
            .insert_expense(NewExpense {
                owner: UserID::new(1),
                category_id: None,
                amount: Amount::new_unchecked(dec!(1)),
                description: String::new(),
                date: date!(2024 - 01 - 10),
            })
            .unwrap();

        let response =
            delete_expense_endpoint(State(state.clone()), Extension(UserID::new(2)), Path(expense.id))
                .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(state.store.get_expense(expense.id, UserID::new(1)).is_ok());
    }
}
