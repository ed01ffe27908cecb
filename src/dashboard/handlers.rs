//! Dashboard HTTP handler and view rendering.

use std::collections::HashMap;

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use time::Date;

use crate::{
    AppState, Error,
    auth::UserID,
    category::CategoryId,
    dashboard::{
        aggregation::{
            DAYS_IN_CHART, MONTHS_IN_CHART, SpendingSummary, daily_totals, format_day_labels,
            format_month_labels, monthly_totals, recent_months,
        },
        cards::{active_limits_view, category_breakdown_view, summary_cards_view},
        charts::{
            DashboardChart, ECHARTS_SCRIPT_URL, category_chart, charts_script, charts_view,
            daily_spending_chart, monthly_spending_chart,
        },
    },
    endpoints,
    expense::{Expense, spend_by_category},
    html::{HeadElement, base, link},
    limit::BudgetLimit,
    navigation::NavBar,
    reward::PointsSummary,
    store::{ExpenseQuery, LimitQuery, RecordStore, RewardQuery, SqliteStore},
    timezone::local_today,
};

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    pub store: SqliteStore,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            store: SqliteStore::from_ref(state),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Everything the dashboard reads from the store.
struct DashboardData {
    expenses: Vec<Expense>,
    active_limits: Vec<BudgetLimit>,
    points_available: i64,
    category_names: HashMap<CategoryId, String>,
}

/// Display a page with an overview of the user's spending.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)?;
    let data = load_dashboard_data(&state.store, user_id, today)?;

    if data.expenses.is_empty() {
        return Ok(dashboard_no_data_view(&data.active_limits, data.points_available).into_response());
    }

    Ok(dashboard_view(&data, today).into_response())
}

fn load_dashboard_data(
    store: &impl RecordStore,
    user_id: UserID,
    today: Date,
) -> Result<DashboardData, Error> {
    let expenses = store
        .query_expenses(&ExpenseQuery {
            newest_first: true,
            ..ExpenseQuery::for_owner(user_id)
        })
        .inspect_err(|error| tracing::error!("Could not get expenses: {error}"))?;

    let active_limits = store
        .query_limits(&LimitQuery {
            containing_date: Some(today),
            ..LimitQuery::for_owner(user_id)
        })
        .inspect_err(|error| tracing::error!("Could not get active limits: {error}"))?;

    let rewards = store
        .query_rewards(&RewardQuery::for_owner(user_id))
        .inspect_err(|error| tracing::error!("Could not get rewards: {error}"))?;

    let category_names = store
        .get_categories()
        .inspect_err(|error| tracing::error!("Could not get categories: {error}"))?
        .into_iter()
        .map(|category| (category.id, category.name.to_string()))
        .collect();

    Ok(DashboardData {
        expenses,
        active_limits,
        points_available: PointsSummary::from_rewards(&rewards).available(),
        category_names,
    })
}

fn build_dashboard_charts(data: &DashboardData, today: Date) -> [DashboardChart; 3] {
    let months = recent_months(today, MONTHS_IN_CHART);
    let (days, day_totals): (Vec<_>, Vec<_>) =
        daily_totals(&data.expenses, today, DAYS_IN_CHART)
            .into_iter()
            .unzip();
    let category_totals = spend_by_category(&data.expenses, &data.category_names);

    [
        DashboardChart {
            id: "monthly-spending-chart",
            options: monthly_spending_chart(
                format_month_labels(&months),
                &monthly_totals(&data.expenses, &months),
            )
            .to_string(),
        },
        DashboardChart {
            id: "daily-spending-chart",
            options: daily_spending_chart(format_day_labels(&days), &day_totals).to_string(),
        },
        DashboardChart {
            id: "category-chart",
            options: category_chart(&category_totals).to_string(),
        },
    ]
}

/// Renders the dashboard page when the user has no expenses.
fn dashboard_no_data_view(active_limits: &[BudgetLimit], points_available: i64) -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();
    let new_expense_link = link(endpoints::NEW_EXPENSE_VIEW, "add your first expense");

    let content = html!(
        (nav_bar)

        div class="flex flex-col items-center px-6 py-8 mx-auto max-w-screen-xl text-gray-900 dark:text-white"
        {
            h2 class="text-xl font-bold"
            {
                "Nothing here yet..."
            }

            p class="mb-8"
            {
                "Charts will show up here once you " (new_expense_link) "."
            }

            p class="mb-8" { "Points: " span id="points-available" { (points_available) } }

            (active_limits_view(active_limits))
        }
    );

    base("Dashboard", &[], &content)
}

/// Renders the main dashboard page with cards, charts and the category breakdown.
fn dashboard_view(data: &DashboardData, today: Date) -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();
    let summary = SpendingSummary::from_expenses(&data.expenses, today);
    let category_totals = spend_by_category(&data.expenses, &data.category_names);
    let charts = build_dashboard_charts(data, today);

    let content = html!(
        (nav_bar)

        div
            id="dashboard-content"
            class="flex flex-col items-center px-2 lg:px-6 lg:py-8 mx-auto
                max-w-screen-xl text-gray-900 dark:text-white"
        {
            (summary_cards_view(&summary, data.points_available))
            (active_limits_view(&data.active_limits))
            (charts_view(&charts))
            (category_breakdown_view(&category_totals, summary.total))
        }
    );

    let scripts = [
        HeadElement::ScriptLink(ECHARTS_SCRIPT_URL.to_owned()),
        charts_script(&charts),
    ];

    base("Dashboard", &scripts, &content)
}
