//! Expense aggregation for the dashboard's cards and charts.

use std::collections::HashMap;

use rust_decimal::Decimal;
use time::{Date, Duration, Month};

use crate::{
    expense::{Expense, total_spend},
    limit::month_containing,
};

/// How many months the monthly spending chart covers, including the current one.
pub(super) const MONTHS_IN_CHART: usize = 6;

/// How many days the daily spending chart covers, including today.
pub(super) const DAYS_IN_CHART: i64 = 7;

/// Headline numbers for a user's spending.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct SpendingSummary {
    pub total: Decimal,
    pub count: usize,
    pub average: Decimal,
    /// Spend from the start of the current month up to and including today.
    pub this_month: Decimal,
}

impl SpendingSummary {
    pub fn from_expenses(expenses: &[Expense], today: Date) -> Self {
        let total = total_spend(expenses);
        let count = expenses.len();
        let average = if count == 0 {
            Decimal::ZERO
        } else {
            total / Decimal::from(count)
        };
        let month_start = month_containing(today).start();
        let this_month = total_spend(
            expenses
                .iter()
                .filter(|expense| expense.date >= month_start && expense.date <= today),
        );

        Self {
            total,
            count,
            average,
            this_month,
        }
    }
}

/// The first day of each of the `count` months up to and including the
/// month containing `today`, oldest first.
pub(super) fn recent_months(today: Date, count: usize) -> Vec<Date> {
    let mut months = Vec::with_capacity(count);
    let mut month_start = month_containing(today).start();

    for _ in 0..count {
        months.push(month_start);

        match month_start.previous_day() {
            Some(last_day_of_previous_month) => {
                month_start = month_containing(last_day_of_previous_month).start();
            }
            None => break,
        }
    }

    months.reverse();
    months
}

/// The total spend in each of `months`, where each month is given by its first day.
pub(super) fn monthly_totals(expenses: &[Expense], months: &[Date]) -> Vec<Decimal> {
    let mut totals: HashMap<Date, Decimal> = HashMap::new();

    for expense in expenses {
        let total = totals
            .entry(month_containing(expense.date).start())
            .or_default();
        *total = total.saturating_add(expense.amount.as_decimal());
    }

    months
        .iter()
        .map(|month| totals.get(month).copied().unwrap_or_default())
        .collect()
}

/// The last `days` days ending with `today`, oldest first, with the total spend on each.
pub(super) fn daily_totals(expenses: &[Expense], today: Date, days: i64) -> Vec<(Date, Decimal)> {
    let mut totals: HashMap<Date, Decimal> = HashMap::new();

    for expense in expenses {
        let total = totals.entry(expense.date).or_default();
        *total = total.saturating_add(expense.amount.as_decimal());
    }

    (0..days)
        .rev()
        .map(|days_ago| {
            let date = today - Duration::days(days_ago);
            (date, totals.get(&date).copied().unwrap_or_default())
        })
        .collect()
}

/// Formats month dates as three-letter abbreviations, e.g. "Jan".
pub(super) fn format_month_labels(months: &[Date]) -> Vec<String> {
    let month_to_str = |date: &Date| {
        match date.month() {
            Month::January => "Jan",
            Month::February => "Feb",
            Month::March => "Mar",
            Month::April => "Apr",
            Month::May => "May",
            Month::June => "Jun",
            Month::July => "Jul",
            Month::August => "Aug",
            Month::September => "Sep",
            Month::October => "Oct",
            Month::November => "Nov",
            Month::December => "Dec",
        }
        .to_string()
    };

    months.iter().map(month_to_str).collect()
}

/// Formats dates as a short weekday and day of the month, e.g. "Mon 15".
pub(super) fn format_day_labels(dates: &[Date]) -> Vec<String> {
    dates
        .iter()
        .map(|date| {
            let weekday = date.weekday().to_string();
            format!("{} {}", &weekday[..3], date.day())
        })
        .collect()
}
