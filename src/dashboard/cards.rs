//! Cards for the dashboard's headline numbers, active limits and category breakdown.

use maud::{Markup, html};
use rust_decimal::{Decimal, prelude::ToPrimitive};

use crate::{
    dashboard::aggregation::SpendingSummary,
    endpoints,
    html::{
        CARD_STYLE, LINK_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        format_currency, progress_bar,
    },
    limit::BudgetLimit,
    money::usage_percentage,
};

fn stat_card(label: &str, value: &str, id: &str) -> Markup {
    html!(
        div class=(CARD_STYLE)
        {
            p class="text-sm text-gray-500 dark:text-gray-400" { (label) }
            p id=(id) class="text-2xl font-bold" { (value) }
        }
    )
}

/// The row of headline numbers at the top of the dashboard.
pub(super) fn summary_cards_view(summary: &SpendingSummary, points_available: i64) -> Markup {
    html!(
        section class="w-full grid grid-cols-2 lg:grid-cols-4 gap-4 mb-8"
        {
            (stat_card("Total spent", &format_currency(summary.total), "total-spent"))
            (stat_card("This month", &format_currency(summary.this_month), "month-spent"))
            (stat_card(
                &format!("Average of {} expenses", summary.count),
                &format_currency(summary.average),
                "average-expense",
            ))
            (stat_card("Points", &points_available.to_string(), "points-available"))
        }
    )
}

/// Progress of the limits whose period contains today.
pub(super) fn active_limits_view(limits: &[BudgetLimit]) -> Markup {
    html!(
        section id="active-limits" class="w-full mb-8"
        {
            h3 class="text-xl font-semibold mb-4" { "Active limits" }

            @if limits.is_empty() {
                p class="text-gray-600 dark:text-gray-400"
                {
                    "No limit covers today. "
                    a href=(endpoints::NEW_LIMIT_VIEW) class=(LINK_STYLE) { "Set a limit" }
                    " to start earning points."
                }
            } @else {
                div class="grid grid-cols-1 md:grid-cols-2 gap-4"
                {
                    @for limit in limits {
                        (active_limit_card(limit))
                    }
                }
            }
        }
    )
}

fn active_limit_card(limit: &BudgetLimit) -> Markup {
    let cap = limit.cap.as_decimal();
    let percentage = usage_percentage(limit.accumulated_spend, cap)
        .to_f64()
        .unwrap_or_default();

    html!(
        div class=(CARD_STYLE) data-limit-id=(limit.id)
        {
            div class="flex justify-between items-baseline mb-2"
            {
                span class="font-semibold"
                {
                    (limit.period.start()) " to " (limit.period.end())
                }
                span class="text-sm" { (limit.status()) }
            }

            p class="mb-2"
            {
                (format_currency(limit.accumulated_spend)) " of " (format_currency(cap))
            }

            (progress_bar(percentage))
        }
    )
}

/// Spend per category with each category's share of the total.
pub(super) fn category_breakdown_view(category_totals: &[(&str, Decimal)], total: Decimal) -> Markup {
    html!(
        section class="w-full mb-8"
        {
            h3 class="text-xl font-semibold mb-4" { "Spending by category" }

            table
                id="category-breakdown"
                class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                        th scope="col" class="px-6 py-4 text-right" { "Spent" }
                        th scope="col" class="px-6 py-4 text-right" { "Share" }
                    }
                }

                tbody
                {
                    @for (name, amount) in category_totals {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td class=(TABLE_CELL_STYLE) { (name) }
                            td class="px-6 py-4 text-right" { (format_currency(*amount)) }
                            td class="px-6 py-4 text-right"
                            {
                                (format!("{:.1}%", usage_percentage(*amount, total)))
                            }
                        }
                    }
                }
            }
        }
    )
}
