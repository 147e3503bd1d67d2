//! Daily, monthly and running total views over an owner's records.

mod handlers;
mod views;

pub use handlers::{
    DailySummaryParams, MonthlySummaryParams, RunningTotalsParams, SummaryState,
    daily_summary_endpoint, monthly_summary_endpoint, running_totals_endpoint,
};
pub use views::{
    CategorySummary, DailySummary, MonthlySummary, RunningTotals, daily_summary, monthly_summary,
    running_totals,
};
