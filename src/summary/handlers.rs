//! JSON endpoints for the summary views.
//!
//! The reference date defaults to today in the server's local timezone when the
//! query string leaves it out.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Query, State, rejection::QueryRejection},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    AppState, Error,
    aggregation::{CurrencyFormat, RecordFilter, YearMonth},
    auth::Principal,
    record::{OccurredOn, Record, get_records_by_owner, non_empty},
    summary::{
        DailySummary, MonthlySummary, RunningTotals, daily_summary, monthly_summary,
        running_totals,
    },
    timezone::local_today,
};

/// The state needed to build summaries.
#[derive(Debug, Clone)]
pub struct SummaryState {
    /// The database connection for reading records.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The canonical name of the timezone used to work out today's date.
    pub local_timezone: String,
    /// How money amounts are displayed.
    pub currency: CurrencyFormat,
}

impl FromRef<AppState> for SummaryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
            currency: state.currency.clone(),
        }
    }
}

/// Query parameters for the daily summary.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct DailySummaryParams {
    /// The day to summarise as `YYYY-MM-DD`. Defaults to today.
    pub date: Option<String>,
    /// Only include records with exactly this category.
    pub category: Option<String>,
    /// Only include records with exactly this payment method.
    pub payment_method: Option<String>,
}

/// Query parameters for the monthly summary.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct MonthlySummaryParams {
    /// The month to summarise as `YYYY-MM`. Defaults to the current month.
    pub month: Option<String>,
}

/// Query parameters for the running totals.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct RunningTotalsParams {
    /// The date to treat as today, as `YYYY-MM-DD`. Defaults to today.
    pub today: Option<String>,
}

/// A route handler for the records and total of a single day.
pub async fn daily_summary_endpoint(
    State(state): State<SummaryState>,
    principal: Principal,
    params: Result<Query<DailySummaryParams>, QueryRejection>,
) -> Result<Json<DailySummary>, Error> {
    let Query(params) = params?;
    let date = resolve_date(non_empty(params.date), &state.local_timezone)?;
    let filter = RecordFilter {
        category: non_empty(params.category),
        payment_method: non_empty(params.payment_method),
    };

    let records = load_records(&state, &principal)?;

    Ok(Json(daily_summary(&records, date, filter, &state.currency)))
}

/// A route handler for a month's total broken down by category.
pub async fn monthly_summary_endpoint(
    State(state): State<SummaryState>,
    principal: Principal,
    params: Result<Query<MonthlySummaryParams>, QueryRejection>,
) -> Result<Json<MonthlySummary>, Error> {
    let Query(params) = params?;
    let month = match non_empty(params.month) {
        Some(text) => text.parse()?,
        None => YearMonth::of(local_today(&state.local_timezone)?),
    };

    let records = load_records(&state, &principal)?;

    Ok(Json(monthly_summary(&records, month, &state.currency)))
}

/// A route handler for today's total and the month-to-date total.
pub async fn running_totals_endpoint(
    State(state): State<SummaryState>,
    principal: Principal,
    params: Result<Query<RunningTotalsParams>, QueryRejection>,
) -> Result<Json<RunningTotals>, Error> {
    let Query(params) = params?;
    let today = resolve_date(non_empty(params.today), &state.local_timezone)?;

    let records = load_records(&state, &principal)?;

    Ok(Json(running_totals(&records, today, &state.currency)))
}

/// Parse `text` as a calendar date, or use today's date if there is no text.
fn resolve_date(text: Option<String>, local_timezone: &str) -> Result<Date, Error> {
    match text {
        Some(text) => OccurredOn::new(&text)
            .calendar_date()
            .ok_or(Error::InvalidDate(text)),
        None => local_today(local_timezone),
    }
}

fn load_records(state: &SummaryState, principal: &Principal) -> Result<Vec<Record>, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("Could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    get_records_by_owner(&principal.owner_id(), &connection)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::{Query, State};
    use rust_decimal_macros::dec;
    use time::{Month, macros::date};

    use crate::{
        Error,
        aggregation::{CurrencyFormat, YearMonth},
        auth::Principal,
        endpoints,
        record::{NewRecord, OwnerId, create_record},
        summary::{
            DailySummary, DailySummaryParams, MonthlySummary, MonthlySummaryParams,
            RunningTotals, RunningTotalsParams, SummaryState, daily_summary_endpoint,
            monthly_summary_endpoint, running_totals_endpoint,
        },
        test_utils::{
            assert_error_message, get_test_app_state, get_test_connection, get_test_server,
            sign_in,
        },
        timezone::local_today,
    };

    fn get_summary_state() -> SummaryState {
        let connection = get_test_connection();
        let anonymous = OwnerId::anonymous();

        for new_record in [
            NewRecord::new("2024-03-01", "Rent", dec!(15000)).category("Housing"),
            NewRecord::new("2024-03-15", "Vegetables", dec!(250))
                .category("Food")
                .payment_method("Cash"),
            NewRecord::new("2024-03-15T19:45:00Z", "Dinner", dec!(1200.5))
                .category("Food")
                .payment_method("Card"),
            NewRecord::new("2024-04-01", "Bus pass", dec!(500)).category("Transport"),
        ] {
            create_record(&anonymous, new_record, &connection).unwrap();
        }

        SummaryState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
            currency: CurrencyFormat::default(),
        }
    }

    #[tokio::test]
    async fn daily_summary_for_date() {
        let summary = daily_summary_endpoint(
            State(get_summary_state()),
            Principal::Anonymous,
            Ok(Query(DailySummaryParams {
                date: Some("2024-03-15".to_owned()),
                ..Default::default()
            })),
        )
        .await
        .expect("could not get daily summary")
        .0;

        assert_eq!(summary.date, date!(2024 - 03 - 15));
        assert_eq!(summary.count, 2);
        assert_eq!(summary.total, dec!(1450.5));
        assert_eq!(summary.total_display, "₹1,450.50");
    }

    #[tokio::test]
    async fn daily_summary_filters_by_payment_method() {
        let summary = daily_summary_endpoint(
            State(get_summary_state()),
            Principal::Anonymous,
            Ok(Query(DailySummaryParams {
                date: Some("2024-03-15".to_owned()),
                category: Some(String::new()),
                payment_method: Some("Cash".to_owned()),
            })),
        )
        .await
        .expect("could not get daily summary")
        .0;

        assert_eq!(summary.count, 1);
        assert_eq!(summary.records[0].description, "Vegetables");
        assert_eq!(summary.category, None);
    }

    #[tokio::test]
    async fn daily_summary_defaults_to_today() {
        let summary = daily_summary_endpoint(
            State(get_summary_state()),
            Principal::Anonymous,
            Ok(Query(DailySummaryParams::default())),
        )
        .await
        .expect("could not get daily summary")
        .0;

        assert_eq!(summary.date, local_today("Etc/UTC").unwrap());
    }

    #[tokio::test]
    async fn daily_summary_rejects_bad_date() {
        let result = daily_summary_endpoint(
            State(get_summary_state()),
            Principal::Anonymous,
            Ok(Query(DailySummaryParams {
                date: Some("15/03/2024".to_owned()),
                ..Default::default()
            })),
        )
        .await;

        assert_eq!(
            result.unwrap_err(),
            Error::InvalidDate("15/03/2024".to_owned())
        );
    }

    #[tokio::test]
    async fn monthly_summary_for_month() {
        let summary = monthly_summary_endpoint(
            State(get_summary_state()),
            Principal::Anonymous,
            Ok(Query(MonthlySummaryParams {
                month: Some("2024-03".to_owned()),
            })),
        )
        .await
        .expect("could not get monthly summary")
        .0;

        assert_eq!(summary.month, YearMonth::new(2024, Month::March));
        assert_eq!(summary.count, 3);
        assert_eq!(summary.total, dec!(16450.5));
        let categories: Vec<_> = summary
            .categories
            .iter()
            .map(|category| category.category.as_str())
            .collect();
        assert_eq!(categories, vec!["Housing", "Food"]);
    }

    #[tokio::test]
    async fn monthly_summary_rejects_bad_month() {
        let result = monthly_summary_endpoint(
            State(get_summary_state()),
            Principal::Anonymous,
            Ok(Query(MonthlySummaryParams {
                month: Some("March".to_owned()),
            })),
        )
        .await;

        assert_eq!(result.unwrap_err(), Error::InvalidMonth("March".to_owned()));
    }

    #[tokio::test]
    async fn running_totals_for_date() {
        let totals = running_totals_endpoint(
            State(get_summary_state()),
            Principal::Anonymous,
            Ok(Query(RunningTotalsParams {
                today: Some("2024-03-15".to_owned()),
            })),
        )
        .await
        .expect("could not get running totals")
        .0;

        assert_eq!(totals.today_total, dec!(1450.5));
        assert_eq!(totals.today_count, 2);
        assert_eq!(totals.month_total, dec!(16450.5));
        assert_eq!(totals.month_total_display, "₹16,450.50");
    }

    #[tokio::test]
    async fn summaries_only_include_callers_records() {
        let state = get_test_app_state();
        {
            let connection = state.db_connection.lock().unwrap();
            create_record(
                &OwnerId::new("alice"),
                NewRecord::new("2024-03-15", "Books", dec!(300)),
                &connection,
            )
            .unwrap();
            create_record(
                &OwnerId::new("bob"),
                NewRecord::new("2024-03-15", "Games", dec!(4000)),
                &connection,
            )
            .unwrap();
        }
        let server = get_test_server(state);
        let cookie = sign_in(&server, "alice").await;

        let response = server
            .get(endpoints::RUNNING_TOTALS)
            .add_query_param("today", "2024-03-15")
            .add_cookie(cookie)
            .await;

        response.assert_status_ok();
        let totals: RunningTotals = response.json();
        assert_eq!(totals.today_total, dec!(300));
        assert_eq!(totals.month_count, 1);
    }

    #[tokio::test]
    async fn summary_routes_return_json() {
        let state = get_test_app_state();
        {
            let connection = state.db_connection.lock().unwrap();
            create_record(
                &OwnerId::anonymous(),
                NewRecord::new("2024-03-15", "Tea", dec!(20)).category("Food"),
                &connection,
            )
            .unwrap();
        }
        let server = get_test_server(state);

        let daily = server
            .get(endpoints::DAILY_SUMMARY)
            .add_query_param("date", "2024-03-15")
            .add_query_param("payment_method", "")
            .await;
        daily.assert_status_ok();
        let daily: DailySummary = daily.json();
        assert_eq!(daily.count, 1);

        let monthly = server
            .get(endpoints::MONTHLY_SUMMARY)
            .add_query_param("month", "2024-03")
            .await;
        monthly.assert_status_ok();
        let monthly: MonthlySummary = monthly.json();
        assert_eq!(monthly.categories.len(), 1);
        assert_eq!(monthly.categories[0].total_display, "₹20.00");
    }

    #[tokio::test]
    async fn bad_month_is_bad_request() {
        let server = get_test_server(get_test_app_state());

        let response = server
            .get(endpoints::MONTHLY_SUMMARY)
            .add_query_param("month", "2024-13")
            .await;

        response.assert_status_bad_request();
        assert_error_message(&response, "\"2024-13\" is not a valid month, expected YYYY-MM");
    }
}
