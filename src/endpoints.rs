//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/records/{record_id}', use [format_endpoint].

/// The health check route.
pub const ROOT: &str = "/";
/// The route for opening and closing an owner session.
pub const SESSION: &str = "/api/session";
/// The route to list and create records.
pub const RECORDS: &str = "/api/records";
/// The route to update or delete a single record.
pub const RECORD: &str = "/api/records/{record_id}";
/// The route for a single day's records and total.
pub const DAILY_SUMMARY: &str = "/api/summary/daily";
/// The route for a month's total broken down by category.
pub const MONTHLY_SUMMARY: &str = "/api/summary/monthly";
/// The route for today's and this month's running totals.
pub const RUNNING_TOTALS: &str = "/api/summary/totals";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/api/records/{record_id}', '{record_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map_or(endpoint_path.len(), |offset| param_start + offset + 1);

    format!(
        "{}{id}{}",
        &endpoint_path[..param_start],
        &endpoint_path[param_end..]
    )
}
