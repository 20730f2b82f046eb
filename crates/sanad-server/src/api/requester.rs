//! Caller identity from the headers set by the fronting proxy.

use axum::http::HeaderMap;

use sanad::Requester;

pub const USER_HEADER: &str = "x-sanad-user";
pub const STAFF_HEADER: &str = "x-sanad-staff";

/// No user header (or an empty one) means anonymous. Staff without a user
/// id still counts as staff.
pub fn requester_from_headers(headers: &HeaderMap) -> Requester {
    let user_id = headers
        .get(USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string);

    let is_staff = headers
        .get(STAFF_HEADER)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "true" | "1"));

    Requester { user_id, is_staff }
}
