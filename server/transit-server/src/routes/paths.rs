//! Route path constants
//!
//! Router paths use axum's `:param` syntax; the OpenAPI annotations on the
//! handlers spell the same paths with `{param}`.

pub mod health {
    pub const HEALTH: &str = "/health";
    pub const VERSION: &str = "/version";
    pub const OPENAPI_JSON: &str = "/api-docs/openapi.json";
}

pub mod booking {
    pub const BOOK: &str = "/api/booking/book";
    pub const UNASSIGNED: &str = "/api/booking/trips/unassigned";
    pub const TRIP_BY_ID: &str = "/api/booking/trips/:trip_id";
    pub const ASSIGN: &str = "/api/booking/trips/:trip_id/assign";
    pub const COMPLETE: &str = "/api/booking/trips/:trip_id/complete";
    pub const CANCEL: &str = "/api/booking/trips/:trip_id/cancel";
}

pub mod insurance {
    pub const VERIFY: &str = "/api/insurance/verify";
    pub const CHECK: &str = "/api/insurance/check/:patient_id";
}

pub mod billing {
    pub const GENERATE_CLAIM: &str = "/api/billing/generate-claim";
    pub const CLAIM_BY_ID: &str = "/api/billing/claim/:claim_id";
    pub const PENDING_CLAIMS: &str = "/api/billing/pending-claims";
    pub const SUBMIT_CLAIM: &str = "/api/billing/submit-claim";
    pub const POST_PAYMENT: &str = "/api/billing/post-payment";
    pub const STATS: &str = "/api/billing/stats";
}

pub mod analytics {
    pub const DASHBOARD: &str = "/api/analytics/dashboard";
    pub const REVENUE: &str = "/api/analytics/revenue";
    pub const OPERATIONS: &str = "/api/analytics/operations";
    pub const PATIENTS: &str = "/api/analytics/patients";
    pub const SUMMARY: &str = "/api/analytics/summary";
    pub const REVENUE_TREND: &str = "/api/analytics/revenue-trend";
    pub const HEALTH: &str = "/api/analytics/health";
}

pub mod patient {
    pub const LOGIN: &str = "/api/patient/login";
    pub const REGISTER: &str = "/api/patient/register";
    pub const PROFILE: &str = "/api/patient/profile";
    pub const PROFILE_BY_ID: &str = "/api/patient/profile/:patient_id";
    pub const TRIPS: &str = "/api/patient/trips";
    pub const TRIPS_BY_ID: &str = "/api/patient/trips/:patient_id";
    pub const BOOK_TRIP: &str = "/api/patient/trips/book";
}
