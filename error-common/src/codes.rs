// Standardized error codes reported in API error bodies

pub mod validation {
    pub const INVALID_INPUT: &str = "VALIDATION_1001";
    pub const MISSING_REQUIRED_FIELD: &str = "VALIDATION_1002";
    pub const INVALID_FORMAT: &str = "VALIDATION_1003";
    pub const OUTSIDE_BUSINESS_HOURS: &str = "VALIDATION_1004";
}

pub mod authentication {
    pub const INVALID_CREDENTIALS: &str = "AUTH_2001";
    pub const TOKEN_INVALID: &str = "AUTH_2002";
}

pub mod authorization {
    pub const ACCESS_DENIED: &str = "AUTHZ_3001";
}

pub mod database {
    pub const CONNECTION_FAILED: &str = "DB_4001";
    pub const QUERY_FAILED: &str = "DB_4002";
    pub const CONSTRAINT_VIOLATION: &str = "DB_4003";
}

pub mod business {
    pub const NOT_FOUND: &str = "BIZ_5001";
    pub const CONFLICT: &str = "BIZ_5002";
    pub const INVALID_STATE: &str = "BIZ_5003";
}

pub mod system {
    pub const INTERNAL: &str = "SYS_9001";
    pub const NETWORK_FAILURE: &str = "SYS_9002";
    pub const CONFIGURATION: &str = "SYS_9003";
    pub const UNAVAILABLE: &str = "SYS_9004";
}
