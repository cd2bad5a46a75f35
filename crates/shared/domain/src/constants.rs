//! Domain-level constants.
//!
//! These constants define business rules and validation requirements.

// =============================================================================
// User Roles
// =============================================================================

/// Default role assigned to new users
pub const ROLE_USER: &str = "user";

/// Administrator role with elevated privileges
pub const ROLE_ADMIN: &str = "admin";

/// All valid role values
pub const VALID_ROLES: &[&str] = &[ROLE_USER, ROLE_ADMIN];

/// Check if a role value is valid
pub fn is_valid_role(role: &str) -> bool {
    VALID_ROLES.contains(&role)
}

// =============================================================================
// Validation
// =============================================================================

/// Minimum password length requirement
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Minimum username length requirement
pub const MIN_USERNAME_LENGTH: usize = 3;

/// National Provider Identifier length (digits)
pub const NPI_LENGTH: usize = 10;

/// Earliest year an invoice may be generated for
pub const MIN_INVOICE_YEAR: i32 = 2000;

/// Latest year an invoice may be generated for
pub const MAX_INVOICE_YEAR: i32 = 2100;

// =============================================================================
// Billing
// =============================================================================

/// An unpaid invoice older than this many days makes its office overdue
pub const OVERDUE_AFTER_DAYS: i64 = 30;

/// Currency used when none is configured (ISO 4217, processor casing)
pub const DEFAULT_CURRENCY: &str = "usd";

/// Prefix of every generated invoice number
pub const INVOICE_NUMBER_PREFIX: &str = "LUNE";

/// Processor status reported once a payment intent has been captured
pub const PROCESSOR_STATUS_SUCCEEDED: &str = "succeeded";

// =============================================================================
// Authentication
// =============================================================================

/// Default JWT token expiration in hours
pub const DEFAULT_JWT_EXPIRATION_HOURS: i64 = 24;

/// Minimum JWT secret length (security requirement)
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Seconds per hour (for token expiration calculation)
pub const SECONDS_PER_HOUR: i64 = 3600;

/// Default lifetime of a password reset token in minutes
pub const DEFAULT_RESET_TOKEN_TTL_MINUTES: i64 = 60;

/// Authorization header prefix for Bearer tokens
pub const BEARER_TOKEN_PREFIX: &str = "Bearer ";

/// JWT token type identifier
pub const TOKEN_TYPE_BEARER: &str = "Bearer";
