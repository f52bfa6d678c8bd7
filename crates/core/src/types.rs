/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// All monetary amounts are integer cents of the campaign currency.
///
/// Conversion to the provider's expected representation happens at the
/// payment-provider boundary, never in domain or repository code.
pub type Cents = i64;
