//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` (or an open transaction) as the first argument.

pub mod campaign_repo;
pub mod notification_repo;
pub mod payment_event_repo;
pub mod role_repo;
pub mod session_repo;
pub mod square_repo;
pub mod transaction_repo;
pub mod user_repo;

pub use campaign_repo::CampaignRepo;
pub use notification_repo::NotificationRepo;
pub use payment_event_repo::PaymentEventRepo;
pub use role_repo::RoleRepo;
pub use session_repo::SessionRepo;
pub use square_repo::SquareRepo;
pub use transaction_repo::TransactionRepo;
pub use user_repo::UserRepo;
