//! Repository layer.
//!
//! Each repository wraps a [`PgPool`](sqlx::PgPool) and implements one store
//! trait from [`agora_core::store`].

pub mod category_repo;
pub mod message_repo;
pub mod session_repo;
pub mod topic_repo;
pub mod user_repo;

pub use category_repo::CategoryRepo;
pub use message_repo::MessageRepo;
pub use session_repo::SessionRepo;
pub use topic_repo::TopicRepo;
pub use user_repo::UserRepo;
