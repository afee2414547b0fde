//! Chat use cases. Every mutating call takes the caller as an explicit
//! [`Principal`](agora_core::roles::Principal).

pub mod categories;
pub mod messages;
pub mod topics;

pub use categories::CategoryService;
pub use messages::MessageService;
pub use topics::TopicService;

/// Optional changes to a titled entity. Absent fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct TitleChanges {
    pub title: Option<String>,
    pub description: Option<String>,
}
