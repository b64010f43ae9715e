//! Database repository implementations

pub mod message_repository;
pub mod product_repository;

pub use message_repository::MessageRepository;
pub use product_repository::ProductRepository;
