//! Database entities

pub mod message;
pub mod product;

pub use message::{ChatMessage, NewChatMessage};
pub use product::{NewProduct, Product};
