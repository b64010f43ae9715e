pub mod diagnostics;
pub mod health;
pub mod messages;
pub mod products;
pub mod uploads;
pub mod websocket;
