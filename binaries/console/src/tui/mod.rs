pub mod app;
pub mod bridge;
pub mod theme;
pub mod updates;
pub mod views;


pub use app::{ConsoleApp, MessageLevel, ViewType};
pub use bridge::{ServiceBundle, default_service_bundle};
