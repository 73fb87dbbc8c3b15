//! HTTP gateway: sign-in routing, pricing tiers, and toast notifications.

pub mod app;
pub mod config;
pub mod context;
pub mod supabase;

pub use config::{ConfigError, GatewayConfig};
