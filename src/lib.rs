//! Screener Dashboard - stock, crypto and insider-trading screener client
//!
//! Talks to the screener REST backend and exposes every dashboard table as a
//! filterable, sortable, paged view. The `screener` binary is a thin command
//! line front end over the same services.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod security;
pub mod services;
pub mod state;
pub mod table;
pub mod views;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging; `RUST_LOG` overrides the default filter
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "screener_dashboard=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
