//! Services Layer
//!
//! Business operations shared by every front end. Each service is a unit
//! struct whose functions take `&AppState` explicitly; none of them keep
//! state of their own.
//!
//! # Services
//!
//! - `AuthService` - Login, register, logout, session restore
//! - `WatchlistService` - Cached watchlist, add/remove, bulk add
//! - `ScreenerService` - Fenced fetch cycle of every table view
//! - `InsiderService` - Per-insider purchase statistics
//! - `DetailService` - Historical series and Heikin-Ashi candles
//! - `PreferencesService` - Saved filters, hidden columns, page size

pub mod auth_service;
pub mod detail_service;
pub mod insider_service;
pub mod preferences_service;
pub mod screener_service;
pub mod watchlist_service;

pub use auth_service::AuthService;
pub use detail_service::{Asset, DetailService, Timeframe};
pub use insider_service::InsiderService;
pub use preferences_service::PreferencesService;
pub use screener_service::ScreenerService;
pub use watchlist_service::{BulkAddFailure, BulkAddResult, WatchlistService};
