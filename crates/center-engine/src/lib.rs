//! Center Engine - Catalog population, planning and update checks
//!
//! This crate is responsible for:
//! - The local provider over `center-db` (categories, populations, planning)
//! - The front-end dispatcher that owns the catalog and the planning surfaces
//! - Cancellation of superseded population runs
//! - Background update checks and their scheduler

mod catalog;
mod formatting;
mod frontend;
mod pipeline;
mod plan;
mod planner;
mod populate;
mod provider;
mod scheduler;
mod updates;

pub use catalog::Catalog;
pub use formatting::{format_interval, format_number, format_size};
pub use frontend::{Frontend, FrontendConfig, UiEvents};
pub use planner::{PlanFailure, PlanRequest, PlanState};
pub use populate::search_pattern;
pub use provider::{LocalProvider, ProviderConfig};
pub use scheduler::UpdateScheduler;
pub use updates::{
    Connectivity, CycleOutcome, FixedConnectivity, Notification, NotificationAction, Notifier,
    UpdateBackend, UpdateChecker, Urgency, NOTIFICATION_TIMEOUT, OPEN_CENTER_ACTION,
};
