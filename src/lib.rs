//! HRMS Portal
//!
//! Client-side domain-state layer for the HRMS employee portal: attendance
//! punches, leave, tasks, projects, dashboards, profile and the AI assistant,
//! all backed by one REST API.
//!
//! # Architecture
//!
//! - **Session**: process-wide bearer token with a persisted lifecycle
//! - **API**: one reqwest client that attaches the token and handles 401 centrally
//! - **Domains**: one reducer-driven async state machine per backend domain
//! - **Portal**: aggregator with a memoized combined view
//!
//! # Modules
//!
//! - [`api`]: HTTP client and endpoint groups
//! - [`domains`]: per-domain state, actions and operations
//! - [`normalized`]: response adapters over unstable backend field names
//! - [`session`]: authentication session and its storage
//! - [`store`]: reducer trait, versioned store and the operation driver

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::multiple_crate_versions)]
#![allow(clippy::needless_pass_by_value)]

pub mod api;
pub mod config;
pub mod domains;
pub mod error;
pub mod normalized;
pub mod portal;
pub mod session;
pub mod store;
pub mod telemetry;

pub use error::{Outcome, PortalError, Result};
pub use portal::{Portal, PortalView};
