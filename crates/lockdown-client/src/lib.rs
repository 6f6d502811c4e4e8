//! Lockdown Client - HTTP client for the project-management service
//!
//! [`ApiClient`] implements [`lockdown_core::ProjectService`] on top of
//! `reqwest`, covering the four endpoints a run needs: project listing,
//! permission template lookup, visibility update and bulk template
//! application.

pub mod api;

pub use api::ApiClient;
