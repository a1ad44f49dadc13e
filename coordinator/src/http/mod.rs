//! HTTP communication with remote control planes
//!
//! # Architecture
//!
//! ```text
//! VcenterClient ─┐
//! OrionClient ───┼─→ HttpHelper (auth, redirects, TLS policy) ─→ control plane
//! Alertmanager ──┘
//! ```
//!
//! Every non-success response is turned into a [`RemoteError`] carrying
//! `code=<status> message=<reason> body=<body>`, so per-target report
//! entries show what the remote side said.
//!
//! [`RemoteError`]: crate::errors::RemoteError

pub mod client;
pub mod vcenter;

pub use client::{is_ip_address, HttpHelper, HttpOptions, TlsPolicy};
pub use vcenter::VcenterClient;
