//! callsight — call-transcript analytics dashboard.
//!
//! A single-binary dashboard that loads a call transcript document, derives
//! display metrics from it, serves an embedded single-page UI, and relays
//! chat questions to an external causal-reasoning backend over HTTP.
//!
//! Module map:
//!
//! - [`config`] — layered TOML configuration (`CALLSIGHT_*` env overrides)
//! - [`transcript`] — transcript data model and one-shot loader
//! - [`analysis`] — view model, placeholder analysis values, derived metrics
//! - [`backend`] — synchronous HTTP client for the reasoning backend
//! - [`chat`] — per-session chat relay and message log
//! - [`analytics`] — JSONL request log for outbound backend calls
//! - [`web`] — embedded dashboard server (tiny_http)
//! - [`cli`] — subcommand handlers

pub mod analysis;
pub mod analytics;
pub mod backend;
pub mod chat;
pub mod cli;
pub mod config;
pub mod transcript;
pub mod web;
