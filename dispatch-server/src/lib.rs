//! Geofence-triggered dispatch engine.
//!
//! Watches drivers stream their locations along fixed multi-stop routes
//! and, when one gets close enough and soon enough to a pickup station,
//! pairs them with riders waiting there for the same destination area —
//! exactly once per approach.

pub mod cache;
pub mod config;
pub mod detector;
pub mod domain;
pub mod geo;
pub mod matching;
pub mod registry;
pub mod web;
