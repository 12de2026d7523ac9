//! Discforged - disc title navigation tool
//!
//! This library crate exposes the configuration layer for integration testing.

pub mod config;
