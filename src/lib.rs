//! Core library for setlist-playlist-builder
pub mod config;
pub mod models;
pub mod error;
pub mod api;
pub mod events;
pub mod assembler;
pub mod orchestrator;
