//! Streamflix API - backend for a movie streaming web client.
//!
//! This crate provides the JSON API behind the Streamflix web app:
//! - Credential, OAuth and two-factor sign-in with email verification
//! - Account settings and "who's watching" profiles
//! - Per-profile favorites and watch-progress tracking
//! - A small admin surface for managing the movie catalogue

pub mod auth;
pub mod config;
pub mod data;
pub mod db;
pub mod entities;
pub mod error;
pub mod mail;
pub mod routes;
pub mod services;
pub mod state;
