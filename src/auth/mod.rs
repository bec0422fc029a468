//! # Authentication Module
//!
//! Cookie/JWT session authentication with a CSRF double-submit check:
//! token codec, login/session service, and the guard middleware that
//! protects mutating routes.

pub mod jwt;
pub mod middleware;
pub mod models;
pub mod service;
