//! FU News - server-rendered front-end for the FU News content backend
//!
//! This library provides the pages, admin screens and backend client of
//! the FU News site. All data lives behind the backend's REST/OData API.

pub mod client;
pub mod config;
pub mod models;
pub mod services;
pub mod session;
pub mod validation;
pub mod view;
pub mod web;
