//! Foodcart Server - order intake and fulfillment planning backend.
//!
//! # Architecture
//!
//! - Axum web framework serving a JSON API
//! - `PostgreSQL` for the catalogue, orders and the persistent geocode cache
//! - An external geocoding provider, called at most once per distinct address
//! - Pure in-process logic for availability matching and distance ranking
//!
//! # Modules
//!
//! - [`routes`] - Public order/catalogue API and the staff fulfillment view
//! - [`geo`] - Geocoding provider client, persistent cache, distance math
//! - [`matching`] - Menu index answering "can this restaurant make this order"
//! - [`services`] - Order ranking built on top of `geo` and `matching`
//! - [`db`] - Repositories over `PostgreSQL`

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod geo;
pub mod matching;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
