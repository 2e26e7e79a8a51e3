//! iPay return reconciliation service
//!
//! Handles the shopper's redirect back from the iPay hosted payment page:
//! validates the callback, resolves the local order from the provider
//! payment reference, fetches the authoritative payment status, reconciles
//! it into local order state, and always answers with a safe redirect.

pub mod config;
pub mod db;
pub mod error;
pub mod gateway;
pub mod handlers;
pub mod models;
pub mod orders;
pub mod payments;
pub mod reconcile;
