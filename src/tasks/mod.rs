//! Background Tasks Module
//!
//! Contains background tasks that run periodically alongside the caches.
//!
//! # Tasks
//! - Expiration sweep: actively removes expired entries at configured
//!   intervals, complementing the lazy per-read expiration check

mod sweep;

pub use sweep::spawn_sweep_task;
