//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - TTL Sweep: Removes expired process cache entries at configured intervals

mod sweep;

pub use sweep::spawn_sweep_task;
