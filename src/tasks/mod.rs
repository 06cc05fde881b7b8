//! Background Tasks Module
//!
//! Contains background tasks that run periodically alongside cache traffic.
//!
//! # Tasks
//! - Sweeper: Removes expired entries from one shard at its configured interval

mod sweeper;

pub use sweeper::Sweeper;
