//! API endpoint handlers, one module per resource.

pub mod doses;
pub mod drugs;
pub mod health;
pub mod medications;
pub mod progress;
