pub mod dose;
pub mod drug;
pub mod enums;
pub mod progress;
pub mod schedule;

pub use dose::*;
pub use drug::*;
pub use progress::*;
pub use schedule::*;
