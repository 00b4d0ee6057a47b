pub mod clock;
pub mod telemetry;
pub mod validate;

pub use clock::*;
pub use telemetry::*;
pub use validate::*;
