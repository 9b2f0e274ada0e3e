pub mod evolution;
pub mod exam;
pub mod prescription;

pub use evolution::*;
pub use exam::*;
pub use prescription::*;
