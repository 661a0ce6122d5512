pub mod campaign;
pub mod forecast;

pub use campaign::*;
pub use forecast::*;
