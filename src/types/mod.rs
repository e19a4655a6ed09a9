pub mod events;
pub mod fill;
pub mod portfolio;
pub mod position;

pub use events::*;
pub use fill::*;
pub use portfolio::*;
pub use position::*;
