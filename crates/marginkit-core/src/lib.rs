pub mod catalog;
pub mod engine;
pub mod form;
pub mod input;

pub use catalog::*;
pub use engine::*;
pub use form::*;
pub use input::*;
