pub mod format;
pub mod html;
pub mod json;
pub mod terminal;
