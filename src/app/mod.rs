pub mod runner;
pub mod loader;

pub use runner::{Ct2Model, LogitsModel};
pub use loader::{ctranslate2, ctranslate2_with, CTRANSLATE2};
