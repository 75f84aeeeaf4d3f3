//! Field helpers for the widgets this crate ships.

mod checkbox;
mod money;
mod options;
mod text;

pub use checkbox::{checkbox_field, toggle_field};
pub use money::money_field;
pub use options::{options_field, yes_no_field};
pub use text::{number_field, text_field};
