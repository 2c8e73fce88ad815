mod rules;
mod types;

pub use rules::Outcome;
pub use types::{Board, Cell, Mark};
