pub mod literal;

pub use literal::{parse_literal, parse_structured};
