pub mod cleaning;
pub mod credits;
pub mod fetch;
pub mod flatten;

pub use cleaning::{CleanStats, clean};
pub use fetch::{FetchOutcome, fetch_all, fetch_with_retry};
