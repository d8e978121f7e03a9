pub mod tmdb;

pub use tmdb::{MovieSource, TmdbClient, TmdbError};
