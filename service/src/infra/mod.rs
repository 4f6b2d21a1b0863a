//! Infrastructure layer.

pub mod database;
pub mod scorer;

pub use self::{
    database::{mem, Database, Mem},
    scorer::FixtureScorer,
};
