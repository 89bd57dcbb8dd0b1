//! Domain models for the imbue recipe client

mod publication;

pub use publication::{Description, Ingredient, Publication, TimeValue};
