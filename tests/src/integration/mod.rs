//! Integration flows across the child chain crates.

pub mod fixtures;

mod admission;
mod end_to_end;
mod events;
mod history;
