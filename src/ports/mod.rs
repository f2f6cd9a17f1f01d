// src/ports/mod.rs
pub mod status;

pub use status::StatusPresenter;
