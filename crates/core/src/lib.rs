//! Core library: learning folder patterns from file names and sorting files
//! into per-label folders.

pub mod classifier;
pub mod config;
pub mod default_trainer;
pub mod error;
pub mod learner;
pub mod model;
pub mod organizer;
pub mod pipeline;
pub mod settings;
pub mod vectorizer;
