//! Background stepping and the thread-safe handle collaborators talk to

pub mod simulation;

pub use simulation::Simulation;
