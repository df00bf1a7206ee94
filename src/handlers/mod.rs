//! HTTP handlers

pub mod health;
pub mod index;
pub mod features;
pub mod predict;
pub mod models;

#[cfg(test)]
mod tests;
