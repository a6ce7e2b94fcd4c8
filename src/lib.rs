//! Relia: reliability analytics for maintained equipment
//!
//! Fits Weibull life models to failure histories, derives reliability
//! curves and B-lives, finds cost-optimal preventive maintenance intervals
//! and checks them with Monte Carlo simulation.

pub mod cli;
pub mod core;
pub mod entities;
