#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

//! Shared types, collaborator traits, errors and configuration for the
//! discovery mixing workspace.

pub mod config;
pub mod error;
pub mod traits;
pub mod types;
