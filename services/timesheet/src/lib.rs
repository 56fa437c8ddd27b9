//! Timesheet service: the internal API for technicians and administrators
//!
//! Owns the duration engine, the time-entry store, the submission review
//! state machine, and the client/location/technician directory.

pub mod duration;
pub mod error;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod state;
