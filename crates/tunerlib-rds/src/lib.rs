//! tunerlib-rds: RDS (Radio Data System) group decoding.
//!
//! A pure, I/O-free decoder for the RDS groups an FM tuner chip delivers
//! four blocks at a time. Drivers feed raw blocks in; confirmed station
//! names, complete radio text messages, and clock time come out. See
//! [`RdsDecoder`] for the accumulation rules.

pub mod decoder;
pub mod pty;

pub use decoder::RdsDecoder;
pub use pty::{program_type_name_eu, program_type_name_na};
