//! Antenna gain by the substitution method.
//!
//! Two S21 measurements go in: reference antenna ↔ antenna under test, and
//! reference ↔ reference. [`data`] turns the raw instrument files into
//! canonical frequency/amplitude traces, [`gain`] aligns them and applies
//! `G_aut = G_ref + (S21_aut_ref − S21_ref_ref)`, [`export`] writes the curve
//! back out, and [`session`] ties the steps into one request.

pub mod config;
pub mod data;
pub mod export;
pub mod gain;
pub mod session;
