//! Case Mentor - Two-Phase Guided Mentoring Dialogue Engine
//!
//! This crate implements a structured mentoring conversation for clinical
//! case consultation: an intake phase that fills a case record through
//! natural dialogue, followed by a reflective mentoring phase grounded in
//! retrieved reference cases.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
