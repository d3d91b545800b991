//! Coordinates in, weather summary out.
//!
//! An HTTP service resolves a forecast from the National Weather Service for
//! a latitude/longitude and classifies the temperature, and a console poller
//! prints current conditions for a fixed set of cities from OpenWeatherMap.

pub mod config;
pub mod data;
pub mod monitoring;
pub mod poller;
pub mod server;
pub mod weather;
