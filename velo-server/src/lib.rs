//! Bike-share availability viewer.
//!
//! A web application that reads the GBFS feeds published by city bike-share
//! systems and shows each network's stations, their live availability, and
//! the station nearest to the user.

pub mod cache;
pub mod cities;
pub mod config;
pub mod gbfs;
pub mod geo;
pub mod network;
pub mod web;
