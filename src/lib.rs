//! # iss-rendezvous
//!
//! Orbital geometry for an ISS rendezvous study.
//! Fetches the current ISS Two-Line Element set, parses it into Keplerian
//! elements, converts them to an inertial position/velocity state, expresses
//! the TLE epoch as a TAI Modified Julian Date, and projects positions into
//! 2D coordinates within a shared orbital plane.

pub mod config;
pub mod constants;
pub mod elements;
pub mod epoch;
pub mod fetch;
pub mod kepler;
pub mod pipeline;
pub mod projection;
pub mod report;
pub mod tle;
pub mod vector;

use thiserror::Error;

pub use config::Config;
pub use elements::KeplerianElements;
pub use epoch::{EpochDateTime, TaiMjd};
pub use kepler::{KeplerSolver, StateVector};
pub use pipeline::{acquire_tle, analyze, run};
pub use projection::{transform_to_2d, PlaneBasis, Point2};
pub use report::Report;
pub use tle::{RawTle, Tle};
pub use vector::Vector3;

/// Any failure of the library, tagged by the stage that produced it.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Tle(#[from] tle::TleError),

    #[error(transparent)]
    Epoch(#[from] epoch::EpochError),

    #[error(transparent)]
    Kepler(#[from] kepler::KeplerError),

    #[error(transparent)]
    Projection(#[from] projection::ProjectionError),

    #[error(transparent)]
    Elements(#[from] elements::ElementsError),

    #[error(transparent)]
    Fetch(#[from] fetch::FetchError),

    #[error(transparent)]
    Store(#[from] fetch::StoreError),

    #[error(transparent)]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
