//! End-to-end run: obtain TLE text, then parse, convert, and project.

use log::{error, info, warn};

use crate::config::Config;
use crate::constants::KM_TO_M;
use crate::epoch::epoch_from_line1;
use crate::fetch::TextFetcher;
use crate::projection::PlaneBasis;
use crate::report::{ProjectedPoint, Report};
use crate::tle::{RawTle, Tle};
use crate::Result;

/// Compute every reported quantity from TLE text.
pub fn analyze(tle_text: &str, config: &Config) -> Result<Report> {
    let raw = RawTle::from_text(tle_text)?;
    let tle = Tle::from_raw(&raw)?;
    info!("Parsed {tle}");

    let elements = tle.to_keplerian();
    let state = config.solver.state_from_elements(&elements)?;

    let (epoch, tai_mjd) = epoch_from_line1(&raw.line1)?;
    info!("Epoch {epoch} = {tai_mjd}");

    let [pos1, pos2] = config.reference_positions;
    let basis = PlaneBasis::from_positions(&pos1, &pos2)?;
    let references = [pos1, pos2].map(|position| ProjectedPoint {
        position,
        plane: basis.project(&position),
    });

    let satellite_km = state.position * (1.0 / KM_TO_M);

    Ok(Report {
        name: tle.name.clone(),
        norad_id: tle.norad_id,
        elements,
        period_min: tle.period() / 60.0,
        state,
        epoch,
        tai_mjd,
        references,
        satellite_in_plane: basis.project(&satellite_km),
        satellite_plane_offset_km: basis.offset(&satellite_km),
    })
}

/// Download the TLE and store it, or fall back to the stored copy.
///
/// In offline mode the stored file is used directly. A failed download is
/// logged and the previously stored file is used if there is one.
pub fn acquire_tle(fetcher: &dyn TextFetcher, config: &Config) -> Result<String> {
    let store = config.store();
    if config.offline {
        info!("Offline mode, reading {:?}", store.path());
        return Ok(store.load()?);
    }

    match fetcher.fetch_text(&config.tle_url) {
        Ok(text) => {
            store.save(&text)?;
            info!("TLE file downloaded successfully");
            Ok(store.load()?)
        }
        Err(e) if store.exists() => {
            error!("Download failed: {e}");
            warn!("Using previously stored TLE {:?}", store.path());
            Ok(store.load()?)
        }
        Err(e) => {
            error!("Download failed: {e}");
            Err(e.into())
        }
    }
}

/// [`acquire_tle`] followed by [`analyze`].
pub fn run(fetcher: &dyn TextFetcher, config: &Config) -> Result<Report> {
    let text = acquire_tle(fetcher, config)?;
    analyze(&text, config)
}
