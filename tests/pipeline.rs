use std::cell::Cell;

use approx::assert_relative_eq;
use tempfile::TempDir;

use iss_rendezvous::fetch::{FetchError, TextFetcher};
use iss_rendezvous::kepler::KeplerError;
use iss_rendezvous::projection::ProjectionError;
use iss_rendezvous::{acquire_tle, analyze, run, Config, Error, KeplerSolver, Vector3};

const ISS_TLE: &str = "ISS (ZARYA)
1 25544U 98067A   24060.75000000  .00016717  00000-0  30270-3 0  9991
2 25544  51.6416 247.4627 0006703 130.5360 325.0288 15.50225865441232
";

struct StubFetcher {
    body: Option<&'static str>,
    calls: Cell<usize>,
}

impl StubFetcher {
    fn ok(body: &'static str) -> Self {
        StubFetcher { body: Some(body), calls: Cell::new(0) }
    }

    fn failing() -> Self {
        StubFetcher { body: None, calls: Cell::new(0) }
    }
}

impl TextFetcher for StubFetcher {
    fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        self.calls.set(self.calls.get() + 1);
        self.body.map(str::to_string).ok_or_else(|| FetchError::Http {
            url: url.to_string(),
            message: "connection refused".to_string(),
        })
    }
}

fn config_in(dir: &TempDir) -> Config {
    Config {
        data_dir: dir.path().join("data"),
        ..Config::default()
    }
}

#[test]
fn analyze_reports_every_quantity() {
    let report = analyze(ISS_TLE, &Config::default()).unwrap();

    assert_eq!(report.name.as_deref(), Some("ISS (ZARYA)"));
    assert_eq!(report.norad_id, 25544);
    assert_relative_eq!(report.elements.semi_major_axis_km, 6794.203054, epsilon = 1e-5);
    assert_relative_eq!(report.elements.inclination_deg, 51.6416);
    assert_relative_eq!(report.period_min, 92.88969, epsilon = 1e-4);

    assert_relative_eq!(report.state.position.x, 4_124_537.8615615056, max_relative = 1e-9);
    assert_relative_eq!(report.state.velocity.y, 7_221.391541055092, max_relative = 1e-9);

    assert_eq!(report.epoch.to_string(), "2024-02-29 18:00:00 UTC");
    assert_relative_eq!(report.tai_mjd.value(), 60_369.750_428_240_74, epsilon = 1e-9);

    assert_relative_eq!(report.references[0].plane.x, -2000.0, epsilon = 1e-9);
    assert_relative_eq!(report.references[1].plane.y, -2236.06797749979, epsilon = 1e-9);
    assert_relative_eq!(report.satellite_in_plane.x, 1004.2845687643753, epsilon = 1e-6);
    assert_relative_eq!(report.satellite_in_plane.y, -6059.335621972751, epsilon = 1e-6);

    let text = report.to_string();
    assert!(text.contains("NORAD 25544"));
    assert!(text.contains("Epoch (TAI MJD):      60369.75042824"));

    let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
    assert_eq!(json["norad_id"], 25544);
    assert_eq!(json["epoch"]["month"], 2);
}

#[test]
fn run_downloads_then_stores() {
    let tmp = TempDir::new().unwrap();
    let config = config_in(&tmp);
    let fetcher = StubFetcher::ok(ISS_TLE);

    let report = run(&fetcher, &config).unwrap();
    assert_eq!(report.norad_id, 25544);
    assert_eq!(fetcher.calls.get(), 1);
    assert_eq!(config.store().load().unwrap(), ISS_TLE);
}

#[test]
fn offline_mode_skips_the_network() {
    let tmp = TempDir::new().unwrap();
    let config = Config { offline: true, ..config_in(&tmp) };
    config.store().save(ISS_TLE).unwrap();

    let fetcher = StubFetcher::failing();
    let text = acquire_tle(&fetcher, &config).unwrap();
    assert_eq!(text, ISS_TLE);
    assert_eq!(fetcher.calls.get(), 0);
}

#[test]
fn failed_download_falls_back_to_stored_file() {
    let tmp = TempDir::new().unwrap();
    let config = config_in(&tmp);
    config.store().save(ISS_TLE).unwrap();

    let report = run(&StubFetcher::failing(), &config).unwrap();
    assert_eq!(report.norad_id, 25544);
}

#[test]
fn failed_download_without_stored_file_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let err = run(&StubFetcher::failing(), &config_in(&tmp)).unwrap_err();
    assert!(matches!(err, Error::Fetch(FetchError::Http { .. })));
}

#[test]
fn garbage_download_is_a_parse_error() {
    let tmp = TempDir::new().unwrap();
    let err = run(&StubFetcher::ok("<html>maintenance</html>"), &config_in(&tmp)).unwrap_err();
    assert!(matches!(err, Error::Tle(_)));
}

#[test]
fn collinear_references_are_reported() {
    let p = Vector3::new(1000.0, 2000.0, 500.0);
    let config = Config {
        reference_positions: [p, -p],
        ..Config::default()
    };
    let err = analyze(ISS_TLE, &config).unwrap_err();
    assert!(matches!(err, Error::Projection(ProjectionError::DegeneratePlane(..))));
}

#[test]
fn solver_cap_is_reported() {
    let config = Config {
        solver: KeplerSolver::new(0.0, 10),
        ..Config::default()
    };
    let err = analyze(ISS_TLE, &config).unwrap_err();
    assert!(matches!(
        err,
        Error::Kepler(KeplerError::NotConverged { iterations: 10, .. })
    ));
}
