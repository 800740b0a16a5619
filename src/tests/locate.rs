use crate::prelude::{fit_day, locate, DayOrbits, Error, SvCoordinates, Unavailability};
use crate::tests::{day42, init_logger, scratch_store, sine_series, sv};

use crate::prelude::OrbitStore;

/// Store holding the 12 sample / 300 ns scenario model: windows
/// keyed 900 (valid [0, 2100]) and 2100 (valid [1200, 3300]).
fn scenario_store(name: &str) -> OrbitStore {
    let day = day42();
    let samples = sine_series(day, sv("G01"), 12, 300);
    let model = fit_day(day, &samples).unwrap();
    let mut store = scratch_store(name);
    store.insert(day, model);
    store
}

#[test]
fn resolves_at_window_lower_bound() {
    init_logger();

    let store = scenario_store("locate-lower-bound");
    let day = day42();
    let g01 = sv("G01");

    let results = locate(&store, &[day, day], &[0, 1200], &[g01, g01]).unwrap();
    for (result, expected) in results.iter().zip(sine_series(day, g01, 12, 300).iter().step_by(4))
    {
        let p = result.position().unwrap();
        assert!((p.x - expected.x_m).abs() < 1E-3);
    }
}

#[test]
fn resolves_at_last_sample() {
    init_logger();

    let store = scenario_store("locate-last-sample");
    let day = day42();
    let g01 = sv("G01");

    let results = locate(&store, &[day], &[3300], &[g01]).unwrap();
    let p = results[0].position().unwrap();
    let last = sine_series(day, g01, 12, 300)[11];
    assert!((p.x - last.x_m).abs() < 1E-3);
    assert!((p.y - last.y_m).abs() < 1E-3);
    assert!((p.z - last.z_m).abs() < 1E-3);
}

#[test]
fn one_nanosecond_outside_rejected() {
    init_logger();

    let store = scenario_store("locate-boundary");
    let day = day42();
    let g01 = sv("G01");

    let results = locate(&store, &[day, day], &[-1, 3301], &[g01, g01]).unwrap();
    for result in results {
        assert_eq!(
            result,
            SvCoordinates::Unavailable(Unavailability::OutOfBounds)
        );
        let (x, y, z) = result.to_xyz();
        assert!(x.is_nan() && y.is_nan() && z.is_nan());
    }
}

/// 13 samples produce windows keyed 900, 2100 and 2400: instants
/// around 2250 sit between two midpoints without being a sample node,
/// so the two candidate windows evaluate to distinct positions.
fn tie_store(name: &str) -> OrbitStore {
    let day = day42();
    let samples = sine_series(day, sv("G01"), 13, 300);
    let model = fit_day(day, &samples).unwrap();
    let mut store = scratch_store(name);
    store.insert(day, model);
    store
}

#[test]
fn tie_break_prefers_upper_window() {
    init_logger();

    let store = tie_store("locate-tie-break");
    let day = day42();
    let g01 = sv("G01");

    // 2250 is equidistant from midpoints 2100 and 2400, and valid for
    // both windows: the later window wins, deterministically
    let windows = store.get(day).unwrap().windows(g01).unwrap();
    let from_lower = windows[&2100].evaluate(2250);
    let from_upper = windows[&2400].evaluate(2250);
    // distinct fits, otherwise this test asserts nothing
    assert_ne!(from_lower, from_upper);

    let results = locate(&store, &[day], &[2250], &[g01]).unwrap();
    assert_eq!(results[0].position().unwrap(), from_upper);
}

#[test]
fn strictly_nearer_lower_window_wins() {
    init_logger();

    let store = tie_store("locate-nearer-lower");
    let day = day42();
    let g01 = sv("G01");

    let windows = store.get(day).unwrap().windows(g01).unwrap();
    let from_lower = windows[&2100].evaluate(2249);

    let results = locate(&store, &[day], &[2249], &[g01]).unwrap();
    assert_eq!(results[0].position().unwrap(), from_lower);
}

#[test]
fn missing_day_signals_no_model() {
    init_logger();

    let store = scratch_store("locate-no-model");
    let day = day42();
    let g01 = sv("G01");

    let results = locate(&store, &[day, day], &[0, 900], &[g01, g01]).unwrap();
    for result in results {
        assert_eq!(result, SvCoordinates::Unavailable(Unavailability::NoModel));
    }
}

#[test]
fn empty_day_signals_no_model() {
    init_logger();

    let mut store = scratch_store("locate-empty-day");
    let day = day42();
    store.insert(day, DayOrbits::default());

    let results = locate(&store, &[day], &[900], &[sv("G01")]).unwrap();
    assert_eq!(results[0], SvCoordinates::Unavailable(Unavailability::NoModel));
}

#[test]
fn unknown_vehicle_signals_no_satellite() {
    init_logger();

    let store = scenario_store("locate-no-satellite");
    let day = day42();

    let results = locate(&store, &[day], &[900], &[sv("E11")]).unwrap();
    assert_eq!(
        results[0],
        SvCoordinates::Unavailable(Unavailability::NoSatellite)
    );
}

#[test]
fn row_order_preserved() {
    init_logger();

    let store = scenario_store("locate-row-order");
    let day = day42();
    let g01 = sv("G01");
    let e11 = sv("E11");

    let results = locate(
        &store,
        &[day, day, day, day],
        &[900, 900, 9999, 0],
        &[g01, e11, g01, g01],
    )
    .unwrap();

    assert!(results[0].position().is_some());
    assert_eq!(
        results[1],
        SvCoordinates::Unavailable(Unavailability::NoSatellite)
    );
    assert_eq!(
        results[2],
        SvCoordinates::Unavailable(Unavailability::OutOfBounds)
    );
    assert!(results[3].position().is_some());
}

#[test]
fn mismatched_batch_rejected() {
    init_logger();

    let store = scenario_store("locate-mismatch");
    let day = day42();

    let result = locate(&store, &[day], &[0, 900], &[sv("G01")]);
    assert!(matches!(result, Err(Error::BatchLengthMismatch(..))));
}
