use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use vargrid_core::{
    icosahedral_resolution, level_for_resolution, synthesize, synthesize_config,
    write_sizing_function, Configuration, Error, FieldSynthesizer, LatLon, Region,
};

const NESTED: &str = r#"{
    "name": "nested",
    "background_resolution": 60.0,
    "grid_density": 1.0,
    "regions": [
        {"type": "polygon", "name": "buffer", "resolution": 20.0, "transition_width": 150.0,
         "polygon": [[-30, -65], [-30, -35], [0, -35], [0, -65]]},
        {"type": "circle", "name": "state", "resolution": 8.0, "transition_start": 20.0,
         "center": [-15.9, -49.9], "radius": 400.0},
        {"type": "circle", "name": "metro", "resolution": 2.0, "transition_width": 6.0,
         "center": [-16.7, -49.3], "radius": 60.0}
    ]
}"#;

fn regions() -> Vec<Region> {
    Configuration::from_json_str(NESTED).unwrap().regions().unwrap()
}

fn axes() -> (Vec<f64>, Vec<f64>) {
    let lat = (0..=80).map(|i| -40.0 + i as f64 * 0.5).collect();
    let lon = (0..=100).map(|i| -75.0 + i as f64 * 0.5).collect();
    (lat, lon)
}

#[test]
fn repeated_runs_are_identical() {
    let (lat, lon) = axes();
    let a = synthesize(60.0, &regions(), &lat, &lon).unwrap();
    let b = synthesize(60.0, &regions(), &lat, &lon).unwrap();
    assert_eq!(a, b);
}

#[test]
fn region_order_does_not_matter() {
    let (lat, lon) = axes();
    let reference = synthesize(60.0, &regions(), &lat, &lon).unwrap();

    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..5 {
        let mut shuffled = regions();
        shuffled.shuffle(&mut rng);
        let field = synthesize(60.0, &shuffled, &lat, &lon).unwrap();
        assert_eq!(field.values(), reference.values());
    }
}

#[test]
fn nested_regions_step_down_toward_the_core() {
    let cfg = Configuration::from_json_str(NESTED).unwrap();
    let s = FieldSynthesizer::from_config(&cfg).unwrap();

    assert_eq!(s.resolution_at(LatLon::new(-16.7, -49.3)), 2.0);
    assert_eq!(s.resolution_at(LatLon::new(-12.5, -49.9)), 8.0);
    assert_eq!(s.resolution_at(LatLon::new(-5.0, -60.0)), 20.0);
    assert_eq!(s.resolution_at(LatLon::new(30.0, 0.0)), 60.0);
}

#[test]
fn config_run_respects_background_bound() {
    let cfg = Configuration::from_json_str(NESTED).unwrap();
    let field = synthesize_config(&cfg).unwrap();

    assert_eq!((field.height(), field.width()), (181, 361));
    assert!(field.values().iter().all(|&v| v.is_finite() && v > 0.0 && v <= 60.0));
    assert_eq!(field.max_resolution(), 60.0);
    assert!(field.min_resolution() <= 8.0);
}

#[test]
fn sampled_field_interpolates_between_nodes() {
    let cfg = Configuration::from_json_str(NESTED).unwrap();
    let field = synthesize_config(&cfg).unwrap();
    let v = field.sample(LatLon::new(-16.5, -49.5)).unwrap();
    assert!((2.0..=60.0).contains(&v), "{v}");
    assert_eq!(field.sample(LatLon::new(45.0, 10.0)), Some(60.0));
}

#[test]
fn jigsaw_export_has_one_value_per_sample() {
    let (lat, lon) = axes();
    let field = synthesize(60.0, &regions(), &lat, &lon).unwrap();
    let mut buf = Vec::new();
    write_sizing_function(&field, &mut buf).unwrap();
    let text = String::from_utf8(buf).unwrap();

    let header = format!("VALUE={};1", lat.len() * lon.len());
    let at = text.lines().position(|l| l == header).unwrap();
    assert_eq!(text.lines().count() - at - 1, lat.len() * lon.len());
}

#[test]
fn bad_configuration_fails_before_synthesis() {
    let json = NESTED.replace("\"metro\"", "\"state\"");
    let cfg = Configuration::from_json_str(&json).unwrap();
    assert!(matches!(synthesize_config(&cfg), Err(Error::Configuration(_))));

    let bowtie = r#"{"background_resolution": 50, "regions": [
        {"type": "polygon", "name": "bowtie", "resolution": 5, "transition_width": 10,
         "polygon": [[0, 0], [1, 1], [1, 0], [0, 1]]}]}"#;
    let cfg = Configuration::from_json_str(bowtie).unwrap();
    assert!(matches!(synthesize_config(&cfg), Err(Error::Geometry(_))));
}

#[test]
fn icosahedral_levels_map_both_ways() {
    assert_eq!(icosahedral_resolution(4).unwrap(), 120.0);
    assert_eq!(level_for_resolution(30.0).unwrap(), 6);
    assert!(matches!(icosahedral_resolution(9), Err(Error::UnsupportedLevel(_))));
}

#[test]
fn field_steps_down_smoothly_onto_a_wide_polygon() {
    let json = r#"{"background_resolution": 150, "regions": [
        {"type": "polygon", "name": "mato_grosso", "resolution": 10, "transition_width": 8,
         "polygon": [[-7.06, -62.02], [-7.06, -49.54], [-18.5, -49.54], [-18.5, -62.02]]}]}"#;
    let regions = Configuration::from_json_str(json).unwrap().regions().unwrap();

    // One meridian, south of the polygon up into it.
    let lat: Vec<f64> = (0..=100).map(|i| -19.0 + i as f64 * 0.01).collect();
    let field = synthesize(150.0, &regions, &lat, &[-55.78]).unwrap();
    let column: Vec<f64> = (0..lat.len()).map(|row| field.get(row, 0)).collect();

    for (w, pair) in column.windows(2).enumerate() {
        assert!(pair[1] <= pair[0], "rose moving north at {:.2}: {pair:?}", lat[w + 1]);
    }
    // 0.01° ≈ 1.1 km south of the edge is inside the 8 km band.
    assert!(column[49] < 12.0, "{}", column[49]);
    assert_eq!(column[0], 150.0);
    assert_eq!(*column.last().unwrap(), 10.0);
}
