use citygen::config::{CityConfig, ConfigLoader, LayoutMode, TransportMode};

fn loader() -> ConfigLoader {
    ConfigLoader::new(env!("CARGO_MANIFEST_DIR"))
}

#[test]
fn loader_reads_small_town_fixture() {
    let config = loader()
        .load("configs/small_town.yaml")
        .expect("fixture parses");
    assert_eq!(config.display_name(), "small_town");
    assert_eq!(config.seed, 42);
    assert_eq!(config.grid_size, 50);
    assert_eq!(config.layout, LayoutMode::Grid);

    let settings = config.normalize();
    assert_eq!(settings.population, 50_000);
    assert_eq!(settings.hospitals, 1);
    assert_eq!(settings.schools, 2);
    assert!((settings.radius() - 15.0).abs() < 1e-12);
    assert_eq!(settings.centre(), 25.0);
}

#[test]
fn loader_reads_radial_fixture_with_aliases_and_defaults() {
    let config = loader()
        .load("configs/radial_town.yaml")
        .expect("fixture parses");
    assert_eq!(config.layout, LayoutMode::Radial);
    assert_eq!(config.transport, TransportMode::PublicTransit);
    assert_eq!(config.green_m2_per_capita, 8.0);
    assert_eq!(config.logging.level, "info");
}

#[test]
fn loader_reports_missing_file() {
    let err = loader().load("configs/missing.yaml").unwrap_err();
    assert!(format!("{err:#}").contains("missing.yaml"));
}

#[test]
fn unknown_layout_is_rejected() {
    let err = CityConfig::from_yaml_str("layout: hexagonal\n").unwrap_err();
    assert!(format!("{err:#}").contains("unknown layout"));
}
