//! End-to-end: trade file -> settings -> bars -> bar file

mod common;

use databars::core::test_utils::{generators, scenarios};
use databars::{create_bars, create_bars_from_str, BarKind, BarSpec, FixedPoint, ProcessingError};
use tempfile::tempdir;

fn fp(value: &str) -> FixedPoint {
    FixedPoint::from_str(value).unwrap()
}

#[test]
fn tick_scenario() {
    let series = create_bars_from_str(&scenarios::three_trade_sequence(), 2.0, "tick").unwrap();
    let bars = series.bars();

    assert_eq!(bars.len(), 2);
    assert_eq!(
        (bars[0].open, bars[0].high, bars[0].low, bars[0].close),
        (fp("10"), fp("12"), fp("10"), fp("12"))
    );
    assert_eq!(bars[0].volume_fixed(), Some(fp("2")));
    assert_eq!(bars[0].vwap, fp("11"));
    assert_eq!(
        (bars[1].open, bars[1].high, bars[1].low, bars[1].close),
        (fp("11"), fp("11"), fp("11"), fp("11"))
    );
    assert_eq!(bars[1].volume_fixed(), Some(fp("2")));
    assert_eq!(bars[1].vwap, fp("11"));
}

#[test]
fn volume_scenario() {
    let series = create_bars_from_str(&scenarios::three_trade_sequence(), 3.0, "volume").unwrap();
    assert_eq!(series.len(), 1);
    assert_eq!(series.bars()[0].volume_fixed(), Some(fp("4")));
    assert_eq!(series.bars()[0].vwap, fp("11"));
}

#[test]
fn invalid_scheme_scenario() {
    let err = create_bars_from_str(&scenarios::three_trade_sequence(), 1.0, "foo").unwrap_err();
    assert!(matches!(err, ProcessingError::InvalidScheme { .. }));
}

#[test]
fn degenerate_group_scenario() {
    let err = create_bars(&scenarios::zero_volume_group(), &BarSpec::tick(2).unwrap()).unwrap_err();
    assert!(matches!(err, ProcessingError::DegenerateGroup { .. }));
}

#[cfg(feature = "io")]
#[test]
fn csv_file_round_trip_preserves_trades() {
    use databars::io::TradeCsvReader;

    let trades = generators::create_random_walk_trades(1_000, 42);
    let dir = tempdir().unwrap();
    let path = common::write_tickdata(dir.path(), "ticks.csv", &trades);

    let read = TradeCsvReader::default().read_path(&path).unwrap();
    assert_eq!(read, trades);
}

#[cfg(all(feature = "io", feature = "config"))]
#[test]
fn configured_pipeline_writes_one_row_per_bar() {
    use databars::io::{BarCsvWriter, TradeCsvReader};
    use databars::Settings;
    use std::io::Write;

    let trades = generators::create_multi_day_dataset(3, 400);
    let dir = tempdir().unwrap();
    let input = common::write_tickdata(dir.path(), "ticks.csv", &trades);

    let mut config_file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        config_file,
        "[bars]\ndefault_kind = \"dollar\"\ndefault_units = 5000.0\n\n[export]\nfloat_precision = 4"
    )
    .unwrap();
    let settings = Settings::load_from_file(config_file.path()).unwrap();
    assert_eq!(settings.bars.default_kind, BarKind::Dollar);

    let read = TradeCsvReader::default().read_path(&input).unwrap();
    let spec = settings.bars.spec(None, None).unwrap();
    let series = create_bars(&read, &spec).unwrap();
    common::assert_bar_invariants(series.bars());
    assert_eq!(series.total_volume(), common::total_volume(&trades));

    let output = dir.path().join("bars.csv");
    let rows = BarCsvWriter::new()
        .with_precision(settings.export.float_precision)
        .write_path(series.bars(), &output)
        .unwrap();

    let text = std::fs::read_to_string(&output).unwrap();
    assert_eq!(rows, series.len());
    assert_eq!(text.lines().count(), series.len() + 1);
    assert!(text.starts_with("date,open,high,low,close,volume,vwap\n"));
}

#[cfg(feature = "polars")]
#[test]
fn parquet_export_round_trip() {
    use databars::io::read_parquet_bars;
    use databars::PolarsExporter;

    let trades = generators::create_massive_realistic_dataset(5_000, 250_000);
    let series = create_bars(&trades, &BarSpec::time_minutes(1.0).unwrap()).unwrap();

    let dir = tempdir().unwrap();
    let path = dir.path().join("bars.parquet");
    PolarsExporter::new().export_parquet(series.bars(), &path).unwrap();

    assert_eq!(read_parquet_bars(&path).unwrap(), series.bars());
}
