//! File-level ingestion and output through the bar pipeline

use databars_core::{create_bars, BarSpec, FixedPoint};
use databars_io::{BarCsvWriter, ReadError, TradeCsvLayout, TradeCsvReader};
use std::fs;
use tempfile::tempdir;

const TICKS: &str = "\
Date,Time,Price,Volume
09/01/2013,17:00:00.000,10,1
09/01/2013,17:00:01.000,12,1
09/01/2013,17:00:02.000,11,2
";

#[test]
fn tick_file_to_bar_file() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("ticks.csv");
    let output = dir.path().join("out").join("bars.csv");
    fs::write(&input, TICKS).unwrap();

    let trades = TradeCsvReader::default().read_path(&input).unwrap();
    assert_eq!(trades.len(), 3);

    let series = create_bars(&trades, &BarSpec::tick(2).unwrap()).unwrap();
    let rows = BarCsvWriter::new()
        .with_precision(2)
        .write_path(series.bars(), &output)
        .unwrap();
    assert_eq!(rows, 2);

    let written = fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(
        lines,
        vec![
            "date,open,high,low,close,volume,vwap",
            "2013-09-01 17:00:01.000000,10.00,12.00,10.00,12.00,2.00,11.00",
            "2013-09-01 17:00:02.000000,11.00,11.00,11.00,11.00,2.00,11.00",
        ]
    );
}

#[test]
fn semicolon_epoch_layout() {
    let csv = "ts;px;qty\n1378054800000;1640.25;3\n1378054800500;1640.50;1\n";
    let layout = TradeCsvLayout {
        price_column: "px".to_string(),
        volume_column: "qty".to_string(),
        delimiter: b';',
        ..TradeCsvLayout::epoch("ts")
    };

    let trades = TradeCsvReader::new(layout).read_from(csv.as_bytes()).unwrap();
    let series = create_bars(&trades, &BarSpec::volume(4.0).unwrap()).unwrap();

    assert_eq!(series.len(), 1);
    let bar = series.bars()[0];
    assert_eq!(bar.open_time, 1_378_054_800_000_000);
    assert_eq!(bar.date, 1_378_054_800_500_000);
    assert_eq!(bar.vwap, FixedPoint::from_str("1640.3125").unwrap());
}

#[test]
fn missing_input_file() {
    let dir = tempdir().unwrap();
    let err = TradeCsvReader::default()
        .read_path(dir.path().join("absent.csv"))
        .unwrap_err();
    assert!(matches!(err, ReadError::Open { .. }));
}
