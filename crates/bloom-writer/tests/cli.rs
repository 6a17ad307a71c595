use flate2::write::GzEncoder;
use flate2::Compression;
use serde_json::json;
use sqd_bloom_writer::format::{read_filter_records, RECORD_SIZE};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;


const EXTRACTOR: &str = env!("CARGO_BIN_EXE_filter-extractor");
const STATS: &str = env!("CARGO_BIN_EXE_filter-stats");


fn bloom(last_byte: &str) -> String {
    format!("0x{}{}", "00".repeat(255), last_byte)
}


fn block(number: u32, last_byte: &str) -> serde_json::Value {
    json!({
        "number": format!("{:#x}", number),
        "timestamp": (1600000000 + number as u64).to_string(),
        "logsBloom": bloom(last_byte),
        "miner": "0x0000000000000000000000000000000000000000",
        "transactions": []
    })
}


fn write_input(dir: &TempDir, blocks: &serde_json::Value) -> PathBuf {
    let path = dir.path().join("blocks.json.gz");
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(blocks.to_string().as_bytes()).unwrap();
    std::fs::write(&path, encoder.finish().unwrap()).unwrap();
    path
}


fn run(bin: &str, input: &Path, output: &Path) -> Output {
    Command::new(bin)
        .arg(input)
        .arg(output)
        .env("RUST_LOG", "warn")
        .output()
        .unwrap()
}


#[test]
fn example_block() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let input = write_input(&dir, &json!([{
        "number": "0x1a",
        "timestamp": "1600000000",
        "logsBloom": bloom("ff")
    }]));

    let bin_out = dir.path().join("filters.bin");
    assert!(run(EXTRACTOR, &input, &bin_out).status.success());
    let bytes = std::fs::read(&bin_out)?;
    assert_eq!(bytes.len(), RECORD_SIZE);
    assert_eq!(&bytes[..4], &[0x00, 0x00, 0x00, 0x1a]);
    assert!(bytes[4..RECORD_SIZE - 1].iter().all(|b| *b == 0));
    assert_eq!(bytes[RECORD_SIZE - 1], 0xff);

    let csv_out = dir.path().join("stats.csv");
    assert!(run(STATS, &input, &csv_out).status.success());
    assert_eq!(std::fs::read_to_string(&csv_out)?, "26,1600000000,8\n");
    Ok(())
}


#[test]
fn one_record_per_block() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let blocks: Vec<_> = (0..100).map(|i| block(i, "01")).collect();
    let input = write_input(&dir, &json!(blocks));

    let bin_out = dir.path().join("filters.bin");
    assert!(run(EXTRACTOR, &input, &bin_out).status.success());
    let records = read_filter_records(std::fs::File::open(&bin_out)?)
        .collect::<Result<Vec<_>, _>>()?;
    assert_eq!(records.len(), 100);
    assert!(records.iter().enumerate().all(|(i, r)| r.number == i as u32));
    assert_eq!(std::fs::metadata(&bin_out)?.len(), 100 * RECORD_SIZE as u64);

    let csv_out = dir.path().join("stats.csv");
    assert!(run(STATS, &input, &csv_out).status.success());
    let text = std::fs::read_to_string(&csv_out)?;
    assert!(text.ends_with('\n'));
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines.len(), 100);
    assert_eq!(lines[42], "42,1600000042,1");
    Ok(())
}


#[test]
fn empty_array() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let input = write_input(&dir, &json!([]));

    for bin in [EXTRACTOR, STATS] {
        let output = dir.path().join("out");
        std::fs::write(&output, b"stale content")?;
        assert!(run(bin, &input, &output).status.success());
        assert_eq!(std::fs::metadata(&output)?.len(), 0);
    }
    Ok(())
}


#[test]
fn malformed_gzip() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("blocks.json.gz");
    std::fs::write(&input, br#"[{"number": "0x1"}]"#)?;

    for bin in [EXTRACTOR, STATS] {
        let output = dir.path().join("out");
        let result = run(bin, &input, &output);
        assert_eq!(result.status.code(), Some(1));
        assert!(String::from_utf8_lossy(&result.stderr).contains("gzip"));
        let len = std::fs::metadata(&output).map(|m| m.len()).unwrap_or(0);
        assert_eq!(len, 0);
    }
    Ok(())
}


#[test]
fn bad_bloom_stops_the_run() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let mut broken = block(2, "00");
    broken["logsBloom"] = json!(format!("0x{}", "00".repeat(255)));
    let input = write_input(&dir, &json!([block(0, "00"), block(1, "00"), broken, block(3, "00")]));

    let bin_out = dir.path().join("filters.bin");
    let result = run(EXTRACTOR, &input, &bin_out);
    assert_eq!(result.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&result.stderr).contains("block 2"));
    assert_eq!(std::fs::metadata(&bin_out)?.len(), 2 * RECORD_SIZE as u64);

    let csv_out = dir.path().join("stats.csv");
    let result = run(STATS, &input, &csv_out);
    assert_eq!(result.status.code(), Some(1));
    assert_eq!(std::fs::read_to_string(&csv_out)?, "0,1600000000,0\n1,1600000001,0\n");
    Ok(())
}


#[test]
fn missing_input_file() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let output = dir.path().join("out");
    let result = run(STATS, &dir.path().join("missing.json.gz"), &output);
    assert_eq!(result.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&result.stderr).contains("failed to open"));
    assert!(!output.exists());
    Ok(())
}


#[test]
fn missing_arguments() {
    for bin in [EXTRACTOR, STATS] {
        let result = Command::new(bin).output().unwrap();
        assert_eq!(result.status.code(), Some(1));
        assert!(String::from_utf8_lossy(&result.stderr).contains("Usage"));

        let result = Command::new(bin).arg("only-input.json.gz").output().unwrap();
        assert_eq!(result.status.code(), Some(1));
    }
}


#[test]
fn help() {
    let result = Command::new(STATS).arg("--help").output().unwrap();
    assert!(result.status.success());
    assert!(String::from_utf8_lossy(&result.stdout).contains("numOnes"));
}
