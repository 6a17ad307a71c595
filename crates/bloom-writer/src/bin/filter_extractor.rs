use sqd_bloom_writer::cli::{init_logging, run, Cli};
use sqd_bloom_writer::format::FilterRecordFormat;


fn main() -> anyhow::Result<()> {
    let args = Cli::parse_or_exit(
        "filter-extractor",
        "Writes the height and the raw logsBloom of every block as a 260-byte binary record"
    );

    init_logging(args.json_log);

    run(&args, FilterRecordFormat::new())?;
    Ok(())
}
