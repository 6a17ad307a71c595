use sqd_bloom_writer::cli::{init_logging, run, Cli};
use sqd_bloom_writer::format::FilterStatsFormat;


fn main() -> anyhow::Result<()> {
    let args = Cli::parse_or_exit(
        "filter-stats",
        "Writes `blockId,timestamp,numOnes` for every block, where numOnes counts the set bits of logsBloom"
    );

    init_logging(args.json_log);

    run(&args, FilterStatsFormat::new())?;
    Ok(())
}
