use crate::format::RecordFormat;
use crate::progress::Progress;
use sqd_bloom_data::{Block, BlockNumber, Result};
use std::io::Write;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};


#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SinkStats {
    pub blocks: u64,
    pub bytes: u64,
    pub last_block: Option<BlockNumber>,
}


/// Pulls blocks one at a time and writes one record per block.
///
/// The first error stops the run. Records written before it are
/// left in the output.
pub struct Sink<F> {
    format: F,
    progress: Progress,
    report_interval: Duration,
}


impl<F: RecordFormat> Sink<F> {
    pub fn new(format: F) -> Self {
        let window_size = NonZeroUsize::new(10).unwrap();
        let granularity = Duration::from_secs(1);
        Self {
            format,
            progress: Progress::new(window_size, granularity),
            report_interval: Duration::from_secs(5),
        }
    }

    pub fn with_report_interval(mut self, interval: Duration) -> Self {
        self.report_interval = interval;
        self
    }

    pub fn write<I, W>(&mut self, blocks: I, mut out: W) -> Result<SinkStats>
    where
        I: IntoIterator<Item = Result<Block>>,
        W: Write
    {
        tracing::info!(format = self.format.name(), "writing filter records");

        let mut stats = SinkStats::default();
        let mut last_report = Instant::now();

        for block in blocks {
            let block = block?;

            let size = self.format.write_record(&block, &mut out)?;
            stats.blocks += 1;
            stats.bytes += size as u64;
            stats.last_block = Some(block.number);

            self.progress.set_current_value(block.number as u64);
            if last_report.elapsed() > self.report_interval {
                self.report();
                last_report = Instant::now();
            }
        }

        out.flush()?;

        if self.progress.has_news() {
            self.report();
        }

        tracing::info!(
            blocks = stats.blocks,
            bytes = stats.bytes,
            last_block = ?stats.last_block,
            "done"
        );

        Ok(stats)
    }

    fn report(&mut self) {
        let speed = self.progress.speed();
        tracing::info!(
            "last block: {}, progress: {} blocks/sec",
            self.progress.current_value().unwrap_or_default(),
            speed.round(),
        );
    }
}
