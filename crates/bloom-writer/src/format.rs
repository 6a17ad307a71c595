use sqd_bloom_data::{Block, BlockNumber, LogsBloom, BLOOM_SIZE};
use std::io::{self, ErrorKind, Read, Write};


/// Serializes one block into one output record.
pub trait RecordFormat {
    fn name(&self) -> &'static str;

    /// Writes the record and returns its size in bytes.
    fn write_record(&mut self, block: &Block, out: &mut dyn Write) -> io::Result<usize>;
}


/// Big-endian u32 block number followed by the raw filter bytes
pub const RECORD_SIZE: usize = 4 + BLOOM_SIZE;


/// Dense binary format: fixed size records, no header, no delimiters.
pub struct FilterRecordFormat {
    buf: [u8; RECORD_SIZE]
}


impl FilterRecordFormat {
    pub fn new() -> Self {
        Self {
            buf: [0; RECORD_SIZE]
        }
    }
}


impl Default for FilterRecordFormat {
    fn default() -> Self {
        Self::new()
    }
}


impl RecordFormat for FilterRecordFormat {
    fn name(&self) -> &'static str {
        "binary"
    }

    fn write_record(&mut self, block: &Block, out: &mut dyn Write) -> io::Result<usize> {
        self.buf[..4].copy_from_slice(&block.number.to_be_bytes());
        self.buf[4..].copy_from_slice(block.logs_bloom.as_bytes());
        out.write_all(&self.buf)?;
        Ok(RECORD_SIZE)
    }
}


/// `<number>,<timestamp>,<popcount>` lines, no header
pub struct FilterStatsFormat {
    line: Vec<u8>
}


impl FilterStatsFormat {
    pub fn new() -> Self {
        Self {
            line: Vec::with_capacity(64)
        }
    }
}


impl Default for FilterStatsFormat {
    fn default() -> Self {
        Self::new()
    }
}


impl RecordFormat for FilterStatsFormat {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn write_record(&mut self, block: &Block, out: &mut dyn Write) -> io::Result<usize> {
        self.line.clear();
        writeln!(
            self.line,
            "{},{},{}",
            block.number,
            block.timestamp,
            block.logs_bloom.count_ones()
        )?;
        out.write_all(&self.line)?;
        Ok(self.line.len())
    }
}


#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterRecord {
    pub number: BlockNumber,
    pub logs_bloom: LogsBloom,
}


impl FilterRecord {
    pub fn from_bytes(bytes: &[u8; RECORD_SIZE]) -> Self {
        let mut number = [0; 4];
        number.copy_from_slice(&bytes[..4]);
        let mut bloom = [0; BLOOM_SIZE];
        bloom.copy_from_slice(&bytes[4..]);
        Self {
            number: BlockNumber::from_be_bytes(number),
            logs_bloom: LogsBloom::new(bloom)
        }
    }
}


/// Reads back the records written with [FilterRecordFormat], front to back.
pub fn read_filter_records<R: Read>(mut reader: R) -> impl Iterator<Item = io::Result<FilterRecord>> {
    let mut buf = [0; RECORD_SIZE];

    let mut next = move || -> io::Result<Option<FilterRecord>> {
        let mut filled = 0;
        while filled < RECORD_SIZE {
            match reader.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => {},
                Err(err) => return Err(err)
            }
        }
        match filled {
            0 => Ok(None),
            RECORD_SIZE => Ok(Some(FilterRecord::from_bytes(&buf))),
            n => Err(io::Error::new(
                ErrorKind::UnexpectedEof,
                format!("truncated filter record: got {} of {} bytes", n, RECORD_SIZE)
            ))
        }
    };

    std::iter::from_fn(move || next().transpose())
}
