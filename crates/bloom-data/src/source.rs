use crate::error::{DecodeError, Error, FieldError, Result};
use crate::model::{Block, RawBlock};
use flate2::read::MultiGzDecoder;
use serde::Deserialize;
use serde_json::error::Category;
use std::fs::File;
use std::io::{self, BufRead, BufReader, ErrorKind, Read};
use std::iter::FusedIterator;
use std::path::Path;


const READ_BUFFER_SIZE: usize = 64 * 1024;


#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum State {
    /// `[` not consumed yet
    Start,
    /// inside the array, no element read yet
    First,
    /// inside the array, an element separator or `]` is expected
    Next,
    Done,
    Failed,
}


/// Lazy, forward-only sequence of blocks read from a gzip compressed JSON array.
///
/// The array is framed by hand, and every element is handed to a fresh
/// `serde_json` deserializer, so no more than one element is parsed at a time.
/// The underlying reader is owned by the source and released on drop.
pub struct BlockSource<R> {
    reader: BufReader<MultiGzDecoder<R>>,
    state: State,
    index: u64,
}


impl BlockSource<File> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(file))
    }
}


impl<R: Read> BlockSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::with_capacity(READ_BUFFER_SIZE, MultiGzDecoder::new(reader)),
            state: State::Start,
            index: 0,
        }
    }

    /// Index of the next array element
    pub fn position(&self) -> u64 {
        self.index
    }

    fn read_next(&mut self) -> Result<Option<Block>> {
        if self.state == State::Start {
            match self.peek_token()? {
                Some(b'[') => self.reader.consume(1),
                Some(found) => return Err(DecodeError::NotAnArray { found }.into()),
                None => return Err(DecodeError::UnexpectedEof.into())
            }
            self.state = State::First;
        }

        let token = self.peek_token()?.ok_or(DecodeError::UnexpectedEof)?;

        if token == b']' {
            self.reader.consume(1);
            self.expect_end()?;
            self.state = State::Done;
            tracing::debug!(blocks = self.index, "reached the end of the block array");
            return Ok(None)
        }

        if self.state == State::Next {
            if token != b',' {
                return Err(DecodeError::UnexpectedToken {
                    index: self.index - 1,
                    found: token
                }.into())
            }
            self.reader.consume(1);
        }

        let raw = self.read_element()?;
        let block = Block::from_raw(raw, self.index)?;
        self.index += 1;
        self.state = State::Next;
        Ok(Some(block))
    }

    fn read_element(&mut self) -> Result<RawBlock> {
        let result = {
            let mut de = serde_json::Deserializer::from_reader(&mut self.reader);
            RawBlock::deserialize(&mut de)
        };
        result.map_err(|err| element_error(err, self.index))
    }

    /// Skips JSON whitespace and returns the next byte without consuming it.
    fn peek_token(&mut self) -> Result<Option<u8>> {
        loop {
            let buf = self.reader.fill_buf().map_err(stream_error)?;
            if buf.is_empty() {
                return Ok(None)
            }
            let len = buf.len();
            match buf.iter().position(|b| !is_whitespace(*b)) {
                Some(pos) => {
                    let token = buf[pos];
                    self.reader.consume(pos);
                    return Ok(Some(token))
                },
                None => self.reader.consume(len)
            }
        }
    }

    /// Reads the stream to the end, which also makes the decoder verify
    /// the gzip trailer.
    fn expect_end(&mut self) -> Result<()> {
        match self.peek_token()? {
            None => Ok(()),
            Some(found) => Err(DecodeError::TrailingData { found }.into())
        }
    }
}


impl<R: Read> Iterator for BlockSource<R> {
    type Item = Result<Block>;

    fn next(&mut self) -> Option<Self::Item> {
        if matches!(self.state, State::Done | State::Failed) {
            return None
        }
        let result = self.read_next();
        if result.is_err() {
            self.state = State::Failed;
        }
        result.transpose()
    }
}


impl<R: Read> FusedIterator for BlockSource<R> {}


fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}


fn stream_error(err: io::Error) -> Error {
    match err.kind() {
        ErrorKind::InvalidInput | ErrorKind::InvalidData | ErrorKind::UnexpectedEof => {
            DecodeError::Gzip(err).into()
        },
        _ => Error::Io(err)
    }
}


fn element_error(err: serde_json::Error, index: u64) -> Error {
    match err.classify() {
        Category::Io => stream_error(io::Error::from(err)),
        Category::Syntax | Category::Eof => DecodeError::Json(err).into(),
        Category::Data => FieldError::Malformed {
            index,
            reason: err.to_string()
        }.into()
    }
}
