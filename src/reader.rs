use crate::{
    result::{LoaderError, Result},
    scanner::{Scanner, Statement},
};
use std::collections::VecDeque;
use std::io::{ErrorKind, Read};

pub const DEFAULT_CHUNK_SIZE: usize = 1 << 15;

/// Iterator of statements pulled from a UTF-8 byte stream.
///
/// The stream is read `chunk_size` bytes at a time; a multi-byte character split between
/// two reads is carried over, so memory stays proportional to the chunk size plus the
/// longest statement. Iteration stops after the first error.
pub struct StatementReader<R: Read> {
    reader: R,
    scanner: Scanner,
    buf: Vec<u8>,
    carry: Vec<u8>,
    pending: VecDeque<Statement>,
    bytes_read: u64,
    done: bool,
}

impl<R: Read> StatementReader<R> {
    pub fn new(reader: R) -> Self {
        Self::with_chunk_size(reader, DEFAULT_CHUNK_SIZE)
    }

    pub fn with_chunk_size(reader: R, chunk_size: usize) -> Self {
        StatementReader {
            reader,
            scanner: Scanner::new(),
            buf: vec![0; chunk_size.max(1)],
            carry: Vec::new(),
            pending: VecDeque::new(),
            bytes_read: 0,
            done: false,
        }
    }

    /// Bytes consumed from the underlying reader so far
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    fn fail(&mut self, err: LoaderError) -> Option<Result<Statement>> {
        self.done = true;
        Some(Err(err))
    }

    /// Read and scan one chunk. Returns `Ok(false)` at end of stream.
    fn fill(&mut self) -> Result<bool> {
        let n = loop {
            match self.reader.read(&mut self.buf) {
                Ok(n) => break n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        };

        if n == 0 {
            if !self.carry.is_empty() {
                let offset = self.bytes_read - self.carry.len() as u64;
                return Err(LoaderError::InvalidUtf8 { offset });
            }
            self.pending.extend(self.scanner.finish());
            return Ok(false);
        }

        self.bytes_read += n as u64;
        self.carry.extend_from_slice(&self.buf[..n]);

        let valid = match std::str::from_utf8(&self.carry) {
            Ok(_) => self.carry.len(),
            // incomplete sequence at the end, completed by the next read
            Err(e) if e.error_len().is_none() => e.valid_up_to(),
            Err(e) => {
                let offset = self.bytes_read - self.carry.len() as u64 + e.valid_up_to() as u64;
                return Err(LoaderError::InvalidUtf8 { offset });
            }
        };

        if let Ok(text) = std::str::from_utf8(&self.carry[..valid]) {
            self.pending.extend(self.scanner.feed(text));
        }
        self.carry.drain(..valid);
        Ok(true)
    }
}

impl<R: Read> Iterator for StatementReader<R> {
    type Item = Result<Statement>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(statement) = self.pending.pop_front() {
                return Some(Ok(statement));
            }
            if self.done {
                return None;
            }
            match self.fill() {
                Ok(true) => {}
                Ok(false) => self.done = true,
                Err(e) => return self.fail(e),
            }
        }
    }
}

/// Count-only pre-scan: number of statements starting with INSERT
pub fn count_insert_statements<R: Read>(reader: R, chunk_size: usize) -> Result<u64> {
    let mut count = 0;
    for statement in StatementReader::with_chunk_size(reader, chunk_size) {
        if statement?.is_insert() {
            count += 1;
        }
    }
    Ok(count)
}
