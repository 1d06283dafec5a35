//! Recorded streams: a flat sequence of `[u32 LE length][packet]` records.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};
use memmap2::Mmap;

use crate::error::{Result, ViewerError};

const RECORD_PREFIX_SIZE: usize = 4;

/// Memory-mapped capture reader with zero-copy packet access.
pub struct CaptureReader {
    mmap: Mmap,
    /// Byte offset and length of each packet.
    index: Vec<(usize, usize)>,
}

impl CaptureReader {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };
        let index = index_records(&mmap)?;
        tracing::debug!(path = %path.display(), packets = index.len(), "capture opened");
        Ok(Self { mmap, index })
    }

    pub fn packet_count(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn packet(&self, i: usize) -> Option<&[u8]> {
        let &(offset, len) = self.index.get(i)?;
        Some(&self.mmap[offset..offset + len])
    }

    pub fn packets(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.index
            .iter()
            .map(move |&(offset, len)| &self.mmap[offset..offset + len])
    }

    pub fn total_bytes(&self) -> usize {
        self.mmap.len()
    }
}

fn index_records(data: &[u8]) -> Result<Vec<(usize, usize)>> {
    let mut index = Vec::new();
    let mut pos = 0usize;
    while pos < data.len() {
        if data.len() - pos < RECORD_PREFIX_SIZE {
            return Err(ViewerError::MalformedFrame(format!(
                "capture truncated inside record prefix at byte {pos}"
            )));
        }
        let mut prefix = [0u8; RECORD_PREFIX_SIZE];
        prefix.copy_from_slice(&data[pos..pos + RECORD_PREFIX_SIZE]);
        let len = u32::from_le_bytes(prefix) as usize;
        let start = pos + RECORD_PREFIX_SIZE;
        if data.len() - start < len {
            return Err(ViewerError::MalformedFrame(format!(
                "capture record {} at byte {pos} declares {len} bytes, only {} remain",
                index.len(),
                data.len() - start
            )));
        }
        index.push((start, len));
        pos = start + len;
    }
    Ok(index)
}

/// Appends packets to a capture file.
pub struct CaptureWriter {
    out: BufWriter<File>,
    written: usize,
}

impl CaptureWriter {
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            out: BufWriter::new(file),
            written: 0,
        })
    }

    pub fn write_packet(&mut self, packet: &[u8]) -> Result<()> {
        let len = u32::try_from(packet.len())
            .map_err(|_| ViewerError::MalformedFrame("packet exceeds 4 GiB".into()))?;
        self.out.write_u32::<LittleEndian>(len)?;
        self.out.write_all(packet)?;
        self.written += 1;
        Ok(())
    }

    pub fn packets_written(&self) -> usize {
        self.written
    }

    pub fn finish(mut self) -> Result<usize> {
        self.out.flush()?;
        Ok(self.written)
    }
}
