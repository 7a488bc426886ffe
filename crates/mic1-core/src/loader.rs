//! Control-store and program image loading from external byte streams.
//!
//! Both loaders run once, before the first cycle, and fail fast: any load
//! error leaves the engine unstarted. The control-store image is a
//! sequence of 8-byte little-endian records (low 36 bits significant), up
//! to one per slot; trailing partial bytes are ignored, matching the
//! record-granular reads of the reference loader. The program image is a
//! 4-byte little-endian `size` field, a 20-byte initialization block
//! loaded at address 0, and `size − 20` body bytes loaded at the program
//! origin.

use std::io::Read;

use thiserror::Error;

use crate::control_store::{ControlStore, CONTROL_STORE_SLOTS};
use crate::memory::{MainMemory, INIT_BLOCK_BYTES, PROGRAM_ORIGIN};

/// Bytes per control-store image record.
pub const CONTROL_STORE_RECORD_BYTES: usize = 8;

/// Fatal image-load errors. None of these leave partial engine state that
/// execution could start from.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The underlying stream failed.
    #[error("image read failed: {0}")]
    Io(#[from] std::io::Error),
    /// The stream ended before a required field or block was complete.
    #[error("short read: got {read} bytes of {expected}")]
    ShortRead {
        /// Bytes actually read.
        read: usize,
        /// Bytes the format requires at this stage.
        expected: usize,
    },
    /// The declared program size is smaller than the initialization block.
    #[error("program size field {size} is smaller than the {INIT_BLOCK_BYTES} byte initialization block")]
    SizeBelowInitBlock {
        /// The declared size.
        size: u32,
    },
    /// The program does not fit in memory.
    #[error("program of {size} bytes does not fit in {capacity} bytes of memory")]
    ProgramTooLarge {
        /// The declared size.
        size: u64,
        /// The memory capacity it was checked against.
        capacity: usize,
    },
}

/// What the control-store loader read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlStoreReport {
    /// Number of microinstruction records loaded into slots `0..n`.
    pub words_read: usize,
}

/// What the program loader read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramReport {
    /// The `size` field declared by the image.
    pub declared_size: u32,
    /// Body bytes loaded at the program origin.
    pub body_read: usize,
}

/// Loads a control-store image into `store`, slot 0 first.
///
/// Fewer than [`CONTROL_STORE_SLOTS`] records is legal; remaining slots
/// stay zero. Records beyond the slot count are ignored.
///
/// # Errors
///
/// Returns [`LoadError::Io`] when the stream fails.
pub fn load_control_store<R: Read>(
    reader: &mut R,
    store: &mut ControlStore,
) -> Result<ControlStoreReport, LoadError> {
    let mut image = Vec::new();
    let _ = reader.read_to_end(&mut image)?;

    let words_read = (image.len() / CONTROL_STORE_RECORD_BYTES).min(CONTROL_STORE_SLOTS);
    for (slot, chunk) in image
        .chunks_exact(CONTROL_STORE_RECORD_BYTES)
        .take(words_read)
        .enumerate()
    {
        let mut record = [0_u8; CONTROL_STORE_RECORD_BYTES];
        record.copy_from_slice(chunk);
        store.set(slot as u16, u64::from_le_bytes(record));
    }

    Ok(ControlStoreReport { words_read })
}

/// Loads a program image into `memory`: the initialization block at
/// address 0 and the body at the program origin.
///
/// # Errors
///
/// Returns [`LoadError::ShortRead`] when the stream ends inside the size
/// field, the initialization block, or the body;
/// [`LoadError::SizeBelowInitBlock`] when the declared size cannot cover
/// the initialization block; [`LoadError::ProgramTooLarge`] when the
/// declared size exceeds capacity or the body overruns memory; and
/// [`LoadError::Io`] when the stream itself fails.
pub fn load_program<R: Read>(
    reader: &mut R,
    memory: &mut MainMemory,
) -> Result<ProgramReport, LoadError> {
    let mut size_field = [0_u8; 4];
    let read = read_fully(reader, &mut size_field)?;
    if read != size_field.len() {
        return Err(LoadError::ShortRead {
            read,
            expected: size_field.len(),
        });
    }
    let declared_size = u32::from_le_bytes(size_field);

    if (declared_size as usize) < INIT_BLOCK_BYTES {
        return Err(LoadError::SizeBelowInitBlock {
            size: declared_size,
        });
    }
    if declared_size as usize > memory.capacity() {
        return Err(LoadError::ProgramTooLarge {
            size: u64::from(declared_size),
            capacity: memory.capacity(),
        });
    }

    let body_len = declared_size as usize - INIT_BLOCK_BYTES;
    let capacity = memory.capacity();

    {
        let init = memory
            .slice_mut(0, INIT_BLOCK_BYTES)
            .ok_or(LoadError::ProgramTooLarge {
                size: u64::from(declared_size),
                capacity,
            })?;
        let read = read_fully(reader, init)?;
        if read != INIT_BLOCK_BYTES {
            return Err(LoadError::ShortRead {
                read,
                expected: INIT_BLOCK_BYTES,
            });
        }
    }

    let body = memory
        .slice_mut(PROGRAM_ORIGIN, body_len)
        .ok_or(LoadError::ProgramTooLarge {
            size: u64::from(declared_size),
            capacity,
        })?;
    let body_read = read_fully(reader, body)?;
    if body_read != body_len {
        return Err(LoadError::ShortRead {
            read: body_read,
            expected: body_len,
        });
    }

    Ok(ProgramReport {
        declared_size,
        body_read,
    })
}

/// Reads until `buf` is full or the stream ends, returning the byte count.
fn read_fully<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize, LoadError> {
    let mut filled = 0;
    while filled < buf.len() {
        let count = reader.read(&mut buf[filled..])?;
        if count == 0 {
            break;
        }
        filled += count;
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::{load_control_store, load_program, LoadError, CONTROL_STORE_RECORD_BYTES};
    use crate::control_store::{ControlStore, CONTROL_STORE_SLOTS};
    use crate::memory::{MainMemory, INIT_BLOCK_BYTES, PROGRAM_ORIGIN};

    fn program_image(body: &[u8]) -> Vec<u8> {
        let size = (INIT_BLOCK_BYTES + body.len()) as u32;
        let mut image = size.to_le_bytes().to_vec();
        image.extend(std::iter::repeat_n(0xAB, INIT_BLOCK_BYTES));
        image.extend_from_slice(body);
        image
    }

    #[test]
    fn control_store_records_land_in_order() {
        let mut image = Vec::new();
        image.extend_from_slice(&0x0000_000A_0000_0001_u64.to_le_bytes());
        image.extend_from_slice(&0x0000_0000_0000_0002_u64.to_le_bytes());

        let mut store = ControlStore::new();
        let report = load_control_store(&mut Cursor::new(image), &mut store).expect("loads");

        assert_eq!(report.words_read, 2);
        assert_eq!(store.fetch(0), 0x0000_000A_0000_0001);
        assert_eq!(store.fetch(1), 0x0000_0000_0000_0002);
        assert_eq!(store.fetch(2), 0);
    }

    #[test]
    fn empty_control_store_image_is_legal() {
        let mut store = ControlStore::new();
        let report =
            load_control_store(&mut Cursor::new(Vec::new()), &mut store).expect("loads");
        assert_eq!(report.words_read, 0);
    }

    #[test]
    fn trailing_partial_record_is_ignored() {
        let mut image = 0x42_u64.to_le_bytes().to_vec();
        image.extend_from_slice(&[1, 2, 3]);

        let mut store = ControlStore::new();
        let report = load_control_store(&mut Cursor::new(image), &mut store).expect("loads");
        assert_eq!(report.words_read, 1);
        assert_eq!(store.fetch(1), 0);
    }

    #[test]
    fn records_past_the_slot_count_are_ignored() {
        let image = vec![0_u8; (CONTROL_STORE_SLOTS + 3) * CONTROL_STORE_RECORD_BYTES];
        let mut store = ControlStore::new();
        let report = load_control_store(&mut Cursor::new(image), &mut store).expect("loads");
        assert_eq!(report.words_read, CONTROL_STORE_SLOTS);
    }

    #[test]
    fn program_body_lands_at_the_origin() {
        let mut memory = MainMemory::with_capacity(0x1000);
        let report =
            load_program(&mut Cursor::new(program_image(&[1, 2, 3])), &mut memory).expect("loads");

        assert_eq!(report.declared_size, 23);
        assert_eq!(report.body_read, 3);
        assert_eq!(memory.byte_at(0), Some(0xAB));
        assert_eq!(memory.byte_at(INIT_BLOCK_BYTES as u32 - 1), Some(0xAB));
        assert_eq!(memory.byte_at(PROGRAM_ORIGIN as u32), Some(1));
        assert_eq!(memory.byte_at(PROGRAM_ORIGIN as u32 + 2), Some(3));
    }

    #[test]
    fn empty_body_is_legal() {
        let mut memory = MainMemory::with_capacity(0x1000);
        let report = load_program(&mut Cursor::new(program_image(&[])), &mut memory)
            .expect("size 20 with no body loads");
        assert_eq!(report.body_read, 0);
    }

    #[test]
    fn truncated_size_field_is_a_short_read() {
        let mut memory = MainMemory::with_capacity(0x1000);
        let err = load_program(&mut Cursor::new(vec![1, 2]), &mut memory).unwrap_err();
        assert!(matches!(
            err,
            LoadError::ShortRead {
                read: 2,
                expected: 4
            }
        ));
    }

    #[test]
    fn truncated_init_block_is_a_short_read() {
        let mut image = 25_u32.to_le_bytes().to_vec();
        image.extend_from_slice(&[0; 7]);

        let mut memory = MainMemory::with_capacity(0x1000);
        let err = load_program(&mut Cursor::new(image), &mut memory).unwrap_err();
        assert!(matches!(
            err,
            LoadError::ShortRead {
                read: 7,
                expected: INIT_BLOCK_BYTES
            }
        ));
    }

    #[test]
    fn truncated_body_reports_read_versus_expected() {
        let mut image = program_image(&[9, 9, 9, 9]);
        let _ = image.pop();
        let _ = image.pop();

        let mut memory = MainMemory::with_capacity(0x1000);
        let err = load_program(&mut Cursor::new(image), &mut memory).unwrap_err();
        assert!(matches!(
            err,
            LoadError::ShortRead {
                read: 2,
                expected: 4
            }
        ));
    }

    #[test]
    fn declared_size_below_init_block_is_rejected() {
        let image = 7_u32.to_le_bytes().to_vec();
        let mut memory = MainMemory::with_capacity(0x1000);
        let err = load_program(&mut Cursor::new(image), &mut memory).unwrap_err();
        assert!(matches!(err, LoadError::SizeBelowInitBlock { size: 7 }));
    }

    #[test]
    fn oversized_program_is_rejected_before_any_write() {
        let image = 0x2000_u32.to_le_bytes().to_vec();
        let mut memory = MainMemory::with_capacity(0x1000);
        let err = load_program(&mut Cursor::new(image), &mut memory).unwrap_err();
        assert!(matches!(err, LoadError::ProgramTooLarge { .. }));
        assert_eq!(memory.byte_at(0), Some(0));
    }

    #[test]
    fn body_overrunning_the_origin_window_is_rejected() {
        // Declared size fits capacity, but origin + body does not.
        let mut memory = MainMemory::with_capacity(0x500);
        let image = program_image(&vec![0_u8; 0x200]);
        let err = load_program(&mut Cursor::new(image), &mut memory).unwrap_err();
        assert!(matches!(err, LoadError::ProgramTooLarge { .. }));
    }
}
