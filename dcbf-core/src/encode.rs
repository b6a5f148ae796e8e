//! Кодирование сырых выборок в бинарную нагрузку.
//!
//! Зеркало [`crate::decode`]: байт-ориентированная запись и битовая
//! упаковка старшим битом вперёд с паддингом каждого блока до
//! `ReadBlockSizeInBytes`.

use byteorder::{BigEndian, LittleEndian, WriteBytesExt};
use dcbf_types::{ByteOrder, DcbfError, DcbfResult, FileDescriptor};

/// Размер одного блока записи в байтах для данной геометрии каналов.
pub fn block_size_in_bytes(desc: &FileDescriptor) -> u32 {
    if desc.is_byte_aligned() {
        (desc.read_block_size as usize * desc.bytes_per_scan()) as u32
    } else {
        let bits = desc.read_block_size as usize * desc.bits_per_scan();
        bits.div_ceil(8) as u32
    }
}

/// Кодирует поканальные сырые значения в бинарную нагрузку.
///
/// `samples` — по одному буферу на канал, равной длины, кратной
/// `ReadBlockSize`: в файл пишутся только целые блоки. Для каналов со
/// сжатием LSB младшие биты отбрасываются здесь же.
pub fn encode(
    desc: &FileDescriptor,
    samples: &[Vec<i64>],
) -> DcbfResult<Vec<u8>> {
    if samples.len() != desc.channel_count() {
        return Err(DcbfError::format_violation(format!(
            "Expected {} channel buffers, got {}",
            desc.channel_count(),
            samples.len()
        )));
    }

    let rows = samples.first().map_or(0, Vec::len);
    if samples.iter().any(|s| s.len() != rows) {
        return Err(DcbfError::format_violation(
            "Channel buffers must have equal lengths",
        ));
    }
    if desc.read_block_size == 0 || rows % desc.read_block_size as usize != 0 {
        return Err(DcbfError::format_violation(format!(
            "Sample count {rows} is not a multiple of ReadBlockSize {}",
            desc.read_block_size
        )));
    }

    if desc.is_byte_aligned() {
        encode_byte_aligned(desc, samples, rows)
    } else {
        encode_bit_packed(desc, samples, rows)
    }
}

fn encode_byte_aligned(
    desc: &FileDescriptor,
    samples: &[Vec<i64>],
    rows: usize,
) -> DcbfResult<Vec<u8>> {
    let mut out = Vec::with_capacity(rows * desc.bytes_per_scan());

    for row in 0..rows {
        for (chan, buf) in desc.channels.iter().zip(samples) {
            let n = chan.raw_sample_size_in_bytes();
            let masked = mask_bits(buf[row], chan.raw_sample_size_in_bits);

            match chan.byte_order {
                ByteOrder::LittleEndian => out.write_uint::<LittleEndian>(masked, n)?,
                ByteOrder::BigEndian => out.write_uint::<BigEndian>(masked, n)?,
            }
        }
    }

    Ok(out)
}

fn encode_bit_packed(
    desc: &FileDescriptor,
    samples: &[Vec<i64>],
    rows: usize,
) -> DcbfResult<Vec<u8>> {
    let block_bytes = desc.read_block_size_in_bytes as usize;
    let min_block_bytes = (desc.read_block_size as usize * desc.bits_per_scan()).div_ceil(8);
    if block_bytes < min_block_bytes {
        return Err(DcbfError::format_violation(format!(
            "ReadBlockSizeInBytes {block_bytes} cannot hold a {min_block_bytes}-byte block"
        )));
    }

    let blocks = rows / desc.read_block_size as usize;
    let mut out = Vec::with_capacity(blocks * block_bytes);

    for block in 0..blocks {
        let mut bits = BitWriter::new();

        for row in 0..desc.read_block_size as usize {
            let idx = block * desc.read_block_size as usize + row;

            for (chan, buf) in desc.channels.iter().zip(samples) {
                let size = chan.compressed_sample_size_in_bits;
                // Сжатие с потерями: младшие биты отбрасываются
                let val = mask_bits(buf[idx] >> chan.lsb_bits_removed(), size);
                bits.push(val, size);
            }
        }

        let packed = bits.finish();
        out.extend_from_slice(&packed);
        // Паддинг блока до декларированного размера
        out.resize(out.len() + block_bytes - packed.len(), 0);
    }

    Ok(out)
}

/// Младшие `bits` битов значения в беззнаковом представлении.
fn mask_bits(
    val: i64,
    bits: u32,
) -> u64 {
    if bits >= 64 {
        val as u64
    } else {
        (val as u64) & ((1u64 << bits) - 1)
    }
}

/// Битовый аккумулятор, старшим битом вперёд.
struct BitWriter {
    out: Vec<u8>,
    cur: u8,
    nbits: u32,
}

impl BitWriter {
    fn new() -> Self {
        Self {
            out: Vec::new(),
            cur: 0,
            nbits: 0,
        }
    }

    fn push(
        &mut self,
        val: u64,
        n: u32,
    ) {
        for i in (0..n).rev() {
            self.cur = (self.cur << 1) | ((val >> i) & 1) as u8;
            self.nbits += 1;
            if self.nbits == 8 {
                self.out.push(self.cur);
                self.cur = 0;
                self.nbits = 0;
            }
        }
    }

    /// Сбрасывает неполный байт, дополняя его нулями справа.
    fn finish(mut self) -> Vec<u8> {
        if self.nbits > 0 {
            self.out.push(self.cur << (8 - self.nbits));
        }
        self.out
    }
}
