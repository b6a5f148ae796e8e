//! Декодирование бинарной нагрузки в масштабированные выборки.
//!
//! Два пути, выбираемые по геометрии каналов:
//! - байт-ориентированный — сжатия нет либо сжатые выборки выровнены по
//!   границе байта (little-endian, размер кратен 8);
//! - битовый — выборки упакованы вплотную, старшим битом вперёд, блоками
//!   по `ReadBlockSizeInBytes` байт с паддингом в хвосте каждого блока.
//!
//! Исчерпание буфера посреди скана — не ошибка: декодирование
//! останавливается, частичный результат возвращается с флагом
//! `truncated`.

use byteorder::{BigEndian, LittleEndian, ReadBytesExt};
use dcbf_types::{ByteOrder, DcbfError, DcbfResult, FileDescriptor};

/// Результат декодирования: по одному буферу на канал.
#[derive(Debug, Clone)]
pub struct DecodedSamples {
    /// Масштабированные выборки в порядке объявления каналов
    pub channels: Vec<Vec<f64>>,
    /// Полностью декодированных выборок на канал
    pub samples: u32,
    /// Буфер закончился посреди блока — хвост отброшен
    pub truncated: bool,
}

/// Масштабирующий полином: `Σ coeffs[i] * raw^i`, `raw^0 = 1`.
///
/// Коэффициенты идут от свободного члена к старшим степеням. NaN/Inf при
/// экстремальных значениях не перехватываются.
pub fn scale(
    raw: i64,
    coeffs: &[f64],
) -> f64 {
    let mut acc = 0.0;
    let mut polynom = 1.0;

    for c in coeffs {
        acc += c * polynom;
        polynom *= raw as f64;
    }

    acc
}

/// Декодирует нагрузку целиком, выбирая путь по геометрии каналов.
pub fn decode(
    desc: &FileDescriptor,
    payload: &[u8],
) -> DcbfResult<DecodedSamples> {
    validate_geometry(desc)?;

    if desc.is_byte_aligned() {
        decode_byte_aligned(desc, payload)
    } else {
        Ok(decode_bit_packed(desc, payload))
    }
}

/// Геометрия каналов обязана быть представимой до начала декодирования;
/// иначе результат не определён и файл отвергается.
fn validate_geometry(desc: &FileDescriptor) -> DcbfResult<()> {
    if desc.channels.is_empty() {
        return Err(DcbfError::format_violation("No channels to decode"));
    }
    if desc.read_block_size == 0 {
        return Err(DcbfError::format_violation("ReadBlockSize must be >= 1"));
    }

    if desc.is_byte_aligned() {
        for chan in &desc.channels {
            let size = chan.raw_sample_size_in_bits;
            if size % 8 != 0 || !(8..=32).contains(&size) {
                return Err(DcbfError::format_violation(format!(
                    "Channel '{}': raw sample size {size} bits is not byte-decodable",
                    chan.name
                )));
            }
        }
    } else {
        if desc.read_block_size_in_bytes == 0 {
            return Err(DcbfError::format_violation(
                "ReadBlockSizeInBytes must be >= 1 for packed data",
            ));
        }
        for chan in &desc.channels {
            let size = chan.compressed_sample_size_in_bits;
            let real_size = size + chan.lsb_bits_removed();
            if size == 0 || real_size > 32 {
                return Err(DcbfError::format_violation(format!(
                    "Channel '{}': reconstructed sample size {real_size} bits is unsupported",
                    chan.name
                )));
            }
        }
    }

    Ok(())
}

fn decode_byte_aligned(
    desc: &FileDescriptor,
    payload: &[u8],
) -> DcbfResult<DecodedSamples> {
    let bytes_per_scan = desc.bytes_per_scan();
    let mut channels = vec![Vec::new(); desc.channel_count()];
    let mut samples = 0u32;
    let mut buf = payload;

    'outer: while !buf.is_empty() {
        // Один блок: read_block_size сканов
        for _ in 0..desc.read_block_size {
            if buf.len() < bytes_per_scan {
                break 'outer;
            }

            for (i, chan) in desc.channels.iter().enumerate() {
                let n = chan.raw_sample_size_in_bytes();
                let raw: i64 = match (chan.byte_order, chan.signed) {
                    (ByteOrder::LittleEndian, true) => buf.read_int::<LittleEndian>(n)?,
                    (ByteOrder::LittleEndian, false) => buf.read_uint::<LittleEndian>(n)? as i64,
                    (ByteOrder::BigEndian, true) => buf.read_int::<BigEndian>(n)?,
                    (ByteOrder::BigEndian, false) => buf.read_uint::<BigEndian>(n)? as i64,
                };

                channels[i].push(scale(raw, &chan.scaling_coeffs));
            }

            samples += 1;
        }
    }

    let truncated = !buf.is_empty() || samples % desc.read_block_size != 0;

    Ok(DecodedSamples {
        channels,
        samples,
        truncated,
    })
}

fn decode_bit_packed(
    desc: &FileDescriptor,
    payload: &[u8],
) -> DecodedSamples {
    let block_bytes = desc.read_block_size_in_bytes as usize;
    let bits_per_scan = desc.bits_per_scan();
    let mut channels = vec![Vec::new(); desc.channel_count()];
    let mut samples = 0u32;
    let mut truncated = false;
    let mut offset = 0usize;

    'outer: while offset < payload.len() {
        // Паддинг в хвосте блока отбрасывается вместе с самим блоком
        let end = (offset + block_bytes).min(payload.len());
        let mut bits = BitCursor::new(&payload[offset..end]);

        for _ in 0..desc.read_block_size {
            if bits.remaining() < bits_per_scan {
                truncated = true;
                break 'outer;
            }

            for (i, chan) in desc.channels.iter().enumerate() {
                let size = chan.compressed_sample_size_in_bits;
                let lsb = chan.lsb_bits_removed();

                // Восстанавливаем отброшенные младшие биты нулями
                let mut val = (bits.take(size) as i64) << lsb;

                if chan.signed {
                    val = sign_extend(val, size + lsb);
                }

                channels[i].push(scale(val, &chan.scaling_coeffs));
            }

            samples += 1;
        }

        offset = end;
    }

    DecodedSamples {
        channels,
        samples,
        truncated,
    }
}

/// Расширение знака от `bits`-битного значения до i64.
fn sign_extend(
    val: i64,
    bits: u32,
) -> i64 {
    if bits == 0 || bits >= 64 {
        return val;
    }
    if val & (1i64 << (bits - 1)) != 0 {
        val | (!0i64 << bits)
    } else {
        val
    }
}

/// Битовый курсор по срезу, старшим битом вперёд.
struct BitCursor<'a> {
    buf: &'a [u8],
    bit: usize,
}

impl<'a> BitCursor<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, bit: 0 }
    }

    fn remaining(&self) -> usize {
        self.buf.len() * 8 - self.bit
    }

    /// Читает `n` битов, MSB-first. Вызывающий обязан проверить
    /// `remaining()` заранее.
    fn take(
        &mut self,
        n: u32,
    ) -> u64 {
        let mut val = 0u64;

        for _ in 0..n {
            let byte = self.buf[self.bit >> 3];
            let shift = 7 - (self.bit & 7);
            val = (val << 1) | ((byte >> shift) & 1) as u64;
            self.bit += 1;
        }

        val
    }
}
