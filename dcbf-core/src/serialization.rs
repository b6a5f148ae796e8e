//! Высокоуровневое чтение и запись DCBF файлов.

use std::{
    io::{BufWriter, Write},
    path::Path,
};

use dcbf_types::{DcbfError, DcbfResult, FileDescriptor};

use crate::{
    decode::decode,
    encode::{block_size_in_bytes, encode},
    format::{parse_header_file, render_header},
    payload::read_payload,
};

/// Полностью декодированный DCBF файл.
#[derive(Debug, Clone)]
pub struct DecodedFile {
    /// Разобранный заголовок
    pub descriptor: FileDescriptor,
    /// Масштабированные выборки, по буферу на канал
    pub channels: Vec<Vec<f64>>,
    /// Полностью декодированных выборок на канал
    pub samples: u32,
    /// Нагрузка закончилась посреди блока
    pub truncated: bool,
}

/// Читает, декодирует и масштабирует файл целиком.
///
/// Единственная операция над файлом: заголовок, нагрузка и декодирование
/// выполняются одним синхронным проходом, все ресурсы освобождаются до
/// возврата. Усечённая нагрузка — не ошибка: проверяйте
/// [`DecodedFile::truncated`].
pub fn read_scaled_file<P: AsRef<Path>>(path: P) -> DcbfResult<DecodedFile> {
    let descriptor = parse_header_file(&path)?;
    let payload = read_payload(&path, descriptor.header_size)?;
    let decoded = decode(&descriptor, &payload)?;

    Ok(DecodedFile {
        descriptor,
        channels: decoded.channels,
        samples: decoded.samples,
        truncated: decoded.truncated,
    })
}

/// Потоковый писатель DCBF файлов.
///
/// Заголовок записывается сразу при создании: в отличие от форматов с
/// бинарным заголовком, DCBF не хранит в нём итоговых счётчиков, поэтому
/// дозаписывать его по завершении не нужно.
pub struct DcbfWriter<W: Write> {
    writer: BufWriter<W>,
    descriptor: FileDescriptor,
    blocks_written: u64,
    total_samples: u64,
}

impl<W: Write> DcbfWriter<W> {
    /// Создаёт писатель, вычисляя `ReadBlockSizeInBytes` и `HeaderSize`
    /// и немедленно записывая заголовок в поток.
    pub fn create(
        inner: W,
        mut descriptor: FileDescriptor,
    ) -> DcbfResult<Self> {
        if descriptor.channels.is_empty() {
            return Err(DcbfError::format_violation("Task must have channels"));
        }
        if descriptor.read_block_size == 0 {
            return Err(DcbfError::format_violation("ReadBlockSize must be >= 1"));
        }

        descriptor.read_block_size_in_bytes = block_size_in_bytes(&descriptor);

        let header = render_header(&descriptor);
        descriptor.header_size = header.len() as u32;

        let mut writer = BufWriter::new(inner);
        writer.write_all(header.as_bytes())?;

        Ok(Self {
            writer,
            descriptor,
            blocks_written: 0,
            total_samples: 0,
        })
    }

    /// Записывает один блок: по `ReadBlockSize` сырых значений на канал.
    pub fn write_block(
        &mut self,
        samples: &[Vec<i64>],
    ) -> DcbfResult<()> {
        let expected = self.descriptor.read_block_size as usize;
        if samples.iter().any(|s| s.len() != expected) {
            return Err(DcbfError::format_violation(format!(
                "Each channel buffer must hold exactly {expected} samples"
            )));
        }

        let bytes = encode(&self.descriptor, samples)?;
        self.writer.write_all(&bytes)?;

        self.blocks_written += 1;
        self.total_samples += expected as u64;

        Ok(())
    }

    /// Завершает запись, сбрасывая буфер.
    pub fn finish(mut self) -> DcbfResult<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Итоговый дескриптор (с вычисленными размерами).
    pub fn descriptor(&self) -> &FileDescriptor {
        &self.descriptor
    }

    /// Количество записанных блоков.
    pub fn blocks_written(&self) -> u64 {
        self.blocks_written
    }

    /// Общее количество записанных выборок на канал.
    pub fn total_samples(&self) -> u64 {
        self.total_samples
    }
}
