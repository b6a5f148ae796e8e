//! Пример: запись DCBF файла с синтетическим сигналом
//!
//! Демонстрирует:
//! - создание дескриптора задачи с одним каналом
//! - упаковку 12-битных выборок без потерь через DcbfWriter
//! - автоматическое вычисление HeaderSize и ReadBlockSizeInBytes

use std::fs::File;

use dcbf_core::serialization::DcbfWriter;
use dcbf_types::{ByteOrder, ChannelDescriptor, CompressionType, FileDescriptor, Justification};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let output_path = "dcbf-core/test_output.cfg";

    // --- Дескриптор: один 12-битный канал с упаковкой без потерь ---
    let descriptor = FileDescriptor {
        version: "1.0.0".to_string(),
        header_size: 0,
        task_name: "demoTask".to_string(),
        read_block_size: 1000,
        read_block_size_in_bytes: 0, // вычислит DcbfWriter
        channels: vec![ChannelDescriptor {
            name: "Dev1/ai0".to_string(),
            raw_sample_resolution: 12,
            raw_sample_size_in_bits: 16,
            justification: Justification::Right,
            signed: true,
            compression: CompressionType::LosslessPacking,
            compressed_sample_size_in_bits: 12,
            byte_order: ByteOrder::BigEndian,
            scaling_coeffs: vec![0.0, 4.8828125E-3], // ±10 В на 12 бит
        }],
    };

    let file = File::create(output_path)?;
    let mut writer = DcbfWriter::create(file, descriptor)?;

    // --- Синтетический сигнал: синусоида 50 Гц при 10 kS/s ---
    let num_blocks = 10;
    let block_size = 1000usize;

    for block_idx in 0..num_blocks {
        let samples: Vec<i64> = (0..block_size)
            .map(|i| {
                let t = (block_idx * block_size + i) as f64 / 10_000.0;
                (2047.0 * (2.0 * std::f64::consts::PI * 50.0 * t).sin()) as i64
            })
            .collect();

        writer.write_block(&[samples])?;
        println!("Block {block_idx}: {block_size} samples written");
    }

    let total = writer.total_samples();
    let header_size = writer.descriptor().header_size;
    writer.finish()?;

    println!("\n✓ Записано: {output_path}");
    println!("  Header   : {header_size} bytes");
    println!("  Blocks   : {num_blocks}");
    println!("  Samples  : {total}");

    Ok(())
}
