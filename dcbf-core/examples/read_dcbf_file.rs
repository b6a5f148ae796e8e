//! Пример: чтение DCBF файла через read_scaled_file
//!
//! Демонстрирует:
//! - разбор заголовка и декодирование нагрузки одним вызовом
//! - проверку флага усечения
//! - поканальную сводку

use dcbf_core::{report::summarize, serialization::read_scaled_file};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let input_path = "dcbf-core/test_output.cfg";

    let decoded = match read_scaled_file(input_path) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("✗ Decode failed: {e}");
            return Err(Box::new(e));
        }
    };

    let desc = &decoded.descriptor;
    println!("✓ Header parsed");
    println!("  Task          : {}", desc.task_name);
    println!("  Channels      : {}", desc.channel_count());
    println!("  ReadBlockSize : {}", desc.read_block_size);
    println!("  Block bytes   : {}", desc.read_block_size_in_bytes);

    if decoded.truncated {
        println!("⚠ Payload truncated: partial tail discarded");
    }

    println!("\n✓ Decoded {} samples per channel", decoded.samples);
    for s in summarize(&decoded) {
        println!(
            "Channel: {}\tName: {}\tSamples: {}\tAverage: {:.6}",
            s.index, s.name, s.samples, s.mean
        );
    }

    Ok(())
}
