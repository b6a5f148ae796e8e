use std::path::PathBuf;

use clap::Parser;
use dcbf_core::{
    format::parse_header_file,
    report::summarize,
    serialization::read_scaled_file,
};
use dcbf_types::FileDescriptor;
use log::{error, warn};

#[derive(Parser, Debug)]
#[command(
    name = "dcbf-cli",
    version = env!("CARGO_PKG_VERSION"),
    about = "Decode and summarize a compressed DAQ binary file",
    long_about = None,
)]
struct Cli {
    /// Путь к DCBF файлу
    file: PathBuf,
    /// Показать только заголовок, без декодирования нагрузки
    #[arg(long)]
    header_only: bool,
    /// Тихий режим (только ошибки)
    #[arg(short, long)]
    quiet: bool,
}

fn print_descriptor(desc: &FileDescriptor) {
    println!("Task          : {}", desc.task_name);
    println!("Version       : {}", desc.version);
    println!("Header size   : {} bytes", desc.header_size);
    println!("Channels      : {}", desc.channel_count());
    println!("ReadBlockSize : {} samples/channel", desc.read_block_size);
    println!("Block bytes   : {}", desc.read_block_size_in_bytes);

    for (i, chan) in desc.channels.iter().enumerate() {
        println!(
            "  [{}] {}: {} of {} bits, {}, {}, {}, {} coeff(s)",
            i,
            chan.name,
            chan.compressed_sample_size_in_bits,
            chan.raw_sample_size_in_bits,
            chan.compression,
            chan.byte_order,
            if chan.signed { "signed" } else { "unsigned" },
            chan.scaling_coeffs.len(),
        );
    }
}

fn main() {
    let cli = Cli::parse();
    let level = if cli.quiet { "error" } else { "info" };

    env_logger::Builder::new()
        .filter_level(level.parse().unwrap())
        .format_target(false)
        .format_timestamp_secs()
        .init();

    if cli.header_only {
        match parse_header_file(&cli.file) {
            Ok(desc) => print_descriptor(&desc),
            Err(e) => {
                error!("{}: {e}", cli.file.display());
                std::process::exit(1);
            }
        }
        return;
    }

    let decoded = match read_scaled_file(&cli.file) {
        Ok(d) => d,
        Err(e) => {
            error!("{}: {e}", cli.file.display());
            std::process::exit(1);
        }
    };

    print_descriptor(&decoded.descriptor);

    if decoded.truncated {
        // Усечение — не ошибка формата: декодировано столько, сколько было
        warn!(
            "payload ended mid-block: only {} full samples per channel decoded",
            decoded.samples
        );
    }

    println!();
    for s in summarize(&decoded) {
        println!(
            "Channel: {}\tNumber of Samples: {}\tAverage: {:.6}",
            s.index, s.samples, s.mean
        );
    }
}
