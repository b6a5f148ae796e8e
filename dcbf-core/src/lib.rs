//! Библиотека формата DCBF
//!
//! Эталонная реализация формата `[DAQCompressedBinaryFile]` версии 1.0.0:
//! текстовый заголовок с описанием каналов и масштабирующих полиномов,
//! за которым следует сырая бинарная нагрузка — выборки АЦП, упакованные
//! побайтово либо побитово (lossless packing / lossy LSB removal).
//!
//! # Быстрый старт
//!
//! ```no_run
//! use dcbf_core::serialization::read_scaled_file;
//!
//! let decoded = read_scaled_file("stream.cfg")?;
//! for (chan, data) in decoded.descriptor.channels.iter().zip(&decoded.channels) {
//!     println!("{}: {} samples", chan.name, data.len());
//! }
//! # Ok::<(), dcbf_types::DcbfError>(())
//! ```

pub mod decode;
pub mod encode;
pub mod format;
pub mod gpstime;
pub mod payload;
pub mod report;
pub mod serialization;

pub use decode::*;
pub use encode::*;
pub use format::*;
pub use gpstime::*;
pub use payload::*;
pub use report::*;
pub use serialization::*;

pub use dcbf_types::{
    ByteOrder, ChannelDescriptor, CompressionType, DcbfError, DcbfResult, FileDescriptor,
    Justification, DCBF_VERSION,
};

/// Версия библиотеки.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
