//! Поканальная сводка по декодированным выборкам.

use crate::serialization::DecodedFile;

/// Сводка по одному каналу.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelSummary {
    /// Индекс канала в порядке объявления
    pub index: usize,
    /// Имя канала из заголовка
    pub name: String,
    /// Декодированных выборок
    pub samples: usize,
    /// Среднее арифметическое масштабированных значений
    pub mean: f64,
}

/// Считает поканальные средние.
///
/// Наблюдение без побочных эффектов; пустой результат декодирования даёт
/// пустую сводку.
pub fn summarize(decoded: &DecodedFile) -> Vec<ChannelSummary> {
    if decoded.samples == 0 {
        return Vec::new();
    }

    decoded
        .descriptor
        .channels
        .iter()
        .zip(&decoded.channels)
        .enumerate()
        .map(|(index, (chan, data))| {
            let mean = data.iter().sum::<f64>() / data.len() as f64;
            ChannelSummary {
                index,
                name: chan.name.clone(),
                samples: data.len(),
                mean,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use dcbf_types::{
        ByteOrder, ChannelDescriptor, CompressionType, FileDescriptor, Justification,
    };

    use super::*;

    fn decoded_with(channels: Vec<Vec<f64>>) -> DecodedFile {
        let samples = channels.first().map_or(0, Vec::len) as u32;
        let chan_descs = (0..channels.len())
            .map(|i| ChannelDescriptor {
                name: format!("Dev1/ai{i}"),
                raw_sample_resolution: 16,
                raw_sample_size_in_bits: 16,
                justification: Justification::Right,
                signed: true,
                compression: CompressionType::None,
                compressed_sample_size_in_bits: 16,
                byte_order: ByteOrder::LittleEndian,
                scaling_coeffs: vec![0.0, 1.0],
            })
            .collect();

        DecodedFile {
            descriptor: FileDescriptor {
                version: "1.0.0".to_string(),
                header_size: 0,
                task_name: "test".to_string(),
                read_block_size: samples,
                read_block_size_in_bytes: samples * 2,
                channels: chan_descs,
            },
            channels,
            samples,
            truncated: false,
        }
    }

    #[test]
    fn test_summarize_means() {
        let decoded = decoded_with(vec![vec![1.0, 2.0, 3.0], vec![-1.0, -1.0, 4.0]]);
        let summary = summarize(&decoded);

        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].name, "Dev1/ai0");
        assert_eq!(summary[0].samples, 3);
        assert!((summary[0].mean - 2.0).abs() < 1e-12);
        assert!((summary[1].mean - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_summarize_empty_is_noop() {
        let decoded = decoded_with(vec![Vec::new()]);

        assert!(summarize(&decoded).is_empty());
    }
}
