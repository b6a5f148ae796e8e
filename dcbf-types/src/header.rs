use crate::ChannelDescriptor;

/// Единственная поддерживаемая версия формата.
pub const DCBF_VERSION: &str = "1.0.0";

/// Описание файла: метаданные задачи и упорядоченный список каналов.
///
/// Каналы следуют в том порядке, в котором их выборки чередуются в
/// бинарной части файла.
#[derive(Debug, Clone)]
pub struct FileDescriptor {
    /// Версия формата (принимается только [`DCBF_VERSION`])
    pub version: String,
    /// Размер текстового заголовка в байтах; бинарные данные начинаются
    /// с этого смещения от начала файла
    pub header_size: u32,
    /// Имя задачи сбора данных
    pub task_name: String,
    /// Выборок на канал в одном блоке записи
    pub read_block_size: u32,
    /// Размер одного блока записи в байтах (с учётом битовой упаковки)
    pub read_block_size_in_bytes: u32,
    /// Каналы задачи в порядке чередования выборок
    pub channels: Vec<ChannelDescriptor>,
}

impl FileDescriptor {
    /// Количество каналов задачи.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Все ли каналы задачи допускают байт-ориентированное чтение.
    ///
    /// Путь декодирования выбирается по всей задаче сразу: достаточно
    /// одного канала с битовой упаковкой, чтобы весь поток читался
    /// битовым курсором.
    pub fn is_byte_aligned(&self) -> bool {
        self.channels.iter().all(|c| c.is_byte_aligned())
    }

    /// Байтов в одном скане (по одной выборке каждого канала) для
    /// байт-ориентированного пути.
    pub fn bytes_per_scan(&self) -> usize {
        self.channels
            .iter()
            .map(|c| c.raw_sample_size_in_bytes())
            .sum()
    }

    /// Битов в одном скане для упакованного пути.
    pub fn bits_per_scan(&self) -> usize {
        self.channels
            .iter()
            .map(|c| c.compressed_sample_size_in_bits as usize)
            .sum()
    }
}
