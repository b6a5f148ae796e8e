use crate::{DcbfError, DcbfResult};

/// Тип сжатия сырых выборок.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionType {
    /// Без сжатия
    None,
    /// Упаковка без потерь: выборки пишутся вплотную, без выравнивания
    /// по границе байта
    LosslessPacking,
    /// Сжатие с потерями: младшие биты выборки отбрасываются
    LossyLsbRemoval,
}

/// Порядок байтов сжатых выборок в потоке.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    BigEndian,
    LittleEndian,
}

/// Выравнивание значащих битов внутри сырого контейнера.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Justification {
    /// Значащие биты в старшей части контейнера
    Left,
    /// Значащие биты в младшей части контейнера
    Right,
}

/// Описание одного канала задачи.
///
/// Создаётся один раз при разборе заголовка и далее не изменяется.
/// Владелец — [`crate::FileDescriptor`].
#[derive(Debug, Clone)]
pub struct ChannelDescriptor {
    /// Имя физического канала (например `Dev1/ai0`)
    pub name: String,
    /// Разрешение АЦП канала (биты)
    pub raw_sample_resolution: u32,
    /// Размер сырой выборки в контейнере (биты)
    pub raw_sample_size_in_bits: u32,
    /// Выравнивание значащих битов в контейнере
    pub justification: Justification,
    /// Знаковое представление сырых значений
    pub signed: bool,
    /// Тип сжатия
    pub compression: CompressionType,
    /// Размер сжатой выборки (биты)
    pub compressed_sample_size_in_bits: u32,
    /// Порядок байтов сжатого потока
    pub byte_order: ByteOrder,
    /// Коэффициенты масштабирующего полинома, от свободного члена
    /// к старшим степеням: scaled = Σ coeffs[i] * raw^i
    pub scaling_coeffs: Vec<f64>,
}

impl ChannelDescriptor {
    /// Число битов, отброшенных сжатием с младшего конца.
    ///
    /// Для левого выравнивания младшие биты считаются от полного размера
    /// контейнера, для правого — от разрешения АЦП.
    pub fn lsb_bits_removed(&self) -> u32 {
        let base = match self.justification {
            Justification::Left => self.raw_sample_size_in_bits,
            Justification::Right => self.raw_sample_resolution,
        };
        base.saturating_sub(self.compressed_sample_size_in_bits)
    }

    /// Размер сырой выборки в байтах (для байт-ориентированного пути).
    pub fn raw_sample_size_in_bytes(&self) -> usize {
        (self.raw_sample_size_in_bits / 8) as usize
    }

    /// Выборки канала можно читать целыми байтами без битового курсора.
    pub fn is_byte_aligned(&self) -> bool {
        self.compression == CompressionType::None
            || (self.byte_order == ByteOrder::LittleEndian
                && self.compressed_sample_size_in_bits % 8 == 0)
    }
}

////////////////////////////////////////////////////////////////////////////////
// Разбор и печать литералов заголовка
////////////////////////////////////////////////////////////////////////////////

impl std::fmt::Display for CompressionType {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            CompressionType::None => write!(f, "None"),
            CompressionType::LosslessPacking => write!(f, "LosslessPacking"),
            CompressionType::LossyLsbRemoval => write!(f, "LossyLSBRemoval"),
        }
    }
}

impl std::str::FromStr for CompressionType {
    type Err = DcbfError;

    fn from_str(s: &str) -> DcbfResult<Self> {
        match s {
            "None" => Ok(CompressionType::None),
            "LosslessPacking" => Ok(CompressionType::LosslessPacking),
            "LossyLSBRemoval" => Ok(CompressionType::LossyLsbRemoval),
            _ => Err(DcbfError::invalid_header(format!(
                "Unknown compression type: '{s}'"
            ))),
        }
    }
}

impl std::fmt::Display for ByteOrder {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            ByteOrder::BigEndian => write!(f, "BigEndian"),
            ByteOrder::LittleEndian => write!(f, "LittleEndian"),
        }
    }
}

impl std::str::FromStr for ByteOrder {
    type Err = DcbfError;

    fn from_str(s: &str) -> DcbfResult<Self> {
        match s {
            "BigEndian" => Ok(ByteOrder::BigEndian),
            "LittleEndian" => Ok(ByteOrder::LittleEndian),
            _ => Err(DcbfError::invalid_header(format!(
                "Unknown byte order: '{s}'"
            ))),
        }
    }
}

impl std::fmt::Display for Justification {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            Justification::Left => write!(f, "Left"),
            Justification::Right => write!(f, "Right"),
        }
    }
}

impl std::str::FromStr for Justification {
    type Err = DcbfError;

    fn from_str(s: &str) -> DcbfResult<Self> {
        match s {
            "Left" => Ok(Justification::Left),
            "Right" => Ok(Justification::Right),
            _ => Err(DcbfError::invalid_header(format!(
                "Unknown justification: '{s}'"
            ))),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    fn chan_16bit() -> ChannelDescriptor {
        ChannelDescriptor {
            name: "Dev1/ai0".to_string(),
            raw_sample_resolution: 16,
            raw_sample_size_in_bits: 16,
            justification: Justification::Right,
            signed: true,
            compression: CompressionType::None,
            compressed_sample_size_in_bits: 16,
            byte_order: ByteOrder::LittleEndian,
            scaling_coeffs: vec![0.0, 1.0],
        }
    }

    #[test]
    fn test_literal_round_trip() {
        for c in [
            CompressionType::None,
            CompressionType::LosslessPacking,
            CompressionType::LossyLsbRemoval,
        ] {
            assert_eq!(c.to_string().parse::<CompressionType>().unwrap(), c);
        }
        for b in [ByteOrder::BigEndian, ByteOrder::LittleEndian] {
            assert_eq!(b.to_string().parse::<ByteOrder>().unwrap(), b);
        }
        for j in [Justification::Left, Justification::Right] {
            assert_eq!(j.to_string().parse::<Justification>().unwrap(), j);
        }
    }

    #[test]
    fn test_unknown_literals_rejected() {
        assert!("Lz4".parse::<CompressionType>().is_err());
        assert!("MiddleEndian".parse::<ByteOrder>().is_err());
        assert!("Center".parse::<Justification>().is_err());
        // Литералы чувствительны к регистру, как в оригинальном заголовке
        assert!("none".parse::<CompressionType>().is_err());
    }

    #[test]
    fn test_lsb_bits_removed() {
        let mut chan = chan_16bit();

        chan.compression = CompressionType::LossyLsbRemoval;
        chan.compressed_sample_size_in_bits = 12;

        // Правое выравнивание: lsb = resolution - compressed
        assert_eq!(chan.lsb_bits_removed(), 4);

        // Левое выравнивание: lsb = container - compressed
        chan.justification = Justification::Left;
        chan.raw_sample_size_in_bits = 32;
        assert_eq!(chan.lsb_bits_removed(), 20);
    }

    #[test]
    fn test_is_byte_aligned() {
        let mut chan = chan_16bit();
        assert!(chan.is_byte_aligned(), "None всегда байт-ориентирован");

        chan.compression = CompressionType::LossyLsbRemoval;
        chan.compressed_sample_size_in_bits = 12;
        chan.byte_order = ByteOrder::BigEndian;
        assert!(!chan.is_byte_aligned());

        // LittleEndian + кратность 8 битам — можно без битового курсора
        chan.compressed_sample_size_in_bits = 16;
        chan.byte_order = ByteOrder::LittleEndian;
        assert!(chan.is_byte_aligned());
    }
}
