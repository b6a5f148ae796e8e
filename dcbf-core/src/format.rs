//! Текстовый заголовок DCBF файла
//!
//! Заголовок строго построчный и позиционный: секции и ключи обязаны
//! следовать в точном порядке, любое расхождение отвергает весь файл.
//! За строкой `Begin=Here` начинается бинарная нагрузка; её смещение от
//! начала файла равно `HeaderSize`.

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use dcbf_types::{ChannelDescriptor, DcbfError, DcbfResult, FileDescriptor, DCBF_VERSION};

/// Открывающая секция файла.
pub const DCBF_FILE_SECTION: &str = "[DAQCompressedBinaryFile]";

/// Секция, отделяющая заголовок от бинарных данных.
pub const DCBF_BINARY_SECTION: &str = "[BinaryData]";

/// Построчный курсор по заголовку с позиционными проверками.
struct HeaderLines<R> {
    lines: std::io::Lines<R>,
}

impl<R: BufRead> HeaderLines<R> {
    fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
        }
    }

    /// Следующая строка заголовка; конец потока — ошибка формата.
    fn next_line(&mut self) -> DcbfResult<String> {
        match self.lines.next() {
            Some(line) => Ok(line?.trim_end_matches('\r').to_string()),
            None => Err(DcbfError::invalid_header("Unexpected end of header")),
        }
    }

    /// Строка обязана совпасть с литералом точно.
    fn expect(
        &mut self,
        literal: &str,
    ) -> DcbfResult<()> {
        let line = self.next_line()?;
        if line != literal {
            return Err(DcbfError::invalid_header(format!(
                "Expected '{literal}', found '{line}'"
            )));
        }
        Ok(())
    }

    /// Значение ключа `Key=...`; ключ обязан стоять именно здесь.
    fn value(
        &mut self,
        key: &str,
    ) -> DcbfResult<String> {
        let line = self.next_line()?;
        match line.strip_prefix(key) {
            Some(v) => Ok(v.to_string()),
            None => Err(DcbfError::invalid_header(format!(
                "Expected key '{key}', found '{line}'"
            ))),
        }
    }

    /// Целочисленное значение ключа.
    fn number(
        &mut self,
        key: &str,
    ) -> DcbfResult<u32> {
        let v = self.value(key)?;
        v.trim().parse().map_err(|e| {
            DcbfError::invalid_header(format!("Invalid number for '{key}': '{v}' ({e})"))
        })
    }
}

/// Разбирает заголовок из произвольного построчного источника.
///
/// Источник читается ровно до `Begin=Here`; дальше идут бинарные данные,
/// которые этим разборщиком не затрагиваются.
pub fn parse_file_descriptor<R: BufRead>(reader: R) -> DcbfResult<FileDescriptor> {
    let mut lines = HeaderLines::new(reader);

    lines.expect(DCBF_FILE_SECTION)?;

    let version = lines.value("Version=")?;
    if version != DCBF_VERSION {
        return Err(DcbfError::UnsupportedVersion {
            found: version,
            expected: DCBF_VERSION.to_string(),
        });
    }

    let header_size = lines.number("HeaderSize=")?;

    let num_tasks = lines.number("NumberOfTasks=")?;
    if num_tasks != 1 {
        return Err(DcbfError::invalid_header(format!(
            "NumberOfTasks must be 1, found {num_tasks}"
        )));
    }

    lines.expect("[Task0]")?;
    let task_name = lines.value("Name=")?;

    let number_of_channels = lines.number("NumberOfChannels=")?;
    if number_of_channels < 1 {
        return Err(DcbfError::invalid_header("NumberOfChannels must be >= 1"));
    }

    let read_block_size = lines.number("ReadBlockSize=")?;
    let read_block_size_in_bytes = lines.number("ReadBlockSizeInBytes=")?;

    let mut channels = Vec::with_capacity(number_of_channels as usize);
    for i in 0..number_of_channels {
        // Индекс канала обязан совпасть с порядковым номером секции
        lines.expect(&format!("[Task0Channel{i}]"))?;
        channels.push(parse_channel(&mut lines)?);
    }

    lines.expect(DCBF_BINARY_SECTION)?;
    lines.expect("Begin=Here")?;

    Ok(FileDescriptor {
        version,
        header_size,
        task_name,
        read_block_size,
        read_block_size_in_bytes,
        channels,
    })
}

/// Разбирает заголовок файла по пути; файл закрывается до возврата.
pub fn parse_header_file<P: AsRef<Path>>(path: P) -> DcbfResult<FileDescriptor> {
    let file = File::open(path)?;
    parse_file_descriptor(BufReader::new(file))
}

fn parse_channel<R: BufRead>(lines: &mut HeaderLines<R>) -> DcbfResult<ChannelDescriptor> {
    let name = lines.value("Name=")?;
    let raw_sample_resolution = lines.number("RawSampleResolution=")?;
    let raw_sample_size_in_bits = lines.number("RawSampleSizeInBits=")?;
    let justification = lines.value("RawSampleJustification=")?.parse()?;
    let signed = match lines.value("SignedNumber=")?.as_str() {
        "TRUE" => true,
        "FALSE" => false,
        other => {
            return Err(DcbfError::invalid_header(format!(
                "SignedNumber must be TRUE or FALSE, found '{other}'"
            )))
        }
    };
    let compression = lines.value("CompressionType=")?.parse()?;
    let compressed_sample_size_in_bits = lines.number("CompressedSampleSizeInBits=")?;
    let byte_order = lines.value("CompressionByteOrder=")?.parse()?;
    let scaling_coeffs = parse_coeffs(&lines.value("PolynomialScalingCoeffs=")?)?;

    Ok(ChannelDescriptor {
        name,
        raw_sample_resolution,
        raw_sample_size_in_bits,
        justification,
        signed,
        compression,
        compressed_sample_size_in_bits,
        byte_order,
        scaling_coeffs,
    })
}

/// Разбирает список коэффициентов `c0;c1;...;cn;`.
///
/// Пустой список или список, начинающийся с `;` (комментарий в исходном
/// формате), означает канал без калибровки — файл отвергается.
fn parse_coeffs(s: &str) -> DcbfResult<Vec<f64>> {
    if s.is_empty() || s.starts_with(';') {
        return Err(DcbfError::invalid_header(
            "PolynomialScalingCoeffs is empty",
        ));
    }

    let mut coeffs = Vec::new();
    for part in s.split(';') {
        let part = part.trim();
        if part.is_empty() {
            continue; // завершающий ';'
        }
        let c: f64 = part.parse().map_err(|e| {
            DcbfError::invalid_header(format!("Invalid scaling coefficient '{part}': {e}"))
        })?;
        coeffs.push(c);
    }

    if coeffs.is_empty() {
        return Err(DcbfError::invalid_header(
            "PolynomialScalingCoeffs has no values",
        ));
    }

    Ok(coeffs)
}

/// Рендерит заголовок в текст.
///
/// `HeaderSize` печатается фиксированным 10-значным полем, поэтому длина
/// текста не зависит от значения: рендерим с нулём, измеряем и рендерим
/// повторно с фактическим размером.
pub fn render_header(desc: &FileDescriptor) -> String {
    let draft = render_with_size(desc, 0);
    render_with_size(desc, draft.len() as u32)
}

fn render_with_size(
    desc: &FileDescriptor,
    header_size: u32,
) -> String {
    let mut out = String::new();

    out.push_str(DCBF_FILE_SECTION);
    out.push('\n');
    out.push_str(&format!("Version={}\n", DCBF_VERSION));
    out.push_str(&format!("HeaderSize={header_size:010}\n"));
    out.push_str("NumberOfTasks=1\n");
    out.push_str("[Task0]\n");
    out.push_str(&format!("Name={}\n", desc.task_name));
    out.push_str(&format!("NumberOfChannels={}\n", desc.channel_count()));
    out.push_str(&format!("ReadBlockSize={}\n", desc.read_block_size));
    out.push_str(&format!(
        "ReadBlockSizeInBytes={}\n",
        desc.read_block_size_in_bytes
    ));

    for (i, chan) in desc.channels.iter().enumerate() {
        out.push_str(&format!("[Task0Channel{i}]\n"));
        out.push_str(&format!("Name={}\n", chan.name));
        out.push_str(&format!(
            "RawSampleResolution={}\n",
            chan.raw_sample_resolution
        ));
        out.push_str(&format!(
            "RawSampleSizeInBits={}\n",
            chan.raw_sample_size_in_bits
        ));
        out.push_str(&format!(
            "RawSampleJustification={}\n",
            chan.justification
        ));
        out.push_str(&format!(
            "SignedNumber={}\n",
            if chan.signed { "TRUE" } else { "FALSE" }
        ));
        out.push_str(&format!("CompressionType={}\n", chan.compression));
        out.push_str(&format!(
            "CompressedSampleSizeInBits={}\n",
            chan.compressed_sample_size_in_bits
        ));
        out.push_str(&format!("CompressionByteOrder={}\n", chan.byte_order));
        out.push_str("PolynomialScalingCoeffs=");
        for c in &chan.scaling_coeffs {
            out.push_str(&format!("{c:.15E};"));
        }
        out.push('\n');
    }

    out.push_str(DCBF_BINARY_SECTION);
    out.push('\n');
    out.push_str("Begin=Here\n");

    out
}

#[cfg(test)]
mod tests {
    use dcbf_types::{ByteOrder, CompressionType, Justification};

    use super::*;

    fn sample_header_text() -> String {
        "[DAQCompressedBinaryFile]\n\
         Version=1.0.0\n\
         HeaderSize=0000000421\n\
         NumberOfTasks=1\n\
         [Task0]\n\
         Name=myVoltageTask\n\
         NumberOfChannels=2\n\
         ReadBlockSize=1000\n\
         ReadBlockSizeInBytes=3000\n\
         [Task0Channel0]\n\
         Name=Dev1/ai0\n\
         RawSampleResolution=16\n\
         RawSampleSizeInBits=16\n\
         RawSampleJustification=Right\n\
         SignedNumber=TRUE\n\
         CompressionType=LossyLSBRemoval\n\
         CompressedSampleSizeInBits=12\n\
         CompressionByteOrder=BigEndian\n\
         PolynomialScalingCoeffs=0.000000000000000E0;3.051850947599719E-4;\n\
         [Task0Channel1]\n\
         Name=Dev1/ai1\n\
         RawSampleResolution=16\n\
         RawSampleSizeInBits=16\n\
         RawSampleJustification=Right\n\
         SignedNumber=TRUE\n\
         CompressionType=LossyLSBRemoval\n\
         CompressedSampleSizeInBits=12\n\
         CompressionByteOrder=BigEndian\n\
         PolynomialScalingCoeffs=1.250000000000000E-2;3.051850947599719E-4;\n\
         [BinaryData]\n\
         Begin=Here\n"
            .to_string()
    }

    #[test]
    fn test_parse_sample_header() {
        let desc = parse_file_descriptor(sample_header_text().as_bytes()).unwrap();

        assert_eq!(desc.version, "1.0.0");
        assert_eq!(desc.header_size, 421);
        assert_eq!(desc.task_name, "myVoltageTask");
        assert_eq!(desc.channel_count(), 2);
        assert_eq!(desc.read_block_size, 1000);
        assert_eq!(desc.read_block_size_in_bytes, 3000);

        let chan = &desc.channels[0];
        assert_eq!(chan.name, "Dev1/ai0");
        assert_eq!(chan.raw_sample_resolution, 16);
        assert_eq!(chan.raw_sample_size_in_bits, 16);
        assert_eq!(chan.justification, Justification::Right);
        assert!(chan.signed);
        assert_eq!(chan.compression, CompressionType::LossyLsbRemoval);
        assert_eq!(chan.compressed_sample_size_in_bits, 12);
        assert_eq!(chan.byte_order, ByteOrder::BigEndian);
        assert_eq!(chan.scaling_coeffs.len(), 2);
        assert!((chan.scaling_coeffs[1] - 3.051850947599719E-4).abs() < 1e-18);

        assert!((desc.channels[1].scaling_coeffs[0] - 1.25E-2).abs() < 1e-15);
    }

    #[test]
    fn test_unsupported_version_rejected() {
        let text = sample_header_text().replace("Version=1.0.0", "Version=2.0.0");
        let err = parse_file_descriptor(text.as_bytes()).unwrap_err();

        assert!(matches!(err, DcbfError::UnsupportedVersion { .. }));
    }

    #[test]
    fn test_zero_channels_rejected() {
        let text = sample_header_text().replace("NumberOfChannels=2", "NumberOfChannels=0");

        assert!(parse_file_descriptor(text.as_bytes()).is_err());
    }

    #[test]
    fn test_out_of_order_channel_rejected() {
        let text = sample_header_text().replace("[Task0Channel1]", "[Task0Channel7]");

        assert!(parse_file_descriptor(text.as_bytes()).is_err());
    }

    #[test]
    fn test_missing_key_rejected() {
        let text = sample_header_text().replace("ReadBlockSize=1000\n", "");

        assert!(parse_file_descriptor(text.as_bytes()).is_err());
    }

    #[test]
    fn test_truncated_header_rejected() {
        let full = sample_header_text();
        let cut = &full[..full.len() / 2];

        assert!(parse_file_descriptor(cut.as_bytes()).is_err());
    }

    #[test]
    fn test_empty_coeffs_rejected() {
        let text = sample_header_text().replace(
            "PolynomialScalingCoeffs=1.250000000000000E-2;3.051850947599719E-4;",
            "PolynomialScalingCoeffs=",
        );

        assert!(parse_file_descriptor(text.as_bytes()).is_err());
    }

    #[test]
    fn test_comment_coeffs_rejected() {
        // Ведущий ';' в исходном формате — комментарий, не список
        let text = sample_header_text().replace(
            "PolynomialScalingCoeffs=1.250000000000000E-2;3.051850947599719E-4;",
            "PolynomialScalingCoeffs=;no calibration",
        );

        assert!(parse_file_descriptor(text.as_bytes()).is_err());
    }

    #[test]
    fn test_malformed_number_rejected() {
        let text = sample_header_text().replace("ReadBlockSize=1000", "ReadBlockSize=10e0");

        assert!(parse_file_descriptor(text.as_bytes()).is_err());
    }

    #[test]
    fn test_render_parse_round_trip() {
        let desc = parse_file_descriptor(sample_header_text().as_bytes()).unwrap();
        let rendered = render_header(&desc);
        let reparsed = parse_file_descriptor(rendered.as_bytes()).unwrap();

        // HeaderSize в отрендеренном тексте равен его фактической длине
        assert_eq!(reparsed.header_size as usize, rendered.len());
        assert_eq!(reparsed.task_name, desc.task_name);
        assert_eq!(reparsed.channel_count(), desc.channel_count());
        for (a, b) in reparsed.channels[0]
            .scaling_coeffs
            .iter()
            .zip(&desc.channels[0].scaling_coeffs)
        {
            assert!((a - b).abs() <= a.abs() * 1e-14);
        }
        assert_eq!(
            reparsed.channels[1].compressed_sample_size_in_bits,
            desc.channels[1].compressed_sample_size_in_bits
        );
    }

    #[test]
    fn test_render_header_size_fixed_width() {
        let desc = parse_file_descriptor(sample_header_text().as_bytes()).unwrap();
        let rendered = render_header(&desc);

        // Фиксированное 10-значное поле — длина не зависит от значения
        let line = rendered
            .lines()
            .find(|l| l.starts_with("HeaderSize="))
            .unwrap();
        assert_eq!(line.len(), "HeaderSize=".len() + 10);
    }
}
