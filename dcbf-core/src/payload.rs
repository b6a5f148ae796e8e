//! Чтение бинарной нагрузки после текстового заголовка.

use std::{
    fs::File,
    io::{Read, Seek, SeekFrom},
    path::Path,
};

use dcbf_types::{DcbfError, DcbfResult};

/// Читает всю бинарную нагрузку файла: от `header_size` до конца.
///
/// Размер буфера вычисляется заранее из размера файла; нехватка памяти
/// возвращается как [`DcbfError::Allocation`], а файл короче заголовка —
/// как [`DcbfError::IncompleteRead`].
pub fn read_payload<P: AsRef<Path>>(
    path: P,
    header_size: u32,
) -> DcbfResult<Vec<u8>> {
    let mut file = File::open(path)?;
    let total = file.metadata()?.len();

    let expected = match total.checked_sub(header_size as u64) {
        Some(n) => n,
        None => {
            return Err(DcbfError::IncompleteRead {
                expected: header_size as u64,
                got: total,
            })
        }
    };

    let mut data = Vec::new();
    data.try_reserve_exact(expected as usize)?;

    file.seek(SeekFrom::Start(header_size as u64))?;

    let got = file.take(expected).read_to_end(&mut data)? as u64;
    if got < expected {
        return Err(DcbfError::IncompleteRead { expected, got });
    }

    Ok(data)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn test_read_payload_skips_header() {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(b"HEADER----").unwrap();
        f.write_all(&[1u8, 2, 3, 4, 5]).unwrap();

        let data = read_payload(f.path(), 10).unwrap();
        assert_eq!(data, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_read_payload_empty_tail() {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(b"HEADER").unwrap();

        let data = read_payload(f.path(), 6).unwrap();
        assert!(data.is_empty());
    }

    #[test]
    fn test_file_shorter_than_header() {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(b"abc").unwrap();

        let err = read_payload(f.path(), 100).unwrap_err();
        assert!(matches!(err, DcbfError::IncompleteRead { .. }));
    }
}
