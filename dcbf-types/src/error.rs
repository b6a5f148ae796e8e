use std::collections::TryReserveError;

use thiserror::Error;

/// Результат для операций DCBF
pub type DcbfResult<T> = std::result::Result<T, DcbfError>;

/// Типы ошибок формата DCBF.
#[derive(Debug, Error)]
pub enum DcbfError {
    /// Некорректный или нарушающий порядок ключей заголовок
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// Несовместимая версия формата
    #[error("Unsupported version: found {found}, expected {expected}")]
    UnsupportedVersion { found: String, expected: String },

    /// Файл короче, чем декларирует заголовок
    #[error("Incomplete read: expected {expected} bytes, got {got}")]
    IncompleteRead { expected: u64, got: u64 },

    /// Не удалось выделить буфер под полезную нагрузку
    #[error("Allocation failure: {0}")]
    Allocation(#[from] TryReserveError),

    /// Ошибки ввода/вывода (автоконвертируются из std::io::Error)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Нарушение спецификации формата
    #[error("Format violation: {0}")]
    FormatViolation(String),
}

impl DcbfError {
    /// Удобные конструкторы
    pub fn invalid_header<S: Into<String>>(s: S) -> Self {
        Self::InvalidHeader(s.into())
    }

    pub fn format_violation<S: Into<String>>(s: S) -> Self {
        Self::FormatViolation(s.into())
    }
}
