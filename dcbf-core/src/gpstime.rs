//! Перевод GPS-секунд в календарное время.
//!
//! Счётчики GPS-меток отдают секунды с начала года (IRIG-B); год
//! известен принимающей стороне. Преобразование чисто арифметическое,
//! без таблиц часовых поясов.

/// Календарная метка времени внутри известного года.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpsTime {
    /// Месяц, 1..=12
    pub month: u8,
    /// День месяца, начиная с 1
    pub day: u8,
    /// Часы, 0..24
    pub hours: u8,
    /// Минуты, 0..60
    pub minutes: u8,
    /// Секунды с дробной частью
    pub seconds: f64,
}

/// Високосный год по григорианскому правилу.
pub fn is_leap_year(year: u16) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Раскладывает секунды с 1 января на месяц/день/часы/минуты/секунды.
pub fn from_gps_seconds(
    seconds_since_jan1: f64,
    year: u16,
) -> GpsTime {
    let feb_days = if is_leap_year(year) { 29.0 } else { 28.0 };
    let month_days = [
        31.0, feb_days, 31.0, 30.0, 31.0, 30.0, 31.0, 31.0, 30.0, 31.0, 30.0, 31.0,
    ];

    let mut days = seconds_since_jan1 / 86_400.0;
    let mut month = 12u8;
    let mut passed = 0.0;

    for (i, len) in month_days.iter().enumerate() {
        if days <= passed + len || i == month_days.len() - 1 {
            month = (i + 1) as u8;
            days -= passed;
            break;
        }
        passed += len;
    }

    let hours_f = 24.0 * days.fract();
    let day = days.trunc() as u8 + 1; // дни месяца считаются с 1
    let minutes_f = 60.0 * hours_f.fract();
    let seconds = 60.0 * minutes_f.fract();

    GpsTime {
        month,
        day,
        hours: hours_f.trunc() as u8,
        minutes: minutes_f.trunc() as u8,
        seconds,
    }
}

/// Имя месяца для печати метки времени.
pub fn month_name(month: u8) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        12 => "December",
        _ => "<invalid>",
    }
}
