//! # Number Formatting
//!
//! Fixed-capacity ASCII renderings of the values shown on the status bar.
//! Every function here is infallible: inputs outside the displayable range
//! are clamped before formatting, so a value can never grow wider than
//! the field reserved for it.

use core::fmt::Write;

use heapless::String;

/// Widest number the generic formatter renders.
pub const MAX_DIGITS: usize = 6;

/// Largest value representable in `MAX_DIGITS` digits. Larger inputs are
/// clamped to it.
pub const MAX_VALUE: u32 = 999_999;

/// Largest task count the two-character task field can show.
pub const MAX_TASK_COUNT: u32 = 99;

/// `HH:MM:SS`
pub const UPTIME_LEN: usize = 8;

/// Minimal-width decimal rendering of a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedNumber {
    pub digits: String<MAX_DIGITS>,
    /// Number of digits, 1..=`MAX_DIGITS`. Selects the drawing column.
    pub width: usize,
}

/// Width class of the task-count field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TaskCountWidth {
    /// 0–9: one digit padded with a space on both sides.
    Single,
    /// 10–99: two digits.
    Double,
}

/// Task count text together with its width class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskCountText {
    pub text: String<3>,
    pub width: TaskCountWidth,
}

/// Number of decimal digits in `value` (at least 1).
pub const fn digit_count(mut value: u32) -> usize {
    let mut digits = 1;
    while value >= 10 {
        value /= 10;
        digits += 1;
    }
    digits
}

/// Render `value` without leading zeros ("0" for zero). Values above
/// [`MAX_VALUE`] are clamped.
pub fn format_number(value: u32) -> FormattedNumber {
    let value = value.min(MAX_VALUE);
    let mut digits = String::new();
    // Cannot overflow: clamped to MAX_DIGITS digits
    let _ = write!(digits, "{}", value);

    FormattedNumber {
        width: digit_count(value),
        digits,
    }
}

/// Render elapsed seconds as `HH:MM:SS`.
///
/// Each digit is taken independently, so hours wrap at 100: 100 hours
/// shows as `00:00:00`.
pub fn format_uptime(seconds: u64) -> String<UPTIME_LEN> {
    let mut text = String::new();
    let _ = write!(
        text,
        "{}{}:{}{}:{}{}",
        (seconds / 36_000) % 10,
        (seconds / 3_600) % 10,
        (seconds / 600) % 6,
        (seconds / 60) % 10,
        (seconds / 10) % 6,
        seconds % 10,
    );
    text
}

/// Render the live task count.
///
/// Counts below 10 become `" d "`, overwriting a previous two-digit value
/// completely; counts of 10 and above become two digits. Counts above
/// [`MAX_TASK_COUNT`] are clamped.
pub fn format_task_count(count: u32) -> TaskCountText {
    let count = count.min(MAX_TASK_COUNT);
    let mut text = String::new();

    let width = if count < 10 {
        let _ = write!(text, " {} ", count);
        TaskCountWidth::Single
    } else {
        let _ = write!(text, "{}", count);
        TaskCountWidth::Double
    };

    TaskCountText { text, width }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_minimal_width() {
        for (value, expected) in [(0, "0"), (7, "7"), (42, "42"), (999_999, "999999")] {
            let formatted = format_number(value);
            assert_eq!(formatted.digits.as_str(), expected);
            assert_eq!(formatted.width, expected.len());
        }
    }

    #[test]
    fn test_number_widths_at_boundaries() {
        assert_eq!(format_number(9).width, 1);
        assert_eq!(format_number(10).width, 2);
        assert_eq!(format_number(999).width, 3);
        assert_eq!(format_number(1_000).width, 4);
        assert_eq!(format_number(99_999).width, 5);
        assert_eq!(format_number(100_000).width, 6);
    }

    #[test]
    fn test_number_clamps_above_six_digits() {
        let formatted = format_number(1_000_000);
        assert_eq!(formatted.digits.as_str(), "999999");
        assert_eq!(formatted.width, MAX_DIGITS);

        assert_eq!(format_number(u32::MAX).digits.as_str(), "999999");
    }

    #[test]
    fn test_uptime() {
        assert_eq!(format_uptime(0).as_str(), "00:00:00");
        assert_eq!(format_uptime(59).as_str(), "00:00:59");
        assert_eq!(format_uptime(60).as_str(), "00:01:00");
        assert_eq!(format_uptime(3_661).as_str(), "01:01:01");
        assert_eq!(format_uptime(99 * 3_600 + 59 * 60 + 59).as_str(), "99:59:59");
    }

    #[test]
    fn test_uptime_hours_wrap_past_99() {
        assert_eq!(format_uptime(100 * 3_600).as_str(), "00:00:00");
        assert_eq!(format_uptime(123 * 3_600 + 4 * 60 + 5).as_str(), "23:04:05");
    }

    #[test]
    fn test_task_count_single_digit_is_padded() {
        let text = format_task_count(0);
        assert_eq!(text.text.as_str(), " 0 ");
        assert_eq!(text.width, TaskCountWidth::Single);

        assert_eq!(format_task_count(9).text.as_str(), " 9 ");
    }

    #[test]
    fn test_task_count_double_digit() {
        let text = format_task_count(10);
        assert_eq!(text.text.as_str(), "10");
        assert_eq!(text.width, TaskCountWidth::Double);

        assert_eq!(format_task_count(99).text.as_str(), "99");
        assert_eq!(format_task_count(250).text.as_str(), "99");
    }

    #[test]
    fn test_digit_count() {
        assert_eq!(digit_count(0), 1);
        assert_eq!(digit_count(123_456), 6);
        assert_eq!(digit_count(u32::MAX), 10);
    }
}
