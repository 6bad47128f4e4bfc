//! Progress estimation
//!
//! Percentages are an estimate from the page size, the step number and a
//! fresh total count. They do not track records inserted or deleted between
//! steps, so a long-running export can jump or stall near the end.

/// Percentage of a job complete after `step` pages of `page_size` records
///
/// `min(100, floor(page_size * step / total * 100))`; an empty record set is
/// always 100. Arithmetic saturates instead of overflowing.
///
/// # Examples
///
/// ```
/// use helpdesk_export::core::export::progress::percentage;
///
/// assert_eq!(percentage(65, 1, 30), 46);
/// assert_eq!(percentage(65, 2, 30), 92);
/// assert_eq!(percentage(65, 3, 30), 100);
/// assert_eq!(percentage(0, 7, 30), 100);
/// ```
pub fn percentage(total: u64, step: u32, page_size: u64) -> u8 {
    if total == 0 {
        return 100;
    }

    let processed = page_size.saturating_mul(u64::from(step));
    let pct = processed.saturating_mul(100) / total;
    // min(100) keeps the cast lossless
    pct.min(100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(65, 1 => 46 ; "first of three pages")]
    #[test_case(65, 2 => 92 ; "second of three pages")]
    #[test_case(65, 3 => 100 ; "last page is capped")]
    #[test_case(30, 1 => 100 ; "exact single page")]
    #[test_case(1000, 1 => 3 ; "floors fractional percentages")]
    #[test_case(0, 1 => 100 ; "empty set on first step")]
    #[test_case(0, 42 => 100 ; "empty set on any step")]
    fn test_percentage(total: u64, step: u32) -> u8 {
        percentage(total, step, 30)
    }

    #[test]
    fn test_percentage_non_decreasing_and_bounded() {
        for total in [1u64, 7, 29, 30, 31, 59, 60, 61, 999, 10_000] {
            let mut previous = 0;
            for step in 1..=400 {
                let pct = percentage(total, step, 30);
                assert!(pct <= 100);
                assert!(pct >= previous, "total={total} step={step}");
                previous = pct;
            }
        }
    }

    #[test]
    fn test_percentage_saturates() {
        assert_eq!(percentage(1, u32::MAX, u64::MAX), 100);
    }
}
