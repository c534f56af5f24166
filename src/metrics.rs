/// Sum of all counts in a series.
pub fn total(values: &[u64]) -> u64 {
    values.iter().sum()
}

/// Share of `value` in `total` as a percentage, or `None` when the total is zero.
pub fn share_percent(value: u64, total: u64) -> Option<f64> {
    if total == 0 {
        return None;
    }
    Some((value as f64) * 100.0 / (total as f64))
}

/// Scale `value` against `max` onto `width` cells. Non-zero values always get at least one cell.
pub fn scaled_width(value: u64, max: u64, width: usize) -> usize {
    if max == 0 || value == 0 || width == 0 {
        return 0;
    }
    let w = ((value as f64) / (max as f64) * (width as f64)).round() as usize;
    w.clamp(1, width)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn share_handles_empty_totals() {
        assert_eq!(share_percent(3, 0), None);
        assert_eq!(share_percent(1, 4), Some(25.0));
        assert_eq!(total(&[12, 9]), 21);
    }

    #[test]
    fn scaled_width_never_hides_small_values() {
        assert_eq!(scaled_width(12, 12, 30), 30);
        assert_eq!(scaled_width(1, 1000, 30), 1);
        assert_eq!(scaled_width(0, 10, 30), 0);
        assert_eq!(scaled_width(6, 12, 30), 15);
    }
}
