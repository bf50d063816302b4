/// Human-readable byte count, binary units, at most two decimals.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];
    if bytes == 0 {
        return "0 B".to_string();
    }
    let exponent = ((bytes.ilog2() / 10) as usize).min(UNITS.len() - 1);
    let value = bytes as f64 / 1024f64.powi(exponent as i32);
    let rendered = format!("{value:.2}");
    let rendered = rendered.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", rendered, UNITS[exponent])
}

/// Display mask for the 14-digit company registry number:
/// `12.345.678/0001-99`. Shorter inputs are masked as far as they go.
pub fn mask_tax_id(value: &str) -> String {
    let digits: Vec<char> = value.chars().filter(char::is_ascii_digit).take(14).collect();
    let mut masked = String::with_capacity(18);
    for (index, digit) in digits.iter().enumerate() {
        match index {
            2 | 5 => masked.push('.'),
            8 => masked.push('/'),
            12 => masked.push('-'),
            _ => {}
        }
        masked.push(*digit);
    }
    masked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_zero_and_small_sizes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(512), "512 B");
    }

    #[test]
    fn formats_round_binary_sizes_without_decimals() {
        assert_eq!(format_bytes(1024), "1 KB");
        assert_eq!(format_bytes(100 * 1024 * 1024), "100 MB");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024), "3 GB");
    }

    #[test]
    fn keeps_up_to_two_decimals() {
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(1024 + 256), "1.25 KB");
    }

    #[test]
    fn masks_a_full_tax_id() {
        assert_eq!(mask_tax_id("12345678000199"), "12.345.678/0001-99");
    }

    #[test]
    fn masks_partial_input_and_strips_junk() {
        assert_eq!(mask_tax_id("12.345x678"), "12.345.678");
        assert_eq!(mask_tax_id(""), "");
        assert_eq!(mask_tax_id("123456780001995555"), "12.345.678/0001-99");
    }
}
