//! Currency cell parsing.
//!
//! Cells look like `"KSh 1,499"` or, for listings with variants, a range such
//! as `"KSh 499 - 699"`. A cell that cannot be read yields `None`; the caller
//! drops the row rather than failing the load.

const RANGE_SEPARATORS: [char; 2] = ['-', '\u{2013}'];

/// Parse a currency cell into an amount. Ranges resolve to the mean of the
/// ends that parse.
pub fn parse_price(cell: &str) -> Option<f64> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }

    if cell.contains(RANGE_SEPARATORS) {
        let ends: Vec<f64> = cell.split(RANGE_SEPARATORS).filter_map(parse_amount).collect();
        if ends.is_empty() {
            return None;
        }
        return Some(ends.iter().sum::<f64>() / ends.len() as f64);
    }

    parse_amount(cell)
}

/// Keep only digits, `.` and `-`, then parse. Non-finite results are rejected.
fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}
