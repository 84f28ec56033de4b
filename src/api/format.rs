//! Display formatting for API responses

const TRILLION: i64 = 1_000_000_000_000;
const BILLION: i64 = 1_000_000_000;
const MILLION: i64 = 1_000_000;

/// Render a market cap with a magnitude suffix, e.g. `2.50T`
///
/// Values below one million are rendered as plain integers.
pub fn format_market_cap(value: Option<i64>) -> Option<String> {
    let value = value?;

    let formatted = if value >= TRILLION {
        format!("{:.2}T", value as f64 / TRILLION as f64)
    } else if value >= BILLION {
        format!("{:.2}B", value as f64 / BILLION as f64)
    } else if value >= MILLION {
        format!("{:.2}M", value as f64 / MILLION as f64)
    } else {
        value.to_string()
    };

    Some(formatted)
}
