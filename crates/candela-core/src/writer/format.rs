//! Line-wrapped numeric rows.

use super::WriteOptions;

/// Beyond this many places f64 has no digits left and the scale factor
/// heads for overflow.
pub const MAX_DECIMALS: u32 = 15;

/// Round `value` to `decimals` places (at most [`MAX_DECIMALS`]) and print it
/// in its shortest form.
pub fn format_number(value: f64, decimals: u32) -> String {
    let factor = 10f64.powi(decimals.min(MAX_DECIMALS) as i32);
    let rounded = (value * factor).round() / factor;
    // Avoid "-0" for tiny negatives that round away.
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    format!("{}", rounded)
}

/// Space-separated numbers, wrapped so no line exceeds the column budget.
///
/// The row always ends with a line ending, so consecutive rows start on
/// fresh lines. A single token wider than the budget gets a line to itself.
pub fn format_values<I>(values: I, options: &WriteOptions) -> String
where
    I: IntoIterator<Item = f64>,
{
    let mut out = String::new();
    let mut line_len = 0;

    for value in values {
        let token = format_number(value, options.decimals);
        if line_len > 0 {
            if line_len + 1 + token.len() > options.line_width {
                out.push_str(&options.line_ending);
                line_len = 0;
            } else {
                out.push(' ');
                line_len += 1;
            }
        }
        out.push_str(&token);
        line_len += token.len();
    }

    out.push_str(&options.line_ending);
    out
}
