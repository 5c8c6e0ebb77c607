//! Number formatting for tick and cursor labels

/// Minus sign used for negative labels (U+2212)
pub const MINUS_SIGN: char = '\u{2212}';

const MAX_SIG_FIGURES: usize = 10;

/// Smallest number of significant figures (1..=10) that reproduces `value`
/// to a relative error of `1e-10`.
pub fn determine_sig_figures(value: f64) -> usize {
    if value == 0.0 || !value.is_finite() {
        return 1;
    }

    let order = value.abs().log10().floor() as i32;
    let tolerance = 10f64.powi(-(MAX_SIG_FIGURES as i32));

    for figures in 1..=MAX_SIG_FIGURES {
        let multiplier = 10f64.powi(figures as i32 - 1 - order);
        let rounded = (value * multiplier).round() / multiplier;
        if ((value - rounded) / value).abs() <= tolerance {
            return figures;
        }
    }
    MAX_SIG_FIGURES
}

/// Round `value` to `sig_figures` significant figures
pub fn round_to_sig_figures(value: f64, sig_figures: usize) -> f64 {
    if value == 0.0 {
        return 0.0;
    }
    let order = value.abs().log10().floor() as i32;
    let multiplier = 10f64.powi(sig_figures as i32 - 1 - order);
    let rounded = (value.abs() * multiplier).round() / multiplier;
    rounded.copysign(value)
}

/// Format `value` for display.
///
/// Returns an empty string for NaN and infinities. Without an explicit
/// figure count the shortest exact representation is used. Magnitudes
/// below `1e-3` or from `1e5` upward switch to exponential notation.
pub fn format_number(value: f64, sig_figures: Option<usize>) -> String {
    if !value.is_finite() {
        return String::new();
    }

    let sig = match sig_figures {
        Some(n) if n > 0 => n,
        _ => determine_sig_figures(value),
    };

    let rounded = round_to_sig_figures(value, sig).abs();
    let order = if rounded == 0.0 {
        0
    } else {
        rounded.log10().floor() as i32
    };

    let body = if order < -3 || order > 4 {
        exponential(rounded, sig - 1)
    } else {
        let places = (sig as i32 - 1 - order).max(0) as usize;
        format!("{:.*}", places, rounded)
    };

    if value < 0.0 && rounded != 0.0 {
        format!("{MINUS_SIGN}{body}")
    } else {
        body
    }
}

/// `1.5e+5` / `2e-4` style exponent with an explicit sign
fn exponential(value: f64, places: usize) -> String {
    let raw = format!("{:.*e}", places, value);
    match raw.split_once('e') {
        Some((mantissa, exp)) if exp.starts_with('-') => format!("{mantissa}e{exp}"),
        Some((mantissa, exp)) => format!("{mantissa}e+{exp}"),
        None => raw,
    }
}
