// ── Byte counter formatting ──

const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];

/// Render a byte counter with binary units and one decimal place.
///
/// Zero renders as `"0 B"`. Values past the TiB range stay in TiB rather
/// than overflowing the unit table.
#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
pub fn fmt_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".into();
    }

    let exp = usize::try_from(bytes.ilog(1024))
        .unwrap_or(usize::MAX)
        .min(UNITS.len() - 1);
    let scaled = bytes as f64 / 1024_f64.powi(i32::try_from(exp).unwrap_or(0));
    let unit = UNITS.get(exp).copied().unwrap_or("TiB");

    format!("{scaled:.1} {unit}")
}
