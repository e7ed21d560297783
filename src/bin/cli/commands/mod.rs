pub mod faq;
pub mod inventory;
pub mod mail;
pub mod poll;
pub mod purchase;
pub mod treasury;
pub mod user;

/// Parses a money amount such as `12`, `12.5` or `12.34` into cents
pub fn parse_amount(raw: &str) -> Result<i64, String> {
    let raw = raw.trim();
    if raw.starts_with('-') {
        return Err(format!("'{}' must not be negative", raw));
    }
    let (whole, fraction) = match raw.split_once(['.', ',']) {
        Some((whole, fraction)) => (whole, fraction),
        None => (raw, ""),
    };
    if whole.is_empty() || fraction.len() > 2 || !fraction.chars().all(|c| c.is_ascii_digit()) {
        return Err(format!("'{}' is not an amount with at most two decimals", raw));
    }

    let whole: i64 = whole
        .parse()
        .map_err(|_| format!("'{}' is not a valid amount", raw))?;
    let fraction: i64 = if fraction.is_empty() {
        0
    } else {
        let digits: i64 = fraction
            .parse()
            .map_err(|_| format!("'{}' is not a valid amount", raw))?;
        if fraction.len() == 1 { digits * 10 } else { digits }
    };

    whole
        .checked_mul(100)
        .and_then(|cents| cents.checked_add(fraction))
        .ok_or_else(|| format!("'{}' is too large", raw))
}

/// Turns an optional new value and a clear flag into a field update
///
/// `None` leaves the field alone and `Some(None)` clears it.
pub fn field_change<T>(value: Option<T>, clear: bool) -> Option<Option<T>> {
    if clear { Some(None) } else { value.map(Some) }
}
