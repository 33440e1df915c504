//! Observer position input.

use hazard_common::{HazardError, HazardResult};

/// Parse one `lat,lon` input line.
///
/// Blank lines and `#` comments yield `Ok(None)`.
pub fn parse_position(line: &str) -> HazardResult<Option<(f64, f64)>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (lat, lon) = line.split_once(',').ok_or_else(|| {
        HazardError::invalid_parameter("position", format!("expected 'lat,lon', got '{}'", line))
    })?;
    let lat = parse_coord("lat", lat)?;
    let lon = parse_coord("lon", lon)?;
    Ok(Some((lat, lon)))
}

fn parse_coord(name: &str, raw: &str) -> HazardResult<f64> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| HazardError::invalid_parameter(name, format!("not a number: '{}'", raw.trim())))?;
    if !value.is_finite() {
        return Err(HazardError::invalid_parameter(name, "must be finite"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_position() {
        assert_eq!(parse_position("50.06,19.94").unwrap(), Some((50.06, 19.94)));
        assert_eq!(parse_position("  50.06 , 19.94 \n").unwrap(), Some((50.06, 19.94)));
        assert_eq!(parse_position("").unwrap(), None);
        assert_eq!(parse_position("# start of walk").unwrap(), None);
    }

    #[test]
    fn test_parse_position_errors() {
        assert!(parse_position("50.06").is_err());
        assert!(parse_position("north,19.94").is_err());
        assert!(parse_position("NaN,19.94").is_err());
        assert!(parse_position("50.06,inf").is_err());
    }
}
