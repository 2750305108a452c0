//! Presentation-only formatting. Nothing here mutates stored data.

/// Shown when a record has neither city nor state.
pub const LOCATION_PLACEHOLDER: &str = "Not informed";

/// Format an 11-digit CPF as `XXX.XXX.XXX-XX`.
///
/// Input that is not exactly eleven ASCII digits is returned unchanged.
pub fn format_tax_id(tax_id: &str) -> String {
    if tax_id.len() != 11 || !tax_id.bytes().all(|b| b.is_ascii_digit()) {
        return tax_id.to_string();
    }
    format!(
        "{}.{}.{}-{}",
        &tax_id[0..3],
        &tax_id[3..6],
        &tax_id[6..9],
        &tax_id[9..11]
    )
}

/// `"<city>/<state>"`, either side alone when the other is blank, or
/// [`LOCATION_PLACEHOLDER`] when both are.
pub fn format_city_state(city: &str, state: &str) -> String {
    match (city.trim(), state.trim()) {
        ("", "") => LOCATION_PLACEHOLDER.to_string(),
        (city, "") => city.to_string(),
        ("", state) => state.to_string(),
        (city, state) => format!("{city}/{state}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tax_id_gets_separators() {
        let stored = String::from("12345678901");
        assert_eq!(format_tax_id(&stored), "123.456.789-01");
        assert_eq!(stored, "12345678901");
    }

    #[test]
    fn malformed_tax_id_passes_through() {
        assert_eq!(format_tax_id("1234567890"), "1234567890");
        assert_eq!(format_tax_id("123456789012"), "123456789012");
        assert_eq!(format_tax_id("123.456.789-01"), "123.456.789-01");
        assert_eq!(format_tax_id("1234567890a"), "1234567890a");
        assert_eq!(format_tax_id(""), "");
    }

    #[test]
    fn city_state_combinations() {
        assert_eq!(format_city_state("São Paulo", "SP"), "São Paulo/SP");
        assert_eq!(format_city_state("", "SP"), "SP");
        assert_eq!(format_city_state("Recife", ""), "Recife");
        assert_eq!(format_city_state("", ""), LOCATION_PLACEHOLDER);
        assert_eq!(format_city_state(" ", "\t"), LOCATION_PLACEHOLDER);
    }
}
