//! Bank identifier normalization.

/// Canonical form of a caller-supplied bank identifier: surrounding
/// whitespace removed and lowercased.
///
/// Every lookup and every stored `bank_id` goes through this function so
/// `" Akbank "`, `"AKBANK"` and `"akbank"` all address the same bank.
pub fn normalize_bank_id(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trims_and_lowercases() {
        assert_eq!(normalize_bank_id("  Akbank\t"), "akbank");
        assert_eq!(normalize_bank_id("GARANTI"), "garanti");
    }

    #[test]
    fn test_keeps_non_ascii_letters() {
        assert_eq!(normalize_bank_id("YapıKredi"), "yapıkredi");
    }

    #[test]
    fn test_is_idempotent() {
        let once = normalize_bank_id(" YapiKredi ");
        assert_eq!(normalize_bank_id(&once), once);
    }
}
