use ambre_core::OrderId;
use chrono::{DateTime, Utc};
use rand::seq::IndexedRandom;

const SUFFIX_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const SUFFIX_LEN: usize = 4;

/// `ORD-<unix millis>-<4 uppercase alphanumerics>`.
pub fn generate_order_id(now: DateTime<Utc>) -> OrderId {
    let mut rng = rand::rng();
    let suffix: String = (0..SUFFIX_LEN)
        .filter_map(|_| SUFFIX_ALPHABET.choose(&mut rng).copied().map(char::from))
        .collect();
    OrderId::new(format!("ORD-{}-{suffix}", now.timestamp_millis()))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_format() {
        let now = Utc.timestamp_millis_opt(1_767_225_600_123).single().unwrap_or_default();
        let id = generate_order_id(now);
        let parts: Vec<&str> = id.as_str().split('-').collect();

        assert_eq!(parts.len(), 3);
        assert_eq!(parts.first(), Some(&"ORD"));
        assert_eq!(parts.get(1), Some(&"1767225600123"));
        let suffix = parts.get(2).copied().unwrap_or_default();
        assert_eq!(suffix.len(), SUFFIX_LEN);
        assert!(suffix.bytes().all(|b| SUFFIX_ALPHABET.contains(&b)));
    }
}
