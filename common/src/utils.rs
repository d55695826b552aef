use crate::constants::OTP_LENGTH;
use rand::Rng;

/// Random numeric code of `OTP_LENGTH` digits, leading zeros allowed.
pub fn generate_otp() -> String {
    let mut rng = rand::thread_rng();
    (0..OTP_LENGTH)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

/// Parses `key=value` pairs into transition metadata. Values that are valid
/// JSON (numbers, booleans, quoted strings) keep their type, anything else is
/// stored as a plain string.
pub fn parse_metadata<'a>(pairs: impl IntoIterator<Item = &'a str>) -> crate::types::dtos::Metadata {
    pairs
        .into_iter()
        .filter_map(|pair| pair.split_once('='))
        .map(|(key, value)| {
            let value = serde_json::from_str(value)
                .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
            (key.to_string(), value)
        })
        .collect()
}

pub fn print_welcome_message() {
    println!("=====================================");
    println!("   Laundry pickup & delivery client");
    println!("   type `help` for the command list");
    println!("=====================================");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_otp_shape() {
        for _ in 0..50 {
            let code = generate_otp();
            assert_eq!(code.len(), OTP_LENGTH);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_parse_metadata_keeps_json_types() {
        let metadata = parse_metadata(["bags=3", "note=torn sleeve", "rush=true", "broken"]);
        assert_eq!(metadata.len(), 3);
        assert_eq!(metadata["bags"], serde_json::json!(3));
        assert_eq!(metadata["note"], serde_json::json!("torn sleeve"));
        assert_eq!(metadata["rush"], serde_json::json!(true));
    }
}
