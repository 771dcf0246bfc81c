pub fn encode_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect::<String>()
}

pub fn decode_hex(input: &str) -> Option<Vec<u8>> {
    if input.len() % 2 != 0 || !input.is_ascii() {
        return None;
    }
    (0..input.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&input[i..i + 2], 16).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_helpers() {
        assert_eq!(encode_hex(&[0, 16, 255]), "0010ff");
        assert_eq!(decode_hex("0010FF"), Some(vec![0, 16, 255]));
        assert_eq!(decode_hex("abc"), None);
        assert_eq!(decode_hex(""), Some(vec![]));
    }
}
