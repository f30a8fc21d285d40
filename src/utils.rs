pub fn mask_token(token: &str) -> String {
    let len = token.chars().count();
    if len <= 15 {
        // Too short to safely show, just show dots
        return "•".repeat(len);
    }

    let first: String = token.chars().take(7).collect();
    let last: String = token.chars().skip(len - 6).collect();
    format!("{}...{}", first, last)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_short_token() {
        assert_eq!(mask_token("abc"), "•••");
        assert_eq!(mask_token(""), "");
    }

    #[test]
    fn test_mask_long_token() {
        assert_eq!(
            mask_token("eyJhbGciOiJIUzI1NiJ9.payload.signature"),
            "eyJhbGc...nature"
        );
    }
}
