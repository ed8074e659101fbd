//! Assertion helpers for scenario steps

use std::fmt::Debug;

/// Error when an assertion fails
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertionError {
    pub message: String,
    pub expected: String,
    pub actual: String,
}

impl AssertionError {
    pub fn new(
        message: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

impl std::fmt::Display for AssertionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\n    Expected: {}\n    Actual: {}", self.message, self.expected, self.actual)
    }
}

impl std::error::Error for AssertionError {}

/// Check that `actual` equals `expected`
pub fn expect_eq<T: PartialEq + Debug>(label: &str, actual: T, expected: T) -> Result<(), AssertionError> {
    if actual != expected {
        return Err(AssertionError::new(
            format!("{} should equal {:?}", label, expected),
            format!("{:?}", expected),
            format!("{:?}", actual),
        ));
    }
    Ok(())
}

/// Check that `actual` differs from `unexpected`
pub fn expect_ne<T: PartialEq + Debug>(label: &str, actual: T, unexpected: T) -> Result<(), AssertionError> {
    if actual == unexpected {
        return Err(AssertionError::new(
            format!("{} should not equal {:?}", label, unexpected),
            format!("anything but {:?}", unexpected),
            format!("{:?}", actual),
        ));
    }
    Ok(())
}

/// Parse a check string into (path, operator, value)
pub fn parse_check(check: &str) -> Option<(&str, &str, &str)> {
    // Try operators in order of specificity (>= before >, == before =)
    for op in &[">=", "<=", "!=", "==", "=", ">", "<"] {
        if let Some(idx) = check.find(op) {
            let path = check[..idx].trim();
            let value = check[idx + op.len()..].trim();
            if path.is_empty() || value.is_empty() {
                return None;
            }
            return Some((path, op, value));
        }
    }
    None
}

/// Compare an integer against an expected value with the given operator
pub fn check_comparison(path: &str, actual: i64, operator: &str, expected_str: &str) -> Result<(), AssertionError> {
    let value: i64 = expected_str.trim().parse().map_err(|_| AssertionError {
        message: format!("Invalid value for {}", path),
        expected: "integer".to_string(),
        actual: expected_str.to_string(),
    })?;

    let pass = match operator {
        ">=" => actual >= value,
        "<=" => actual <= value,
        ">" => actual > value,
        "<" => actual < value,
        "=" | "==" => actual == value,
        "!=" => actual != value,
        _ => {
            return Err(AssertionError::new(
                format!("Unknown operator '{}' for {}", operator, path),
                "one of = == != > >= < <=",
                operator,
            ));
        }
    };

    if !pass {
        return Err(AssertionError {
            message: format!("Check failed: {} {} {} (actual: {})", path, operator, expected_str, actual),
            expected: format!("{} {} {}", path, operator, value),
            actual: actual.to_string(),
        });
    }

    Ok(())
}

/// Compare two words with `=`/`==` or `!=`
pub fn check_word(path: &str, actual: &str, operator: &str, expected: &str) -> Result<(), AssertionError> {
    let expected = expected.trim_matches('"');
    let pass = match operator {
        "=" | "==" => actual == expected,
        "!=" => actual != expected,
        _ => {
            return Err(AssertionError::new(
                format!("Operator '{}' cannot compare {}", operator, path),
                "= or !=",
                operator,
            ));
        }
    };

    if !pass {
        return Err(AssertionError::new(
            format!("Check failed: {} {} {}", path, operator, expected),
            format!("{} {} {}", path, operator, expected),
            actual,
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_check_operators() {
        assert_eq!(parse_check("score = 300"), Some(("score", "=", "300")));
        assert_eq!(parse_check("score == 300"), Some(("score", "==", "300")));
        assert_eq!(parse_check("frame.3 >= 20"), Some(("frame.3", ">=", "20")));
        assert_eq!(parse_check("score<5"), Some(("score", "<", "5")));
        assert_eq!(parse_check("error != none"), Some(("error", "!=", "none")));
        assert_eq!(parse_check("score"), None);
        assert_eq!(parse_check("= 3"), None);
    }

    #[test]
    fn test_check_comparison() {
        assert!(check_comparison("score", 300, "=", "300").is_ok());
        assert!(check_comparison("score", 24, ">", "20").is_ok());
        assert!(check_comparison("score", 24, "<=", "24").is_ok());

        let err = check_comparison("score", 16, "=", "17").unwrap_err();
        assert_eq!(err.expected, "score = 17");
        assert_eq!(err.actual, "16");

        assert!(check_comparison("score", 1, "=", "one").is_err());
        assert!(check_comparison("score", 1, "~", "1").is_err());
    }

    #[test]
    fn test_check_word() {
        assert!(check_word("error", "incomplete_game", "=", "incomplete_game").is_ok());
        assert!(check_word("error", "none", "!=", "\"frame_overflow\"").is_ok());
        assert!(check_word("error", "none", "=", "frame_overflow").is_err());
        assert!(check_word("error", "none", ">", "x").is_err());
    }

    #[test]
    fn test_expect_helpers() {
        assert!(expect_eq("score", 20, 20).is_ok());
        let err = expect_eq("score", 19, 20).unwrap_err();
        assert_eq!(err.to_string(), "score should equal 20\n    Expected: 20\n    Actual: 19");
        assert!(expect_ne("score", 1, 2).is_ok());
        assert!(expect_ne("score", 2, 2).is_err());
    }
}
