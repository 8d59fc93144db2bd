/// Replace `${ENV_VAR}` placeholders in config text.
///
/// Unresolvable variables are left as-is so a missing secret surfaces as a
/// literal placeholder instead of an empty string.
pub fn substitute_env(input: &str) -> String {
    substitute_with(input, |name| std::env::var(name).ok())
}

fn substitute_with(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) if end > 0 => {
                let name = &after[..end];
                match lookup(name) {
                    Some(val) => out.push_str(&val),
                    None => {
                        out.push_str("${");
                        out.push_str(name);
                        out.push('}');
                    },
                }
                rest = &after[end + 1..];
            },
            _ => {
                // Unterminated or empty placeholder, emit literally.
                out.push_str("${");
                rest = after;
            },
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(name: &str) -> Option<String> {
        (name == "PW_TEST_VAR").then(|| "resolved".to_string())
    }

    #[test]
    fn substitutes_known_var() {
        assert_eq!(
            substitute_with("id = \"${PW_TEST_VAR}\"", lookup),
            "id = \"resolved\""
        );
    }

    #[test]
    fn leaves_unknown_var() {
        assert_eq!(substitute_with("${PW_MISSING}", lookup), "${PW_MISSING}");
    }

    #[test]
    fn handles_multiple_placeholders() {
        assert_eq!(
            substitute_with("${PW_TEST_VAR}/${PW_TEST_VAR}", lookup),
            "resolved/resolved"
        );
    }

    #[test]
    fn unterminated_placeholder_is_literal() {
        assert_eq!(substitute_with("tail ${PW_TEST", lookup), "tail ${PW_TEST");
    }

    #[test]
    fn plain_text_unchanged() {
        assert_eq!(substitute_env("no placeholders here"), "no placeholders here");
    }
}
