pub(crate) mod classes;
pub(crate) mod exams;
pub(crate) mod health;
pub(crate) mod scores;
pub(crate) mod students;
pub(crate) mod subjects;

/// Escapes `\`, `%` and `_` for a `LIKE ... ESCAPE '\'` pattern.
pub(crate) fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::escape_like;

    #[test]
    fn escape_like_guards_wildcards() {
        assert_eq!(escape_like("JSS 1"), "JSS 1");
        assert_eq!(escape_like("100%_a\\b"), "100\\%\\_a\\\\b");
    }
}
