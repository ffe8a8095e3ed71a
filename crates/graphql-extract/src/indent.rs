/// Re-pad printed GraphQL so it sits where `original` used to.
///
/// Everything before the first non-whitespace character of `original` is
/// kept. Its last line (the indentation of the first non-blank line) is
/// prepended to every non-empty printed line, and the trailing whitespace
/// of `original` is appended verbatim.
#[must_use]
pub fn restore_indentation(original: &str, printed: &str) -> String {
    let body_start = original.len() - original.trim_start().len();
    let leading = &original[..body_start];
    let indent_start = leading.rfind('\n').map_or(0, |idx| idx + 1);
    let (prefix, indent) = leading.split_at(indent_start);

    let trailing = if original.trim().is_empty() {
        ""
    } else {
        &original[original.trim_end().len()..]
    };

    let body = printed
        .trim()
        .lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{indent}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!("{prefix}{body}{trailing}")
}
