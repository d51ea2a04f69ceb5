/// Characters that separate arguments on a command line.
pub const DELIMITERS: [char; 5] = [' ', '\t', '\r', '\n', '\x07'];

/// Splits a raw input line into its arguments.
///
/// Runs of delimiters collapse, so the result never holds an empty token.
/// A blank line yields an empty vector.
pub fn tokenize(input: &str) -> Vec<String> {
    input
        .split(|ch| DELIMITERS.contains(&ch))
        .filter(|token| !token.is_empty())
        .map(String::from)
        .collect()
}
