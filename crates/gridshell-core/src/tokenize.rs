/// Splits a command line into tokens.
///
/// Tokens are separated by whitespace. A double-quoted run becomes one token
/// with the quotes removed, even when empty or when it touches unquoted text
/// (`a"b c"d` gives `a`, `b c`, `d`). A quote with no closing partner is kept
/// as an ordinary character.
pub fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut rest = line;

    while let Some(c) = rest.chars().next() {
        if c == '"' {
            if let Some(end) = rest[1..].find('"') {
                flush(&mut tokens, &mut current);
                tokens.push(rest[1..1 + end].to_string());
                rest = &rest[end + 2..];
                continue;
            }
        }
        if c.is_whitespace() {
            flush(&mut tokens, &mut current);
        } else {
            current.push(c);
        }
        rest = &rest[c.len_utf8()..];
    }
    flush(&mut tokens, &mut current);

    tokens
}

fn flush(tokens: &mut Vec<String>, current: &mut String) {
    if !current.is_empty() {
        tokens.push(std::mem::take(current));
    }
}
