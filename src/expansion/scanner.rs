//! Single-pass scanner used to rewrite named placeholders without touching
//! string literals, quoted identifiers, comments, dollar-quoted blocks, or
//! `::` casts.

#[derive(Clone)]
enum State {
    Normal,
    SingleQuoted,
    DoubleQuoted,
    LineComment,
    BlockComment(u32),
    DollarQuoted(String),
}

fn is_line_comment_start(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx) == Some(&b'-') && bytes.get(idx + 1) == Some(&b'-')
}

fn is_block_comment_start(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx) == Some(&b'/') && bytes.get(idx + 1) == Some(&b'*')
}

fn is_block_comment_end(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx) == Some(&b'*') && bytes.get(idx + 1) == Some(&b'/')
}

fn try_start_dollar_quote(bytes: &[u8], start: usize) -> Option<(String, usize)> {
    let mut idx = start + 1;
    while idx < bytes.len() && bytes[idx] != b'$' {
        let b = bytes[idx];
        if !(b.is_ascii_alphanumeric() || b == b'_') {
            return None;
        }
        idx += 1;
    }

    if idx < bytes.len() && bytes[idx] == b'$' {
        let tag = String::from_utf8(bytes[start + 1..idx].to_vec()).ok()?;
        Some((tag, idx))
    } else {
        None
    }
}

fn matches_tag(bytes: &[u8], idx: usize, tag: &str) -> bool {
    let end = idx + 1 + tag.len();
    bytes.len() > end && &bytes[idx + 1..end] == tag.as_bytes() && bytes[end] == b'$'
}

/// Scan an identifier (`[A-Za-z_][A-Za-z0-9_]*`) starting at `start`.
fn scan_identifier(bytes: &[u8], start: usize) -> Option<usize> {
    if start >= bytes.len() || bytes[start].is_ascii_digit() {
        return None;
    }
    let mut idx = start;
    while idx < bytes.len() && (bytes[idx].is_ascii_alphanumeric() || bytes[idx] == b'_') {
        idx += 1;
    }
    if idx == start { None } else { Some(idx) }
}

/// Walk `sql` and invoke `replace` for every named placeholder (`:name`)
/// found outside literals, comments, and dollar-quoted blocks. A `Some`
/// return substitutes the placeholder text; `None` keeps it verbatim.
pub(crate) fn rewrite_named_placeholders<F>(sql: &str, mut replace: F) -> String
where
    F: FnMut(&str) -> Option<String>,
{
    let bytes = sql.as_bytes();
    let mut out = String::with_capacity(sql.len() + 16);
    // Everything before this offset has already been flushed to `out`.
    let mut copied = 0usize;
    let mut state = State::Normal;
    let mut idx = 0usize;

    while idx < bytes.len() {
        match state {
            State::Normal => {
                let b = bytes[idx];
                if b == b'\'' {
                    state = State::SingleQuoted;
                    idx += 1;
                } else if b == b'"' {
                    state = State::DoubleQuoted;
                    idx += 1;
                } else if is_line_comment_start(bytes, idx) {
                    state = State::LineComment;
                    idx += 2;
                } else if is_block_comment_start(bytes, idx) {
                    state = State::BlockComment(1);
                    idx += 2;
                } else if b == b'$' {
                    if let Some((tag, closing)) = try_start_dollar_quote(bytes, idx) {
                        state = State::DollarQuoted(tag);
                        idx = closing + 1;
                    } else {
                        idx += 1;
                    }
                } else if b == b':' {
                    if bytes.get(idx + 1) == Some(&b':') {
                        // `::` type cast, not a placeholder
                        idx += 2;
                    } else if let Some(end) = scan_identifier(bytes, idx + 1) {
                        let name = &sql[idx..end];
                        if let Some(replacement) = replace(name) {
                            out.push_str(&sql[copied..idx]);
                            out.push_str(&replacement);
                            copied = end;
                        }
                        idx = end;
                    } else {
                        idx += 1;
                    }
                } else {
                    idx += 1;
                }
            }
            State::SingleQuoted => {
                if bytes[idx] == b'\'' {
                    if bytes.get(idx + 1) == Some(&b'\'') {
                        idx += 2; // escaped quote
                        continue;
                    }
                    state = State::Normal;
                }
                idx += 1;
            }
            State::DoubleQuoted => {
                if bytes[idx] == b'"' {
                    if bytes.get(idx + 1) == Some(&b'"') {
                        idx += 2; // escaped quote
                        continue;
                    }
                    state = State::Normal;
                }
                idx += 1;
            }
            State::LineComment => {
                if bytes[idx] == b'\n' {
                    state = State::Normal;
                }
                idx += 1;
            }
            State::BlockComment(depth) => {
                if is_block_comment_start(bytes, idx) {
                    state = State::BlockComment(depth + 1);
                    idx += 2;
                } else if is_block_comment_end(bytes, idx) {
                    state = if depth == 1 {
                        State::Normal
                    } else {
                        State::BlockComment(depth - 1)
                    };
                    idx += 2;
                } else {
                    idx += 1;
                }
            }
            State::DollarQuoted(ref tag) => {
                if bytes[idx] == b'$' && matches_tag(bytes, idx, tag) {
                    let tag_len = tag.len();
                    state = State::Normal;
                    idx += tag_len + 2;
                } else {
                    idx += 1;
                }
            }
        }
    }

    out.push_str(&sql[copied..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upper(sql: &str) -> String {
        rewrite_named_placeholders(sql, |name| Some(name.to_uppercase()))
    }

    #[test]
    fn rewrites_only_outside_literals_and_comments() {
        let sql = "select ':a', \":b\" , :c -- :d\n/* :e */ from t where x = :f";
        assert_eq!(
            upper(sql),
            "select ':a', \":b\" , :C -- :d\n/* :e */ from t where x = :F"
        );
    }

    #[test]
    fn skips_double_colon_casts() {
        assert_eq!(upper("select :a::text, 1::int"), "select :A::text, 1::int");
    }

    #[test]
    fn skips_dollar_quoted_blocks() {
        let sql = "$fn$ select :a $fn$ where b = :b";
        assert_eq!(upper(sql), "$fn$ select :a $fn$ where b = :B");
    }

    #[test]
    fn handles_escaped_quotes() {
        let sql = "select 'it''s :a' , :b";
        assert_eq!(upper(sql), "select 'it''s :a' , :B");
    }

    #[test]
    fn identifier_must_not_start_with_digit() {
        assert_eq!(upper("select :1a, :_x"), "select :1a, :_X");
    }
}
