/// Calculates the 1-based line and column number for a given byte position in the source text.
/// This function is designed to be called only when an error occurs, as it iterates through
/// the source text to determine the position.
pub fn get_line_and_column(source: &str, position: usize) -> (usize, usize) {
    let mut line = 1;
    let mut column = 1;
    for (i, c) in source.char_indices() {
        if i >= position {
            break;
        }
        if c == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    (line, column)
}

/// Returns the 1-based line of `source` containing `position`, without its line break.
pub fn line_at(source: &str, position: usize) -> &str {
    let position = position.min(source.len());
    let start = source[..position].rfind('\n').map_or(0, |i| i + 1);
    let end = source[position..]
        .find('\n')
        .map_or(source.len(), |i| position + i);
    &source[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_and_column() {
        let source = "div{\n  color: red;\n}";
        assert_eq!(get_line_and_column(source, 0), (1, 1));
        assert_eq!(get_line_and_column(source, 7), (2, 3));
        assert_eq!(get_line_and_column(source, source.len()), (3, 2));
    }

    #[test]
    fn test_line_and_column_counts_characters() {
        let source = "p{content: 'é';}";
        let position = source.find(';').unwrap();
        assert_eq!(get_line_and_column(source, position), (1, 15));
    }

    #[test]
    fn test_line_at() {
        let source = "div{\n  color: red;\n}";
        assert_eq!(line_at(source, 8), "  color: red;");
        assert_eq!(line_at(source, 0), "div{");
        assert_eq!(line_at(source, source.len()), "}");
    }
}
