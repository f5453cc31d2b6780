/// Marks a command to run without waiting for it.
pub const BACKGROUND_MARKER: char = '&';

const DELIMITER: char = ' ';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tokens {
    pub args: Vec<String>,
    pub background: bool,
}

impl Tokens {
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    pub fn program(&self) -> Option<&str> {
        self.args.first().map(String::as_str)
    }
}

/// Splits `line` on runs of spaces.
///
/// The first `&` in the line is overwritten with a space before splitting,
/// so the caller's buffer no longer carries the marker afterwards and gets
/// logged without it. Later `&` characters are left alone.
pub fn tokenize(line: &mut String) -> Tokens {
    let background = match line.find(BACKGROUND_MARKER) {
        Some(pos) => {
            line.replace_range(pos..pos + BACKGROUND_MARKER.len_utf8(), " ");
            true
        }
        None => false,
    };

    let args = line
        .split(DELIMITER)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect();

    Tokens { args, background }
}
