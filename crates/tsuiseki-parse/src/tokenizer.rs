/// Token categories produced by [`tokenize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Text enclosed in a bracket pair: `[SubGroup]`, `(1080p)`, `【Group】`.
    Enclosed,
    /// A word outside brackets.
    Word,
    /// A dash-family separator (`-`, `–`, `—`). Kept so `Title - 05` can be recognized.
    Dash,
    /// A run of soft delimiters (space, underscore, dot).
    Delimiter,
}

/// A single token of a filename or folder name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
}

impl Token {
    fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn is_word(&self) -> bool {
        self.kind == TokenKind::Word
    }
}

const BRACKETS: &[(char, char)] = &[
    ('[', ']'),
    ('(', ')'),
    ('{', '}'),
    ('\u{300C}', '\u{300D}'), // 「」
    ('\u{300E}', '\u{300F}'), // 『』
    ('\u{3010}', '\u{3011}'), // 【】
];

/// Extensions recognized and split off the input.
const EXTENSIONS: &[&str] = &[
    "mkv", "mp4", "avi", "ogm", "wmv", "mpg", "mpeg", "flv", "webm", "m4v", "ts", "mov", "3gp",
    "rm", "rmvb", "m2ts",
];

fn is_soft_delimiter(c: char) -> bool {
    matches!(c, ' ' | '_' | '.' | '\u{3000}')
}

fn is_dash(c: char) -> bool {
    matches!(c, '-' | '\u{2013}' | '\u{2014}')
}

/// Whether the dot at `dot` splits a plain number such as `07.5`: digits only
/// since `start`, then digits up to the end of the word.
fn is_decimal_point(chars: &[char], start: usize, dot: usize) -> bool {
    if !chars[start..dot].iter().all(char::is_ascii_digit) {
        return false;
    }
    let fraction = chars[dot + 1..]
        .iter()
        .take_while(|c| c.is_ascii_digit())
        .count();
    fraction > 0
        && chars
            .get(dot + 1 + fraction)
            .map_or(true, |c| !c.is_alphanumeric())
}

fn closing_bracket(c: char) -> Option<char> {
    BRACKETS
        .iter()
        .find(|(open, _)| *open == c)
        .map(|(_, close)| *close)
}

/// Split a known video extension off the end of `input`.
///
/// Matching is case-insensitive; the returned extension is lowercase.
pub fn split_extension(input: &str) -> (&str, Option<String>) {
    match input.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => {
            let ext = ext.to_ascii_lowercase();
            if EXTENSIONS.contains(&ext.as_str()) {
                (stem, Some(ext))
            } else {
                (input, None)
            }
        }
        _ => (input, None),
    }
}

/// Tokenize a path component.
///
/// Returns the token stream and the stripped extension, if any. A dot inside
/// a plain number stays in the word so `07.5` survives, while `S02E05.1080p`
/// splits. A dash glued to letters or
/// digits on both sides (`01-03`, `Kaguya-sama`, `WEB-DL`) stays inside the word.
pub fn tokenize(input: &str) -> (Vec<Token>, Option<String>) {
    let (input, extension) = split_extension(input);
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if let Some(close) = closing_bracket(c) {
            i += 1;
            let start = i;
            while i < chars.len() && chars[i] != close {
                i += 1;
            }
            let text: String = chars[start..i].iter().collect();
            let text = text.trim();
            if !text.is_empty() {
                tokens.push(Token::new(TokenKind::Enclosed, text));
            }
            if i < chars.len() {
                i += 1;
            }
            continue;
        }

        if is_dash(c) {
            tokens.push(Token::new(TokenKind::Dash, "-"));
            i += 1;
            continue;
        }

        if is_soft_delimiter(c) {
            while i < chars.len() && is_soft_delimiter(chars[i]) {
                i += 1;
            }
            tokens.push(Token::new(TokenKind::Delimiter, " "));
            continue;
        }

        let start = i;
        while i < chars.len() && closing_bracket(chars[i]).is_none() {
            let c = chars[i];
            let has_neighbours = i > start && i + 1 < chars.len();
            let joins_word = has_neighbours
                && chars[i - 1].is_alphanumeric()
                && chars[i + 1].is_alphanumeric();
            if c == '.' && has_neighbours && is_decimal_point(&chars, start, i) {
                i += 1;
                continue;
            }
            if is_soft_delimiter(c) || (is_dash(c) && !joins_word) {
                break;
            }
            i += 1;
        }
        let text: String = chars[start..i].iter().collect();
        if !text.is_empty() {
            tokens.push(Token::new(TokenKind::Word, text));
        }
    }

    (tokens, extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(tokens: &[Token]) -> Vec<&str> {
        tokens
            .iter()
            .filter(|t| t.is_word())
            .map(|t| t.text.as_str())
            .collect()
    }

    #[test]
    fn test_group_title_episode() {
        let (tokens, ext) = tokenize("[SubGroup] Anime Title - 05 [1080p].mkv");
        assert_eq!(ext.as_deref(), Some("mkv"));
        assert_eq!(tokens[0], Token::new(TokenKind::Enclosed, "SubGroup"));
        assert_eq!(tokens[1].kind, TokenKind::Delimiter);
        assert_eq!(words(&tokens), vec!["Anime", "Title", "05"]);
        assert!(tokens.iter().any(|t| t.kind == TokenKind::Dash));
        assert_eq!(
            tokens.last(),
            Some(&Token::new(TokenKind::Enclosed, "1080p"))
        );
    }

    #[test]
    fn test_underscores_and_dots() {
        let (tokens, _) = tokenize("Show_Name.S01E05.H.264");
        assert_eq!(words(&tokens), vec!["Show", "Name", "S01E05", "H", "264"]);
        let (tokens, _) = tokenize("Title 07.5");
        assert_eq!(words(&tokens), vec!["Title", "07.5"]);
    }

    #[test]
    fn test_dot_after_marker_splits() {
        let (tokens, ext) = tokenize("Show.Name.S02E05.1080p.WEB-DL.mkv");
        assert_eq!(ext.as_deref(), Some("mkv"));
        assert_eq!(
            words(&tokens),
            vec!["Show", "Name", "S02E05", "1080p", "WEB-DL"]
        );
        let (tokens, _) = tokenize("Title.05.720p");
        assert_eq!(words(&tokens), vec!["Title", "05", "720p"]);
        let (tokens, _) = tokenize("Title.12.5.x264");
        assert_eq!(words(&tokens), vec!["Title", "12.5", "x264"]);
    }

    #[test]
    fn test_joined_dash_stays_in_word() {
        let (tokens, _) = tokenize("Title 01-03");
        assert_eq!(words(&tokens), vec!["Title", "01-03"]);
        let (tokens, _) = tokenize("Kaguya-sama WEB-DL");
        assert_eq!(words(&tokens), vec!["Kaguya-sama", "WEB-DL"]);
        let (tokens, _) = tokenize("86 - 13");
        assert_eq!(words(&tokens), vec!["86", "13"]);
    }

    #[test]
    fn test_extension_split() {
        assert_eq!(split_extension("a.MKV"), ("a", Some("mkv".into())));
        assert_eq!(split_extension("a.txt"), ("a.txt", None));
        assert_eq!(split_extension(".mkv"), (".mkv", None));
        assert_eq!(split_extension("Show S2"), ("Show S2", None));
    }

    #[test]
    fn test_cjk_brackets_and_dashes() {
        let (tokens, _) = tokenize("【GroupName】 Title \u{2013} 01");
        assert_eq!(tokens[0], Token::new(TokenKind::Enclosed, "GroupName"));
        assert!(tokens.iter().any(|t| t.kind == TokenKind::Dash));
    }
}
