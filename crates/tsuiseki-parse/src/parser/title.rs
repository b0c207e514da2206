use crate::tokenizer::{Token, TokenKind};

/// The first contiguous run of unclaimed words starting at or after `from`.
///
/// Returns the index of the run's first token and the joined text. The run
/// ends at a claimed token, a bracket, or a dash.
pub fn first_run(tokens: &[Token], identified: &[bool], from: usize) -> Option<(usize, String)> {
    let mut start = None;
    let mut text = String::new();

    for (i, token) in tokens.iter().enumerate().skip(from) {
        if identified[i] {
            if start.is_some() {
                break;
            }
            continue;
        }
        match token.kind {
            TokenKind::Word => {
                start.get_or_insert(i);
                text.push_str(&token.text);
            }
            TokenKind::Delimiter if start.is_some() => text.push(' '),
            TokenKind::Delimiter => {}
            TokenKind::Enclosed | TokenKind::Dash => {
                if start.is_some() {
                    break;
                }
            }
        }
    }

    let text = text.trim().to_string();
    match start {
        Some(index) if !text.is_empty() => Some((index, text)),
        _ => None,
    }
}

/// Title: the first run in the whole input.
pub fn extract_title(tokens: &[Token], identified: &[bool]) -> Option<(usize, String)> {
    first_run(tokens, identified, 0)
}

/// Episode title: the first run after the last episode marker.
pub fn extract_episode_title(
    tokens: &[Token],
    identified: &[bool],
    episode_index: Option<usize>,
) -> Option<(usize, String)> {
    first_run(tokens, identified, episode_index? + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;

    #[test]
    fn test_title_stops_at_claimed_token() {
        let (tokens, _) = tokenize("Sousou no Frieren - 05 - The End");
        let mut identified = vec![false; tokens.len()];
        let episode = tokens.iter().position(|t| t.text == "05").unwrap();
        identified[episode] = true;

        let (start, title) = extract_title(&tokens, &identified).unwrap();
        assert_eq!((start, title.as_str()), (0, "Sousou no Frieren"));

        let (_, episode_title) =
            extract_episode_title(&tokens, &identified, Some(episode)).unwrap();
        assert_eq!(episode_title, "The End");
    }

    #[test]
    fn test_no_title() {
        let (tokens, _) = tokenize("[Group] 05");
        let identified = vec![true; tokens.len()];
        assert!(extract_title(&tokens, &identified).is_none());
    }
}
