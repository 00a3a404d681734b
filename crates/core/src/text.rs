//! Deterministic display casing for plan and day titles.

/// Connective words kept lowercase unless position or punctuation says
/// otherwise.
const SMALL_WORDS: [&str; 26] = [
    "a", "an", "and", "as", "at", "but", "by", "for", "in", "nor", "of", "on", "or", "per", "the",
    "to", "vs", "via", "with", "from", "over", "into", "onto", "off", "up", "down",
];

#[derive(Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    Word,
    Whitespace,
    Separator,
}

/// Title-case a heading the way the plan views display it.
///
/// Underscores become spaces and whitespace runs collapse before casing.
/// Already-uppercase runs of two or more letters pass through untouched, so
/// `SQL` survives but `sql` becomes `Sql`. Small connective words stay
/// lowercase unless they open or close the title or sit directly behind a
/// colon or dash: `"day-to-day plan"` is `"Day-To-Day Plan"` while
/// `"intro to the basics"` keeps its `to` and `the`.
#[must_use]
pub fn title_case(input: &str) -> String {
    let cleaned = input.replace('_', " ");
    let cleaned = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    if cleaned.is_empty() {
        return cleaned;
    }

    let tokens = tokenize(&cleaned);
    let is_word = |index: usize| {
        tokens[index].0 == TokenKind::Word && tokens[index].1.chars().any(char::is_alphanumeric)
    };
    let first_word = (0..tokens.len()).find(|i| is_word(*i));
    let last_word = (0..tokens.len()).rev().find(|i| is_word(*i));

    let mut out = String::with_capacity(cleaned.len());
    // A colon or dash forces capitalization on the token glued to it;
    // whitespace in between cancels the effect.
    let mut force_cap = true;
    for (index, (kind, text)) in tokens.iter().enumerate() {
        match kind {
            TokenKind::Whitespace => {
                force_cap = false;
                out.push_str(text);
            }
            TokenKind::Separator => {
                force_cap = *text != ";";
                out.push_str(text);
            }
            TokenKind::Word => {
                let acronym = text.len() >= 2 && text.bytes().all(|b| b.is_ascii_uppercase());
                if acronym || !text.chars().any(char::is_alphanumeric) {
                    out.push_str(text);
                } else {
                    let lowered = text.to_lowercase();
                    let keep_small = !force_cap
                        && Some(index) != first_word
                        && Some(index) != last_word
                        && SMALL_WORDS.contains(&lowered.as_str());
                    if keep_small {
                        out.push_str(&lowered);
                    } else {
                        push_capitalized(&mut out, &lowered);
                    }
                }
                force_cap = false;
            }
        }
    }
    out
}

fn is_separator(c: char) -> bool {
    matches!(c, '-' | '–' | '—' | ':' | ';')
}

fn tokenize(text: &str) -> Vec<(TokenKind, &str)> {
    let mut tokens = Vec::new();
    let mut rest = text;
    while let Some(first) = rest.chars().next() {
        let (kind, len) = if is_separator(first) {
            (TokenKind::Separator, first.len_utf8())
        } else if first.is_whitespace() {
            (TokenKind::Whitespace, run_len(rest, char::is_whitespace))
        } else {
            (
                TokenKind::Word,
                run_len(rest, |c| !c.is_whitespace() && !is_separator(c)),
            )
        };
        tokens.push((kind, &rest[..len]));
        rest = &rest[len..];
    }
    tokens
}

fn run_len(text: &str, matches: impl Fn(char) -> bool) -> usize {
    text.char_indices()
        .find(|(_, c)| !matches(*c))
        .map_or(text.len(), |(index, _)| index)
}

/// Uppercase the first letter and every letter opening a sub-word, where
/// sub-words follow apostrophes or any other non-alphanumeric character.
fn push_capitalized(out: &mut String, lowered: &str) {
    let mut cap_next = true;
    for c in lowered.chars() {
        if cap_next && c.is_alphabetic() {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        cap_next = !c.is_alphanumeric();
    }
}
