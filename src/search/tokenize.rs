//! Splitting field text into index terms.

/// Minimum term length for indexing. Set to 1 so single-letter symbols stay findable.
const MIN_TOKEN_LENGTH: usize = 1;

/// Tokenizes text into lowercase terms with case-aware splitting.
///
/// Splits on several boundaries and keeps the compound word as well:
/// - **CamelCase**: "HttpServer" → ["http", "server", "httpserver"]
/// - **snake_case**: "parse_json" → ["parse", "json", "parse_json"]
/// - **hyphen-case**: "multi-line" → ["multi", "line", "multi-line"]
///
/// Any character that is neither alphanumeric nor `_`/`-` ends the current word,
/// so "Widget.render" yields the terms of "Widget" followed by those of "render".
///
/// Each whitespace-separated chunk is also kept verbatim when splitting changed it,
/// so "__type" → ["type", "__type"] and "[Symbol.iterator]" →
/// ["symbol", "iterator", "[symbol.iterator]"]. Queries split on whitespace too, so
/// a query equal to a name always has an exact term to land on.
pub(crate) fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = vec![];
    for chunk in text.split_whitespace() {
        let chunk_start = tokens.len();
        split_words(chunk, &mut tokens);

        let verbatim = chunk.to_lowercase();
        if !tokens[chunk_start..].contains(&verbatim) {
            tokens.push(verbatim);
        }
    }
    tokens
}

/// The state machine maintains two pointers:
/// - `word_start`: Start of the complete word (e.g., "HttpServer")
/// - `subword_start`: Start of the current sub-component (e.g., "Server")
///
/// `word_tokens` marks where the current word's terms begin in `tokens`.
fn split_words(text: &str, tokens: &mut Vec<String>) {
    let mut last_case = None;
    let mut word_start = 0;
    let mut subword_start = 0;
    let mut word_tokens = 0;
    let mut word_start_next_char = true;
    let mut subword_start_next_char = true;

    for (i, c) in text.char_indices() {
        let is_delimiter = c == '-' || c == '_';
        let is_word_char = c.is_alphanumeric() || is_delimiter;

        if word_start_next_char {
            if !is_word_char {
                continue;
            }
            word_start = i;
            subword_start = i;
            word_tokens = tokens.len();
            word_start_next_char = false;
            subword_start_next_char = false;
            last_case = None;
        }

        if subword_start_next_char && !is_delimiter {
            subword_start = i;
            subword_start_next_char = false;
        }

        // lowercase → uppercase marks a CamelCase boundary
        let current_case = c.is_alphabetic().then(|| c.is_uppercase());
        let case_change = last_case == Some(false) && current_case == Some(true);
        last_case = current_case;

        if is_delimiter {
            if !subword_start_next_char && i.saturating_sub(subword_start) >= MIN_TOKEN_LENGTH {
                push_token(&text[subword_start..i], tokens);
            }
            subword_start_next_char = true;
        } else if !is_word_char {
            if !subword_start_next_char
                && subword_start != word_start
                && i.saturating_sub(subword_start) >= MIN_TOKEN_LENGTH
            {
                push_token(&text[subword_start..i], tokens);
            }
            push_word(&text[word_start..i], word_tokens, tokens);
            word_start_next_char = true;
        } else if case_change {
            if i.saturating_sub(subword_start) >= MIN_TOKEN_LENGTH {
                push_token(&text[subword_start..i], tokens);
            }
            subword_start = i;
        }
    }

    if !word_start_next_char {
        let last_subword = &text[subword_start..];
        if !subword_start_next_char && word_start != subword_start {
            push_token(last_subword, tokens);
        }
        push_word(&text[word_start..], word_tokens, tokens);
    }
}

/// Appends a whole word without its outer `_`/`-`, unless its single subword already
/// is that word ("__type" has only the subword "type").
fn push_word(word: &str, word_tokens: usize, tokens: &mut Vec<String>) {
    let word = word.trim_matches(['-', '_']);
    if tokens.len() == word_tokens + 1 && tokens[word_tokens] == word.to_lowercase() {
        return;
    }
    push_token(word, tokens);
}

/// Lowercases a token and appends it, skipping anything shorter than the minimum.
fn push_token(token: &str, tokens: &mut Vec<String>) {
    if token.chars().count() < MIN_TOKEN_LENGTH {
        return;
    }
    tokens.push(token.to_lowercase());
}
