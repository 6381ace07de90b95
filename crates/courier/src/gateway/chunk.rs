//! Splitting long outbound text into platform-sized chunks.

/// Discord's maximum message content length, in characters.
pub const MESSAGE_CHUNK_LIMIT: usize = 2000;

/// Split `text` into chunks of at most [`MESSAGE_CHUNK_LIMIT`] characters.
///
/// A greedy forward scan: within each limit-sized window the split lands
/// after the last newline, else after the last period, else hard-cuts at
/// the limit. The delimiter stays with the chunk it ends, every chunk is
/// trimmed of surrounding whitespace, and input that trims to nothing
/// yields no chunks. Earlier chunks are never re-balanced and the scan
/// never looks past one window.
pub fn split_message(text: &str) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut remaining = text.trim();

    while remaining.chars().count() > MESSAGE_CHUNK_LIMIT {
        let window_end = remaining
            .char_indices()
            .nth(MESSAGE_CHUNK_LIMIT)
            .map(|(at, _)| at)
            .unwrap_or(remaining.len());
        let window = &remaining[..window_end];
        // A break at index 0 would leave an empty leading fragment, so it
        // falls through to the hard cut. `\n` and `.` are single-byte;
        // the position after either is a char boundary.
        let cut = window
            .rfind('\n')
            .or_else(|| window.rfind('.'))
            .filter(|&at| at > 0)
            .map(|at| at + 1)
            .unwrap_or(window_end);

        let chunk = remaining[..cut].trim();
        if !chunk.is_empty() {
            chunks.push(chunk.to_string());
        }
        remaining = remaining[cut..].trim();
    }

    if !remaining.is_empty() {
        chunks.push(remaining.to_string());
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_no_chunks() {
        assert!(split_message("").is_empty());
        assert!(split_message("  \n\t ").is_empty());
    }

    #[test]
    fn short_input_is_a_single_trimmed_chunk() {
        assert_eq!(split_message("hello"), ["hello"]);
        assert_eq!(split_message("  hello \n"), ["hello"]);
    }

    #[test]
    fn input_at_the_limit_is_not_split() {
        let text = "a".repeat(MESSAGE_CHUNK_LIMIT);
        assert_eq!(split_message(&text), [text]);
    }

    #[test]
    fn content_just_over_the_limit_splits_in_two() {
        let result = split_message(&"a".repeat(2001));
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].len(), 2000);
        assert_eq!(result[1].len(), 1);
    }

    #[test]
    fn hard_cut_when_no_break_exists() {
        let result = split_message(&"a".repeat(2005));
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].len(), 2000);
        assert_eq!(result[1].len(), 5);
    }

    #[test]
    fn splits_after_a_newline_inside_the_window() {
        let text = format!("{}\nmore text{}", "a".repeat(1990), "x".repeat(20));
        let result = split_message(&text);
        assert_eq!(result.len(), 2);
        assert!(result[0].chars().count() <= 2000);
        assert_eq!(result[0], "a".repeat(1990));
        assert_eq!(result[1], format!("more text{}", "x".repeat(20)));
    }

    #[test]
    fn splits_after_a_period_when_no_newline_exists() {
        let text = format!("{}. {}", "a".repeat(1500), "b".repeat(1000));
        let result = split_message(&text);
        assert_eq!(result.len(), 2);
        assert_eq!(result[0], format!("{}.", "a".repeat(1500)));
        assert_eq!(result[1], "b".repeat(1000));
    }

    #[test]
    fn leading_delimiter_does_not_produce_an_empty_chunk() {
        // The only break in the window sits at index 0, so the split falls
        // back to a hard cut.
        let text = format!(".{}", "a".repeat(2500));
        let result = split_message(&text);
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].chars().count(), 2000);
    }

    #[test]
    fn no_characters_are_lost_without_natural_breaks() {
        let text = "b".repeat(4500);
        let result = split_message(&text);
        assert_eq!(result.len(), 3); // ceil(4500 / 2000)
        assert_eq!(result.concat(), text);
    }

    #[test]
    fn multibyte_text_cuts_on_character_boundaries() {
        let text = "é".repeat(2001);
        let result = split_message(&text);
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].chars().count(), 2000);
        assert_eq!(result[1], "é");
    }
}
