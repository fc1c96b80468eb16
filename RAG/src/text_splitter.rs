use regex::Regex;
use std::collections::VecDeque;
use std::sync::LazyLock;

static RE_INLINE_WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t\x0B\x0C]+").expect("valid regex"));
static RE_TRAILING_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m) +$").expect("valid regex"));
static RE_BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

const DEFAULT_SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

/// Recursive character splitter. Tries paragraph, line and word boundaries in
/// turn and only hard-cuts between characters when a single word is longer
/// than the chunk size. All lengths are counted in chars.
#[derive(Debug, Clone)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            chunk_overlap: chunk_overlap.min(chunk_size - 1),
        }
    }

    pub fn split_text(&self, text: &str) -> Vec<String> {
        let cleaned = clean_text(text);
        self.split_recursive(&cleaned, &DEFAULT_SEPARATORS)
    }

    fn split_recursive(&self, text: &str, separators: &[&str]) -> Vec<String> {
        let mut chunks = Vec::new();

        // Coarsest separator present in the text; "" means split per char
        let mut separator = separators.last().copied().unwrap_or("");
        let mut finer: &[&str] = &[];
        for (i, &candidate) in separators.iter().enumerate() {
            if candidate.is_empty() {
                separator = candidate;
                break;
            }
            if text.contains(candidate) {
                separator = candidate;
                finer = &separators[i + 1..];
                break;
            }
        }

        // Split on it
        let pieces: Vec<String> = if separator.is_empty() {
            text.chars().map(String::from).collect()
        } else {
            text.split(separator)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        };

        // Merge runs of short pieces, recurse into the long ones
        let mut short_pieces = Vec::new();
        for piece in pieces {
            if char_len(&piece) < self.chunk_size {
                short_pieces.push(piece);
                continue;
            }
            if !short_pieces.is_empty() {
                chunks.extend(self.merge_pieces(&short_pieces, separator));
                short_pieces.clear();
            }
            if finer.is_empty() {
                chunks.push(piece);
            } else {
                chunks.extend(self.split_recursive(&piece, finer));
            }
        }
        if !short_pieces.is_empty() {
            chunks.extend(self.merge_pieces(&short_pieces, separator));
        }

        chunks
    }

    /// Greedily packs pieces up to `chunk_size`, seeding each new chunk with
    /// the trailing pieces of the previous one (at most `chunk_overlap` chars).
    fn merge_pieces(&self, pieces: &[String], separator: &str) -> Vec<String> {
        let sep_len = char_len(separator);
        let mut merged = Vec::new();
        let mut window: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for piece in pieces {
            let len = char_len(piece);
            // Window full: emit it, then drop from the front down to the overlap
            if total + len + joiner_for(&window, sep_len) > self.chunk_size && !window.is_empty() {
                if let Some(chunk) = join_trimmed(&window, separator) {
                    merged.push(chunk);
                }

                while total > self.chunk_overlap
                    || (total > 0 && total + len + joiner_for(&window, sep_len) > self.chunk_size)
                {
                    let Some(first) = window.pop_front() else {
                        break;
                    };
                    total = total.saturating_sub(char_len(first) + joiner_for(&window, sep_len));
                }
            }

            total += len + joiner_for(&window, sep_len);
            window.push_back(piece.as_str());
        }

        // Flush the tail
        if let Some(chunk) = join_trimmed(&window, separator) {
            merged.push(chunk);
        }

        merged
    }
}

impl Default for TextSplitter {
    fn default() -> Self {
        Self::new(500, 50)
    }
}

// Separator cost of appending one more piece to `window`.
fn joiner_for(window: &VecDeque<&str>, sep_len: usize) -> usize {
    if window.is_empty() {
        0
    } else {
        sep_len
    }
}

fn join_trimmed(window: &VecDeque<&str>, separator: &str) -> Option<String> {
    let joined = window.iter().copied().collect::<Vec<_>>().join(separator);
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Normalizes line endings and inline whitespace but keeps paragraph breaks,
/// which the splitter relies on.
fn clean_text(text: &str) -> String {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let text = RE_INLINE_WHITESPACE.replace_all(&text, " ");
    let text = RE_TRAILING_SPACE.replace_all(&text, "");
    let text = RE_BLANK_LINES.replace_all(&text, "\n\n");
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered_words(count: usize) -> Vec<String> {
        (0..count).map(|i| format!("w{:03}", i)).collect()
    }

    #[test]
    fn short_text_is_a_single_chunk() {
        let splitter = TextSplitter::default();
        let chunks = splitter.split_text("  Alpha Beta\tGamma  ");
        assert_eq!(chunks, vec!["Alpha Beta Gamma".to_string()]);
    }

    #[test]
    fn blank_text_yields_nothing() {
        let splitter = TextSplitter::default();
        assert!(splitter.split_text("").is_empty());
        assert!(splitter.split_text(" \n\n \t ").is_empty());
    }

    #[test]
    fn paragraphs_are_kept_whole_when_they_fit() {
        let first = numbered_words(60).join(" ");
        let second = numbered_words(60)
            .iter()
            .map(|w| w.replace('w', "v"))
            .collect::<Vec<_>>()
            .join(" ");
        let text = format!("{}\n\n{}", first, second);

        let chunks = TextSplitter::default().split_text(&text);
        assert_eq!(chunks, vec![first, second]);
    }

    #[test]
    fn word_chunks_overlap_and_cover_everything() {
        let words = numbered_words(400);
        let text = words.join(" ");

        let chunks = TextSplitter::default().split_text(&text);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 500, "chunk too long: {}", chunk.len());
        }

        for pair in chunks.windows(2) {
            let first_of_next = pair[1].split(' ').next().unwrap();
            assert!(
                pair[0].split(' ').any(|w| w == first_of_next),
                "no overlap between consecutive chunks"
            );
        }

        for word in &words {
            assert!(chunks.iter().any(|c| c.split(' ').any(|w| w == word)));
        }
    }

    #[test]
    fn unbroken_text_is_hard_cut() {
        let text: String = "a".repeat(1200);
        let chunks = TextSplitter::default().split_text(&text);
        let lengths: Vec<usize> = chunks.iter().map(|c| c.chars().count()).collect();
        assert_eq!(lengths, vec![500, 500, 300]);
    }

    #[test]
    fn lengths_are_counted_in_chars() {
        let text: String = "é".repeat(600);
        let chunks = TextSplitter::new(500, 50).split_text(&text);
        assert_eq!(chunks[0].chars().count(), 500);
    }

    #[test]
    fn clean_text_keeps_paragraph_breaks() {
        assert_eq!(clean_text("a  b \r\n\r\n\n\nc\t d  "), "a b\n\nc d");
    }
}
