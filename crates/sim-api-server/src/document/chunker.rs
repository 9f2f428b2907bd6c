/// A bounded slice of a source document.
#[derive(Debug, Clone)]
pub struct Chunk {
    pub content: String,
    pub start_pos: usize,
    pub end_pos: usize,
}

/// Character-window chunker with sentence-boundary snapping.
///
/// Walks a window of `chunk_size` characters. When the window end falls
/// before the document end, the last period or newline inside the window is
/// preferred as the cut point, but only if it lies past the window midpoint
/// (a cut earlier than that would degenerate chunk sizes). After each chunk
/// the window start steps back by `overlap` characters from the chunk end,
/// so consecutive chunks share context.
pub struct TextChunker {
    chunk_size: usize,
    overlap: usize,
}

impl TextChunker {
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            // Overlap must leave forward progress.
            overlap: overlap.min(chunk_size.saturating_sub(1)),
        }
    }

    pub fn chunk(&self, text: &str) -> Vec<Chunk> {
        let chars: Vec<char> = text.chars().collect();
        let total = chars.len();
        let mut chunks = Vec::new();

        if total == 0 {
            return chunks;
        }

        let mut start = 0usize;
        while start < total {
            // Unclamped: the step to the next window is measured from here.
            let mut end = start + self.chunk_size;
            let mut window = &chars[start..end.min(total)];

            if end < total {
                if let Some(boundary) = window.iter().rposition(|&c| c == '.' || c == '\n') {
                    if boundary > self.chunk_size / 2 {
                        window = &window[..=boundary];
                        end = start + boundary + 1;
                    }
                }
            }

            let content: String = window.iter().collect();
            let content = content.trim().to_string();
            if !content.is_empty() {
                chunks.push(Chunk {
                    content,
                    start_pos: start,
                    end_pos: end.min(total),
                });
            }

            let next_start = end.saturating_sub(self.overlap);
            start = next_start.max(start + 1);
        }

        chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_yields_no_chunks() {
        let chunker = TextChunker::new(512, 50);
        assert!(chunker.chunk("").is_empty());
        assert!(chunker.chunk("   \n  ").is_empty());
    }

    #[test]
    fn test_short_input_is_one_chunk() {
        let chunker = TextChunker::new(512, 50);
        let chunks = chunker.chunk("a short document");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "a short document");
    }

    #[test]
    fn test_chunk_lengths_are_bounded() {
        let chunker = TextChunker::new(512, 50);
        let text: String = ('a'..='z').cycle().take(5000).collect();
        let chunks = chunker.chunk(&text);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.content.chars().count() <= 512);
        }
    }

    #[test]
    fn test_consecutive_chunks_overlap_without_boundaries() {
        let chunker = TextChunker::new(512, 50);
        // No periods, newlines, or spaces: no snapping, no edge trimming.
        let text: String = ('a'..='z').cycle().take(2000).collect();
        let chunks = chunker.chunk(&text);

        for pair in chunks.windows(2) {
            assert_eq!(pair[1].start_pos, pair[0].end_pos - 50);
            let tail: String = pair[0].content.chars().rev().take(50).collect::<Vec<_>>()
                .into_iter().rev().collect();
            let head: String = pair[1].content.chars().take(50).collect();
            assert_eq!(tail, head);
        }
    }

    #[test]
    fn test_non_overlapping_spans_reconstruct_input() {
        let chunker = TextChunker::new(512, 50);
        let text: String = ('a'..='z').cycle().take(3000).collect();
        let chunks = chunker.chunk(&text);

        let mut rebuilt = String::new();
        for (i, chunk) in chunks.iter().enumerate() {
            if i + 1 < chunks.len() {
                let keep = chunk.content.chars().count() - 50;
                rebuilt.extend(chunk.content.chars().take(keep));
            } else {
                rebuilt.push_str(&chunk.content);
            }
        }
        assert_eq!(rebuilt, text);
    }

    #[test]
    fn test_snaps_to_sentence_boundary_past_midpoint() {
        let chunker = TextChunker::new(40, 5);
        // A period at position 29 (past the midpoint of 20) inside a 40-char
        // window: the chunk must cut there.
        let text = format!("{}.{}", "a".repeat(29), "b".repeat(60));
        let chunks = chunker.chunk(&text);

        assert_eq!(chunks[0].content, format!("{}.", "a".repeat(29)));
        assert_eq!(chunks[0].end_pos, 30);
        assert_eq!(chunks[1].start_pos, 25);
    }

    #[test]
    fn test_boundary_before_midpoint_is_ignored() {
        let chunker = TextChunker::new(40, 5);
        // Period at position 5: before the midpoint, so the hard cut wins.
        let text = format!("{}.{}", "a".repeat(5), "b".repeat(100));
        let chunks = chunker.chunk(&text);

        assert_eq!(chunks[0].content.chars().count(), 40);
    }

    #[test]
    fn test_tiny_chunks_with_periods() {
        let chunker = TextChunker::new(4, 1);
        let chunks = chunker.chunk("A. B. C.");

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.content.chars().count() <= 4);
            assert!(chunk.content.contains('.'));
        }
        assert_eq!(chunks.last().unwrap().content, "C.");
    }

    #[test]
    fn test_newline_counts_as_boundary() {
        let chunker = TextChunker::new(40, 5);
        let text = format!("{}\n{}", "a".repeat(29), "b".repeat(60));
        let chunks = chunker.chunk(&text);

        assert_eq!(chunks[0].content, "a".repeat(29));
        assert_eq!(chunks[0].end_pos, 30);
    }
}
