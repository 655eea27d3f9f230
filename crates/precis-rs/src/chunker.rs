//! Paragraph-preserving text chunking.
//!
//! Splits a document into ordered, bounded-size chunks without ever cutting a
//! paragraph in half. Paragraphs — blank-line-delimited runs of text with
//! internal whitespace collapsed to single spaces — are the boundary unit, so
//! every chunk hands the backend a self-contained span of context. Joining
//! chunk texts with [`CHUNK_JOIN`] reproduces the normalized document exactly.

/// Default chunk target size in characters. Sized for small local models.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// Separator between paragraphs inside a chunk, and between chunks when
/// reassembling the normalized document.
pub const CHUNK_JOIN: &str = "\n\n";

/// One ordered segment of the source document.
///
/// Chunks are created once per run by [`chunk`] and never mutated. Their
/// ordering matters: the reduce phase joins partial summaries in chunk order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// 1-based position within the document.
    pub index: usize,
    /// Normalized paragraph text, blank-line separated.
    pub text: String,
}

impl Chunk {
    /// Approximate character length (exact for ASCII text).
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Split `text` into ordered chunks of at most `target_size` characters,
/// except where a single paragraph is itself longer than `target_size` — an
/// oversized paragraph becomes its own chunk, whole, because losing or
/// splitting content is worse than exceeding the target.
///
/// Empty or whitespace-only input yields an empty Vec. Non-empty input always
/// yields at least one chunk. A `target_size` of 0 is treated as 1.
pub fn chunk(text: &str, target_size: usize) -> Vec<Chunk> {
    let target = target_size.max(1);
    let mut chunks = Vec::new();
    let mut buffer = String::new();

    for para in normalized_paragraphs(text) {
        let projected = if buffer.is_empty() {
            para.len()
        } else {
            buffer.len() + CHUNK_JOIN.len() + para.len()
        };
        if projected > target && !buffer.is_empty() {
            flush(&mut chunks, &mut buffer);
        }
        if !buffer.is_empty() {
            buffer.push_str(CHUNK_JOIN);
        }
        buffer.push_str(&para);
    }

    if !buffer.is_empty() {
        flush(&mut chunks, &mut buffer);
    }
    chunks
}

/// Blank-line-delimited paragraphs with internal whitespace runs (including
/// newlines) collapsed to single spaces. Empty paragraphs are dropped.
fn normalized_paragraphs(text: &str) -> impl Iterator<Item = String> {
    text.split("\n\n")
        .map(|para| {
            let words: Vec<&str> = para.split_whitespace().collect();
            words.join(" ")
        })
        .filter(|para| !para.is_empty())
}

fn flush(chunks: &mut Vec<Chunk>, buffer: &mut String) {
    let index = chunks.len() + 1;
    chunks.push(Chunk {
        index,
        text: std::mem::take(buffer),
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(chunks: &[Chunk]) -> Vec<&str> {
        chunks.iter().map(|c| c.text.as_str()).collect()
    }

    #[test]
    fn empty_input_yields_no_chunks() {
        assert!(chunk("", 1000).is_empty());
        assert!(chunk("   \n\n  \n", 1000).is_empty());
    }

    #[test]
    fn short_input_yields_single_chunk() {
        let chunks = chunk("hello world", 1000);
        assert_eq!(texts(&chunks), vec!["hello world"]);
        assert_eq!(chunks[0].index, 1);
    }

    #[test]
    fn paragraphs_accumulate_until_target() {
        let text = "aaaa aaaa\n\nbbbb bbbb\n\ncccc cccc";
        // Two 9-char paragraphs plus separator fit in 20; the third does not.
        let chunks = chunk(text, 20);
        assert_eq!(
            texts(&chunks),
            vec!["aaaa aaaa\n\nbbbb bbbb", "cccc cccc"]
        );
    }

    #[test]
    fn one_chunk_per_paragraph_when_target_is_small() {
        let chunks = chunk("alpha alpha\n\nbeta beta\n\ngamma gamma", 12);
        assert_eq!(
            texts(&chunks),
            vec!["alpha alpha", "beta beta", "gamma gamma"]
        );
        let indices: Vec<usize> = chunks.iter().map(|c| c.index).collect();
        assert_eq!(indices, vec![1, 2, 3]);
    }

    #[test]
    fn oversized_paragraph_is_kept_whole() {
        let long = "x".repeat(500);
        let text = format!("short one\n\n{long}\n\ntail");
        let chunks = chunk(&text, 100);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[1].text, long);
        assert!(chunks[1].len() > 100);
    }

    #[test]
    fn joining_chunks_reproduces_normalized_input() {
        let text = "First  paragraph\nwith a wrapped line.\n\nSecond\tparagraph.\n\n\nThird.";
        let normalized = "First paragraph with a wrapped line.\n\nSecond paragraph.\n\nThird.";
        for target in [1, 10, 25, 1000] {
            let chunks = chunk(text, target);
            assert_eq!(texts(&chunks).join(CHUNK_JOIN), normalized, "target {target}");
        }
    }

    #[test]
    fn no_paragraph_is_ever_split() {
        let paras = ["one two three", "four five", "six seven eight nine"];
        let text = paras.join("\n\n");
        for target in 1..40 {
            for c in chunk(&text, target) {
                for piece in c.text.split(CHUNK_JOIN) {
                    assert!(paras.contains(&piece), "split unit {piece:?} at target {target}");
                }
            }
        }
    }

    #[test]
    fn whitespace_runs_collapse_within_paragraphs() {
        let chunks = chunk("a   b\nc\n\nd  e", 1000);
        assert_eq!(texts(&chunks), vec!["a b c\n\nd e"]);
    }

    #[test]
    fn zero_target_size_is_guarded() {
        let chunks = chunk("a\n\nb", 0);
        assert_eq!(texts(&chunks), vec!["a", "b"]);
    }

    #[test]
    fn exact_fit_paragraph_stays_in_current_chunk() {
        // 4 + 2 + 4 = 10 characters exactly; no flush at target 10.
        let chunks = chunk("aaaa\n\nbbbb", 10);
        assert_eq!(texts(&chunks), vec!["aaaa\n\nbbbb"]);
    }
}
