use super::error::StoryError;

/// Default maximum chunk length, in characters
pub const MAX_CHUNK_SIZE: usize = 3000;

/// A contiguous, zero-based-indexed slice of the story text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    pub index: usize,
    pub text: String,
}

impl TextChunk {
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// Split text into chunks of at most `max_chars` characters.
///
/// Lengths are counted in `char`s, never bytes, so a multi-byte character is
/// never cut in half. Every chunk except possibly the last holds exactly
/// `max_chars` characters, and joining the chunks in order gives back `text`.
pub fn split_into_chunks(text: &str, max_chars: usize) -> Result<Vec<TextChunk>, StoryError> {
    if text.is_empty() {
        return Err(StoryError::Validation("empty text".to_string()));
    }
    if max_chars == 0 {
        return Err(StoryError::Validation(
            "chunk size must be greater than zero".to_string(),
        ));
    }

    let mut chunks = Vec::new();
    let mut start = 0;
    let mut count = 0;

    for (offset, _) in text.char_indices() {
        if count == max_chars {
            chunks.push(TextChunk {
                index: chunks.len(),
                text: text[start..offset].to_string(),
            });
            start = offset;
            count = 0;
        }
        count += 1;
    }

    // text is non-empty, so the tail always holds at least one character
    chunks.push(TextChunk {
        index: chunks.len(),
        text: text[start..].to_string(),
    });

    Ok(chunks)
}
