//! Resumable tag lexer
//!
//! Splits a byte stream into tags, each paired with the raw text that
//! preceded it. The stream may be cut anywhere: an unterminated tag or text
//! run is kept in reusable buffers and completed by the next [`TagLexer::feed`]
//! call. Only ASCII delimiters are inspected, so multi-byte UTF-8 sequences
//! split across chunks are reassembled untouched.

const COMMENT_OPEN: &[u8] = b"!--";

/// A complete tag together with the text read since the previous tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag<'a> {
    /// Element name, without attributes
    pub name: &'a [u8],
    /// `</name>` rather than `<name>`
    pub closing: bool,
    /// Raw character data between the previous tag and this one
    pub text: &'a [u8],
}

/// Streaming tag lexer with carry-over between chunks
#[derive(Debug, Default)]
pub struct TagLexer {
    /// Text accumulated since the last emitted tag
    text: Vec<u8>,
    /// Bytes after `<` of a tag whose `>` has not been seen yet
    tag: Vec<u8>,
    in_tag: bool,
    /// Inside `<!-- ... -->`, which may contain `<` and `>`
    in_comment: bool,
    /// Consecutive `-` seen at the end of the comment so far, capped at 2
    comment_dashes: u8,
}

impl TagLexer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lex one chunk, invoking `emit` for every tag completed inside it.
    pub fn feed<F>(&mut self, chunk: &[u8], mut emit: F)
    where
        F: FnMut(Tag<'_>),
    {
        let mut pos = 0;

        while pos < chunk.len() {
            let rest = &chunk[pos..];

            if self.in_comment {
                match self.comment_end(rest) {
                    Some(consumed) => {
                        self.in_comment = false;
                        pos += consumed;
                    }
                    None => pos = chunk.len(),
                }
            } else if self.in_tag && self.could_open_comment(rest[0]) {
                self.tag.push(rest[0]);
                pos += 1;
                if self.tag == COMMENT_OPEN {
                    self.tag.clear();
                    self.in_tag = false;
                    self.in_comment = true;
                    self.comment_dashes = 0;
                }
            } else if self.in_tag {
                match rest.iter().position(|&b| b == b'>' || b == b'<') {
                    Some(offset) => {
                        self.tag.extend_from_slice(&rest[..offset]);
                        if rest[offset] == b'>' {
                            self.in_tag = false;
                            self.complete_tag(&mut emit);
                        } else {
                            // A second `<` before any `>`: the first one was literal text
                            self.demote_tag_to_text();
                        }
                        pos += offset + 1;
                    }
                    None => {
                        self.tag.extend_from_slice(rest);
                        pos = chunk.len();
                    }
                }
            } else {
                match rest.iter().position(|&b| b == b'<') {
                    Some(offset) => {
                        self.text.extend_from_slice(&rest[..offset]);
                        self.in_tag = true;
                        pos += offset + 1;
                    }
                    None => {
                        self.text.extend_from_slice(rest);
                        pos = chunk.len();
                    }
                }
            }
        }
    }

    /// Bytes held back waiting for more input
    pub fn pending_bytes(&self) -> usize {
        self.text.len() + self.tag.len() + usize::from(self.in_tag)
    }

    /// Whether input ended in the middle of a tag or comment
    pub fn in_partial_tag(&self) -> bool {
        self.in_tag || self.in_comment
    }

    /// Whether `next` extends a tag that so far reads as a prefix of `!--`
    fn could_open_comment(&self, next: u8) -> bool {
        next != b'>'
            && next != b'<'
            && self.tag.len() < COMMENT_OPEN.len()
            && COMMENT_OPEN.starts_with(&self.tag)
    }

    /// Offset just past the `-->` that ends the current comment, if it is in
    /// `bytes`.
    fn comment_end(&mut self, bytes: &[u8]) -> Option<usize> {
        for (idx, &b) in bytes.iter().enumerate() {
            match b {
                b'>' if self.comment_dashes >= 2 => return Some(idx + 1),
                b'-' => self.comment_dashes = (self.comment_dashes + 1).min(2),
                _ => self.comment_dashes = 0,
            }
        }
        None
    }

    fn demote_tag_to_text(&mut self) {
        self.text.push(b'<');
        self.text.extend_from_slice(&self.tag);
        self.tag.clear();
    }

    fn complete_tag<F>(&mut self, emit: &mut F)
    where
        F: FnMut(Tag<'_>),
    {
        let raw = &self.tag[..];

        // Declarations, processing instructions and comments are transparent:
        // the surrounding text run continues across them.
        if matches!(raw.first(), Some(b'?') | Some(b'!')) {
            self.tag.clear();
            return;
        }

        let (closing, body) = match raw.split_first() {
            Some((b'/', body)) => (true, body),
            _ => (false, raw),
        };
        let name_len = body
            .iter()
            .position(|&b| b == b'/' || b.is_ascii_whitespace())
            .unwrap_or(body.len());
        let name = &body[..name_len];

        if name.is_empty() {
            // `<>`, `< a>`, `</>`: not a tag
            self.text.push(b'<');
            self.text.extend_from_slice(&self.tag);
            self.text.push(b'>');
            self.tag.clear();
            return;
        }

        let self_closing = !closing && body.last() == Some(&b'/');

        emit(Tag {
            name,
            closing,
            text: &self.text,
        });
        if self_closing {
            emit(Tag {
                name,
                closing: true,
                text: &[],
            });
        }

        self.text.clear();
        self.tag.clear();
    }
}
