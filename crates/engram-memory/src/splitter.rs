// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recursive character text splitter.
//!
//! Splits long text into chunks of at most `size` characters, preferring
//! paragraph boundaries, then line breaks, then sentence ends, then word
//! boundaries, before falling back to hard character cuts. Consecutive
//! chunks share up to `overlap` characters of trailing context.

/// Boundary preference order, coarsest first.
const SEPARATORS: [&str; 4] = ["\n\n", "\n", ". ", " "];

/// Split `text` into chunks of at most `size` characters with `overlap`
/// characters of carry-over. Deterministic for a given input.
pub fn split_text(text: &str, size: usize, overlap: usize) -> Vec<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    split_with(trimmed, size, overlap, &SEPARATORS)
}

fn split_with(text: &str, size: usize, overlap: usize, seps: &[&str]) -> Vec<String> {
    if char_len(text) <= size {
        return vec![text.to_string()];
    }
    let Some((sep, rest)) = seps.split_first() else {
        return hard_cut(text, size, overlap);
    };

    let mut pieces = Vec::new();
    for piece in split_keep(text, sep) {
        if char_len(&piece) > size {
            // Piece itself is too big; descend to the next boundary kind.
            pieces.extend(split_with(&piece, size, overlap, rest));
        } else {
            pieces.push(piece);
        }
    }
    merge_pieces(pieces, size, overlap)
}

/// Split on `sep`, keeping the separator attached to the left piece so
/// rejoined chunks reproduce the original text.
fn split_keep(text: &str, sep: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut rest = text;
    while let Some(idx) = rest.find(sep) {
        let end = idx + sep.len();
        out.push(rest[..end].to_string());
        rest = &rest[end..];
    }
    if !rest.is_empty() {
        out.push(rest.to_string());
    }
    out
}

/// Greedily pack pieces into chunks of at most `size` characters,
/// retaining up to `overlap` trailing characters between chunks.
fn merge_pieces(pieces: Vec<String>, size: usize, overlap: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut buf: Vec<String> = Vec::new();
    let mut buf_len = 0usize;

    for piece in pieces {
        let piece_len = char_len(&piece);
        if buf_len + piece_len > size && !buf.is_empty() {
            push_chunk(&mut chunks, &buf);
            while !buf.is_empty() && (buf_len > overlap || buf_len + piece_len > size) {
                let removed = buf.remove(0);
                buf_len -= char_len(&removed);
            }
        }
        buf_len += piece_len;
        buf.push(piece);
    }
    push_chunk(&mut chunks, &buf);
    chunks
}

fn push_chunk(chunks: &mut Vec<String>, buf: &[String]) {
    let chunk = buf.concat().trim().to_string();
    if !chunk.is_empty() {
        chunks.push(chunk);
    }
}

/// Character-window fallback when no boundary fits.
fn hard_cut(text: &str, size: usize, overlap: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let step = size.saturating_sub(overlap).max(1);
    let mut out = Vec::new();
    let mut start = 0;
    while start < chars.len() {
        let end = (start + size).min(chars.len());
        let piece: String = chars[start..end].iter().collect();
        let piece = piece.trim().to_string();
        if !piece.is_empty() {
            out.push(piece);
        }
        if end == chars.len() {
            break;
        }
        start += step;
    }
    out
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}
