//! RESP2 framing.
//!
//! Just enough of the Redis serialization protocol to send commands and read
//! the replies hash commands produce: simple strings, errors, integers, bulk
//! strings and arrays (including their nil forms).

use bytes::{Buf, BufMut, Bytes, BytesMut};

use remote_hash_store::StoreError;

const CRLF: &[u8] = b"\r\n";

/// One RESP2 value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// `+OK\r\n`
    Simple(String),
    /// `-ERR message\r\n`
    Error(String),
    /// `:42\r\n`
    Integer(i64),
    /// `$5\r\nhello\r\n`, or `$-1\r\n` for nil.
    Bulk(Option<Bytes>),
    /// `*2\r\n...`, or `*-1\r\n` for nil.
    Array(Option<Vec<Frame>>),
}

impl Frame {
    /// A command: an array of bulk strings.
    pub fn command<I, A>(args: I) -> Frame
    where
        I: IntoIterator<Item = A>,
        A: AsRef<[u8]>,
    {
        Frame::Array(Some(
            args.into_iter()
                .map(|arg| Frame::Bulk(Some(Bytes::copy_from_slice(arg.as_ref()))))
                .collect(),
        ))
    }

    /// A bulk string frame holding `value`.
    pub fn bulk(value: impl AsRef<[u8]>) -> Frame {
        Frame::Bulk(Some(Bytes::copy_from_slice(value.as_ref())))
    }

    /// Short human-readable description, for error messages.
    pub fn describe(&self) -> String {
        match self {
            Frame::Simple(s) => format!("simple string {}", s),
            Frame::Error(e) => format!("error {}", e),
            Frame::Integer(n) => format!("integer {}", n),
            Frame::Bulk(None) | Frame::Array(None) => "nil".to_string(),
            Frame::Bulk(Some(b)) => format!("bulk string ({} bytes)", b.len()),
            Frame::Array(Some(items)) => format!("array of {}", items.len()),
        }
    }
}

/// Malformed input on the wire.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("invalid frame type byte {0:#04x}")]
    InvalidType(u8),

    #[error("invalid length {0}")]
    InvalidLength(i64),

    #[error("invalid integer")]
    InvalidInteger,

    #[error("frame line is not valid UTF-8")]
    InvalidUtf8,

    #[error("bulk string not terminated by CRLF")]
    MissingTerminator,
}

impl From<CodecError> for StoreError {
    fn from(e: CodecError) -> Self {
        StoreError::Decode {
            message: e.to_string(),
        }
    }
}

/// Append the wire form of `frame` to `dst`.
pub fn encode(frame: &Frame, dst: &mut BytesMut) {
    match frame {
        Frame::Simple(s) => put_line(dst, b'+', s.as_bytes()),
        Frame::Error(e) => put_line(dst, b'-', e.as_bytes()),
        Frame::Integer(n) => put_line(dst, b':', n.to_string().as_bytes()),
        Frame::Bulk(None) => put_line(dst, b'$', b"-1"),
        Frame::Bulk(Some(bytes)) => {
            put_line(dst, b'$', bytes.len().to_string().as_bytes());
            dst.put_slice(bytes);
            dst.put_slice(CRLF);
        }
        Frame::Array(None) => put_line(dst, b'*', b"-1"),
        Frame::Array(Some(items)) => {
            put_line(dst, b'*', items.len().to_string().as_bytes());
            for item in items {
                encode(item, dst);
            }
        }
    }
}

fn put_line(dst: &mut BytesMut, tag: u8, line: &[u8]) {
    dst.reserve(line.len() + 3);
    dst.put_u8(tag);
    dst.put_slice(line);
    dst.put_slice(CRLF);
}

/// Take one complete frame off the front of `src`.
///
/// Returns `Ok(None)` and leaves `src` untouched when more bytes are needed.
pub fn decode(src: &mut BytesMut) -> Result<Option<Frame>, CodecError> {
    match parse(src, 0)? {
        Some((frame, consumed)) => {
            src.advance(consumed);
            Ok(Some(frame))
        }
        None => Ok(None),
    }
}

/// Finds where the first frame in a growing buffer ends, without building it.
///
/// The scan position and the open arrays persist between calls, so bytes
/// already checked are not checked again when more arrive, and nothing is
/// copied until the frame is complete. Feed it the same buffer, only ever
/// appended to, until it reports a length; it then starts over.
#[derive(Debug, Default)]
pub struct FrameScanner {
    pos: usize,
    open_arrays: Vec<usize>,
}

impl FrameScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes of `buf` already known to belong to the frame.
    pub fn scanned(&self) -> usize {
        self.pos
    }

    /// The length of the first frame in `buf`, once all of it is present.
    pub fn scan(&mut self, buf: &[u8]) -> Result<Option<usize>, CodecError> {
        loop {
            let Some(&tag) = buf.get(self.pos) else {
                return Ok(None);
            };
            let Some((line, next)) = read_line(buf, self.pos + 1) else {
                return Ok(None);
            };

            self.pos = match tag {
                b'+' | b'-' => next,
                b':' => {
                    parse_int(line)?;
                    next
                }
                b'$' => match parse_len(line)? {
                    None => next,
                    Some(len) => {
                        let end = next
                            .checked_add(len)
                            .ok_or(CodecError::InvalidLength(len as i64))?;
                        if buf.len() < end + CRLF.len() {
                            return Ok(None);
                        }
                        if &buf[end..end + CRLF.len()] != CRLF {
                            return Err(CodecError::MissingTerminator);
                        }
                        end + CRLF.len()
                    }
                },
                b'*' => match parse_len(line)? {
                    None | Some(0) => next,
                    Some(len) => {
                        self.pos = next;
                        self.open_arrays.push(len);
                        continue;
                    }
                },
                other => return Err(CodecError::InvalidType(other)),
            };

            // One element finished; close every array it completes.
            loop {
                let Some(remaining) = self.open_arrays.last_mut() else {
                    let len = self.pos;
                    self.pos = 0;
                    return Ok(Some(len));
                };
                if *remaining > 1 {
                    *remaining -= 1;
                    break;
                }
                self.open_arrays.pop();
            }
        }
    }
}

/// Parse the frame starting at `pos`; returns it and the position after it.
fn parse(buf: &[u8], pos: usize) -> Result<Option<(Frame, usize)>, CodecError> {
    let Some(&tag) = buf.get(pos) else {
        return Ok(None);
    };
    let Some((line, next)) = read_line(buf, pos + 1) else {
        return Ok(None);
    };

    match tag {
        b'+' => Ok(Some((Frame::Simple(utf8(line)?), next))),
        b'-' => Ok(Some((Frame::Error(utf8(line)?), next))),
        b':' => Ok(Some((Frame::Integer(parse_int(line)?), next))),
        b'$' => {
            let Some(len) = parse_len(line)? else {
                return Ok(Some((Frame::Bulk(None), next)));
            };
            let end = next
                .checked_add(len)
                .ok_or(CodecError::InvalidLength(len as i64))?;
            if buf.len() < end + CRLF.len() {
                return Ok(None);
            }
            if &buf[end..end + CRLF.len()] != CRLF {
                return Err(CodecError::MissingTerminator);
            }
            let bytes = Bytes::copy_from_slice(&buf[next..end]);
            Ok(Some((Frame::Bulk(Some(bytes)), end + CRLF.len())))
        }
        b'*' => {
            let Some(len) = parse_len(line)? else {
                return Ok(Some((Frame::Array(None), next)));
            };
            let mut items = Vec::with_capacity(len.min(1024));
            let mut cursor = next;
            for _ in 0..len {
                match parse(buf, cursor)? {
                    Some((item, after)) => {
                        items.push(item);
                        cursor = after;
                    }
                    None => return Ok(None),
                }
            }
            Ok(Some((Frame::Array(Some(items)), cursor)))
        }
        other => Err(CodecError::InvalidType(other)),
    }
}

/// The bytes up to the next CRLF, and the position after it.
fn read_line(buf: &[u8], start: usize) -> Option<(&[u8], usize)> {
    let rest = buf.get(start..)?;
    let at = rest.windows(CRLF.len()).position(|w| w == CRLF)?;
    Some((&rest[..at], start + at + CRLF.len()))
}

fn utf8(line: &[u8]) -> Result<String, CodecError> {
    std::str::from_utf8(line)
        .map(str::to_string)
        .map_err(|_| CodecError::InvalidUtf8)
}

fn parse_int(line: &[u8]) -> Result<i64, CodecError> {
    std::str::from_utf8(line)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or(CodecError::InvalidInteger)
}

/// A length prefix; `None` for the nil marker `-1`.
fn parse_len(line: &[u8]) -> Result<Option<usize>, CodecError> {
    match parse_int(line)? {
        -1 => Ok(None),
        n => usize::try_from(n)
            .map(Some)
            .map_err(|_| CodecError::InvalidLength(n)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(frame: &Frame) -> Vec<u8> {
        let mut buf = BytesMut::new();
        encode(frame, &mut buf);
        buf.to_vec()
    }

    #[test]
    fn encodes_commands_as_bulk_arrays() {
        let frame = Frame::command(["HSET", "k", "a", "1"]);
        assert_eq!(
            encoded(&frame),
            b"*4\r\n$4\r\nHSET\r\n$1\r\nk\r\n$1\r\na\r\n$1\r\n1\r\n".to_vec()
        );
    }

    #[test]
    fn encodes_nils() {
        assert_eq!(encoded(&Frame::Bulk(None)), b"$-1\r\n".to_vec());
        assert_eq!(encoded(&Frame::Array(None)), b"*-1\r\n".to_vec());
    }

    #[test]
    fn encodes_empty_bulk() {
        assert_eq!(encoded(&Frame::bulk("")), b"$0\r\n\r\n".to_vec());
    }

    #[test]
    fn decodes_simple_types() {
        let mut buf = BytesMut::from(&b"+OK\r\n-ERR wrong\r\n:42\r\n"[..]);
        assert_eq!(decode(&mut buf).unwrap(), Some(Frame::Simple("OK".into())));
        assert_eq!(
            decode(&mut buf).unwrap(),
            Some(Frame::Error("ERR wrong".into()))
        );
        assert_eq!(decode(&mut buf).unwrap(), Some(Frame::Integer(42)));
        assert!(buf.is_empty());
    }

    #[test]
    fn decodes_hgetall_reply() {
        let mut buf = BytesMut::from(&b"*4\r\n$1\r\na\r\n$1\r\n1\r\n$1\r\nb\r\n$0\r\n\r\n"[..]);
        assert_eq!(
            decode(&mut buf).unwrap(),
            Some(Frame::Array(Some(vec![
                Frame::bulk("a"),
                Frame::bulk("1"),
                Frame::bulk("b"),
                Frame::bulk(""),
            ])))
        );
    }

    #[test]
    fn decodes_nil_bulk_inside_array() {
        let mut buf = BytesMut::from(&b"*3\r\n$1\r\n1\r\n$-1\r\n$1\r\n2\r\n"[..]);
        assert_eq!(
            decode(&mut buf).unwrap(),
            Some(Frame::Array(Some(vec![
                Frame::bulk("1"),
                Frame::Bulk(None),
                Frame::bulk("2"),
            ])))
        );
    }

    #[test]
    fn bulk_may_contain_crlf() {
        let mut buf = BytesMut::from(&b"$4\r\na\r\nb\r\n"[..]);
        assert_eq!(decode(&mut buf).unwrap(), Some(Frame::bulk("a\r\nb")));
    }

    #[test]
    fn partial_input_waits_for_more() {
        let full = b"*2\r\n$5\r\nhello\r\n$5\r\nworld\r\n";
        for cut in 0..full.len() {
            let mut buf = BytesMut::from(&full[..cut]);
            assert_eq!(decode(&mut buf).unwrap(), None, "cut at {}", cut);
            assert_eq!(buf.len(), cut);
        }

        let mut buf = BytesMut::from(&full[..]);
        assert!(decode(&mut buf).unwrap().is_some());
    }

    fn hgetall_reply(fields: usize) -> Vec<u8> {
        let mut items = Vec::with_capacity(fields * 2);
        for i in 0..fields {
            items.push(Frame::bulk(format!("field-{}", i)));
            items.push(Frame::bulk(format!("value-{}", i)));
        }
        encoded(&Frame::Array(Some(items)))
    }

    #[test]
    fn scanner_finds_frame_end() {
        let mut scanner = FrameScanner::new();
        let buf = b"*2\r\n$1\r\na\r\n*0\r\n:7\r\n";
        assert_eq!(scanner.scan(buf).unwrap(), Some(15));
        assert_eq!(scanner.scanned(), 0);
        assert_eq!(scanner.scan(&buf[15..]).unwrap(), Some(4));
    }

    #[test]
    fn scanner_handles_nested_and_nil() {
        let frame = Frame::Array(Some(vec![
            Frame::Array(Some(vec![Frame::Integer(1), Frame::Bulk(None)])),
            Frame::Array(None),
            Frame::Simple("OK".into()),
        ]));
        let bytes = encoded(&frame);
        let mut scanner = FrameScanner::new();
        assert_eq!(scanner.scan(&bytes).unwrap(), Some(bytes.len()));
    }

    #[test]
    fn scanner_resumes_large_chunked_reply() {
        let full = hgetall_reply(20_000);
        let mut scanner = FrameScanner::new();
        let mut buf = BytesMut::new();
        let mut last_scanned = 0;
        let mut found = None;

        for chunk in full.chunks(4096) {
            assert_eq!(found, None, "frame reported before all bytes arrived");
            buf.extend_from_slice(chunk);
            found = scanner.scan(&buf).unwrap();
            if found.is_none() {
                assert!(scanner.scanned() >= last_scanned);
                assert!(scanner.scanned() + 64 > buf.len() - chunk.len());
                last_scanned = scanner.scanned();
            }
        }

        assert_eq!(found, Some(full.len()));
        let frame = decode(&mut buf).unwrap().unwrap();
        assert!(buf.is_empty());
        match frame {
            Frame::Array(Some(items)) => {
                assert_eq!(items.len(), 40_000);
                assert_eq!(items[39_999], Frame::bulk("value-19999"));
            }
            other => panic!("expected array, got {}", other.describe()),
        }
    }

    #[test]
    fn scanner_rejects_garbage() {
        let mut scanner = FrameScanner::new();
        assert_eq!(
            scanner.scan(b"*1\r\n?x\r\n"),
            Err(CodecError::InvalidType(b'?'))
        );
    }

    #[test]
    fn rejects_garbage() {
        let mut buf = BytesMut::from(&b"?what\r\n"[..]);
        assert_eq!(decode(&mut buf), Err(CodecError::InvalidType(b'?')));

        let mut buf = BytesMut::from(&b":forty-two\r\n"[..]);
        assert_eq!(decode(&mut buf), Err(CodecError::InvalidInteger));

        let mut buf = BytesMut::from(&b"$-5\r\n"[..]);
        assert_eq!(decode(&mut buf), Err(CodecError::InvalidLength(-5)));

        let mut buf = BytesMut::from(&b"$2\r\nabcd"[..]);
        assert_eq!(decode(&mut buf), Err(CodecError::MissingTerminator));
    }

    #[test]
    fn codec_error_becomes_decode() {
        let e: StoreError = CodecError::InvalidInteger.into();
        assert!(matches!(e, StoreError::Decode { .. }));
    }

    #[test]
    fn describe_is_short() {
        assert_eq!(Frame::Integer(3).describe(), "integer 3");
        assert_eq!(Frame::Bulk(None).describe(), "nil");
        assert_eq!(Frame::bulk("abc").describe(), "bulk string (3 bytes)");
        assert_eq!(Frame::Array(Some(vec![])).describe(), "array of 0");
    }
}
