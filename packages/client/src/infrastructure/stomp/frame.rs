//! STOMP 1.2 frame model and codec.
//!
//! ```text
//! COMMAND EOL
//! *( header EOL )
//! EOL
//! *OCTET
//! NULL
//! *( EOL )
//! ```
//!
//! Header values are escaped in every frame except CONNECT and CONNECTED.
//! A frame with a `content-length` header may carry NUL bytes in its body.

use std::fmt;
use std::str::FromStr;

use super::error::{Result, StompError};

const NUL: u8 = 0;
const LF: u8 = b'\n';
const CR: u8 = b'\r';

/// Largest frame (headers and body) the decoder accepts
pub const MAX_FRAME_BYTES: usize = 1024 * 1024;

/// Frame command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    // client frames
    Connect,
    Stomp,
    Send,
    Subscribe,
    Unsubscribe,
    Ack,
    Nack,
    Begin,
    Commit,
    Abort,
    Disconnect,
    // server frames
    Connected,
    Message,
    Receipt,
    Error,
}

impl Command {
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Connect => "CONNECT",
            Command::Stomp => "STOMP",
            Command::Send => "SEND",
            Command::Subscribe => "SUBSCRIBE",
            Command::Unsubscribe => "UNSUBSCRIBE",
            Command::Ack => "ACK",
            Command::Nack => "NACK",
            Command::Begin => "BEGIN",
            Command::Commit => "COMMIT",
            Command::Abort => "ABORT",
            Command::Disconnect => "DISCONNECT",
            Command::Connected => "CONNECTED",
            Command::Message => "MESSAGE",
            Command::Receipt => "RECEIPT",
            Command::Error => "ERROR",
        }
    }

    /// CONNECT, STOMP and CONNECTED frames carry raw header values
    fn escapes_headers(&self) -> bool {
        !matches!(self, Command::Connect | Command::Stomp | Command::Connected)
    }
}

impl FromStr for Command {
    type Err = StompError;

    fn from_str(s: &str) -> Result<Self> {
        let command = match s {
            "CONNECT" => Command::Connect,
            "STOMP" => Command::Stomp,
            "SEND" => Command::Send,
            "SUBSCRIBE" => Command::Subscribe,
            "UNSUBSCRIBE" => Command::Unsubscribe,
            "ACK" => Command::Ack,
            "NACK" => Command::Nack,
            "BEGIN" => Command::Begin,
            "COMMIT" => Command::Commit,
            "ABORT" => Command::Abort,
            "DISCONNECT" => Command::Disconnect,
            "CONNECTED" => Command::Connected,
            "MESSAGE" => Command::Message,
            "RECEIPT" => Command::Receipt,
            "ERROR" => Command::Error,
            other => return Err(StompError::UnknownCommand(other.to_string())),
        };
        Ok(command)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single STOMP frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub command: Command,
    /// Headers in wire order. Repeated names are kept; the first one wins on lookup.
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Frame {
    pub fn new(command: Command) -> Self {
        Self {
            command,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Builder-style header append
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Builder-style body; also sets `content-length`
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        let len = self.body.len().to_string();
        self.headers.retain(|(name, _)| name != "content-length");
        self.headers.push(("content-length".to_string(), len));
        self
    }

    /// First value of a header
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn body_str(&self) -> Result<&str> {
        std::str::from_utf8(&self.body)
            .map_err(|e| StompError::Protocol(format!("body is not UTF-8: {e}")))
    }

    /// Serialize to wire bytes
    pub fn encode(&self) -> Vec<u8> {
        let escape = self.command.escapes_headers();
        let mut out = Vec::with_capacity(64 + self.body.len());
        out.extend_from_slice(self.command.as_str().as_bytes());
        out.push(LF);
        for (name, value) in &self.headers {
            if escape {
                out.extend_from_slice(escape_header(name).as_bytes());
                out.push(b':');
                out.extend_from_slice(escape_header(value).as_bytes());
            } else {
                out.extend_from_slice(name.as_bytes());
                out.push(b':');
                out.extend_from_slice(value.as_bytes());
            }
            out.push(LF);
        }
        out.push(LF);
        out.extend_from_slice(&self.body);
        out.push(NUL);
        out
    }

    /// Serialize as a UTF-8 string, for transports that carry text messages
    pub fn encode_text(&self) -> Result<String> {
        String::from_utf8(self.encode())
            .map_err(|e| StompError::Protocol(format!("frame is not UTF-8: {e}")))
    }
}

fn escape_header(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            ':' => out.push_str("\\c"),
            other => out.push(other),
        }
    }
    out
}

fn unescape_header(raw: &str) -> Result<String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('c') => out.push(':'),
            Some(other) => return Err(StompError::InvalidEscape(format!("\\{other}"))),
            None => return Err(StompError::InvalidEscape("\\".to_string())),
        }
    }
    Ok(out)
}

/// Incremental frame decoder.
///
/// Bytes may be pushed in arbitrary chunks; complete frames are returned as
/// soon as they are available. Heart-beats (bare EOLs between frames) are
/// consumed silently.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buf: Vec<u8>,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Number of buffered bytes not yet consumed as a frame
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Decode the next complete frame, `Ok(None)` if more bytes are needed
    pub fn next_frame(&mut self) -> Result<Option<Frame>> {
        self.skip_heartbeats();
        if self.buf.is_empty() {
            return Ok(None);
        }

        let Some((head_len, body_start)) = find_header_end(&self.buf) else {
            self.check_buffered()?;
            return Ok(None);
        };

        let head = std::str::from_utf8(&self.buf[..head_len])
            .map_err(|e| StompError::Protocol(format!("headers are not UTF-8: {e}")))?;
        let mut lines = head.split('\n').map(|line| line.strip_suffix('\r').unwrap_or(line));

        let command: Command = lines
            .next()
            .ok_or_else(|| StompError::Protocol("missing command".to_string()))?
            .parse()?;

        let mut headers = Vec::new();
        for line in lines {
            let (name, value) = line
                .split_once(':')
                .ok_or_else(|| StompError::Protocol(format!("malformed header line: {line}")))?;
            if command.escapes_headers() {
                headers.push((unescape_header(name)?, unescape_header(value)?));
            } else {
                headers.push((name.to_string(), value.to_string()));
            }
        }

        let content_length = headers
            .iter()
            .find(|(n, _)| n == "content-length")
            .map(|(_, v)| {
                v.trim()
                    .parse::<usize>()
                    .map_err(|_| StompError::Protocol(format!("invalid content-length: {v}")))
            })
            .transpose()?;

        let body_end = match content_length {
            Some(len) => {
                let end = body_start
                    .checked_add(len)
                    .filter(|end| *end < MAX_FRAME_BYTES)
                    .ok_or_else(|| {
                        StompError::Protocol(format!(
                            "content-length {len} exceeds the {MAX_FRAME_BYTES} byte frame limit"
                        ))
                    })?;
                if self.buf.len() <= end {
                    return Ok(None);
                }
                if self.buf[end] != NUL {
                    return Err(StompError::Protocol(
                        "frame body is not terminated by NUL after content-length".to_string(),
                    ));
                }
                end
            }
            None => match self.buf[body_start..].iter().position(|b| *b == NUL) {
                Some(offset) => body_start + offset,
                None => {
                    self.check_buffered()?;
                    return Ok(None);
                }
            },
        };

        let body = self.buf[body_start..body_end].to_vec();
        self.buf.drain(..=body_end);

        Ok(Some(Frame {
            command,
            headers,
            body,
        }))
    }

    /// An unterminated frame must not grow past the frame limit
    fn check_buffered(&self) -> Result<()> {
        if self.buf.len() > MAX_FRAME_BYTES {
            return Err(StompError::Protocol(format!(
                "frame exceeds {MAX_FRAME_BYTES} bytes without terminator"
            )));
        }
        Ok(())
    }

    fn skip_heartbeats(&mut self) {
        let eols = self
            .buf
            .iter()
            .take_while(|b| **b == LF || **b == CR)
            .count();
        if eols > 0 {
            self.buf.drain(..eols);
        }
    }
}

/// Locate the blank line ending the header block.
///
/// Returns the length of the command+headers section (without its final EOL)
/// and the offset where the body starts.
fn find_header_end(buf: &[u8]) -> Option<(usize, usize)> {
    let mut i = 0;
    while i < buf.len() {
        if buf[i] == NUL {
            // a NUL before the blank line means a frame with no header terminator
            return Some((i, i));
        }
        if buf[i] == LF {
            let next = i + 1;
            if next < buf.len() && buf[next] == LF {
                return Some((i, next + 1));
            }
            if next + 1 < buf.len() && buf[next] == CR && buf[next + 1] == LF {
                return Some((i, next + 2));
            }
        }
        i += 1;
    }
    None
}
