//! Log redaction for patient identifiers.
//!
//! Prediction requests carry no direct identifiers, but upstream callers
//! sometimes embed them in free-text labels or error messages that end up in
//! logs. Every formatted log line is passed through [`redact`] before it
//! reaches the sink.
//!
//! Redaction is line-based: the writer buffers until a newline, so a
//! pattern split across two `write` calls is still caught.

use std::io::Write;
use std::sync::OnceLock;

use regex::{Regex, RegexSet};
use tracing_subscriber::fmt::MakeWriter;

/// Lines longer than this are cut before scanning.
const MAX_LINE_BYTES: usize = 16 * 1024;

const REDACTION_UNAVAILABLE: &str = "[REDACTION-UNAVAILABLE]\n";

const RULES: [(&str, &str); 5] = [
    (
        r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}",
        "[REDACTED-UUID]",
    ),
    (r"\b\d{3}-\d{2}-\d{4}\b", "[REDACTED-SSN]"),
    (r"(?i)\bMRN[:#\s]?\s*\d{6,10}\b", "[REDACTED-MRN]"),
    (
        r"(?i)\b[a-z0-9][a-z0-9._%+-]{0,63}@(?:[a-z0-9-]{1,63}\.)+[a-z]{2,}\b",
        "[REDACTED-EMAIL]",
    ),
    (
        r"\b(?:\+?1[-.\s]?)?\(?\d{3}\)?[-.\s]\d{3}[-.\s]\d{4}\b",
        "[REDACTED-PHONE]",
    ),
];

struct Patterns {
    set: RegexSet,
    each: Vec<(Regex, &'static str)>,
}

fn compile() -> Result<Patterns, regex::Error> {
    Ok(Patterns {
        set: RegexSet::new(RULES.iter().map(|(p, _)| *p))?,
        each: RULES
            .iter()
            .map(|(p, r)| Regex::new(p).map(|re| (re, *r)))
            .collect::<Result<_, _>>()?,
    })
}

fn patterns() -> Option<&'static Patterns> {
    static PATTERNS: OnceLock<Option<Patterns>> = OnceLock::new();
    PATTERNS.get_or_init(|| compile().ok()).as_ref()
}

fn clip(input: &str, max_bytes: usize) -> (&str, bool) {
    if input.len() <= max_bytes {
        return (input, false);
    }
    let mut end = max_bytes;
    while !input.is_char_boundary(end) {
        end -= 1;
    }
    (&input[..end], true)
}

/// Replace identifier-like substrings with redaction markers.
#[must_use]
pub fn redact(input: &str) -> String {
    let (text, clipped) = clip(input, MAX_LINE_BYTES);
    // Never let an unscanned line through.
    let Some(patterns) = patterns() else {
        return REDACTION_UNAVAILABLE.to_string();
    };

    let mut out = text.to_string();
    for idx in patterns.set.matches(text).iter() {
        let (regex, replacement) = &patterns.each[idx];
        out = regex.replace_all(&out, *replacement).into_owned();
    }
    if clipped {
        out.push_str(" [TRUNCATED]");
        if input.ends_with('\n') {
            out.push('\n');
        }
    }
    out
}

/// `MakeWriter` wrapper that redacts each formatted line.
#[derive(Debug, Clone)]
pub struct SanitizingMakeWriter<M> {
    inner: M,
}

impl<M> SanitizingMakeWriter<M> {
    #[must_use]
    pub fn new(inner: M) -> Self {
        Self { inner }
    }
}

impl<'a, M> MakeWriter<'a> for SanitizingMakeWriter<M>
where
    M: MakeWriter<'a>,
{
    type Writer = SanitizingWriter<M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        SanitizingWriter {
            inner: self.inner.make_writer(),
            pending: Vec::new(),
        }
    }
}

/// Line-buffering writer produced by [`SanitizingMakeWriter`].
pub struct SanitizingWriter<W: Write> {
    inner: W,
    pending: Vec<u8>,
}

impl<W: Write> SanitizingWriter<W> {
    fn write_line(&mut self, line: &[u8]) -> std::io::Result<()> {
        let text = String::from_utf8_lossy(line);
        self.inner.write_all(redact(&text).as_bytes())
    }
}

impl<W: Write> Write for SanitizingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.pending.extend_from_slice(buf);
        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            self.write_line(&line)?;
        }
        if self.pending.len() > MAX_LINE_BYTES * 2 {
            let rest = std::mem::take(&mut self.pending);
            self.write_line(&rest)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        if !self.pending.is_empty() {
            let rest = std::mem::take(&mut self.pending);
            self.write_line(&rest)?;
        }
        self.inner.flush()
    }
}

impl<W: Write> Drop for SanitizingWriter<W> {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}
