//! Byte-level recognizer for the commit message grammar.
//!
//! The machine consumes the input one byte at a time through an explicit
//! cursor and reports the first violation with the byte column at which it
//! was detected. The header is strictly sequential; after the blank line the
//! machine speculatively attempts footer trailers and rewinds the speculated
//! bytes into body content when the attempt fails before any trailer was
//! committed.

use tracing::{debug, info};

use crate::commit::{Commit, CommitBuilder, BREAKING_CHANGE_KEY};
use crate::error::ErrorKind;
use crate::types::{self, TypeSet};

fn is_printable(b: u8) -> bool {
    (0x20..=0x7e).contains(&b)
}

fn is_scope_byte(b: u8) -> bool {
    is_printable(b) && b != b'(' && b != b')'
}

/// Whether the recognizer may keep going after a phase, or the input ended on
/// a valid final position.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Flow {
    Next,
    Done,
}

/// Outcome of one speculative trailer attempt.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Attempt {
    /// A trailer was recognized and its value recorded.
    Footer,
    /// The attempt failed before any trailer was committed; the speculated
    /// bytes start body content at the current mark.
    Body,
    /// The input ended on a valid final position.
    End,
}

/// Which separator introduced the trailer value being collected.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Separator {
    Colon,
    Hash,
}

pub(crate) struct Machine<'a> {
    data: &'a [u8],
    len: usize,
    /// Cursor of the byte under examination.
    pos: usize,
    /// Start of the current lexeme.
    mark: usize,
    /// Newlines consumed since the last body emission; replayed in front of
    /// the next body fragment.
    pending_newlines: usize,
    /// Position of the most recent newline, where a rewind restarts.
    last_newline: usize,
    /// Lowercased, canonicalized key of the trailer being collected.
    current_key: String,
    type_set: TypeSet,
    out: CommitBuilder,
}

impl<'a> Machine<'a> {
    pub(crate) fn new(data: &'a [u8], type_set: TypeSet) -> Self {
        Self {
            data,
            len: data.len(),
            pos: 0,
            mark: 0,
            pending_newlines: 0,
            last_newline: 0,
            current_key: String::new(),
            type_set,
            out: CommitBuilder::default(),
        }
    }

    pub(crate) fn minimal(&self) -> bool {
        self.out.minimal()
    }

    pub(crate) fn into_commit(self) -> Commit {
        self.out.build()
    }

    /// Runs the recognizer over the whole input.
    pub(crate) fn run(&mut self) -> Result<(), ErrorKind> {
        if self.len == 0 {
            return Err(ErrorKind::Empty { col: 0 });
        }

        self.header()?;
        if self.description()? == Flow::Done {
            return Ok(());
        }
        self.footers_and_body()
    }

    fn cur(&self) -> u8 {
        self.data[self.pos]
    }

    fn prev(&self) -> u8 {
        self.data[self.pos - 1]
    }

    fn text(&self) -> &[u8] {
        &self.data[self.mark..self.pos]
    }

    /// Advances past the current byte where the grammar always requires at
    /// least one more.
    fn bump_expecting_more(&mut self) -> Result<(), ErrorKind> {
        let early = ErrorKind::Early {
            ch: self.cur() as char,
            col: self.pos,
        };
        self.pos += 1;
        if self.pos == self.len {
            return Err(early);
        }
        Ok(())
    }

    // ---- header -----------------------------------------------------------

    /// `TYPE ( "(" SCOPE ")" )? ( "!" )? ":" " "+`, leaving the cursor on the
    /// first description byte.
    fn header(&mut self) -> Result<(), ErrorKind> {
        match self.type_set {
            TypeSet::Minimal => self.keyword_type(types::MINIMAL)?,
            TypeSet::Conventional => self.keyword_type(types::CONVENTIONAL)?,
            TypeSet::FreeForm => self.freeform_type()?,
        }

        if self.cur() == b'(' {
            self.scope()?;
        }

        if self.cur() == b'!' {
            self.out.exclamation = true;
            info!("commit message communicates a breaking change");
            self.bump_expecting_more()?;
        }

        if self.cur() != b':' {
            return Err(ErrorKind::Colon {
                ch: self.cur() as char,
                col: self.pos,
            });
        }
        self.bump_expecting_more()?;

        if self.cur() != b' ' {
            return Err(ErrorKind::DescriptionInit {
                ch: self.cur() as char,
                col: self.pos,
            });
        }

        // One white space is mandatory; any further ones are discarded.
        loop {
            self.pos += 1;
            if self.pos == self.len {
                return Err(ErrorKind::Description {
                    ch: self.prev() as char,
                    col: self.pos,
                });
            }
            match self.cur() {
                b'\n' => return Err(ErrorKind::Newline { col: self.pos + 1 }),
                b' ' => continue,
                _ => return Ok(()),
            }
        }
    }

    /// Matches one of the dialect keywords case-insensitively, byte by byte.
    fn keyword_type(&mut self, keywords: &[&str]) -> Result<(), ErrorKind> {
        self.mark = self.pos;
        let mut live = (1u32 << keywords.len()) - 1;

        loop {
            let b = self.cur();
            let matched = self.pos - self.mark;

            let mut next = 0u32;
            for (i, keyword) in keywords.iter().enumerate() {
                if live & (1 << i) != 0
                    && keyword
                        .as_bytes()
                        .get(matched)
                        .is_some_and(|k| k.eq_ignore_ascii_case(&b))
                {
                    next |= 1 << i;
                }
            }
            if next == 0 {
                return Err(ErrorKind::Type {
                    ch: b as char,
                    col: self.pos,
                });
            }
            live = next;

            let matched = matched + 1;
            let complete = keywords
                .iter()
                .enumerate()
                .any(|(i, keyword)| live & (1 << i) != 0 && keyword.len() == matched);
            if complete {
                // No keyword extends another, so the grammar now needs the
                // scope, marker, or colon.
                self.bump_expecting_more()?;
                self.out.ty = String::from_utf8_lossy(self.text()).into_owned();
                info!(commit_type = %self.out.ty, "valid commit message type");
                return Ok(());
            }

            self.pos += 1;
            if self.pos == self.len {
                return Err(ErrorKind::TypeIncomplete {
                    ch: self.prev() as char,
                    col: self.pos,
                });
            }
        }
    }

    /// Free-form dialect: one or more printable bytes up to a structural one.
    fn freeform_type(&mut self) -> Result<(), ErrorKind> {
        if !is_printable(self.cur()) {
            return Err(ErrorKind::Type {
                ch: self.cur() as char,
                col: self.pos,
            });
        }
        self.mark = self.pos;

        loop {
            self.bump_expecting_more()?;
            match self.cur() {
                b'!' | b'(' | b':' => {
                    self.out.ty = String::from_utf8_lossy(self.text()).into_owned();
                    info!(commit_type = %self.out.ty, "valid commit message type");
                    return Ok(());
                }
                b if is_printable(b) => continue,
                b => {
                    return Err(ErrorKind::Colon {
                        ch: b as char,
                        col: self.pos,
                    })
                }
            }
        }
    }

    /// `"(" SCOPE ")"`, leaving the cursor on the byte after the closing
    /// parenthesis. An empty scope block is tolerated and recorded as absent.
    fn scope(&mut self) -> Result<(), ErrorKind> {
        self.pos += 1;
        if self.pos == self.len {
            return Err(ErrorKind::ScopeIncomplete {
                ch: self.prev() as char,
                col: self.pos,
            });
        }

        if self.cur() != b')' {
            if !is_scope_byte(self.cur()) {
                return Err(ErrorKind::Scope {
                    ch: self.cur() as char,
                    col: self.pos,
                });
            }
            self.mark = self.pos;
            loop {
                self.pos += 1;
                if self.pos == self.len {
                    return Err(ErrorKind::ScopeIncomplete {
                        ch: self.prev() as char,
                        col: self.pos,
                    });
                }
                match self.cur() {
                    b')' => break,
                    b if is_scope_byte(b) => continue,
                    b => {
                        return Err(ErrorKind::Scope {
                            ch: b as char,
                            col: self.pos,
                        })
                    }
                }
            }
            self.out.scope = String::from_utf8_lossy(self.text()).into_owned();
            info!(scope = %self.out.scope, "valid commit message scope");
        }

        self.bump_expecting_more()
    }

    // ---- description and separator ----------------------------------------

    /// A maximal run of non-newline bytes, then the blank line that must
    /// separate the header from body and footers.
    fn description(&mut self) -> Result<Flow, ErrorKind> {
        self.mark = self.pos;
        loop {
            self.pos += 1;
            if self.pos == self.len {
                self.record_description();
                return Ok(Flow::Done);
            }
            if self.cur() == b'\n' {
                self.record_description();
                break;
            }
        }

        self.pos += 1;
        if self.pos == self.len || self.cur() != b'\n' {
            return Err(ErrorKind::MissingBlankLine { col: self.pos });
        }
        debug!(pos = self.pos, "found a blank line");
        Ok(Flow::Next)
    }

    fn record_description(&mut self) {
        self.out.description = String::from_utf8_lossy(self.text()).into_owned();
        info!(description = %self.out.description, "valid commit message description");
    }

    // ---- body and footers -------------------------------------------------

    fn footers_and_body(&mut self) -> Result<(), ErrorKind> {
        loop {
            match self.trailer_attempt()? {
                Attempt::Footer => {}
                Attempt::End => return Ok(()),
                Attempt::Body => {
                    if self.body_content() == Flow::Done {
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Speculatively recognizes one trailer: token, separator, value.
    ///
    /// Entered with the cursor on the last byte of the previous production;
    /// newlines between trailers are counted here so a rewind can replay them
    /// into the body.
    fn trailer_attempt(&mut self) -> Result<Attempt, ErrorKind> {
        debug!(pos = self.pos, "try to parse a footer trailer token");
        loop {
            self.pos += 1;
            if self.pos == self.len {
                return Ok(Attempt::End);
            }
            match self.cur() {
                b'\n' => self.count_newline(),
                _ => break,
            }
        }

        self.mark = self.pos;
        if !self.cur().is_ascii_alphanumeric() {
            return self.fail_trailer();
        }

        // TOKEN is `alnum+ ("-" alnum+)*`, with the `BREAKING CHANGE` literal
        // overlaid on the space transition.
        loop {
            self.pos += 1;
            if self.pos == self.len {
                return self.fail_trailer();
            }
            match self.cur() {
                b':' => {
                    self.record_key();
                    return self.colon_separator();
                }
                b' ' => {
                    if self.text() == b"BREAKING" {
                        return self.breaking_literal();
                    }
                    self.record_key();
                    self.pos += 1;
                    if self.pos == self.len || self.cur() != b'#' {
                        return self.fail_trailer();
                    }
                    return self.value(Separator::Hash);
                }
                b'-' => {
                    self.pos += 1;
                    if self.pos == self.len || !self.cur().is_ascii_alphanumeric() {
                        return self.fail_trailer();
                    }
                }
                b if b.is_ascii_alphanumeric() => {}
                _ => return self.fail_trailer(),
            }
        }
    }

    /// The region after `BREAKING `: either `#` introducing a value for the
    /// plain `breaking` key, or the case-sensitive `CHANGE:` completion.
    fn breaking_literal(&mut self) -> Result<Attempt, ErrorKind> {
        self.record_key();
        self.pos += 1;
        if self.pos == self.len {
            return self.fail_trailer();
        }
        if self.cur() == b'#' {
            return self.value(Separator::Hash);
        }

        for expected in *b"CHANGE" {
            if self.cur() != expected {
                return self.fail_trailer();
            }
            self.pos += 1;
            if self.pos == self.len {
                return self.fail_trailer();
            }
        }
        if self.cur() != b':' {
            return self.fail_trailer();
        }
        self.record_key();
        self.colon_separator()
    }

    /// `":" " "+` between a trailer token and its value.
    fn colon_separator(&mut self) -> Result<Attempt, ErrorKind> {
        self.pos += 1;
        if self.pos == self.len || self.cur() != b' ' {
            return self.fail_trailer();
        }
        self.value(Separator::Colon)
    }

    /// A non-empty run of printable bytes terminated by a newline or the end
    /// of input.
    fn value(&mut self, separator: Separator) -> Result<Attempt, ErrorKind> {
        debug!(pos = self.pos, "try to parse a footer trailer value");
        self.pos += 1;
        if self.pos == self.len {
            return Err(ErrorKind::TrailerIncomplete {
                ch: self.prev() as char,
                col: self.pos,
            });
        }
        if separator == Separator::Colon {
            while self.cur() == b' ' {
                self.pos += 1;
                if self.pos == self.len {
                    return Err(ErrorKind::TrailerIncomplete {
                        ch: self.prev() as char,
                        col: self.pos,
                    });
                }
            }
        }
        if !is_printable(self.cur()) {
            return Err(ErrorKind::Trailer {
                ch: self.cur() as char,
                col: self.pos,
            });
        }

        self.mark = self.pos;
        loop {
            self.pos += 1;
            if self.pos == self.len {
                self.record_footer();
                return Ok(Attempt::End);
            }
            match self.cur() {
                b'\n' => {
                    self.record_footer();
                    self.count_newline();
                    return Ok(Attempt::Footer);
                }
                b if is_printable(b) => {}
                b => {
                    return Err(ErrorKind::Trailer {
                        ch: b as char,
                        col: self.pos,
                    })
                }
            }
        }
    }

    /// Decides between reclassifying the speculated bytes as body content and
    /// a hard trailer error.
    ///
    /// Rewinding is only allowed while no trailer has been committed; the
    /// mark is pre-advanced past newlines already counted so they are not
    /// re-read (the body appender replays them).
    fn fail_trailer(&mut self) -> Result<Attempt, ErrorKind> {
        if self.out.footers.is_empty() {
            if self.pending_newlines > 0 {
                self.mark = self.last_newline + 1;
            }
            debug!(pos = self.mark, "try to parse body content");
            return Ok(Attempt::Body);
        }
        if self.pos < self.len {
            return Err(ErrorKind::Trailer {
                ch: self.cur() as char,
                col: self.pos,
            });
        }
        Err(ErrorKind::TrailerIncomplete {
            ch: self.prev() as char,
            col: self.pos,
        })
    }

    /// Scans body bytes from the current mark, committing up to (and
    /// including) the byte that precedes a blank line so the trailer entry
    /// re-examines the blank line itself.
    fn body_content(&mut self) -> Flow {
        self.pos = self.mark;
        loop {
            let blank_ahead = self.pos + 2 < self.len
                && self.data[self.pos + 1] == b'\n'
                && self.data[self.pos + 2] == b'\n';
            if blank_ahead {
                self.record_body(self.mark, self.pos + 1);
                return Flow::Next;
            }
            self.pos += 1;
            if self.pos == self.len {
                self.record_body(self.mark, self.pos);
                return Flow::Done;
            }
        }
    }

    fn record_body(&mut self, start: usize, end: usize) {
        while self.pending_newlines > 0 {
            self.out.body.push('\n');
            self.pending_newlines -= 1;
        }
        let text = String::from_utf8_lossy(&self.data[start..end]);
        info!(body = %text, "valid commit message body content");
        self.out.body.push_str(&text);
    }

    fn count_newline(&mut self) {
        self.pending_newlines += 1;
        self.last_newline = self.pos;
        debug!(pos = self.pos, "found a newline");
    }

    fn record_key(&mut self) {
        let mut key = String::from_utf8_lossy(self.text()).to_ascii_lowercase();
        if key == "breaking change" {
            key = BREAKING_CHANGE_KEY.to_owned();
        }
        debug!(token = %key, pos = self.pos, "possibly valid footer token");
        self.current_key = key;
    }

    fn record_footer(&mut self) {
        let value = String::from_utf8_lossy(self.text()).into_owned();
        info!(token = %self.current_key, value = %value, "valid commit message footer trailer");
        self.out
            .footers
            .entry(self.current_key.clone())
            .or_default()
            .push(value);
    }
}
