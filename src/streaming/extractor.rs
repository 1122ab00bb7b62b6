/// How braces are counted while looking for the end of an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanMode {
    /// Braces inside quoted strings (escapes honoured) are ignored.
    #[default]
    StringAware,
    /// Every `{` and `}` byte counts, even inside string values.
    Literal,
}

/// First complete object found in a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractedObject<'a> {
    /// The object text, opening `{` through matching `}` inclusive.
    pub text: &'a [u8],
    /// Bytes of the buffer used up, including noise skipped before the `{`.
    pub consumed: usize,
}

/// Finds the first brace-balanced object at or after the first `{`.
///
/// Returns `None` when the buffer holds no `{` or the object opened by the
/// first `{` is not closed yet. Only the ASCII bytes `{`, `}`, `"` and `\`
/// are inspected, so multi-byte UTF-8 sequences never confuse the scan.
pub fn extract_one(buffer: &[u8], mode: ScanMode) -> Option<ExtractedObject<'_>> {
    ObjectScanner::new(mode).scan(buffer)
}

/// Brace scan that picks up where the previous call stopped.
///
/// The buffer handed to [`ObjectScanner::scan`] must only grow at the end
/// between calls; call [`ObjectScanner::reset`] after removing bytes from
/// its front. An object delivered in many small reads is then scanned once
/// instead of once per read.
#[derive(Debug, Clone, Default)]
pub struct ObjectScanner {
    mode: ScanMode,
    start: Option<usize>,
    cursor: usize,
    depth: usize,
    in_string: bool,
    escape_next: bool,
}

impl ObjectScanner {
    pub fn new(mode: ScanMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn mode(&self) -> ScanMode {
        self.mode
    }

    /// Bytes already examined.
    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.mode);
    }

    /// Scans the bytes added since the last call.
    ///
    /// On success the scanner is reset, ready for the next object.
    pub fn scan<'a>(&mut self, buffer: &'a [u8]) -> Option<ExtractedObject<'a>> {
        if self.cursor > buffer.len() {
            self.reset();
        }

        let start = match self.start {
            Some(start) => start,
            None => match buffer[self.cursor..].iter().position(|&byte| byte == b'{') {
                Some(offset) => {
                    let start = self.cursor + offset;
                    self.start = Some(start);
                    self.cursor = start;
                    start
                }
                None => {
                    self.cursor = buffer.len();
                    return None;
                }
            },
        };

        while let Some(&byte) = buffer.get(self.cursor) {
            self.cursor += 1;
            if self.closes_object(byte) {
                let end = self.cursor;
                self.reset();
                return Some(ExtractedObject {
                    text: &buffer[start..end],
                    consumed: end,
                });
            }
        }

        None
    }

    fn closes_object(&mut self, byte: u8) -> bool {
        if self.mode == ScanMode::StringAware {
            if self.escape_next {
                self.escape_next = false;
                return false;
            }
            if self.in_string {
                match byte {
                    b'\\' => self.escape_next = true,
                    b'"' => self.in_string = false,
                    _ => {}
                }
                return false;
            }
            if byte == b'"' {
                self.in_string = true;
                return false;
            }
        }

        match byte {
            b'{' => {
                self.depth += 1;
                false
            }
            b'}' => {
                self.depth -= 1;
                self.depth == 0
            }
            _ => false,
        }
    }
}

/// Length of the leading ASCII whitespace run.
pub fn leading_whitespace(buffer: &[u8]) -> usize {
    buffer
        .iter()
        .take_while(|byte| byte.is_ascii_whitespace())
        .count()
}
