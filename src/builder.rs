use std::fmt;

const MIN_NON_ZERO_CAP: usize = 8;

/// Append-only text buffer.
///
/// Growth is amortized: when a write does not fit, capacity becomes
/// `2 * capacity + len(write)`, so a sequence of small writes reallocates
/// only a logarithmic number of times. Nothing is allocated until the first
/// write.
#[derive(Debug, Default, Clone)]
pub struct StringBuilder {
    buf: String,
}

impl StringBuilder {
    pub fn new() -> Self {
        StringBuilder { buf: String::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        StringBuilder {
            buf: String::with_capacity(capacity),
        }
    }

    pub fn write_str(&mut self, s: &str) {
        self.grow_for(s.len());
        self.buf.push_str(s);
    }

    pub fn write_char(&mut self, c: char) {
        self.grow_for(c.len_utf8());
        self.buf.push(c);
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }

    /// Empties the builder, keeping its capacity.
    pub fn reset(&mut self) {
        self.buf.clear();
    }

    pub fn build(self) -> String {
        self.buf
    }

    fn grow_for(&mut self, additional: usize) {
        let available = self.buf.capacity() - self.buf.len();
        if additional <= available {
            return;
        }
        let target = (2 * self.buf.capacity() + additional).max(MIN_NON_ZERO_CAP);
        self.buf.reserve_exact(target - self.buf.len());
    }
}

impl fmt::Write for StringBuilder {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        StringBuilder::write_str(self, s);
        Ok(())
    }

    fn write_char(&mut self, c: char) -> fmt::Result {
        StringBuilder::write_char(self, c);
        Ok(())
    }
}

impl fmt::Display for StringBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.buf)
    }
}

impl From<StringBuilder> for String {
    fn from(builder: StringBuilder) -> Self {
        builder.build()
    }
}
