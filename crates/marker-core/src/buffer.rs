use std::fmt;

use crate::config::DEFAULT_BUFFER_SIZE;
use crate::error::{Error, Result};

/// Append-only HTML accumulator.
///
/// The logical capacity always leaves room for one terminator byte, so
/// `len() < capacity()` holds after every append. Growth doubles the capacity.
#[derive(Clone, Debug)]
pub struct OutputBuffer {
    data: String,
    capacity: usize,
}

impl OutputBuffer {
    /// Creates a buffer; a capacity of 0 selects the default size.
    pub fn new(capacity: usize) -> Result<Self> {
        let capacity = if capacity == 0 {
            DEFAULT_BUFFER_SIZE
        } else {
            capacity
        };
        let mut data = String::new();
        data.try_reserve_exact(capacity)?;
        Ok(Self { data, capacity })
    }

    pub fn append(&mut self, text: &str) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        let needed = self
            .data
            .len()
            .checked_add(text.len())
            .and_then(|len| len.checked_add(1))
            .ok_or(Error::InvalidSize(text.len()))?;
        self.ensure_capacity(needed)?;
        self.data.push_str(text);
        Ok(())
    }

    pub fn append_char(&mut self, ch: char) -> Result<()> {
        let mut utf8 = [0u8; 4];
        self.append(ch.encode_utf8(&mut utf8))
    }

    fn ensure_capacity(&mut self, needed: usize) -> Result<()> {
        if self.capacity >= needed {
            return Ok(());
        }
        let mut capacity = self.capacity;
        while capacity < needed {
            capacity = capacity
                .checked_mul(2)
                .ok_or(Error::InvalidSize(needed))?;
        }
        self.data.try_reserve_exact(capacity - self.data.len())?;
        self.capacity = capacity;
        Ok(())
    }

    pub fn as_str(&self) -> &str {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drops the contents but keeps the grown capacity.
    pub fn clear(&mut self) {
        self.data.clear();
    }

    pub fn into_string(self) -> String {
        self.data
    }
}

impl fmt::Display for OutputBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.data)
    }
}
