use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Copy source {offset:#x} is outside of the {len:#x} written bytes")]
pub struct OutOfWindow {
    pub offset: usize,
    pub len: usize,
}

/// Append-only output that doubles as the back-reference window.
#[derive(Debug, Clone, Default)]
pub struct OutputSink {
    data: Vec<u8>,
}

impl OutputSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, value: u8) {
        self.data.push(value);
    }

    pub fn append_repeated(&mut self, value: u8, count: usize) {
        self.data.resize(self.data.len() + count, value);
    }

    pub fn extend_from_slice(&mut self, values: &[u8]) {
        self.data.extend_from_slice(values);
    }

    /// Copies `count` bytes starting at `offset`, one at a time, so a copy
    /// that overlaps its own destination repeats the window.
    ///
    /// Fails without writing anything unless `offset` points into the
    /// already written output.
    pub fn copy_from(&mut self, offset: usize, count: usize) -> Result<(), OutOfWindow> {
        if offset >= self.data.len() {
            return Err(OutOfWindow {
                offset,
                len: self.data.len(),
            });
        }

        for index in offset..offset + count {
            self.data.push(self.data[index]);
        }

        Ok(())
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlapping_copy_repeats_window() {
        let mut sink = OutputSink::new();
        sink.extend_from_slice(&[0x01, 0x02, 0x03]);

        sink.copy_from(0, 7).unwrap();

        assert_eq!(
            sink.into_bytes(),
            [0x01, 0x02, 0x03, 0x01, 0x02, 0x03, 0x01, 0x02, 0x03, 0x01]
        );
    }

    #[test]
    fn repeated_append() {
        let mut sink = OutputSink::new();
        sink.append(0x10);
        sink.append_repeated(0xaa, 3);

        assert_eq!(sink.len(), 4);
        assert_eq!(sink.as_slice(), &[0x10, 0xaa, 0xaa, 0xaa]);
    }

    #[test]
    fn copy_from_unwritten_fails() {
        let mut sink = OutputSink::new();
        assert_eq!(sink.copy_from(0, 1), Err(OutOfWindow { offset: 0, len: 0 }));

        sink.extend_from_slice(&[0x01, 0x02]);
        assert_eq!(sink.copy_from(2, 1), Err(OutOfWindow { offset: 2, len: 2 }));
        assert_eq!(sink.as_slice(), &[0x01, 0x02]);
    }
}
