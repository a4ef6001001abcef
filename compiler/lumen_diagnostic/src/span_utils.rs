//! Line and column lookup for spans.

/// Byte offset of every line start, for repeated lookups on one source.
#[derive(Clone, Debug, Default)]
pub struct LineOffsetTable {
    offsets: Vec<u32>,
}

impl LineOffsetTable {
    pub fn build(source: &str) -> Self {
        let mut offsets = vec![0u32];
        for (i, byte) in source.bytes().enumerate() {
            if byte == b'\n' {
                offsets.push(u32::try_from(i + 1).unwrap_or(u32::MAX));
            }
        }
        LineOffsetTable { offsets }
    }

    /// 1-based line containing `offset`.
    pub fn line_from_offset(&self, offset: u32) -> u32 {
        let index = match self.offsets.binary_search(&offset) {
            Ok(exact) => exact,
            Err(insert) => insert.saturating_sub(1),
        };
        u32::try_from(index + 1).unwrap_or(u32::MAX)
    }

    /// 1-based (line, column); columns count characters, not bytes.
    pub fn offset_to_line_col(&self, source: &str, offset: u32) -> (u32, u32) {
        let line = self.line_from_offset(offset);
        let start = self.offsets.get(line as usize - 1).copied().unwrap_or(0) as usize;
        let end = (offset as usize).min(source.len()).max(start);
        let column = source
            .get(start..end)
            .map_or(0, |prefix| prefix.chars().count());
        (line, u32::try_from(column + 1).unwrap_or(u32::MAX))
    }

    /// Text of a 1-based line without its newline.
    pub fn line_text<'a>(&self, source: &'a str, line: u32) -> &'a str {
        let index = line.saturating_sub(1) as usize;
        let start = self.offsets.get(index).copied().unwrap_or(0) as usize;
        let end = self
            .offsets
            .get(index + 1)
            .map_or(source.len(), |next| (*next as usize).saturating_sub(1));
        source.get(start..end.max(start)).unwrap_or("")
    }
}
