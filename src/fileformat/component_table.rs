use std::io::Write;

use anyhow::Result;

///////////////////////////////
/// One consistent component, as listed in components.tsv
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct ComponentRow {
    /// 1-based index of the offset-connected component
    pub component: usize,
    /// 1-based index of the consistent component within it
    pub cluster: usize,
    pub reads: usize,
    pub offsets: usize,
    pub consensus: String,
}

pub struct ComponentTableWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> ComponentTableWriter<W> {
    pub fn new(inner: W) -> Self {
        let writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .from_writer(inner);
        Self { writer }
    }

    pub fn write_rows<'a, I>(&mut self, rows: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a ComponentRow>,
    {
        for row in rows {
            self.writer.serialize(row)?;
        }
        Ok(())
    }

    pub fn finish(mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
