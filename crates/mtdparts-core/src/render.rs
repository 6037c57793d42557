//! Partition record rendering
//!
//! Read-only view over a finished [`PartitionTable`]. Each partition is
//! formatted as a fixed-field text record:
//!
//! ```text
//! bootloader
//!   offset   : 0x0
//!   size     : 0x1000
//!   access   : read-only
//! ```
//!
//! A remaining-space size renders as `0x0`; the textual format never
//! resolves the sentinel to an absolute size.

use crate::error::RenderError;
use crate::store::{Partition, PartitionTable};

/// Name line used for partitions defined without a `(name)` field
const UNNAMED: &str = "<unnamed>";

/// Formats partitions from a [`PartitionTable`] as text records
pub struct PartitionRenderer<'t> {
    table: &'t PartitionTable,
}

impl<'t> PartitionRenderer<'t> {
    /// Create a renderer over the given table
    pub fn new(table: &'t PartitionTable) -> Self {
        Self { table }
    }

    /// Render the first partition carrying the given name
    pub fn render_one(&self, name: &str) -> Result<String, RenderError> {
        let part = self
            .table
            .find_by_name(name)
            .ok_or_else(|| RenderError::PartitionNotFound(name.to_string()))?;
        Ok(render_partition(part))
    }

    /// Render every partition in table traversal order, one record per
    /// partition
    pub fn render_all(&self) -> String {
        let mut out = String::new();
        for part in self.table.partitions() {
            out.push_str(&render_partition(part));
        }
        out
    }
}

/// Format one partition as a fixed-field record
fn render_partition(part: &Partition) -> String {
    let access = if part.read_only {
        "read-only"
    } else {
        "read-write"
    };
    format!(
        "{}\n  offset   : {:#x}\n  size     : {:#x}\n  access   : {}\n",
        part.name.as_deref().unwrap_or(UNNAMED),
        part.offset,
        part.size.as_bytes(),
        access,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseError;
    use crate::parser::MtdPartsParser;

    fn parse(spec: &str) -> Result<PartitionTable, ParseError> {
        let mut table = PartitionTable::new();
        MtdPartsParser::new(&mut table).parse(spec)?;
        Ok(table)
    }

    #[test]
    fn test_render_one() {
        let table = parse("dev:0x1000(bootloader)ro,-(rootfs)").unwrap();
        let renderer = PartitionRenderer::new(&table);

        assert_eq!(
            renderer.render_one("bootloader").unwrap(),
            "bootloader\n  offset   : 0x0\n  size     : 0x1000\n  access   : read-only\n"
        );
        // Remaining-space sizes display as the stored zero.
        assert_eq!(
            renderer.render_one("rootfs").unwrap(),
            "rootfs\n  offset   : 0x1000\n  size     : 0x0\n  access   : read-write\n"
        );
    }

    #[test]
    fn test_render_one_not_found() {
        let table = parse("dev:1m(a)").unwrap();
        let renderer = PartitionRenderer::new(&table);
        assert_eq!(
            renderer.render_one("missing").unwrap_err(),
            RenderError::PartitionNotFound("missing".to_string())
        );
    }

    #[test]
    fn test_render_all_is_idempotent() {
        let table = parse("nor0:1m(a),2m(b);nand0:-(c)").unwrap();
        let renderer = PartitionRenderer::new(&table);

        let first = renderer.render_all();
        assert_eq!(first, renderer.render_all());

        let names: Vec<&str> = first
            .lines()
            .filter(|l| !l.starts_with(' '))
            .collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[test]
    fn test_render_unnamed_partition() {
        let table = parse("dev:1m").unwrap();
        let renderer = PartitionRenderer::new(&table);
        assert!(renderer.render_all().starts_with("<unnamed>\n"));
    }
}
