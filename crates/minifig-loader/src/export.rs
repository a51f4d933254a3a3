//! Tab-separated export of a resolved hierarchy.
//!
//! One row per (parent, child) pair, parents in id order and children in
//! resolved order. The attach points of the parent are repeated on every
//! row as `x y z` triples separated by `;`.

use std::io::Write;

use csv::WriterBuilder;

use crate::store::PartsHierarchy;
use crate::types::HierarchyResult;

/// Header row of the export.
pub const EXPORT_COLUMNS: &[&str] = &["parent", "child", "attach_points"];

/// Writes the flattened hierarchy as TSV and returns the number of data rows.
pub fn write_tsv<W: Write>(hierarchy: &PartsHierarchy, writer: W) -> HierarchyResult<usize> {
    let mut out = WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .from_writer(writer);

    out.write_record(EXPORT_COLUMNS)?;

    let mut rows = 0;
    for parent in hierarchy.parent_ids() {
        let points = hierarchy
            .attach_points_of(parent.as_str())
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(";");

        for child in hierarchy.children_of(parent.as_str()) {
            out.write_record([parent.as_str(), child.as_str(), points.as_str()])?;
            rows += 1;
        }
    }

    out.flush()?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_tsv() {
        let hierarchy: PartsHierarchy = "Group Hands:\n977\n983\n977\n\nParent 975:\n-22 16.1213 20.8787\nHands\n\nParent 970:\n0 12 0\n1 12 0\n971\n"
            .parse()
            .unwrap();

        let mut buffer = Vec::new();
        let rows = write_tsv(&hierarchy, &mut buffer).unwrap();
        assert_eq!(rows, 3);

        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "parent\tchild\tattach_points",
                "970\t971\t0 12 0;1 12 0",
                "975\t977\t-22 16.1213 20.8787",
                "975\t983\t-22 16.1213 20.8787",
            ]
        );
    }

    #[test]
    fn test_write_tsv_empty() {
        let hierarchy = PartsHierarchy::default();
        let mut buffer = Vec::new();
        assert_eq!(write_tsv(&hierarchy, &mut buffer).unwrap(), 0);
        assert_eq!(String::from_utf8(buffer).unwrap(), "parent\tchild\tattach_points\n");
    }
}
