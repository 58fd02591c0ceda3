//! Tabular assembly of rewritten rows.

/// Header line. It declares a Tags column no row populates; downstream
/// importers have depended on this exact shape for years, so it stays.
pub const HEADER: &str = "Front,Back,Tags";

/// One exported row: the first two fields of a note, already rewritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRow {
    pub front: String,
    pub back: String,
}

/// Join rows into the final delimited text: header, then one
/// `front\tback` line per row, trailing newline.
///
/// Embedded tabs or newlines inside cells are not escaped. A conformant
/// tabular reader needs quoting around embedded newlines; see DESIGN.md
/// for the flagged fix.
pub fn to_csv(rows: &[ExportRow]) -> String {
    let mut out = String::with_capacity(HEADER.len() + 1 + rows.len() * 16);
    out.push_str(HEADER);
    out.push('\n');
    for row in rows {
        out.push_str(&row.front);
        out.push('\t');
        out.push_str(&row.back);
        out.push('\n');
    }
    out
}
