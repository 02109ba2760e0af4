//! Fixed-column grid layout shared by the OBF and PDF exporters

/// Lay `items` out row-major into rows of `columns` slots. The final row is
/// right-padded with `None` so every row has the same width.
///
/// Returns no rows for no items. Zero columns is treated as one.
pub fn layout_rows<T>(items: impl IntoIterator<Item = T>, columns: usize) -> Vec<Vec<Option<T>>> {
    let columns = columns.max(1);

    let mut rows: Vec<Vec<Option<T>>> = Vec::new();
    for (i, item) in items.into_iter().enumerate() {
        if i % columns == 0 {
            rows.push(Vec::with_capacity(columns));
        }
        if let Some(row) = rows.last_mut() {
            row.push(Some(item));
        }
    }

    if let Some(last) = rows.last_mut() {
        last.resize_with(columns, || None);
    }
    rows
}
