use serde::Serialize;

use crate::layer::{SubPolygon, ZoneId};

/// Sentinel identifier of the appended total row; the tabular display bolds
/// rows carrying it.
pub const TOTAL_ROW_ID: &str = "Sum";

/// One row of the tabular output: a zone id plus attribute values in the
/// layer's attribute-name order. `None` renders as blank, not zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    pub id: ZoneId,
    pub values: Vec<Option<f64>>,
}

/// Rows for the selected sub-polygons, in selection order. An empty selection
/// yields an empty table with no synthetic total row.
pub fn summarize(view: &[SubPolygon], selected: &[usize]) -> Vec<Row> {
    selected
        .iter()
        .filter_map(|&idx| view.get(idx))
        .map(|sub| Row { id: sub.parent.clone(), values: sub.attrs.clone() })
        .collect()
}

/// Running-display variant: always appends the total row, all zeros when the
/// selection is empty. Null values are skipped in the sums, so a mix of null
/// and numeric still sums over the numeric subset.
pub fn summarize_with_total(view: &[SubPolygon], selected: &[usize], width: usize) -> Vec<Row> {
    let mut rows = summarize(view, selected);
    let mut sums = vec![0.0_f64; width];
    for row in &rows {
        for (slot, value) in sums.iter_mut().zip(&row.values) {
            if let Some(v) = value {
                *slot += v;
            }
        }
    }
    rows.push(Row {
        id: TOTAL_ROW_ID.into(),
        values: sums.into_iter().map(Some).collect(),
    });
    rows
}

#[cfg(test)]
mod tests {
    use geo::LineString;

    use super::*;

    fn sub(parent: &str, attrs: Vec<Option<f64>>) -> SubPolygon {
        SubPolygon {
            ring: LineString::from(vec![(0., 0.), (1., 0.), (0., 1.), (0., 0.)]),
            parent: parent.into(),
            attrs,
        }
    }

    #[test]
    fn empty_selection_yields_empty_table() {
        let view = vec![sub("1", vec![Some(10.0)])];
        assert!(summarize(&view, &[]).is_empty());
    }

    #[test]
    fn empty_selection_with_total_is_all_zeros() {
        let view = vec![sub("1", vec![Some(10.0), Some(2.0)])];
        let rows = summarize_with_total(&view, &[], 2);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, TOTAL_ROW_ID.into());
        assert_eq!(rows[0].values, vec![Some(0.0), Some(0.0)]);
    }

    #[test]
    fn nulls_are_skipped_not_zeroed() {
        let view = vec![
            sub("a", vec![Some(10.0)]),
            sub("b", vec![None]),
            sub("c", vec![Some(20.0)]),
        ];
        let rows = summarize_with_total(&view, &[0, 1, 2], 1);
        assert_eq!(rows.len(), 4);
        // The null row keeps its null; the total sums the numeric subset.
        assert_eq!(rows[1].values, vec![None]);
        assert_eq!(rows[3].values, vec![Some(30.0)]);
    }

    #[test]
    fn rows_follow_selection_order() {
        let view = vec![
            sub("a", vec![Some(1.0)]),
            sub("b", vec![Some(2.0)]),
            sub("c", vec![Some(3.0)]),
        ];
        let rows = summarize(&view, &[2, 0]);
        let ids: Vec<&str> = rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a"]);
    }
}
