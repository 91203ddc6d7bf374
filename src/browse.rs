//! Search and pagination over a table projection.

use crate::sheet::Record;

/// Rows where any listed column contains `term`, ignoring case. A blank term
/// keeps every row.
pub fn filter_records<'a>(records: &'a [Record], columns: &[String], term: &str) -> Vec<&'a Record> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return records.iter().collect();
    }
    records
        .iter()
        .filter(|record| {
            columns.iter().any(|column| {
                record
                    .get(column)
                    .is_some_and(|value| value.as_display().to_lowercase().contains(&needle))
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page<'a, T> {
    /// 1-based, clamped into `1..=total_pages`.
    pub number: usize,
    pub total_pages: usize,
    pub items: &'a [T],
}

pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> Page<'_, T> {
    let page_size = page_size.max(1);
    let total_pages = items.len().div_ceil(page_size);
    let number = page.clamp(1, total_pages.max(1));
    let start = ((number - 1) * page_size).min(items.len());
    let end = (start + page_size).min(items.len());
    Page {
        number,
        total_pages,
        items: &items[start..end],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::CellValue;

    fn records() -> Vec<Record> {
        let labels = vec!["name".to_string(), "city".to_string()];
        [("Ana", "Recife"), ("Bruno", "Natal"), ("Carla", "recife")]
            .iter()
            .map(|(name, city)| {
                Record::new(labels.clone(), vec![CellValue::text(*name), CellValue::text(*city)])
            })
            .collect()
    }

    #[test]
    fn search_is_case_insensitive_across_columns() {
        let rows = records();
        let columns = vec!["name".to_string(), "city".to_string()];
        let hits = filter_records(&rows, &columns, "RECIFE");
        assert_eq!(hits.len(), 2);
        assert_eq!(filter_records(&rows, &columns, "  ").len(), 3);
        assert!(filter_records(&rows, &columns, "porto").is_empty());
    }

    #[test]
    fn search_only_looks_at_listed_columns() {
        let rows = records();
        let columns = vec!["name".to_string()];
        assert!(filter_records(&rows, &columns, "natal").is_empty());
    }

    #[test]
    fn pages_are_clamped() {
        let items = (1..=23).collect::<Vec<_>>();
        let first = paginate(&items, 0, 10);
        assert_eq!(first.number, 1);
        assert_eq!(first.total_pages, 3);
        assert_eq!(first.items.len(), 10);

        let last = paginate(&items, 9, 10);
        assert_eq!(last.number, 3);
        assert_eq!(last.items, &[21, 22, 23]);

        let empty: Vec<u8> = Vec::new();
        let page = paginate(&empty, 2, 10);
        assert_eq!(page.total_pages, 0);
        assert!(page.items.is_empty());
    }
}
