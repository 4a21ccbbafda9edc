use crate::model::{Households, Row};

/// Partition rows by their (already normalized) household name.
///
/// Order is preserved both for households (first seen) and for members
/// within a household. No row is dropped.
pub fn group_households(rows: Vec<Row>) -> Households {
    let row_count = rows.len();
    let mut households = Households::new();
    for row in rows {
        households.insert(row);
    }
    log::info!("There are {} households ({} rows)", households.len(), row_count);
    households
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(full: &str, household: &str, line: usize) -> Row {
        let (first, last) = full.split_once(' ').unwrap_or((full, ""));
        Row::new(first, last, full, household, line)
    }

    #[test]
    fn groups_by_exact_name() {
        let rows = vec![
            row("John Smith", "Smith", 1),
            row("Ann Lee", "Lee", 2),
            row("Mary Smith", "Smith", 3),
            row("Bo Lee", "lee", 4),
        ];
        let hh = group_households(rows);
        assert_eq!(hh.len(), 3);

        let smith: Vec<&str> = hh
            .get("Smith")
            .unwrap()
            .members
            .iter()
            .map(|r| r.full_name.as_str())
            .collect();
        assert_eq!(smith, vec!["John Smith", "Mary Smith"]);
        assert_eq!(hh.get("lee").unwrap().members.len(), 1);
    }

    #[test]
    fn empty_input() {
        let hh = group_households(Vec::new());
        assert!(hh.is_empty());
        assert_eq!(hh.row_count(), 0);
    }
}
