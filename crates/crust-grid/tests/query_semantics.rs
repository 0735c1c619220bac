use crust_core::errors::CrustError;
use crust_grid::{filter_eq, project_pair, ResultTable, TableQuery};
use proptest::prelude::*;

fn sample() -> ResultTable {
    ResultTable::parse("1 10 17 4\n2 12 18 4\n3 14 17 5\n").unwrap()
}

#[test]
fn filter_keeps_original_order() {
    let table = sample();
    let rows = filter_eq(&table, 3, 4.0).unwrap();
    assert_eq!(rows, [&[1.0, 10.0, 17.0, 4.0][..], &[2.0, 12.0, 18.0, 4.0][..]]);
}

#[test]
fn filter_without_match_is_empty_not_error() {
    let table = sample();
    assert!(filter_eq(&table, 3, 99.0).unwrap().is_empty());
    let series = project_pair(&table, 3, 99.0, 1, 2).unwrap();
    assert!(series.is_empty());
}

#[test]
fn projection_is_aligned() {
    let table = sample();
    let series = project_pair(&table, 3, 4.0, 1, 2).unwrap();
    assert_eq!(series.x, [10.0, 12.0]);
    assert_eq!(series.y, [17.0, 18.0]);
    assert_eq!(series.len(), 2);
}

#[test]
fn multi_column_conjunction() {
    let table = sample();
    let rows = TableQuery::new(&table).eq(2, 17.0).eq(3, 5.0).rows().unwrap();
    assert_eq!(rows, [&[3.0, 14.0, 17.0, 5.0][..]]);
}

#[test]
fn out_of_range_column_is_a_query_error() {
    let table = sample();
    let err = filter_eq(&table, 4, 1.0).unwrap_err();
    assert!(matches!(err, CrustError::Query(info) if info.code == "crust_grid.column_range"));
}

#[test]
fn empty_table_queries_are_empty() {
    let table = ResultTable::parse("").unwrap();
    assert!(filter_eq(&table, 3, 4.0).unwrap().is_empty());
    assert!(project_pair(&table, 0, 1.0, 1, 2).unwrap().is_empty());
}

#[test]
fn computed_keys_do_not_match_stored_literals() {
    let table = ResultTable::parse("0.3 1\n").unwrap();
    assert!(filter_eq(&table, 0, 0.1 * 3.0).unwrap().is_empty());
    assert_eq!(filter_eq(&table, 0, 0.3).unwrap().len(), 1);
}

fn rows_strategy() -> impl Strategy<Value = Vec<[f64; 3]>> {
    prop::collection::vec(
        (0u8..4, 0u8..4, 0u8..100).prop_map(|(a, b, c)| [f64::from(a), f64::from(b), f64::from(c)]),
        0..40,
    )
}

proptest! {
    #[test]
    fn filter_is_an_ordered_subsequence(rows in rows_strategy(), key in 0u8..4) {
        let table = ResultTable::from_rows(rows.clone()).unwrap();
        let key = f64::from(key);
        let expected: Vec<[f64; 3]> = rows.into_iter().filter(|row| row[0] == key).collect();
        let found: Vec<[f64; 3]> = filter_eq(&table, 0, key)
            .unwrap()
            .into_iter()
            .map(|row| [row[0], row[1], row[2]])
            .collect();
        prop_assert_eq!(found, expected);
    }

    #[test]
    fn conjunction_is_order_independent(rows in rows_strategy(), a in 0u8..4, b in 0u8..4) {
        let table = ResultTable::from_rows(rows).unwrap();
        let (a, b) = (f64::from(a), f64::from(b));
        let left = TableQuery::new(&table).eq(0, a).eq(1, b).indices().unwrap();
        let right = TableQuery::new(&table).eq(1, b).eq(0, a).indices().unwrap();
        prop_assert_eq!(left, right);
    }
}
