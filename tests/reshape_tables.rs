use wbq_rs::Observation;
use wbq_rs::reshape::{to_long, to_wide};

fn obs(country: &str, indicator: &str, date: &str, value: Option<f64>) -> Observation {
    Observation {
        country_iso3: country.into(),
        country_name: format!("{country} name"),
        indicator_id: indicator.into(),
        date: date.into(),
        value,
    }
}

/// Sorted multiset of (country, date, indicator, value) tuples.
fn multiset(rows: &[Observation]) -> Vec<(String, String, String, Option<u64>)> {
    let mut out: Vec<_> = rows
        .iter()
        .map(|r| {
            (
                r.country_iso3.clone(),
                r.date.clone(),
                r.indicator_id.clone(),
                r.value.map(f64::to_bits),
            )
        })
        .collect();
    out.sort();
    out
}

#[test]
fn four_record_grid_pivots_without_nulls() {
    let long = vec![
        obs("BRA", "SP.POP.0004.MA", "2000", Some(120.0)),
        obs("BRA", "SP.POP.0004.FE", "2000", Some(118.0)),
        obs("IND", "SP.POP.0004.MA", "2000", Some(900.0)),
        obs("IND", "SP.POP.0004.FE", "2000", Some(870.0)),
    ];
    let wide = to_wide(&long);
    assert_eq!(wide.indicators, vec!["SP.POP.0004.MA", "SP.POP.0004.FE"]);
    assert_eq!(wide.rows.len(), 2);
    assert_eq!(wide.rows[0].country_iso3, "BRA");
    assert_eq!(wide.rows[0].date, "2000");
    assert_eq!(wide.rows[0].values, vec![Some(120.0), Some(118.0)]);
    assert_eq!(wide.rows[1].country_iso3, "IND");
    assert_eq!(wide.rows[1].values, vec![Some(900.0), Some(870.0)]);
}

#[test]
fn missing_triple_leaves_a_null_cell() {
    let long = vec![
        obs("BRA", "SP.POP.0004.MA", "2000", Some(120.0)),
        obs("IND", "SP.POP.0004.MA", "2000", Some(900.0)),
        obs("IND", "SP.POP.0004.FE", "2000", Some(870.0)),
    ];
    let wide = to_wide(&long);
    assert_eq!(wide.rows[0].country_iso3, "BRA");
    assert_eq!(wide.rows[0].values, vec![Some(120.0), None]);
}

#[test]
fn duplicate_triple_resolves_last_write_wins() {
    let long = vec![
        obs("BRA", "SP.POP.TOTL", "2000", Some(1.0)),
        obs("BRA", "SP.POP.TOTL", "2000", Some(2.0)),
    ];
    let wide = to_wide(&long);
    assert_eq!(wide.rows.len(), 1);
    assert_eq!(wide.rows[0].values, vec![Some(2.0)]);

    // Also when the later duplicate is a null.
    let long = vec![
        obs("BRA", "SP.POP.TOTL", "2000", Some(1.0)),
        obs("BRA", "SP.POP.TOTL", "2000", None),
    ];
    assert_eq!(to_wide(&long).rows[0].values, vec![None]);
}

#[test]
fn row_and_column_order_follow_first_appearance() {
    let long = vec![
        obs("ZAF", "B.IND", "2001", Some(1.0)),
        obs("ARG", "A.IND", "2000", Some(2.0)),
        obs("ZAF", "A.IND", "2000", Some(3.0)),
    ];
    let wide = to_wide(&long);
    assert_eq!(wide.indicators, vec!["B.IND", "A.IND"]);
    let keys: Vec<_> = wide
        .rows
        .iter()
        .map(|r| (r.country_iso3.as_str(), r.date.as_str()))
        .collect();
    assert_eq!(keys, vec![("ZAF", "2001"), ("ARG", "2000"), ("ZAF", "2000")]);
}

#[test]
fn empty_input_gives_empty_table_without_columns() {
    let wide = to_wide(&[]);
    assert!(wide.is_empty());
    assert!(wide.to_long().is_empty());
}

#[test]
fn single_indicator_wide_keeps_long_cardinality() {
    let long = vec![
        obs("BRA", "SP.POP.TOTL", "2000", Some(1.0)),
        obs("BRA", "SP.POP.TOTL", "2001", Some(2.0)),
        obs("IND", "SP.POP.TOTL", "2000", None),
    ];
    let wide = to_wide(&long);
    assert_eq!(wide.rows.len(), long.len());
    assert_eq!(wide.indicators.len(), 1);
}

#[test]
fn wide_round_trips_to_the_same_observation_multiset() {
    // No duplicate triples; missing data points carried as explicit
    // nulls, so the multiset survives the pivot unchanged.
    let long = vec![
        obs("BRA", "MA", "2000", Some(120.0)),
        obs("BRA", "FE", "2000", Some(118.0)),
        obs("IND", "MA", "2000", Some(900.0)),
        obs("IND", "FE", "2000", Some(870.0)),
        obs("BRA", "MA", "2001", Some(121.0)),
        obs("BRA", "FE", "2001", None),
    ];
    let round = to_wide(&long).to_long();
    assert_eq!(multiset(&round), multiset(&long));
}

#[test]
fn round_trip_materializes_absent_triples_as_nulls() {
    // (BRA, FE, 2001) never appears in the input; the pivot creates
    // the hole and the unpivot emits it as an explicit null row.
    let long = vec![
        obs("BRA", "MA", "2000", Some(120.0)),
        obs("BRA", "FE", "2000", Some(118.0)),
        obs("BRA", "MA", "2001", Some(121.0)),
    ];
    let round = to_wide(&long).to_long();
    let mut expected = long.clone();
    expected.push(obs("BRA", "FE", "2001", None));
    assert_eq!(multiset(&round), multiset(&expected));
}

#[test]
fn to_long_is_a_passthrough() {
    let long = vec![obs("BRA", "SP.POP.TOTL", "2000", Some(1.0))];
    assert_eq!(to_long(long.clone()), long);
}
