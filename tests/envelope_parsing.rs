use wbq_rs::models::{Meta, Observation};
use wbq_rs::normalize;

#[test]
fn parse_sample_payload() {
    let sample = r#"
    [
      {"page":1,"pages":1,"per_page":"2","total":2},
      [
        {
          "indicator":{"id":"SP.POP.TOTL","value":"Population, total"},
          "country":{"id":"DE","value":"Germany"},
          "countryiso3code":"DEU",
          "date":"2019",
          "value":83000000,
          "unit":"",
          "obs_status":null,
          "decimal":0
        },
        {
          "indicator":{"id":"SP.POP.TOTL","value":"Population, total"},
          "country":{"id":"DE","value":"Germany"},
          "countryiso3code":"DEU",
          "date":"2020",
          "value":null,
          "unit":"",
          "obs_status":null,
          "decimal":0
        }
      ]
    ]
    "#;

    let v: serde_json::Value = serde_json::from_str(sample).unwrap();
    let arr = v.as_array().unwrap();
    let meta: Meta = serde_json::from_value(arr[0].clone()).unwrap();
    assert_eq!(meta.page, 1);
    assert_eq!(meta.pages, 1);
    assert_eq!(meta.per_page, 2);
    assert_eq!(meta.total, 2);

    let rows: Vec<Observation> = arr[1]
        .as_array()
        .unwrap()
        .iter()
        .map(normalize::observation)
        .collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].country_iso3, "DEU");
    assert_eq!(rows[0].country_name, "Germany");
    assert_eq!(rows[0].indicator_id, "SP.POP.TOTL");
    assert_eq!(rows[0].date, "2019");
    assert_eq!(rows[0].value, Some(83_000_000.0));
    // Missing data point survives as an explicit null row.
    assert_eq!(rows[1].date, "2020");
    assert_eq!(rows[1].value, None);
}

#[test]
fn meta_per_page_accepts_string_or_number() {
    let m: Meta =
        serde_json::from_str(r#"{"page":1,"pages":2,"per_page":"1000","total":2000}"#).unwrap();
    assert_eq!(m.per_page, 1000);
    let m: Meta =
        serde_json::from_str(r#"{"page":1,"pages":2,"per_page":500,"total":2000}"#).unwrap();
    assert_eq!(m.per_page, 500);
}

#[test]
fn meta_tolerates_missing_pages_and_total() {
    // Small result sets may omit envelope fields entirely.
    let m: Meta = serde_json::from_str(r#"{"page":1,"per_page":50}"#).unwrap();
    assert_eq!(m.pages, 1);
    assert_eq!(m.total, 0);
}
