use aram_board::dataset::Table;
use aram_board::error::DataError;
use aram_board::selector::{filter_by_name_substring, resolve_row};

const NAMES: [&str; 6] = ["Lux", "Ahri", "Miss Fortune", "Amumu", "Ahri", "Kai'Sa"];

#[test]
fn blank_query_keeps_every_name_sorted() {
    let expected = vec!["Ahri", "Amumu", "Kai'Sa", "Lux", "Miss Fortune"];
    assert_eq!(filter_by_name_substring(NAMES, ""), expected);
    assert_eq!(filter_by_name_substring(NAMES, "   "), expected);
}

#[test]
fn matching_ignores_case() {
    assert_eq!(filter_by_name_substring(NAMES, "AH"), vec!["Ahri"]);
    assert_eq!(filter_by_name_substring(NAMES, "a"), vec!["Ahri", "Amumu", "Kai'Sa"]);
    assert_eq!(filter_by_name_substring(NAMES, "'s"), vec!["Kai'Sa"]);
}

#[test]
fn query_whitespace_is_significant() {
    assert_eq!(filter_by_name_substring(NAMES, "s f"), vec!["Miss Fortune"]);
    assert_eq!(filter_by_name_substring(NAMES, " fortune"), vec!["Miss Fortune"]);
    assert!(filter_by_name_substring(NAMES, "fortune ").is_empty());
}

#[test]
fn results_are_sorted_members_of_the_input() {
    for query in ["", "a", "u", "x", "LUX", "i"] {
        let out = filter_by_name_substring(NAMES, query);
        let mut sorted = out.clone();
        sorted.sort();
        assert_eq!(out, sorted, "query {query:?}");
        for name in &out {
            assert!(NAMES.contains(&name.as_str()));
            assert!(name.to_lowercase().contains(&query.to_lowercase()));
        }
    }
}

#[test]
fn resolve_returns_matching_row() {
    let raw = "champion,games\nLux,10\nAhri,20\nAhri,30\n";
    let table = Table::from_reader(raw.as_bytes(), &["champion"]).unwrap();

    let lux = resolve_row(&table, "Lux").unwrap();
    assert_eq!(lux.name(), Some("Lux"));

    let ahri = resolve_row(&table, "Ahri").unwrap();
    assert_eq!(ahri.name(), Some("Ahri"));
    assert_eq!(ahri.index(), 1);
}

#[test]
fn resolve_unknown_key_is_not_found() {
    let raw = "champion,games\nLux,10\n";
    let table = Table::from_reader(raw.as_bytes(), &["champion"]).unwrap();

    let err = resolve_row(&table, "lux").unwrap_err();
    assert!(matches!(err, DataError::NotFound(ref key) if key == "lux"));
}
