use std::path::{Path, PathBuf};

use sunsys::docindex::{
    Fragment, IndexError, IssueKind, SearchRecord, Severity, SymbolTable, TargetKind,
};

fn fixtures() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/search")
}

fn load() -> SymbolTable {
    SymbolTable::load_dir(&fixtures()).unwrap()
}

#[test]
fn test_load_fixture_directory() {
    let table = load();

    let names: Vec<&str> = table.fragments().iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["all_e.js", "all_f.js", "functions_9.js"]);

    let sizes: Vec<usize> = table.fragments().iter().map(|f| f.records.len()).collect();
    assert_eq!(sizes, vec![31, 20, 8]);
    assert_eq!(table.len(), 59);
}

#[test]
fn test_lookup_function_with_overloads() {
    let table = load();

    let records = table.lookup("setTs");
    assert_eq!(records.len(), 1);
    let pages: Vec<&str> = records[0].links.iter().map(|l| l.target.page.as_str()).collect();
    assert_eq!(
        pages,
        vec![
            "classsun_1_1TF__FIRST__ORDER__FILTER.html",
            "classsun_1_1TF__INTEGRATOR.html",
            "classsun_1_1TF__SISO.html",
        ]
    );
    assert!(records[0].links.iter().all(|l| l.target.kind == TargetKind::Member));
}

#[test]
fn test_lookup_by_display_name_and_raw_key() {
    let table = load();

    let header = table.lookup("TF_SISO.h");
    assert_eq!(header.len(), 1);
    assert_eq!(header[0].links[0].target.page, "TF__SISO_8h.html");
    assert_eq!(header[0].links[0].target.kind, TargetKind::File);

    assert_eq!(table.lookup("tf_5fsiso_2eh"), header);
    assert_eq!(table.lookup("sun")[0].links[0].target.kind, TargetKind::Namespace);
    assert!(table.lookup("TF_SIS").is_empty());
}

#[test]
fn test_entities_are_decoded() {
    let table = load();

    let colors = &table.lookup("SUN_COLORS")[0];
    assert_eq!(colors.links.len(), 2);
    assert_eq!(
        colors.links[0].owning_scope(&colors.label),
        "Continuous_System_Interface.h"
    );
    assert_eq!(
        colors.links[1].owning_scope(&colors.label),
        "Discrete_System_Interface.h"
    );

    let ctor = &table.lookup("Observer_SS_Incapsuler")[0];
    assert!(ctor.links[0].scope.contains("const SS_Interface &system"));
}

#[test]
fn test_scopes_and_members() {
    let table = load();

    let scopes = table.scopes();
    assert!(scopes.contains(&"sun"));
    assert!(scopes.contains(&"sun::RK4"));
    assert!(scopes.contains(&"sun::Kalman_Filter"));
    assert!(scopes.contains(&"Continuous_System_Interface.h"));
    assert!(!scopes.contains(&""));
    // Scopes are sorted and unique
    let mut sorted = scopes.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(scopes, sorted);

    let rk4: Vec<&str> = table.members_of("sun::RK4").iter().map(|m| m.label).collect();
    for label in ["Ts_", "Ts_2_", "Ts_6_", "output_fcn"] {
        assert!(rk4.contains(&label), "{label} missing from {rk4:?}");
    }
    assert!(!rk4.contains(&"setTs"));

    let siso: Vec<&str> = table.members_of("sun::TF_SISO").iter().map(|m| m.label).collect();
    assert!(siso.contains(&"Ts_"));
    assert!(siso.contains(&"setTs"));

    assert!(table.members_of("sun::Nothing").is_empty());
}

#[test]
fn test_validate_fixture_directory() {
    let report = load().validate();

    assert_eq!(report.fragments, 3);
    assert_eq!(report.records, 59);
    assert!(report.is_valid());
    assert_eq!(report.errors().count(), 0);

    let warnings: Vec<_> = report.warnings().collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].fragment, "all_e.js");
    assert_eq!(warnings[0].key, "setoutput");
    assert_eq!(warnings[0].severity, Severity::Warning);
    assert_eq!(
        warnings[0].kind,
        IssueKind::KeyOrder {
            previous: "sun_5fsystems_5flib".to_string()
        }
    );
}

#[test]
fn test_load_single_file() {
    let table = SymbolTable::load_file(&fixtures().join("functions_9.js")).unwrap();
    assert_eq!(table.len(), 8);
    assert_eq!(table.lookup("obs_apply")[0].links.len(), 3);
    assert!(table.validate().issues.is_empty());
}

#[test]
fn test_load_errors() {
    let temp_dir = tempfile::TempDir::new().unwrap();

    let err = SymbolTable::load_dir(temp_dir.path()).unwrap_err();
    assert!(matches!(err, IndexError::NoFragments(_)));
    assert!(err.suggestion().is_some());

    let missing = temp_dir.path().join("missing");
    assert!(matches!(
        SymbolTable::load_dir(&missing).unwrap_err(),
        IndexError::NotADirectory(_)
    ));

    std::fs::write(temp_dir.path().join("all_0.js"), "var searchData=[['a',['A',").unwrap();
    assert!(matches!(
        SymbolTable::load_dir(temp_dir.path()).unwrap_err(),
        IndexError::Syntax { .. }
    ));

    assert!(matches!(
        SymbolTable::load_file(&missing).unwrap_err(),
        IndexError::Io { .. }
    ));
}

#[test]
fn test_load_doxygen_search_directory() {
    // html/search also holds the widget script and the section table
    let temp_dir = tempfile::TempDir::new().unwrap();
    for name in ["all_e.js", "all_f.js", "functions_9.js"] {
        std::fs::copy(fixtures().join(name), temp_dir.path().join(name)).unwrap();
    }
    std::fs::write(
        temp_dir.path().join("searchdata.js"),
        "var indexSectionsWithContent =\n{\n  0: \"abcdefghiklmnoprstuvw\",\n  1: \"cdkloprst\"\n};\n\nvar indexSectionNames =\n{\n  0: \"all\",\n  1: \"classes\"\n};\n",
    )
    .unwrap();
    std::fs::write(
        temp_dir.path().join("search.js"),
        "function convertToId(search)\n{\n  var result = '';\n  return result;\n}\n",
    )
    .unwrap();

    let table = SymbolTable::load_dir(temp_dir.path()).unwrap();
    let names: Vec<&str> = table.fragments().iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["all_e.js", "all_f.js", "functions_9.js"]);
    assert_eq!(table.len(), 59);
    assert_eq!(table.lookup("setTs")[0].links.len(), 3);

    // A single file without searchData is still an error
    assert!(matches!(
        SymbolTable::load_file(&temp_dir.path().join("searchdata.js")).unwrap_err(),
        IndexError::MissingSearchData { .. }
    ));
}

#[test]
fn test_directory_without_fragments() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("search.js"), "function init() {}\n").unwrap();
    assert!(matches!(
        SymbolTable::load_dir(temp_dir.path()).unwrap_err(),
        IndexError::NoFragments(_)
    ));
}

#[test]
fn test_validate_assembled_table() {
    let mut records = load().fragments()[2].records.clone();
    records.push(SearchRecord {
        key: "zz".to_string(),
        label: "zz".to_string(),
        links: Vec::new(),
    });
    let table = SymbolTable::from_fragments(vec![Fragment {
        name: "assembled.js".to_string(),
        records,
    }]);

    let report = table.validate();
    let errors: Vec<_> = report.errors().collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].fragment, "assembled.js");
    assert_eq!(errors[0].key, "zz");
    assert_eq!(errors[0].kind, IssueKind::NoLinks);
    assert!(!report.is_valid());
}
