//! In-memory symbol table built from search fragments.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::docindex::error::{IndexError, IndexResult};
use crate::docindex::parser::FragmentParser;
use crate::docindex::types::{LinkEntry, SearchRecord, decode_key};
use crate::docindex::validate::{ValidationReport, validate};

/// One loaded source file, records in file order.
#[derive(Debug, Clone, Serialize)]
pub struct Fragment {
    pub name: String,
    pub records: Vec<SearchRecord>,
}

/// A link together with the label of the record it came from.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Member<'a> {
    pub label: &'a str,
    pub link: &'a LinkEntry,
}

/// Normalized key to records. Built once by the `load_*` functions.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    entries: BTreeMap<String, Vec<SearchRecord>>,
    fragments: Vec<Fragment>,
}

impl SymbolTable {
    pub fn load_file(path: &Path) -> IndexResult<Self> {
        Self::load_files(&[path.to_path_buf()])
    }

    /// Load every `*.js` file in `dir`, sorted by file name. Files that do
    /// not declare `searchData` are skipped.
    pub fn load_dir(dir: &Path) -> IndexResult<Self> {
        if !dir.is_dir() {
            return Err(IndexError::NotADirectory(dir.to_path_buf()));
        }
        let read_err = |source: std::io::Error| IndexError::Io {
            path: dir.to_path_buf(),
            source,
        };
        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(read_err)? {
            let path = entry.map_err(read_err)?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "js") {
                files.push(path);
            }
        }
        files.sort();
        let table = Self::load_paths(&files, true)?;
        if table.fragments.is_empty() {
            return Err(IndexError::NoFragments(dir.to_path_buf()));
        }
        Ok(table)
    }

    pub fn load_files(paths: &[PathBuf]) -> IndexResult<Self> {
        Self::load_paths(paths, false)
    }

    /// With `skip_foreign`, files without a `searchData` declaration
    /// (`search.js`, `searchdata.js` next to the fragments) are skipped.
    fn load_paths(paths: &[PathBuf], skip_foreign: bool) -> IndexResult<Self> {
        let mut parser = FragmentParser::new()?;
        let mut table = Self::default();
        for path in paths {
            let source = std::fs::read_to_string(path).map_err(|source| IndexError::Io {
                path: path.clone(),
                source,
            })?;
            let name = path
                .file_name()
                .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
            let records = match parser.parse(&source, &name) {
                Ok(records) => records,
                Err(IndexError::MissingSearchData { fragment }) if skip_foreign => {
                    warn!("Skipping {fragment}: no `searchData` declaration");
                    continue;
                }
                Err(e) => return Err(e),
            };
            table.add_fragment(name, records);
        }
        info!(
            "Loaded {} search keys from {} fragment(s)",
            table.len(),
            table.fragments.len()
        );
        Ok(table)
    }

    /// Build a table from fragments parsed elsewhere.
    pub fn from_fragments(fragments: Vec<Fragment>) -> Self {
        let mut table = Self::default();
        for fragment in fragments {
            table.add_fragment(fragment.name, fragment.records);
        }
        table
    }

    fn add_fragment(&mut self, name: String, records: Vec<SearchRecord>) {
        for record in &records {
            let existing = self.entries.entry(record.normalized_key()).or_default();
            let new_links: Vec<LinkEntry> = record
                .links
                .iter()
                .filter(|link| {
                    !existing
                        .iter()
                        .flat_map(|r| &r.links)
                        .any(|known| known.target.same_location(&link.target))
                })
                .cloned()
                .collect();
            if new_links.is_empty() {
                debug!("[docindex] {name}: '{}' adds no new links", record.key);
                continue;
            }
            match existing.iter_mut().find(|r| r.label == record.label) {
                Some(same_label) => same_label.links.extend(new_links),
                None => existing.push(SearchRecord {
                    key: record.key.clone(),
                    label: record.label.clone(),
                    links: new_links,
                }),
            }
        }
        self.fragments.push(Fragment { name, records });
    }

    /// Exact, case-insensitive lookup. `name` may be a display name
    /// (`SS_FCN`) or a raw search key (`ss_5ffcn`).
    pub fn lookup(&self, name: &str) -> &[SearchRecord] {
        self.entries
            .get(&name.to_lowercase())
            .or_else(|| self.entries.get(&decode_key(name)))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Sorted distinct owning scopes, see [`LinkEntry::owning_scope`].
    pub fn scopes(&self) -> Vec<&str> {
        let scopes: BTreeSet<&str> = self
            .members()
            .map(|m| m.link.owning_scope(m.label))
            .filter(|scope| !scope.is_empty())
            .collect();
        scopes.into_iter().collect()
    }

    /// Links owned by `scope` or by a scope nested in it.
    pub fn members_of(&self, scope: &str) -> Vec<Member<'_>> {
        let nested = format!("{scope}::");
        self.members()
            .filter(|m| {
                let owner = m.link.owning_scope(m.label);
                owner == scope || owner.starts_with(&nested)
            })
            .collect()
    }

    fn members(&self) -> impl Iterator<Item = Member<'_>> {
        self.entries.values().flatten().flat_map(|record| {
            record.links.iter().map(|link| Member {
                label: &record.label,
                link,
            })
        })
    }

    /// Number of distinct normalized keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    /// Validate every loaded fragment.
    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::default();
        for fragment in &self.fragments {
            report.merge(validate(&fragment.name, &fragment.records));
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docindex::parse_fragment;

    fn table(source: &str) -> SymbolTable {
        SymbolTable::from_fragments(vec![Fragment {
            name: "all_0.js".to_string(),
            records: parse_fragment(source).unwrap(),
        }])
    }

    const SOURCE: &str = "var searchData=[
  ['setts',['setTs',['../classsun_1_1TF__INTEGRATOR.html#ac7',1,'sun::TF_INTEGRATOR::setTs()'],['../classsun_1_1TF__SISO.html#a41',1,'sun::TF_SISO::setTs()']]],
  ['ss_5ffcn',['SS_FCN',['../namespacesun.html#aa5',1,'sun']]],
  ['tf_5fsiso',['TF_SISO',['../classsun_1_1TF__SISO.html',1,'sun::TF_SISO']]]
];";

    #[test]
    fn test_lookup_is_case_insensitive() {
        let table = table(SOURCE);
        assert_eq!(table.len(), 3);
        for name in ["setTs", "SETTS", "setts"] {
            assert_eq!(table.lookup(name).len(), 1, "{name}");
        }
        assert_eq!(table.lookup("SS_FCN")[0].label, "SS_FCN");
        assert_eq!(table.lookup("ss_5ffcn")[0].label, "SS_FCN");
        assert!(table.lookup("missing").is_empty());
    }

    #[test]
    fn test_scopes_and_members() {
        let table = table(SOURCE);
        assert_eq!(table.scopes(), vec!["sun", "sun::TF_INTEGRATOR", "sun::TF_SISO"]);

        let members = table.members_of("sun::TF_SISO");
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].label, "setTs");

        // Everything lives under `sun`
        assert_eq!(table.members_of("sun").len(), 4);
    }

    #[test]
    fn test_duplicate_links_are_merged() {
        let records = parse_fragment(SOURCE).unwrap();
        let extra = parse_fragment(
            "var searchData=[['setts',['setTs',['../classsun_1_1TF__SISO.html#a41',1,'sun::TF_SISO::setTs()'],['../classsun_1_1RK4.html#a9',1,'sun::RK4::setTs()']]]];",
        )
        .unwrap();
        let table = SymbolTable::from_fragments(vec![
            Fragment {
                name: "all_0.js".to_string(),
                records: records.clone(),
            },
            Fragment {
                name: "all_1.js".to_string(),
                records,
            },
            Fragment {
                name: "functions_0.js".to_string(),
                records: extra,
            },
        ]);
        let setts = table.lookup("setts");
        assert_eq!(setts.len(), 1);
        assert_eq!(setts[0].links.len(), 3);
        assert_eq!(table.fragments().len(), 3);
    }

    #[test]
    fn test_keys_are_sorted() {
        let table = table(SOURCE);
        let keys: Vec<&str> = table.keys().collect();
        assert_eq!(keys, vec!["setts", "ss_fcn", "tf_siso"]);
    }
}
