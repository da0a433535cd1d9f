//! Docs commands - lookup, validate, scopes, members.

use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::cli::DocsAction;
use crate::config::Settings;
use crate::docindex::{IndexError, LinkEntry, SymbolTable};
use crate::io::{EntityType, Envelope, ExitCode, OutputFormat, ResultCode, emit};

pub fn run(action: DocsAction, settings: &Settings) -> ExitCode {
    match action {
        DocsAction::Lookup { name, dir, json } => {
            with_table(dir, settings, json, |table, format| lookup(table, &name, format))
        }
        DocsAction::Validate { dir, json } => {
            with_table(dir, settings, json, |table, format| validate(table, format))
        }
        DocsAction::Scopes { dir, json } => {
            with_table(dir, settings, json, |table, format| scopes(table, format))
        }
        DocsAction::Members { scope, dir, json } => {
            with_table(dir, settings, json, |table, format| members(table, &scope, format))
        }
    }
}

/// Load the table from `dir` (or the configured search directory) and run `f`.
fn with_table<F>(dir: Option<PathBuf>, settings: &Settings, json: bool, f: F) -> ExitCode
where
    F: FnOnce(&SymbolTable, OutputFormat) -> ExitCode,
{
    let format = OutputFormat::from_json_flag(json);
    let dir = dir.unwrap_or_else(|| settings.search_dir());
    match load(&dir) {
        Ok(table) => f(&table, format),
        Err(e) => index_error(&e, format),
    }
}

fn load(path: &Path) -> Result<SymbolTable, IndexError> {
    if path.is_file() {
        SymbolTable::load_file(path)
    } else {
        SymbolTable::load_dir(path)
    }
}

fn index_error(e: &IndexError, format: OutputFormat) -> ExitCode {
    if format.is_json() {
        let mut envelope: Envelope<()> = Envelope::error(ResultCode::IndexError, e.to_string());
        if let Some(hint) = e.suggestion() {
            envelope = envelope.with_hint(hint);
        }
        emit(&envelope)
    } else {
        eprintln!("Error: {e}");
        if let Some(hint) = e.suggestion() {
            eprintln!("  {hint}");
        }
        ResultCode::IndexError.exit_code()
    }
}

fn lookup(table: &SymbolTable, name: &str, format: OutputFormat) -> ExitCode {
    let start = Instant::now();
    let records = table.lookup(name);
    let hint = "Lookups are exact. Try `sunsys docs scopes` to browse";

    if records.is_empty() {
        let message = format!("No documentation entry for '{name}'");
        if format.is_json() {
            let envelope: Envelope<()> = Envelope::not_found(message)
                .with_hint(hint)
                .with_query(name);
            return emit(&envelope);
        }
        eprintln!("{message}");
        eprintln!("  {hint}");
        return ExitCode::NotFound;
    }

    if format.is_json() {
        let envelope = Envelope::success(records)
            .with_entity_type(EntityType::SearchRecord)
            .with_count(records.len())
            .with_query(name)
            .with_message(format!("Found {} record(s) for '{name}'", records.len()))
            .with_duration_ms(start.elapsed().as_millis() as u64);
        return emit(&envelope);
    }

    for record in records {
        println!("{} ({} link(s))", record.label, record.links.len());
        for link in &record.links {
            print_link(link);
        }
    }
    ExitCode::Success
}

fn print_link(link: &LinkEntry) {
    if link.scope.is_empty() {
        println!("  {:<10} {}", link.target.kind, link.target.url());
    } else {
        println!(
            "  {:<10} {}  [{}]",
            link.target.kind,
            link.target.url(),
            link.scope
        );
    }
}

fn validate(table: &SymbolTable, format: OutputFormat) -> ExitCode {
    let report = table.validate();
    let errors = report.errors().count();
    let warnings = report.warnings().count();
    let summary = format!(
        "{} fragment(s), {} record(s): {errors} error(s), {warnings} warning(s)",
        report.fragments, report.records
    );

    if format.is_json() {
        let envelope = if report.is_valid() {
            Envelope::success(&report).with_message(summary)
        } else {
            Envelope::invalid(&report, summary)
        };
        return emit(
            &envelope
                .with_entity_type(EntityType::ValidationReport)
                .with_count(report.issues.len()),
        );
    }

    for issue in &report.issues {
        println!("{issue}");
    }
    println!("{summary}");
    if report.is_valid() {
        ExitCode::Success
    } else {
        ExitCode::ValidationFailed
    }
}

fn scopes(table: &SymbolTable, format: OutputFormat) -> ExitCode {
    let scopes = table.scopes();

    if format.is_json() {
        let count = scopes.len();
        let envelope = Envelope::success(scopes)
            .with_entity_type(EntityType::Scope)
            .with_count(count);
        return emit(&envelope);
    }

    for scope in &scopes {
        println!("{scope}");
    }
    ExitCode::Success
}

fn members(table: &SymbolTable, scope: &str, format: OutputFormat) -> ExitCode {
    let members = table.members_of(scope);

    if members.is_empty() {
        let message = format!("No members documented under '{scope}'");
        let hint = "Scopes are matched exactly, e.g. `sun::RK4`";
        if format.is_json() {
            let envelope: Envelope<()> = Envelope::not_found(message)
                .with_hint(hint)
                .with_query(scope);
            return emit(&envelope);
        }
        eprintln!("{message}");
        eprintln!("  {hint}");
        return ExitCode::NotFound;
    }

    if format.is_json() {
        let count = members.len();
        let envelope = Envelope::success(members)
            .with_entity_type(EntityType::Member)
            .with_count(count)
            .with_query(scope);
        return emit(&envelope);
    }

    for member in &members {
        println!("{:<28} {}", member.label, member.link.target.url());
    }
    ExitCode::Success
}
