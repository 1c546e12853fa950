use serde_json::Value;
use tracing::info;

use crate::collections::{self, Collection};
use crate::environment::{self, Variables};
use crate::equivalence;
use crate::error::Result;
use crate::generator::{self, ConcreteCase};
use crate::history;
use crate::http::client::HttpClient;
use crate::storage;
use crate::testing::{self, RunReport, Verdict};

use super::{Cli, CollectionArgs, Command, GenerateArgs, HistoryArgs, OutputFormat, RunArgs};

/// Run the parsed command. `Ok(false)` means the command completed but the
/// run had failing or errored cases.
pub async fn dispatch(cli: Cli) -> Result<bool> {
    match cli.command {
        Command::List(args) => list(&args),
        Command::Generate(args) => generate(&args),
        Command::Run(args) => run(args).await,
        Command::History(args) => show_history(&args),
        Command::Fields => fields(),
    }
}

fn load_collection(args: &CollectionArgs) -> Result<Collection> {
    match &args.collection {
        Some(path) => storage::load_collection(path),
        None => Ok(collections::builtin()),
    }
}

fn list(args: &CollectionArgs) -> Result<bool> {
    let collection = load_collection(args)?;

    for scenario in &collection.scenarios {
        let count = generator::case_count(&scenario.specs()?)?;
        println!(
            "{:<28} {:<7} {:<48} {count:>4} cases  {}",
            scenario.name,
            scenario.method.to_string(),
            scenario.path,
            scenario.description
        );
    }

    Ok(true)
}

fn generate(args: &GenerateArgs) -> Result<bool> {
    let collection = load_collection(&args.collection)?;
    let scenario = collection.find(&args.scenario)?;
    let cases = generator::generate(&scenario.specs()?)?;

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&cases)?),
        OutputFormat::Text => {
            let names: Vec<&str> = scenario.parameters.iter().map(|p| p.name.as_str()).collect();
            println!("{} ({}): {} cases", scenario.name, names.join(", "), cases.len());
            for case in &cases {
                println!("{}", format_case(case));
            }
        }
    }

    Ok(true)
}

fn fields() -> Result<bool> {
    for name in equivalence::field_names() {
        let spec = equivalence::lookup(name)?;
        println!("{name}");
        println!("  valid:   {}", join_values(&spec.valid));
        println!("  invalid: {}", join_values(&spec.invalid));
    }
    Ok(true)
}

fn join_values(values: &[Value]) -> String {
    values
        .iter()
        .map(Value::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_case(case: &ConcreteCase<Value>) -> String {
    let outcome = if case.expected { "pass" } else { "fail" };
    format!("{} -> {outcome}  ({})", case.mask, join_values(&case.values))
}

async fn run(args: RunArgs) -> Result<bool> {
    let collection = load_collection(&args.collection)?;

    let file_variables = match &args.vars {
        Some(path) => storage::load_variables(path)?,
        None => Variables::new(),
    };
    let overrides: Variables = args.overrides.iter().cloned().collect();
    let variables = environment::resolve(&collection.variables, &file_variables, &overrides);

    let client = HttpClient::new(args.timeout_ms, args.token.as_deref())?;
    let report = testing::run_collection(
        &client,
        &args.base_url,
        &collection,
        &args.scenarios,
        &variables,
    )
    .await?;

    if let Some(path) = &args.report {
        storage::save_report(path, &report)?;
    }
    if let Some(path) = &args.history {
        let conn = history::open_db(path)?;
        let id = history::record_run(&conn, &args.base_url, &report)?;
        info!(id, path = %path.display(), "recorded run");
    }

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print_report(&report),
    }

    info!(
        total = report.tally.total,
        passed = report.tally.passed,
        failed = report.tally.failed,
        errored = report.tally.errored,
        duration_ms = report.duration_ms,
        "run finished"
    );

    Ok(report.success())
}

fn print_report(report: &RunReport) {
    for scenario in &report.scenarios {
        println!(
            "{}: {}/{} passed, {} failed, {} errored ({} ms)",
            scenario.scenario,
            scenario.tally.passed,
            scenario.tally.total,
            scenario.tally.failed,
            scenario.tally.errored,
            scenario.duration_ms
        );
        for outcome in scenario
            .results
            .iter()
            .filter(|outcome| outcome.verdict != Verdict::Passed)
        {
            println!(
                "  #{} [{}] {} {}: {}",
                outcome.index, outcome.mask, outcome.method, outcome.url, outcome.message
            );
        }
    }

    println!(
        "total: {}/{} passed, {} failed, {} errored ({} ms)",
        report.tally.passed,
        report.tally.total,
        report.tally.failed,
        report.tally.errored,
        report.duration_ms
    );
}

fn show_history(args: &HistoryArgs) -> Result<bool> {
    let conn = history::open_db(&args.db)?;

    if let Some(id) = args.show {
        return match history::load_report(&conn, id)? {
            Some(report) => {
                print_report(&report);
                Ok(true)
            }
            None => {
                println!("no run with id {id}");
                Ok(false)
            }
        };
    }

    for record in history::recent_runs(&conn, args.limit)? {
        println!(
            "#{:<5} {:<12} {:<32} {}/{} passed, {} failed, {} errored ({} ms)",
            record.id,
            record.recorded_at,
            record.base_url,
            record.tally.passed,
            record.tally.total,
            record.tally.failed,
            record.tally.errored,
            record.duration_ms
        );
    }

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{ParameterSpec, generate};
    use serde_json::json;

    #[test]
    fn format_case_shows_mask_outcome_and_values() {
        let specs = [
            ParameterSpec::new(vec![json!("U1")], vec![json!("U1x")]),
            ParameterSpec::new(vec![json!("P1")], vec![Value::Null]),
        ];
        let cases = generate(&specs).unwrap();

        assert_eq!(format_case(&cases[0]), r#"00 -> pass  ("U1", "P1")"#);
        assert_eq!(format_case(&cases[1]), r#"10 -> fail  ("U1x", "P1")"#);
        assert_eq!(format_case(&cases[2]), r#"01 -> fail  ("U1", null)"#);
    }

    #[test]
    fn builtin_collection_is_default() {
        let collection = load_collection(&CollectionArgs { collection: None }).unwrap();
        assert_eq!(collection.name, "builtin");
    }

    #[test]
    fn history_show_reports_missing_run() {
        let dir = tempfile::tempdir().unwrap();
        let args = HistoryArgs {
            db: dir.path().join("history.db"),
            limit: 5,
            show: Some(42),
        };
        assert!(!show_history(&args).unwrap());
    }
}
