//! # Testing & Assertions
//!
//! Runs a scenario case by case: one request per generated case, in
//! generation order. A case expected to pass must answer 2xx; any other case
//! must answer 4xx or 5xx. Transport failures are reported as errored, not
//! as assertion failures, and the run continues.

use std::fmt::{self, Display};
use std::ops::Range;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::collections::{Collection, Scenario};
use crate::environment::Variables;
use crate::error::Result;
use crate::generator::{self, ConcreteCase};
use crate::http::client::Transport;
use crate::http::method::HttpMethod;
use crate::http::request::RequestInput;

const MAX_EXCERPT_CHARS: usize = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusExpectation {
    Success,
    Failure,
}

impl StatusExpectation {
    pub fn from_expected(expected: bool) -> Self {
        if expected {
            StatusExpectation::Success
        } else {
            StatusExpectation::Failure
        }
    }

    pub fn range(self) -> Range<u16> {
        match self {
            StatusExpectation::Success => 200..300,
            StatusExpectation::Failure => 400..600,
        }
    }

    pub fn matches(self, status: u16) -> bool {
        self.range().contains(&status)
    }
}

impl Display for StatusExpectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StatusExpectation::Success => "2xx",
            StatusExpectation::Failure => "4xx/5xx",
        };
        write!(f, "{label}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Passed,
    Failed,
    Errored,
}

/// Result of sending one generated case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseOutcome {
    pub index: usize,
    pub mask: String,
    pub values: Vec<Value>,
    pub expected: bool,
    pub method: HttpMethod,
    pub url: String,
    pub status: Option<u16>,
    pub verdict: Verdict,
    pub message: String,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub errored: usize,
}

impl Tally {
    fn count(&mut self, verdict: Verdict) {
        self.total += 1;
        match verdict {
            Verdict::Passed => self.passed += 1,
            Verdict::Failed => self.failed += 1,
            Verdict::Errored => self.errored += 1,
        }
    }

    fn absorb(&mut self, other: &Tally) {
        self.total += other.total;
        self.passed += other.passed;
        self.failed += other.failed;
        self.errored += other.errored;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub scenario: String,
    #[serde(flatten)]
    pub tally: Tally,
    pub duration_ms: u64,
    pub results: Vec<CaseOutcome>,
}

/// Summary report for a batch run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunReport {
    #[serde(flatten)]
    pub tally: Tally,
    pub duration_ms: u64,
    pub scenarios: Vec<ScenarioReport>,
}

impl RunReport {
    pub fn push(&mut self, report: ScenarioReport) {
        self.tally.absorb(&report.tally);
        self.scenarios.push(report);
    }

    pub fn success(&self) -> bool {
        self.tally.failed == 0 && self.tally.errored == 0
    }
}

/// Run every case of one scenario against `base_url`.
///
/// All requests are bound before the first one is sent, so a missing
/// variable aborts the scenario without touching the backend.
pub async fn run_scenario<T: Transport>(
    transport: &T,
    base_url: &str,
    scenario: &Scenario,
    variables: &Variables,
) -> Result<ScenarioReport> {
    scenario.validate()?;
    let cases = generator::generate_declared(scenario.parameters.len(), &scenario.specs()?)?;
    let requests = cases
        .iter()
        .map(|case| scenario.bind(base_url, &case.values, variables))
        .collect::<Result<Vec<_>>>()?;

    info!(scenario = %scenario.name, cases = cases.len(), "running scenario");

    let started = Instant::now();
    let mut report = ScenarioReport {
        scenario: scenario.name.clone(),
        tally: Tally::default(),
        duration_ms: 0,
        results: Vec::with_capacity(cases.len()),
    };

    for (index, (case, request)) in cases.iter().zip(requests).enumerate() {
        let outcome = run_case(transport, index, case, request).await;
        match outcome.verdict {
            Verdict::Passed => {
                debug!(scenario = %scenario.name, index, mask = %outcome.mask, "case passed");
            }
            Verdict::Failed | Verdict::Errored => {
                warn!(
                    scenario = %scenario.name,
                    index,
                    mask = %outcome.mask,
                    url = %outcome.url,
                    "{}",
                    outcome.message
                );
            }
        }
        report.tally.count(outcome.verdict);
        report.results.push(outcome);
    }

    report.duration_ms = elapsed_ms(started);
    info!(
        scenario = %scenario.name,
        passed = report.tally.passed,
        failed = report.tally.failed,
        errored = report.tally.errored,
        "scenario finished"
    );

    Ok(report)
}

/// Run the named scenarios, or the whole collection when `names` is empty.
pub async fn run_collection<T: Transport>(
    transport: &T,
    base_url: &str,
    collection: &Collection,
    names: &[String],
    variables: &Variables,
) -> Result<RunReport> {
    let scenarios: Vec<&Scenario> = if names.is_empty() {
        collection.scenarios.iter().collect()
    } else {
        names
            .iter()
            .map(|name| collection.find(name))
            .collect::<Result<_>>()?
    };

    let started = Instant::now();
    let mut report = RunReport::default();
    for scenario in scenarios {
        report.push(run_scenario(transport, base_url, scenario, variables).await?);
    }
    report.duration_ms = elapsed_ms(started);

    Ok(report)
}

async fn run_case<T: Transport>(
    transport: &T,
    index: usize,
    case: &ConcreteCase<Value>,
    request: RequestInput,
) -> CaseOutcome {
    let expectation = StatusExpectation::from_expected(case.expected);
    let started = Instant::now();
    let result = transport.send(&request).await;
    let duration_ms = elapsed_ms(started);

    let (status, verdict, message) = match result {
        Ok(response) if expectation.matches(response.status) => {
            debug!(
                status = response.status,
                duration_ms = %response.duration_ms,
                size_bytes = response.size_bytes,
                "response received"
            );
            (
                Some(response.status),
                Verdict::Passed,
                format!("{} {}", response.status, response.status_text),
            )
        }
        Ok(response) => (
            Some(response.status),
            Verdict::Failed,
            format!(
                "expected {expectation}, got {} {}{}",
                response.status,
                response.status_text,
                body_excerpt(&response.body)
            ),
        ),
        Err(err) => (None, Verdict::Errored, err.to_string()),
    };

    CaseOutcome {
        index,
        mask: case.mask.to_string(),
        values: case.values.clone(),
        expected: case.expected,
        method: request.method,
        url: request.url,
        status,
        verdict,
        message,
        duration_ms,
    }
}

/// First line of a response body, shortened, for failure messages.
fn body_excerpt(body: &str) -> String {
    let line = body.lines().next().unwrap_or_default().trim();
    if line.is_empty() {
        return String::new();
    }
    let excerpt: String = line.chars().take(MAX_EXCERPT_CHARS).collect();
    if excerpt.len() < line.len() {
        format!(": {excerpt}...")
    } else {
        format!(": {excerpt}")
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
