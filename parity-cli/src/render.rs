use std::fmt::Write as _;

use colored::*;
use parity_engine::{
    CostEstimate, Region, ServiceParityResourceResult, ServiceParityResult, ServiceParitySeverity,
};
use parity_rules::Rule;

pub fn rules(rules: &[Rule]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} {}", "✔ Rules loaded:".green().bold(), rules.len());
    for rule in rules {
        let _ = writeln!(
            out,
            "  {}/{} [{}] {} - {}",
            rule.rule_set_id,
            rule.name.bold(),
            rule.severity,
            rule.category,
            rule.brief()
        );
    }
    out
}

fn severity_label(severity: ServiceParitySeverity) -> ColoredString {
    let label = format!("{:?}", severity);
    match severity {
        ServiceParitySeverity::Critical | ServiceParitySeverity::Error => label.red().bold(),
        ServiceParitySeverity::Warning => label.yellow(),
        ServiceParitySeverity::Information | ServiceParitySeverity::Unknown => label.normal(),
    }
}

pub fn parity(result: &ServiceParityResult) -> String {
    let mut out = String::new();
    let verdict = if result.pass() {
        "✔ PASS".green().bold()
    } else {
        "✘ FAIL".red().bold()
    };
    let _ = writeln!(
        out,
        "{} parity assessment for {} ({})",
        verdict, result.target_region_name, result.target_region
    );
    let _ = writeln!(out, "  Assessment: {}", result.id);

    for (resource_id, outcome) in &result.resources {
        match outcome {
            ServiceParityResourceResult::Failed { error } => {
                let _ = writeln!(out, "  {} {}", "!".red().bold(), resource_id);
                let _ = writeln!(out, "      error: {}", error);
            }
            ServiceParityResourceResult::Details { details } => {
                let mark = if outcome.pass() { "✔".green() } else { "✘".red() };
                let _ = writeln!(out, "  {} {}", mark, resource_id);
                for detail in details.iter().filter(|detail| !detail.pass) {
                    let _ = writeln!(
                        out,
                        "      [{}] {}: {}",
                        severity_label(detail.severity),
                        detail.brief,
                        detail.message.as_deref().unwrap_or("")
                    );
                    if !detail.path.is_empty() {
                        let _ = writeln!(out, "        at {}", detail.path);
                    }
                }
            }
        }
    }

    let summary = &result.summary;
    let _ = writeln!(
        out,
        "  Resources: {} passed, {} failed, {} errored",
        summary.passed_resources, summary.failed_resources, summary.errored_resources
    );
    out
}

pub fn cost(estimate: &CostEstimate) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", "Cost estimate".bold());
    for line in &estimate.lines {
        let target = line
            .target_cost
            .map(|cost| cost.to_string())
            .unwrap_or_else(|| "unmapped".yellow().to_string());
        let _ = writeln!(
            out,
            "  {} {} x{}: {} -> {}",
            line.resource_id, line.meter_name, line.quantity, line.source_cost, target
        );
    }
    let _ = writeln!(
        out,
        "  Total: {} -> {}",
        estimate.total_source_cost, estimate.total_target_cost
    );
    if !estimate.unmatched_usage.is_empty() {
        let _ = writeln!(
            out,
            "  {} usage records with unknown meters",
            estimate.unmatched_usage.len()
        );
    }
    for meter_id in &estimate.unmapped_meters {
        let _ = writeln!(out, "  {} no target meter for {}", "!".yellow(), meter_id);
    }
    out
}

pub fn regions<'a>(regions: impl IntoIterator<Item = &'a Region>) -> String {
    let mut out = String::new();
    for region in regions {
        let _ = writeln!(
            out,
            "  {:<20} {:<24} {:?}",
            region.id, region.display_name, region.environment
        );
    }
    out
}
