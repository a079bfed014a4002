use serde::Serialize;
use zarigani_core::config::{AppConfig, LoadOptions};
use zarigani_core::{Catalog, TagDictionary};

use crate::commands::{catalog::find_problems, read_catalog, CommandResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

impl DoctorCheck {
    fn pass(name: &'static str, details: impl Into<String>) -> Self {
        Self { name, status: CheckStatus::Pass, details: details.into() }
    }

    fn fail(name: &'static str, details: impl Into<String>) -> Self {
        Self { name, status: CheckStatus::Fail, details: details.into() }
    }

    fn skipped(name: &'static str, reason: &str) -> Self {
        Self { name, status: CheckStatus::Skipped, details: format!("skipped because {reason}") }
    }
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(options: &LoadOptions, json_output: bool) -> CommandResult {
    let report = build_report(options);
    let exit_code = if report.overall_status == CheckStatus::Pass { 0 } else { 1 };

    let output = if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        })
    } else {
        render_human(&report)
    };

    CommandResult { exit_code, output }
}

fn build_report(options: &LoadOptions) -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(options.clone()) {
        Ok(config) => {
            checks.push(DoctorCheck::pass(
                "config_validation",
                "configuration loaded and validated",
            ));
            checks.push(check_image_directory(&config));
            checks.push(check_tag_dictionary(&config));
            match read_catalog(&config) {
                Ok(catalog) => {
                    checks.push(DoctorCheck::pass(
                        "catalog_readability",
                        format!(
                            "{} records in `{}`",
                            catalog.len(),
                            config.catalog.db_file_path.display()
                        ),
                    ));
                    checks.push(check_catalog_consistency(&config, &catalog));
                }
                Err((_, message, _)) => {
                    checks.push(DoctorCheck::fail("catalog_readability", message));
                    checks.push(DoctorCheck::skipped(
                        "catalog_consistency",
                        "the catalog could not be read",
                    ));
                }
            }
        }
        Err(error) => {
            checks.push(DoctorCheck::fail("config_validation", error.to_string()));
            for name in
                ["image_directory", "tag_dictionary", "catalog_readability", "catalog_consistency"]
            {
                checks.push(DoctorCheck::skipped(name, "configuration did not load"));
            }
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_image_directory(config: &AppConfig) -> DoctorCheck {
    let dir = &config.catalog.images_dir;
    if dir.is_dir() {
        DoctorCheck::pass("image_directory", format!("`{}` is present", dir.display()))
    } else {
        DoctorCheck::fail("image_directory", format!("`{}` is not a directory", dir.display()))
    }
}

fn check_tag_dictionary(config: &AppConfig) -> DoctorCheck {
    match TagDictionary::load_or_default(config.catalog.dictionary_path.as_deref()) {
        Ok(dictionary) => {
            let source = match &config.catalog.dictionary_path {
                Some(path) => format!("`{}`", path.display()),
                None => "built-in defaults".to_string(),
            };
            DoctorCheck::pass(
                "tag_dictionary",
                format!("{} keywords loaded from {source}", dictionary.len()),
            )
        }
        Err(error) => DoctorCheck::fail("tag_dictionary", error.to_string()),
    }
}

fn check_catalog_consistency(config: &AppConfig, catalog: &Catalog) -> DoctorCheck {
    let problems = find_problems(catalog, &config.catalog.images_dir);
    if problems.is_empty() {
        DoctorCheck::pass("catalog_consistency", "every record has valid tags and an image file")
    } else {
        DoctorCheck::fail(
            "catalog_consistency",
            format!("{} problem(s): {}", problems.len(), problems.join("; ")),
        )
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
