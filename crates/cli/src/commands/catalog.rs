use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::Path;

use zarigani_core::catalog::{validate_file_name, validate_tags};
use zarigani_core::config::{AppConfig, LoadOptions};
use zarigani_core::ImageRecord;

use crate::commands::{read_catalog, CommandResult};

pub fn list(options: &LoadOptions, json_output: bool) -> CommandResult {
    let config = match AppConfig::load(options.clone()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "catalog list",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    let catalog = match read_catalog(&config) {
        Ok(catalog) => catalog,
        Err((error_class, message, exit_code)) => {
            return CommandResult::failure("catalog list", error_class, message, exit_code);
        }
    };

    let output = if json_output {
        match serde_json::to_string_pretty(&*catalog) {
            Ok(output) => output,
            Err(error) => {
                return CommandResult::failure("catalog list", "serialization", error.to_string(), 1);
            }
        }
    } else if catalog.is_empty() {
        "catalog is empty".to_string()
    } else {
        catalog
            .iter()
            .map(|record| format!("{}\t{}\t{}", record.id, record.file_name, record.tags.join(", ")))
            .collect::<Vec<_>>()
            .join("\n")
    };

    CommandResult { exit_code: 0, output }
}

pub fn verify(options: &LoadOptions) -> CommandResult {
    let config = match AppConfig::load(options.clone()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "catalog verify",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    let catalog = match read_catalog(&config) {
        Ok(catalog) => catalog,
        Err((error_class, message, exit_code)) => {
            return CommandResult::failure("catalog verify", error_class, message, exit_code);
        }
    };

    let problems = find_problems(&catalog, &config.catalog.images_dir);
    if !problems.is_empty() {
        return CommandResult::failure(
            "catalog verify",
            "catalog_inconsistent",
            format!("{} problem(s): {}", problems.len(), problems.join("; ")),
            5,
        );
    }

    let unreferenced = unreferenced_files(&catalog, &config.catalog.images_dir);
    let mut message = format!("{} records verified", catalog.len());
    if !unreferenced.is_empty() {
        message.push_str(&format!(
            "; {} unreferenced file(s) in image directory: {}",
            unreferenced.len(),
            unreferenced.into_iter().collect::<Vec<_>>().join(", ")
        ));
    }
    CommandResult::success("catalog verify", message)
}

pub(crate) fn find_problems(catalog: &[ImageRecord], images_dir: &Path) -> Vec<String> {
    let mut problems = Vec::new();
    let mut ids = HashSet::new();
    let mut file_names = HashSet::new();

    for record in catalog {
        if !ids.insert(record.id) {
            problems.push(format!("duplicate id {}", record.id));
        }
        if !file_names.insert(record.file_name.as_str()) {
            problems.push(format!("duplicate file name `{}`", record.file_name));
        }
        if let Err(error) = validate_tags(record.tags.as_slice()) {
            problems.push(format!("image {}: {error}", record.id));
        }
        match validate_file_name(&record.file_name) {
            Ok(()) if !images_dir.join(&record.file_name).is_file() => {
                problems.push(format!("image {}: file `{}` is missing", record.id, record.file_name));
            }
            Ok(()) => {}
            Err(error) => problems.push(format!("image {}: {error}", record.id)),
        }
    }

    problems
}

fn unreferenced_files(catalog: &[ImageRecord], images_dir: &Path) -> BTreeSet<String> {
    let referenced: HashSet<&str> = catalog.iter().map(|record| record.file_name.as_str()).collect();
    let Ok(entries) = fs::read_dir(images_dir) else {
        return BTreeSet::new();
    };

    entries
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().map(|kind| kind.is_file()).unwrap_or(false))
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| !name.starts_with('.') && !referenced.contains(name.as_str()))
        .collect()
}
