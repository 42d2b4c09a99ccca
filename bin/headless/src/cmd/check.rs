//! Check command - validate configuration and content references

use std::path::Path;

use color_eyre::eyre::{Result, bail};
use headless_core::{Config, ContentStore, JsonContentStore};

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Run the check command.
pub fn run(config_path: &Path, strict: bool) -> Result<()> {
    tracing::info!(?config_path, strict, "Checking configuration and content");

    let result = validate(config_path);

    println!();
    println!("Summary:");
    println!("  Errors:   {}", result.errors.len());
    println!("  Warnings: {}", result.warnings.len());

    if result.has_errors() {
        println!();
        println!("Errors:");
        for err in &result.errors {
            println!("  ✗ {err}");
        }
    }

    if result.has_warnings() {
        println!();
        println!("Warnings:");
        for warn in &result.warnings {
            println!("  ⚠ {warn}");
        }
    }

    if result.has_errors() {
        bail!("Validation failed with {} error(s)", result.errors.len());
    }

    if strict && result.has_warnings() {
        bail!(
            "Validation failed with {} warning(s) (strict mode)",
            result.warnings.len()
        );
    }

    println!();
    println!("✓ All checks passed");

    Ok(())
}

/// Validate the settings file and the content it references.
pub fn validate(config_path: &Path) -> ValidationResult {
    let mut result = ValidationResult::default();

    println!("Checking configuration...");
    let config = match Config::load_with_env(config_path) {
        Ok(c) => {
            println!("  ✓ Configuration valid");
            c
        }
        Err(e) => {
            result.add_error(format!("Configuration error: {e}"));
            println!("  ✗ Configuration invalid: {e}");
            return result;
        }
    };

    for warning in config.warnings() {
        result.add_warning(warning);
    }

    println!("\nChecking content store...");
    check_content(&config, &mut result);

    result
}

/// Check that every content group item exists in the content store.
fn check_content(config: &Config, result: &mut ValidationResult) {
    let path = &config.site.content_file;
    let store = match JsonContentStore::load(path) {
        Ok(store) => store,
        Err(e) => {
            result.add_error(format!("Content store error: {e}"));
            println!("  ✗ {} could not be loaded", path.display());
            return;
        }
    };
    println!("  ✓ {} items in {}", store.len(), path.display());

    let mut missing = 0;
    for group in &config.content {
        for id in &group.items {
            if store.item(*id).is_none() {
                result.add_warning(format!(
                    "content group '{}' references missing item {id}",
                    group.file_name
                ));
                missing += 1;
            }
        }
    }

    if missing == 0 {
        println!("  ✓ All content group items found");
    } else {
        println!("  ⚠ {missing} content group item(s) missing, they will be skipped");
    }
}
