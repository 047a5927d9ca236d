//! Configuration validation utilities and rules
//!
//! `Config::validate` rejects configurations the run cannot start with. The
//! checks here only produce warnings: the run still goes ahead and whatever
//! is wrong shows up as missing sections in the report.

use crate::{
    error::Result,
    models::{Config, ProbeKind},
};
use colored::*;
use std::path::{Path, PathBuf};

/// Configuration validator with non-fatal checks
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate configuration and collect warnings
    pub fn validate_comprehensive(config: &Config) -> Result<Vec<ValidationWarning>> {
        config.validate()?;

        let mut warnings = Vec::new();
        warnings.extend(Self::validate_probe_files(config));
        warnings.extend(Self::validate_interpreter(config));
        warnings.extend(Self::validate_timing(config));

        Ok(warnings)
    }

    /// Missing probe files are skipped at run time; say so up front
    fn validate_probe_files(config: &Config) -> Vec<ValidationWarning> {
        let missing: Vec<&str> = ProbeKind::ALL
            .iter()
            .map(|kind| kind.file_name())
            .filter(|name| !config.probe_path(name).is_file())
            .collect();

        if missing.len() == ProbeKind::ALL.len() {
            return vec![ValidationWarning::new(
                ValidationLevel::Warning,
                format!("No probe files found in {}; the report will be empty", config.probe_dir.display()),
            )];
        }

        let mut warnings: Vec<ValidationWarning> = missing
            .iter()
            .map(|name| {
                ValidationWarning::new(
                    ValidationLevel::Info,
                    format!("Probe '{}' not found in {}, it will be skipped", name, config.probe_dir.display()),
                )
            })
            .collect();

        if config.interpreter.is_none() {
            warnings.extend(
                ProbeKind::ALL
                    .iter()
                    .map(|kind| config.probe_path(kind.file_name()))
                    .filter(|path| path.is_file() && !is_executable(path))
                    .map(|path| {
                        ValidationWarning::new(
                            ValidationLevel::Warning,
                            format!("Probe '{}' is not executable and no interpreter is configured", path.display()),
                        )
                    }),
            );
        }

        warnings
    }

    fn validate_interpreter(config: &Config) -> Vec<ValidationWarning> {
        match &config.interpreter {
            Some(interpreter) if find_on_path(interpreter).is_none() => vec![ValidationWarning::new(
                ValidationLevel::Warning,
                format!("Interpreter '{}' was not found on PATH; every probe will be reported as not found", interpreter),
            )],
            _ => Vec::new(),
        }
    }

    fn validate_timing(config: &Config) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        if config.server_grace_ms == 0 {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                "Server grace period is 0ms; the network client may connect before the server listens".to_string(),
            ));
        } else if config.server_grace_ms > 10_000 {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!("Server grace period of {}ms will lengthen every run", config.server_grace_ms),
            ));
        }

        if config.server_teardown_ms < 100 {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!(
                    "Teardown timeout of {}ms leaves the server little time to exit before it is killed",
                    config.server_teardown_ms
                ),
            ));
        }

        warnings
    }
}

/// Locate a program the way the OS would when spawning it
pub fn find_on_path(program: &str) -> Option<PathBuf> {
    let candidate = Path::new(program);
    if candidate.components().count() > 1 {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }

    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var).find_map(|dir| {
        let full = dir.join(program);
        if full.is_file() {
            return Some(full);
        }
        if cfg!(windows) {
            let exe = dir.join(format!("{}.exe", program));
            if exe.is_file() {
                return Some(exe);
            }
        }
        None
    })
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    std::fs::metadata(path)
        .map(|meta| meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(_path: &Path) -> bool {
    true
}

/// Validation warning levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationLevel {
    Info,
    Warning,
}

impl ValidationLevel {
    /// Get display string for level
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
        }
    }

    /// Get color for terminal display
    pub fn color(&self) -> Color {
        match self {
            Self::Info => Color::Blue,
            Self::Warning => Color::Yellow,
        }
    }
}

/// Configuration validation warning
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub level: ValidationLevel,
    pub message: String,
}

impl ValidationWarning {
    /// Create a new validation warning
    pub fn new(level: ValidationLevel, message: String) -> Self {
        Self { level, message }
    }

    /// Format warning for display
    pub fn format(&self, use_color: bool) -> String {
        let tag = format!("[{}]", self.level.as_str());
        if use_color {
            format!("{} {}", tag.color(self.level.color()), self.message)
        } else {
            format!("{} {}", tag, self.message)
        }
    }
}

/// Convenience function for comprehensive configuration validation
pub fn validate_config(config: &Config) -> Result<Vec<ValidationWarning>> {
    ConfigValidator::validate_comprehensive(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_in(dir: &TempDir) -> Config {
        Config {
            probe_dir: dir.path().to_path_buf(),
            interpreter: Some("sh".to_string()),
            ..Default::default()
        }
    }

    fn messages(warnings: &[ValidationWarning]) -> Vec<String> {
        warnings.iter().map(|w| w.message.clone()).collect()
    }

    #[test]
    fn test_empty_probe_dir_single_warning() {
        let dir = TempDir::new().unwrap();
        let warnings = validate_config(&config_in(&dir)).unwrap();

        let probe_warnings: Vec<_> = messages(&warnings)
            .into_iter()
            .filter(|m| m.contains("probe"))
            .collect();
        assert_eq!(probe_warnings.len(), 1);
        assert!(probe_warnings[0].contains("No probe files found"));
    }

    #[test]
    fn test_missing_probes_listed_individually() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("cputest.py"), "print(1)").unwrap();

        let warnings = validate_config(&config_in(&dir)).unwrap();
        let skipped = messages(&warnings).into_iter().filter(|m| m.contains("will be skipped")).count();
        assert_eq!(skipped, ProbeKind::ALL.len() - 1);
    }

    #[test]
    fn test_zero_grace_period_warns() {
        let dir = TempDir::new().unwrap();
        let mut config = config_in(&dir);
        config.server_grace_ms = 0;

        let warnings = validate_config(&config).unwrap();
        assert!(warnings
            .iter()
            .any(|w| w.level == ValidationLevel::Warning && w.message.contains("grace period is 0ms")));
    }

    #[test]
    fn test_unknown_interpreter_warns() {
        let dir = TempDir::new().unwrap();
        let mut config = config_in(&dir);
        config.interpreter = Some("definitely-not-an-interpreter-xyz".to_string());

        let warnings = validate_config(&config).unwrap();
        assert!(messages(&warnings).iter().any(|m| m.contains("not found on PATH")));
    }

    #[test]
    fn test_invalid_config_is_error() {
        let mut config = Config::default();
        config.server_teardown_ms = 0;
        assert!(validate_config(&config).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_non_executable_probe_without_interpreter() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("memorytest.py"), "echo hi").unwrap();
        let mut config = config_in(&dir);
        config.interpreter = None;

        let warnings = validate_config(&config).unwrap();
        assert!(messages(&warnings).iter().any(|m| m.contains("is not executable")));
    }

    #[cfg(unix)]
    #[test]
    fn test_find_on_path() {
        assert!(find_on_path("sh").is_some());
        assert!(find_on_path("/bin/sh").is_some());
        assert!(find_on_path("definitely-not-an-interpreter-xyz").is_none());
    }

    #[test]
    fn test_warning_format() {
        let warning = ValidationWarning::new(ValidationLevel::Warning, "careful".to_string());
        assert_eq!(warning.format(false), "[WARNING] careful");
    }
}
