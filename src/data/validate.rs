use std::collections::HashSet;
use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::placement::RawResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationSeverity {
    Error,
    Warning,
    Info,
}

impl ValidationSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for ValidationSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationDiagnostic {
    pub severity: ValidationSeverity,
    pub context: String,
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for ValidationDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}.{}: {}",
            self.severity, self.context, self.field, self.message
        )
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub diagnostics: Vec<ValidationDiagnostic>,
}

impl ValidationReport {
    pub fn push(
        &mut self,
        severity: ValidationSeverity,
        context: impl Into<String>,
        field: &'static str,
        message: impl Into<String>,
    ) {
        self.diagnostics.push(ValidationDiagnostic {
            severity,
            context: context.into(),
            field,
            message: message.into(),
        });
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diag| diag.severity == ValidationSeverity::Error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationDiagnostic> {
        self.diagnostics
            .iter()
            .filter(|diag| diag.severity == ValidationSeverity::Error)
    }

    pub fn count(&self, severity: ValidationSeverity) -> usize {
        self.diagnostics
            .iter()
            .filter(|diag| diag.severity == severity)
            .count()
    }
}

/// Check one weigh-in on its own. Placement never calls this; it is for data entry paths.
pub fn validate_result(result: &RawResult, report: &mut ValidationReport) {
    let context = format!("angler[{}]", result.angler_id);

    for (field, value) in [
        ("total_weight", result.total_weight),
        ("big_bass_weight", result.big_bass_weight),
        ("dead_fish_penalty", result.dead_fish_penalty),
    ] {
        if value < Decimal::ZERO {
            report.push(
                ValidationSeverity::Error,
                context.as_str(),
                field,
                format!("must not be negative (got {value})"),
            );
        }
    }

    if result.big_bass_weight > result.total_weight && !result.buy_in {
        report.push(
            ValidationSeverity::Warning,
            context.as_str(),
            "big_bass_weight",
            "heavier than the total weight",
        );
    }

    if result.num_fish == 0 && result.total_weight > Decimal::ZERO {
        report.push(
            ValidationSeverity::Warning,
            context.as_str(),
            "num_fish",
            "weight recorded with no fish counted",
        );
    }

    if result.buy_in && result.total_weight > Decimal::ZERO {
        report.push(
            ValidationSeverity::Warning,
            context.as_str(),
            "total_weight",
            "buy-in has weight; it is scored as a buy-in regardless",
        );
    }

    if result.dead_fish_penalty > result.total_weight {
        report.push(
            ValidationSeverity::Warning,
            context.as_str(),
            "dead_fish_penalty",
            "penalty exceeds the total weight",
        );
    }

    if result.buy_in && result.disqualified {
        report.push(
            ValidationSeverity::Info,
            context,
            "disqualified",
            "both buy-in and disqualified; disqualification applies",
        );
    }
}

/// Check a tournament's weigh-ins, including one-result-per-angler.
pub fn validate_results(results: &[RawResult]) -> ValidationReport {
    let mut report = ValidationReport::default();
    let mut seen = HashSet::new();

    for (index, result) in results.iter().enumerate() {
        if !seen.insert(result.angler_id) {
            report.push(
                ValidationSeverity::Error,
                format!("entry[{index}]"),
                "angler_id",
                format!("angler {} already has a result", result.angler_id),
            );
        }
        validate_result(result, &mut report);
    }

    report
}
