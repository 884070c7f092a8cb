//! Validation report returned by the `validate*` entry points.

use serde::{Serialize, Serializer, ser::SerializeStruct};

use super::{Diagnostic, Severity};

/// Outcome of a validation pass.
///
/// Validation is informational: a report with `valid == false` never stops
/// graph construction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    errors: Vec<Diagnostic>,
    warnings: Vec<Diagnostic>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes the diagnostic to `errors` or `warnings` by severity.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity() {
            Severity::Error => self.errors.push(diagnostic),
            Severity::Warning => self.warnings.push(diagnostic),
        }
    }

    /// True when no errors were recorded. Warnings do not invalidate.
    pub fn valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[Diagnostic] {
        &self.errors
    }

    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    /// Appends every diagnostic of `other`.
    pub fn merge(&mut self, other: ValidationReport) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// Appends the diagnostics of `other` whose code and subject are not
    /// already reported. Diagnostics without a code or subject are always
    /// appended.
    pub fn merge_unique(&mut self, other: ValidationReport) {
        for diagnostic in other.errors.into_iter().chain(other.warnings) {
            if !self.contains_finding(&diagnostic) {
                self.push(diagnostic);
            }
        }
    }

    fn contains_finding(&self, diagnostic: &Diagnostic) -> bool {
        let (Some(code), Some(subject)) = (diagnostic.code(), diagnostic.subject()) else {
            return false;
        };
        self.errors
            .iter()
            .chain(&self.warnings)
            .any(|d| d.code() == Some(code) && d.subject() == Some(subject))
    }
}

impl Serialize for ValidationReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ValidationReport", 3)?;
        state.serialize_field("valid", &self.valid())?;
        state.serialize_field("errors", &self.errors)?;
        state.serialize_field("warnings", &self.warnings)?;
        state.end()
    }
}

impl FromIterator<Diagnostic> for ValidationReport {
    fn from_iter<I: IntoIterator<Item = Diagnostic>>(iter: I) -> Self {
        let mut report = Self::new();
        for diagnostic in iter {
            report.push(diagnostic);
        }
        report
    }
}
