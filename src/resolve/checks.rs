//! # Checks
//!
//! Per-category outcome of resolution. Each resolution frame keeps its own
//! [`Checks`] and converts it into the reported list once, at the end.

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Check categories.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub enum CheckType {
    /// DID syntax and method.
    #[serde(rename = "DID_SYNTAX")]
    DidSyntax,

    /// On-chain organization record.
    #[serde(rename = "ORGID")]
    OrgId,

    /// ORG.JSON retrieval, integrity and proof.
    #[serde(rename = "DID_DOCUMENT")]
    DidDocument,

    /// Trust assertions.
    #[serde(rename = "TRUST_ASSERTIONS")]
    TrustAssertions,
}

impl CheckType {
    const ALL: [Self; 4] = [Self::DidSyntax, Self::OrgId, Self::DidDocument, Self::TrustAssertions];

    const fn index(self) -> usize {
        match self {
            Self::DidSyntax => 0,
            Self::OrgId => 1,
            Self::DidDocument => 2,
            Self::TrustAssertions => 3,
        }
    }
}

/// Outcome of one check.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Check {
    /// Check category.
    #[serde(rename = "type")]
    pub type_: CheckType,

    /// `None` when the check was not applicable or not reached.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passed: Option<bool>,

    /// Errors found.
    #[serde(default)]
    pub errors: Vec<String>,

    /// Warnings found.
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl Check {
    const fn new(type_: CheckType) -> Self {
        Self {
            type_,
            passed: None,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

/// Check accumulator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Checks([Check; 4]);

impl Default for Checks {
    fn default() -> Self {
        Self(CheckType::ALL.map(Check::new))
    }
}

impl Checks {
    /// Mark `type_` as passed, unless it already failed.
    pub fn pass(&mut self, type_: CheckType) {
        let check = &mut self.0[type_.index()];
        if check.errors.is_empty() {
            check.passed = Some(true);
        }
    }

    /// Record an error against `type_` and mark it failed.
    pub fn fail(&mut self, type_: CheckType, error: impl Into<String>) {
        let check = &mut self.0[type_.index()];
        check.passed = Some(false);
        check.errors.push(error.into());
    }

    /// Record a fatal resolution error under its check category.
    pub fn fail_with(&mut self, error: &Error) {
        self.fail(error.check_type(), error.to_string());
    }

    /// Record a warning against `type_`.
    pub fn warn(&mut self, type_: CheckType, warning: impl Into<String>) {
        self.0[type_.index()].warnings.push(warning.into());
    }

    /// Record several warnings against `type_`.
    pub fn warn_all(&mut self, type_: CheckType, warnings: impl IntoIterator<Item = String>) {
        self.0[type_.index()].warnings.extend(warnings);
    }

    /// Set the outcome of `type_` directly.
    pub fn set(&mut self, type_: CheckType, passed: Option<bool>, errors: Vec<String>) {
        let check = &mut self.0[type_.index()];
        check.passed = passed;
        check.errors.extend(errors);
    }

    /// The check for `type_`.
    #[must_use]
    pub const fn get(&self, type_: CheckType) -> &Check {
        &self.0[type_.index()]
    }

    /// The reported list, in category order.
    #[must_use]
    pub fn into_vec(self) -> Vec<Check> {
        self.0.into()
    }
}
