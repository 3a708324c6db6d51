// Copyright © arrakis 2024-present
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//   https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

/// Outcome of validating an agent decision against the rules.
///
/// Validation failures are agent-correctable mistakes, not engine errors:
/// decision sites treat an invalid decision as a pass and move on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Stable machine-readable code, e.g. `insufficient_spice`.
    pub code: &'static str,
    pub message: String,
    pub suggestion: Option<String>,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self { valid: true, errors: vec![] }
    }

    pub fn error(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            valid: false,
            errors: vec![ValidationError { code, message: message.into(), suggestion: None }],
        }
    }

    pub fn error_with_suggestion(
        code: &'static str,
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self {
            valid: false,
            errors: vec![ValidationError {
                code,
                message: message.into(),
                suggestion: Some(suggestion.into()),
            }],
        }
    }

    /// Combines two results, keeping every error.
    pub fn and(mut self, other: ValidationResult) -> ValidationResult {
        self.valid &= other.valid;
        self.errors.extend(other.errors);
        self
    }
}
