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

use color_eyre::Report;

/// Represents the result of some game mutation.
///
/// Mutations either succeed or halt the engine: a failed mutation is always an
/// engine bug or a protocol failure, never a recoverable agent mistake.
/// Recoverable mistakes are expressed through `ValidationResult` values at the
/// decision site instead.
pub type Outcome = Result<(), Report>;

/// Equivalent alias to [Outcome] which wraps a returned value
pub type Value<T> = Result<T, Report>;

/// Mutation completed successfully, execution can continue
pub const OK: Outcome = Ok(());
