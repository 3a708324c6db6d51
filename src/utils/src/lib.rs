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

pub mod outcome;

/// Returns an error from the enclosing function if a required invariant does
/// not hold.
///
/// Used by mutation primitives to assert engine invariants; a failed `verify!`
/// indicates an engine bug, not a bad agent decision.
#[macro_export]
macro_rules! verify {
    ($cond:expr, $($arg:tt)*) => {
        if !($cond) {
            return Err(::color_eyre::eyre::eyre!($($arg)*));
        }
    };
}

/// Unconditionally returns an error from the enclosing function.
#[macro_export]
macro_rules! fail {
    ($($arg:tt)*) => {
        return Err(::color_eyre::eyre::eyre!($($arg)*))
    };
}
