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

use itertools::Itertools;

use crate::catalog::territories::{all_territories, TerritoryId};

/// Result of parsing a territory id from agent-supplied input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerritoryParse {
    Found(TerritoryId),
    /// No exact match; the closest catalogue names, best first.
    NotFound { suggestions: Vec<TerritoryId> },
}

/// Parses a territory id from free-form input.
///
/// Matching is case-insensitive and treats spaces, hyphens and apostrophes as
/// underscores, so "Tuek's Sietch" and "tueks_sietch" both resolve. On a miss
/// the closest names by edit distance are suggested.
pub fn parse_territory(input: &str) -> TerritoryParse {
    let normalized = normalize(input);
    for id in all_territories() {
        if id.name() == normalized {
            return TerritoryParse::Found(id);
        }
    }

    let suggestions = all_territories()
        .map(|id| (edit_distance(&normalized, id.name()), id))
        .sorted_by_key(|(distance, _)| *distance)
        .take(3)
        .filter(|(distance, _)| *distance <= 5)
        .map(|(_, id)| id)
        .collect();
    TerritoryParse::NotFound { suggestions }
}

fn normalize(input: &str) -> String {
    input
        .trim()
        .chars()
        .filter(|c| *c != '\'')
        .map(|c| match c {
            ' ' | '-' => '_',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}

fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != cb);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_and_normalized_matches() {
        assert_eq!(
            parse_territory("cielago_north"),
            TerritoryParse::Found(TerritoryId::CielagoNorth)
        );
        assert_eq!(
            parse_territory("Tuek's Sietch"),
            TerritoryParse::Found(TerritoryId::TueksSietch)
        );
        assert_eq!(
            parse_territory("  HABBANYA RIDGE FLAT "),
            TerritoryParse::Found(TerritoryId::HabbanyaRidgeFlat)
        );
    }

    #[test]
    fn misses_suggest_close_names() {
        let TerritoryParse::NotFound { suggestions } = parse_territory("cielago_nort") else {
            panic!("expected a miss");
        };
        assert_eq!(suggestions.first(), Some(&TerritoryId::CielagoNorth));
    }
}
