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

use data::catalog::factions::KWISATZ_HADERACH_BONUS;
use data::catalog::leaders::LeaderId;
use data::catalog::territories::{TerritoryId, TerritoryKind};
use data::catalog::treachery_cards::{TreacheryCardId, TreacheryKind};
use data::core::primitives::{FactionId, Sector};
use data::game_states::game_state::GameState;
use data::game_states::phase_state::{BattleLeader, BattlePlan, PendingBattle};
use data::requests::BattlePlanSpec;
use itertools::Itertools;

use crate::validation::ValidationResult;

/// Finds every territory-and-sector where two or more non-allied factions
/// have battle-capable forces. Advisors are not battle-capable, and the
/// Polar Sink is neutral ground.
pub fn pending_battles(game: &GameState) -> Vec<PendingBattle> {
    let mut battles = vec![];
    let positions: Vec<(TerritoryId, Sector)> = game
        .factions
        .iter()
        .flat_map(|f| f.on_board.iter().map(|s| (s.territory, s.sector)))
        .unique()
        .sorted()
        .collect();

    for (territory, sector) in positions {
        if territory.kind() == TerritoryKind::PolarSink {
            continue;
        }
        let combatants: Vec<FactionId> = game
            .factions
            .iter()
            .filter(|f| {
                f.stack_at(territory, sector).map(|s| s.fighters()).unwrap_or(0) > 0
            })
            .map(|f| f.faction)
            .collect();
        let contested = combatants
            .iter()
            .tuple_combinations()
            .any(|(a, b)| game.faction(*a).ally != Some(*b));
        if combatants.len() >= 2 && contested {
            battles.push(PendingBattle { territory, sector, factions: combatants });
        }
    }
    battles
}

/// Battles in which a faction participates.
pub fn battles_for(battles: &[PendingBattle], faction: FactionId) -> Vec<PendingBattle> {
    battles
        .iter()
        .filter(|b| b.factions.contains(&faction))
        .cloned()
        .collect()
}

/// Validates a proposed battle plan and converts it into a committed one.
pub fn validate_plan(
    game: &GameState,
    faction: FactionId,
    territory: TerritoryId,
    sector: Sector,
    spec: &BattlePlanSpec,
) -> ValidationResult {
    let state = game.faction(faction);

    match spec.leader {
        BattleLeader::Leader(id) => {
            if id.faction() != faction {
                return ValidationResult::error("not_your_leader", "Leader belongs to another house");
            }
            let Some(leader_state) = state.leader_state(id) else {
                return ValidationResult::error("unknown_leader", "No such leader");
            };
            if !matches!(
                leader_state.location,
                data::game_states::faction_state::LeaderLocation::Available
            ) {
                return ValidationResult::error("leader_unavailable", "Leader cannot be committed");
            }
            if matches!(leader_state.used_in_territory, Some(t) if t != territory) {
                return ValidationResult::error(
                    "leader_used_elsewhere",
                    "Leader already fought in another territory this turn",
                );
            }
        }
        BattleLeader::CheapHero(card) => {
            if !state.hand.contains(&card) || card.kind() != TreacheryKind::CheapHero {
                return ValidationResult::error("no_cheap_hero", "No Cheap Hero card in hand");
            }
        }
        BattleLeader::None => {
            // Announced no-leader plans cannot include treachery cards.
            if spec.weapon.is_some() || spec.defense.is_some() {
                return ValidationResult::error(
                    "cards_without_leader",
                    "Treachery cards require a leader or Cheap Hero",
                );
            }
        }
    }

    let fighters = state.stack_at(territory, sector).map(|s| s.fighters()).unwrap_or(0);
    if spec.forces_dialed > fighters {
        return ValidationResult::error(
            "overdialed",
            format!("Only {fighters} fighters are present"),
        );
    }
    if spec.spice_dialed > state.spice {
        return ValidationResult::error("insufficient_spice", "Cannot support that much spice");
    }
    if spec.spice_dialed > spec.forces_dialed {
        return ValidationResult::error(
            "oversupported",
            "Spice support beyond the dialed forces is wasted",
        );
    }
    for card in [spec.weapon, spec.defense].into_iter().flatten() {
        if !state.hand.contains(&card) {
            return ValidationResult::error("card_not_held", format!("{} is not in hand", card.name()));
        }
    }
    if let Some(weapon) = spec.weapon {
        if !weapon.kind().is_weapon() && weapon.kind() != TreacheryKind::Worthless {
            return ValidationResult::error("not_a_weapon", "Weapon slot holds a non-weapon");
        }
    }
    if let Some(defense) = spec.defense {
        if !defense.kind().is_defense() && defense.kind() != TreacheryKind::Worthless {
            return ValidationResult::error("not_a_defense", "Defense slot holds a non-defense");
        }
    }
    if spec.kwisatz_haderach
        && !(faction == FactionId::Atreides && state.kwisatz_haderach_alive)
    {
        return ValidationResult::error("no_kwisatz_haderach", "The Kwisatz Haderach is unavailable");
    }
    ValidationResult::ok()
}

/// Builds the engine's default plan for a side that failed to submit one:
/// dial at least one force if available and commit the strongest available
/// leader, falling back to a Cheap Hero, falling back to an announced
/// no-leader plan.
pub fn default_plan(
    game: &GameState,
    faction: FactionId,
    territory: TerritoryId,
    sector: Sector,
) -> BattlePlan {
    let state = game.faction(faction);
    let leader = state
        .living_leaders()
        .filter(|l| l.used_in_territory.is_none() || l.used_in_territory == Some(territory))
        .max_by_key(|l| l.id.strength())
        .map(|l| BattleLeader::Leader(l.id))
        .or_else(|| {
            state
                .holds_card_kind(TreacheryKind::CheapHero)
                .map(BattleLeader::CheapHero)
        })
        .unwrap_or(BattleLeader::None);
    let fighters = state.stack_at(territory, sector).map(|s| s.fighters()).unwrap_or(0);
    BattlePlan {
        leader,
        forces_dialed: fighters.min(1),
        spice_dialed: 0,
        weapon: None,
        defense: None,
        kwisatz_haderach: false,
    }
}

/// A side's total battle strength, measured in half-points to avoid
/// fractions.
///
/// Advanced rules: a dialed force counts full strength when spice-supported
/// or when the faction is Fremen, half otherwise. Basic rules: every dialed
/// force counts full. Dead leaders contribute nothing.
pub fn strength_halves(
    game: &GameState,
    faction: FactionId,
    plan: &BattlePlan,
    leader_killed: bool,
) -> u32 {
    let mut halves = 0;
    if !leader_killed {
        if let BattleLeader::Leader(id) = plan.leader {
            halves += id.strength() * 2;
        }
        if plan.kwisatz_haderach {
            halves += KWISATZ_HADERACH_BONUS * 2;
        }
    }
    if game.config.advanced_rules && faction != FactionId::Fremen {
        let supported = plan.forces_dialed.min(plan.spice_dialed);
        let unsupported = plan.forces_dialed - supported;
        halves += supported * 2 + unsupported;
    } else {
        halves += plan.forces_dialed * 2;
    }
    halves
}

/// Outcome of the weapon-and-defense exchange.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WeaponExchange {
    pub aggressor_leader_killed: bool,
    pub defender_leader_killed: bool,
    pub lasgun_explosion: bool,
}

/// Resolves weapons against defenses, including the lasgun-shield explosion.
pub fn resolve_weapons(aggressor: &BattlePlan, defender: &BattlePlan) -> WeaponExchange {
    let any_shield = [aggressor, defender]
        .iter()
        .any(|p| p.defense.map(|d| d.kind() == TreacheryKind::Shield).unwrap_or(false));
    let any_lasgun = [aggressor, defender]
        .iter()
        .any(|p| p.weapon.map(|w| w.kind() == TreacheryKind::Lasgun).unwrap_or(false));
    if any_lasgun && any_shield {
        return WeaponExchange {
            aggressor_leader_killed: true,
            defender_leader_killed: true,
            lasgun_explosion: true,
        };
    }
    WeaponExchange {
        defender_leader_killed: weapon_kills(aggressor.weapon, defender.defense),
        aggressor_leader_killed: weapon_kills(defender.weapon, aggressor.defense),
        lasgun_explosion: false,
    }
}

fn weapon_kills(weapon: Option<TreacheryCardId>, defense: Option<TreacheryCardId>) -> bool {
    let Some(weapon) = weapon else {
        return false;
    };
    let defense_kind = defense.map(|d| d.kind());
    match weapon.kind() {
        TreacheryKind::ProjectileWeapon => defense_kind != Some(TreacheryKind::Shield),
        TreacheryKind::PoisonWeapon => defense_kind != Some(TreacheryKind::Snooper),
        TreacheryKind::Lasgun => true,
        _ => false,
    }
}

/// The leader a plan commits, when it commits a real one.
pub fn named_leader(plan: &BattlePlan) -> Option<LeaderId> {
    match plan.leader {
        BattleLeader::Leader(id) => Some(id),
        _ => None,
    }
}

/// Whether `caller` may call traitor on the opposing plan's named leader.
pub fn traitor_call_valid(game: &GameState, caller: FactionId, opposing: &BattlePlan) -> bool {
    match named_leader(opposing) {
        Some(leader) => game.faction(caller).traitors.contains(&leader),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use data::game_states::phase_state::BattlePlan;

    use super::*;
    use crate::mutations::forces;
    use crate::test_states;

    fn plan(leader: BattleLeader, dialed: u32, spice: u32) -> BattlePlan {
        BattlePlan {
            leader,
            forces_dialed: dialed,
            spice_dialed: spice,
            weapon: None,
            defense: None,
            kwisatz_haderach: false,
        }
    }

    #[test]
    fn contested_sectors_become_battles() {
        let mut game = test_states::basic_game();
        forces::ship_from_reserves(
            &mut game,
            FactionId::Emperor,
            TerritoryId::Arrakeen,
            Sector(9),
            3,
            0,
        )
        .unwrap();
        let battles = pending_battles(&game);
        assert_eq!(battles.len(), 1);
        assert_eq!(battles[0].territory, TerritoryId::Arrakeen);
        assert!(battles[0].factions.contains(&FactionId::Atreides));
        assert!(battles[0].factions.contains(&FactionId::Emperor));
    }

    #[test]
    fn allies_do_not_fight() {
        let mut game = test_states::basic_game();
        crate::mutations::alliances::form(&mut game, FactionId::Atreides, FactionId::Emperor)
            .unwrap();
        forces::ship_from_reserves(
            &mut game,
            FactionId::Emperor,
            TerritoryId::Arrakeen,
            Sector(9),
            3,
            0,
        )
        .unwrap();
        assert!(pending_battles(&game).is_empty());
    }

    #[test]
    fn advanced_strength_halves_unsupported_forces() {
        let mut game = test_states::basic_game();
        game.config.advanced_rules = true;
        let p = plan(BattleLeader::None, 4, 2);
        // 2 supported at full (4 halves) + 2 unsupported at half (2 halves).
        assert_eq!(strength_halves(&game, FactionId::Emperor, &p, false), 6);
        // Fremen never need support.
        assert_eq!(strength_halves(&game, FactionId::Fremen, &p, false), 8);
    }

    #[test]
    fn lasgun_and_shield_explode() {
        let mut a = plan(BattleLeader::None, 1, 0);
        let mut d = plan(BattleLeader::None, 1, 0);
        // Card 8 is the lasgun; cards 9..=12 are shields.
        a.weapon = Some(data::catalog::treachery_cards::TreacheryCardId(8));
        d.defense = Some(data::catalog::treachery_cards::TreacheryCardId(9));
        let exchange = resolve_weapons(&a, &d);
        assert!(exchange.lasgun_explosion);
        assert!(exchange.aggressor_leader_killed && exchange.defender_leader_killed);
    }

    #[test]
    fn shield_stops_projectile_but_not_poison() {
        use data::catalog::treachery_cards::TreacheryCardId;
        let mut a = plan(BattleLeader::None, 1, 0);
        let mut d = plan(BattleLeader::None, 1, 0);
        a.weapon = Some(TreacheryCardId(0));
        d.defense = Some(TreacheryCardId(9));
        assert!(!resolve_weapons(&a, &d).defender_leader_killed);
        a.weapon = Some(TreacheryCardId(4));
        assert!(resolve_weapons(&a, &d).defender_leader_killed);
    }
}
