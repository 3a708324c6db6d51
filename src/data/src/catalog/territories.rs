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

use enum_iterator::Sequence;
use enum_map::Enum;
use serde::{Deserialize, Serialize};

use crate::core::primitives::Sector;

/// Named regions of the board.
///
/// Serialized names are the lowercase snake-case ids used on the wire, e.g.
/// `cielago_north`.
#[derive(
    Debug,
    Clone,
    Copy,
    Hash,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Serialize,
    Deserialize,
    Enum,
    Sequence,
)]
#[serde(rename_all = "snake_case")]
pub enum TerritoryId {
    PolarSink,
    CielagoNorth,
    CielagoDepression,
    CielagoSouth,
    CielagoEast,
    CielagoWest,
    Meridian,
    HargPass,
    FalseWallSouth,
    FalseWallEast,
    TheMinorErg,
    PastyMesa,
    RedChasm,
    SouthMesa,
    TueksSietch,
    GaraKulon,
    SihayaRidge,
    ShieldWall,
    HoleInTheRock,
    RimWallWest,
    Basin,
    OldGap,
    ImperialBasin,
    Arrakeen,
    Carthag,
    Arsunt,
    Tsimpo,
    BrokenLand,
    PlasticBasin,
    HaggaBasin,
    RockOutcroppings,
    SietchTabr,
    BightOfTheCliff,
    FuneralPlain,
    TheGreatFlat,
    TheGreaterFlat,
    WindPass,
    WindPassNorth,
    FalseWallWest,
    HabbanyaErg,
    HabbanyaRidgeFlat,
    HabbanyaSietch,
}

/// Terrain classification, which determines storm exposure and shipping cost.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum TerritoryKind {
    Sand,
    Rock,
    Stronghold,
    /// The storm-free neutral ground at the centre of the board.
    PolarSink,
}

/// Static definition of one territory.
#[derive(Debug, Clone, Copy)]
pub struct TerritoryDef {
    pub id: TerritoryId,
    pub name: &'static str,
    pub kind: TerritoryKind,
    /// Sector indices this territory spans. Empty for the Polar Sink, which
    /// sits outside the sector wheel entirely.
    pub sectors: &'static [u8],
    /// Whether the storm passes over this territory without effect.
    ///
    /// Imperial Basin, Arrakeen and Carthag lose this protection once the
    /// Shield Wall has been destroyed by Family Atomics.
    pub protected_from_storm: bool,
    /// Directly adjacent territories. Symmetric by construction.
    pub adjacent: &'static [TerritoryId],
}

impl TerritoryId {
    pub fn def(self) -> &'static TerritoryDef {
        territory(self)
    }

    pub fn name(self) -> &'static str {
        self.def().name
    }

    pub fn kind(self) -> TerritoryKind {
        self.def().kind
    }

    pub fn is_stronghold(self) -> bool {
        self.kind() == TerritoryKind::Stronghold
    }

    pub fn sectors(self) -> impl Iterator<Item = Sector> {
        self.def().sectors.iter().map(|s| Sector(*s))
    }

    /// Whether the sector index is part of this territory. The Polar Sink
    /// sits outside the sector wheel and accepts forces under any sector
    /// key.
    pub fn contains_sector(self, sector: Sector) -> bool {
        let def = self.def();
        def.sectors.is_empty() || def.sectors.contains(&sector.0)
    }

    /// True for the territories whose storm protection depends on the Shield
    /// Wall standing.
    pub fn protected_by_shield_wall(self) -> bool {
        matches!(
            self,
            TerritoryId::ImperialBasin | TerritoryId::Arrakeen | TerritoryId::Carthag
        )
    }
}

/// All territories in catalogue order.
pub fn all_territories() -> impl Iterator<Item = TerritoryId> {
    enum_iterator::all::<TerritoryId>()
}

/// Looks up the static definition of a territory.
pub fn territory(id: TerritoryId) -> &'static TerritoryDef {
    use TerritoryId::*;
    match id {
        PolarSink => &TerritoryDef {
            id: PolarSink,
            name: "polar_sink",
            kind: TerritoryKind::PolarSink,
            sectors: &[],
            protected_from_storm: true,
            adjacent: &[
                CielagoNorth,
                HargPass,
                FalseWallEast,
                ImperialBasin,
                Arsunt,
                HaggaBasin,
                WindPass,
                CielagoWest,
            ],
        },
        CielagoNorth => &TerritoryDef {
            id: CielagoNorth,
            name: "cielago_north",
            kind: TerritoryKind::Sand,
            sectors: &[0, 1, 2],
            protected_from_storm: false,
            adjacent: &[PolarSink, CielagoWest, CielagoDepression, CielagoEast, HargPass],
        },
        CielagoDepression => &TerritoryDef {
            id: CielagoDepression,
            name: "cielago_depression",
            kind: TerritoryKind::Sand,
            sectors: &[0, 1, 2],
            protected_from_storm: false,
            adjacent: &[CielagoNorth, CielagoWest, Meridian, CielagoSouth, CielagoEast],
        },
        CielagoSouth => &TerritoryDef {
            id: CielagoSouth,
            name: "cielago_south",
            kind: TerritoryKind::Sand,
            sectors: &[1, 2],
            protected_from_storm: false,
            adjacent: &[CielagoDepression, Meridian, CielagoEast],
        },
        CielagoEast => &TerritoryDef {
            id: CielagoEast,
            name: "cielago_east",
            kind: TerritoryKind::Sand,
            sectors: &[2, 3],
            protected_from_storm: false,
            adjacent: &[CielagoNorth, CielagoDepression, CielagoSouth, FalseWallSouth, SouthMesa],
        },
        CielagoWest => &TerritoryDef {
            id: CielagoWest,
            name: "cielago_west",
            kind: TerritoryKind::Sand,
            sectors: &[17, 0],
            protected_from_storm: false,
            adjacent: &[
                PolarSink,
                WindPassNorth,
                WindPass,
                CielagoNorth,
                CielagoDepression,
                Meridian,
                HabbanyaRidgeFlat,
            ],
        },
        Meridian => &TerritoryDef {
            id: Meridian,
            name: "meridian",
            kind: TerritoryKind::Sand,
            sectors: &[0, 1],
            protected_from_storm: false,
            adjacent: &[CielagoWest, CielagoDepression, CielagoSouth, HabbanyaRidgeFlat],
        },
        HargPass => &TerritoryDef {
            id: HargPass,
            name: "harg_pass",
            kind: TerritoryKind::Sand,
            sectors: &[3, 4],
            protected_from_storm: false,
            adjacent: &[PolarSink, CielagoNorth, FalseWallSouth, FalseWallEast, TheMinorErg],
        },
        FalseWallSouth => &TerritoryDef {
            id: FalseWallSouth,
            name: "false_wall_south",
            kind: TerritoryKind::Rock,
            sectors: &[3, 4],
            protected_from_storm: true,
            adjacent: &[HargPass, TheMinorErg, PastyMesa, SouthMesa, CielagoEast],
        },
        FalseWallEast => &TerritoryDef {
            id: FalseWallEast,
            name: "false_wall_east",
            kind: TerritoryKind::Rock,
            sectors: &[4, 5, 6, 7, 8],
            protected_from_storm: true,
            adjacent: &[PolarSink, HargPass, TheMinorErg, ImperialBasin, ShieldWall],
        },
        TheMinorErg => &TerritoryDef {
            id: TheMinorErg,
            name: "the_minor_erg",
            kind: TerritoryKind::Sand,
            sectors: &[4, 5, 6, 7],
            protected_from_storm: false,
            adjacent: &[FalseWallEast, HargPass, FalseWallSouth, PastyMesa, RedChasm, ShieldWall],
        },
        PastyMesa => &TerritoryDef {
            id: PastyMesa,
            name: "pasty_mesa",
            kind: TerritoryKind::Rock,
            sectors: &[4, 5, 6, 7],
            protected_from_storm: true,
            adjacent: &[
                FalseWallSouth,
                TheMinorErg,
                RedChasm,
                SouthMesa,
                TueksSietch,
                GaraKulon,
                SihayaRidge,
            ],
        },
        RedChasm => &TerritoryDef {
            id: RedChasm,
            name: "red_chasm",
            kind: TerritoryKind::Sand,
            sectors: &[6],
            protected_from_storm: false,
            adjacent: &[TheMinorErg, PastyMesa, SouthMesa],
        },
        SouthMesa => &TerritoryDef {
            id: SouthMesa,
            name: "south_mesa",
            kind: TerritoryKind::Sand,
            sectors: &[6, 7, 8],
            protected_from_storm: false,
            adjacent: &[CielagoEast, FalseWallSouth, RedChasm, PastyMesa, TueksSietch, SihayaRidge],
        },
        TueksSietch => &TerritoryDef {
            id: TueksSietch,
            name: "tueks_sietch",
            kind: TerritoryKind::Stronghold,
            sectors: &[4],
            protected_from_storm: true,
            adjacent: &[PastyMesa, SouthMesa],
        },
        GaraKulon => &TerritoryDef {
            id: GaraKulon,
            name: "gara_kulon",
            kind: TerritoryKind::Sand,
            sectors: &[7],
            protected_from_storm: false,
            adjacent: &[PastyMesa, SihayaRidge, ShieldWall],
        },
        SihayaRidge => &TerritoryDef {
            id: SihayaRidge,
            name: "sihaya_ridge",
            kind: TerritoryKind::Sand,
            sectors: &[8],
            protected_from_storm: false,
            adjacent: &[SouthMesa, PastyMesa, GaraKulon, ShieldWall],
        },
        ShieldWall => &TerritoryDef {
            id: ShieldWall,
            name: "shield_wall",
            kind: TerritoryKind::Rock,
            sectors: &[7, 8],
            protected_from_storm: true,
            adjacent: &[
                FalseWallEast,
                TheMinorErg,
                GaraKulon,
                SihayaRidge,
                HoleInTheRock,
                ImperialBasin,
            ],
        },
        HoleInTheRock => &TerritoryDef {
            id: HoleInTheRock,
            name: "hole_in_the_rock",
            kind: TerritoryKind::Sand,
            sectors: &[8],
            protected_from_storm: false,
            adjacent: &[ShieldWall, RimWallWest, Basin],
        },
        RimWallWest => &TerritoryDef {
            id: RimWallWest,
            name: "rim_wall_west",
            kind: TerritoryKind::Rock,
            sectors: &[8],
            protected_from_storm: true,
            adjacent: &[HoleInTheRock, ImperialBasin, Basin, Arrakeen],
        },
        Basin => &TerritoryDef {
            id: Basin,
            name: "basin",
            kind: TerritoryKind::Sand,
            sectors: &[8],
            protected_from_storm: false,
            adjacent: &[HoleInTheRock, RimWallWest, OldGap, ImperialBasin],
        },
        OldGap => &TerritoryDef {
            id: OldGap,
            name: "old_gap",
            kind: TerritoryKind::Sand,
            sectors: &[8, 9, 10],
            protected_from_storm: false,
            adjacent: &[Basin, ImperialBasin, Arrakeen, Carthag, Tsimpo, BrokenLand],
        },
        ImperialBasin => &TerritoryDef {
            id: ImperialBasin,
            name: "imperial_basin",
            kind: TerritoryKind::Sand,
            sectors: &[8, 9, 10],
            protected_from_storm: true,
            adjacent: &[
                PolarSink,
                ShieldWall,
                FalseWallEast,
                Arrakeen,
                OldGap,
                Basin,
                RimWallWest,
                Carthag,
                Arsunt,
            ],
        },
        Arrakeen => &TerritoryDef {
            id: Arrakeen,
            name: "arrakeen",
            kind: TerritoryKind::Stronghold,
            sectors: &[9],
            protected_from_storm: true,
            adjacent: &[ImperialBasin, RimWallWest, OldGap],
        },
        Carthag => &TerritoryDef {
            id: Carthag,
            name: "carthag",
            kind: TerritoryKind::Stronghold,
            sectors: &[10],
            protected_from_storm: true,
            adjacent: &[ImperialBasin, OldGap, Tsimpo, Arsunt],
        },
        Arsunt => &TerritoryDef {
            id: Arsunt,
            name: "arsunt",
            kind: TerritoryKind::Sand,
            sectors: &[10, 11],
            protected_from_storm: false,
            adjacent: &[PolarSink, ImperialBasin, Carthag, Tsimpo, HaggaBasin],
        },
        Tsimpo => &TerritoryDef {
            id: Tsimpo,
            name: "tsimpo",
            kind: TerritoryKind::Sand,
            sectors: &[10, 11],
            protected_from_storm: false,
            adjacent: &[OldGap, Carthag, Arsunt, BrokenLand, PlasticBasin, HaggaBasin],
        },
        BrokenLand => &TerritoryDef {
            id: BrokenLand,
            name: "broken_land",
            kind: TerritoryKind::Sand,
            sectors: &[10, 11],
            protected_from_storm: false,
            adjacent: &[OldGap, Tsimpo, PlasticBasin],
        },
        PlasticBasin => &TerritoryDef {
            id: PlasticBasin,
            name: "plastic_basin",
            kind: TerritoryKind::Rock,
            sectors: &[11, 12, 13],
            protected_from_storm: true,
            adjacent: &[
                Tsimpo,
                BrokenLand,
                HaggaBasin,
                RockOutcroppings,
                SietchTabr,
                BightOfTheCliff,
            ],
        },
        HaggaBasin => &TerritoryDef {
            id: HaggaBasin,
            name: "hagga_basin",
            kind: TerritoryKind::Sand,
            sectors: &[11, 12],
            protected_from_storm: false,
            adjacent: &[PolarSink, Arsunt, Tsimpo, PlasticBasin, WindPass],
        },
        RockOutcroppings => &TerritoryDef {
            id: RockOutcroppings,
            name: "rock_outcroppings",
            kind: TerritoryKind::Sand,
            sectors: &[12, 13],
            protected_from_storm: false,
            adjacent: &[PlasticBasin, SietchTabr, BightOfTheCliff],
        },
        SietchTabr => &TerritoryDef {
            id: SietchTabr,
            name: "sietch_tabr",
            kind: TerritoryKind::Stronghold,
            sectors: &[13],
            protected_from_storm: true,
            adjacent: &[PlasticBasin, RockOutcroppings, BightOfTheCliff, WindPass],
        },
        BightOfTheCliff => &TerritoryDef {
            id: BightOfTheCliff,
            name: "bight_of_the_cliff",
            kind: TerritoryKind::Sand,
            sectors: &[13, 14],
            protected_from_storm: false,
            adjacent: &[PlasticBasin, RockOutcroppings, SietchTabr, FuneralPlain],
        },
        FuneralPlain => &TerritoryDef {
            id: FuneralPlain,
            name: "funeral_plain",
            kind: TerritoryKind::Sand,
            sectors: &[14],
            protected_from_storm: false,
            adjacent: &[BightOfTheCliff, TheGreatFlat],
        },
        TheGreatFlat => &TerritoryDef {
            id: TheGreatFlat,
            name: "the_great_flat",
            kind: TerritoryKind::Sand,
            sectors: &[14],
            protected_from_storm: false,
            adjacent: &[FuneralPlain, WindPass, TheGreaterFlat],
        },
        TheGreaterFlat => &TerritoryDef {
            id: TheGreaterFlat,
            name: "the_greater_flat",
            kind: TerritoryKind::Sand,
            sectors: &[15],
            protected_from_storm: false,
            adjacent: &[TheGreatFlat, WindPass, HabbanyaErg],
        },
        WindPass => &TerritoryDef {
            id: WindPass,
            name: "wind_pass",
            kind: TerritoryKind::Sand,
            sectors: &[13, 14, 15, 16],
            protected_from_storm: false,
            adjacent: &[
                PolarSink,
                HaggaBasin,
                SietchTabr,
                TheGreatFlat,
                TheGreaterFlat,
                FalseWallWest,
                WindPassNorth,
                CielagoWest,
            ],
        },
        WindPassNorth => &TerritoryDef {
            id: WindPassNorth,
            name: "wind_pass_north",
            kind: TerritoryKind::Sand,
            sectors: &[16, 17],
            protected_from_storm: false,
            adjacent: &[WindPass, FalseWallWest, CielagoWest],
        },
        FalseWallWest => &TerritoryDef {
            id: FalseWallWest,
            name: "false_wall_west",
            kind: TerritoryKind::Rock,
            sectors: &[15, 16, 17],
            protected_from_storm: true,
            adjacent: &[WindPass, WindPassNorth, HabbanyaErg, HabbanyaRidgeFlat],
        },
        HabbanyaErg => &TerritoryDef {
            id: HabbanyaErg,
            name: "habbanya_erg",
            kind: TerritoryKind::Sand,
            sectors: &[15, 16],
            protected_from_storm: false,
            adjacent: &[TheGreaterFlat, FalseWallWest, HabbanyaRidgeFlat, HabbanyaSietch],
        },
        HabbanyaRidgeFlat => &TerritoryDef {
            id: HabbanyaRidgeFlat,
            name: "habbanya_ridge_flat",
            kind: TerritoryKind::Sand,
            sectors: &[16, 17],
            protected_from_storm: false,
            adjacent: &[
                HabbanyaErg,
                FalseWallWest,
                HabbanyaSietch,
                CielagoWest,
                Meridian,
            ],
        },
        HabbanyaSietch => &TerritoryDef {
            id: HabbanyaSietch,
            name: "habbanya_sietch",
            kind: TerritoryKind::Stronghold,
            sectors: &[16],
            protected_from_storm: true,
            adjacent: &[HabbanyaRidgeFlat, HabbanyaErg],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjacency_is_symmetric() {
        for id in all_territories() {
            for &other in id.def().adjacent {
                assert!(
                    other.def().adjacent.contains(&id),
                    "{:?} lists {:?} as adjacent, but not vice versa",
                    id,
                    other
                );
            }
        }
    }

    #[test]
    fn sectors_are_in_range() {
        for id in all_territories() {
            for sector in id.def().sectors {
                assert!(*sector < crate::core::primitives::NUM_SECTORS);
            }
        }
    }

    #[test]
    fn strongholds_span_a_single_sector() {
        for id in all_territories().filter(|t| t.is_stronghold()) {
            assert_eq!(id.def().sectors.len(), 1, "{:?}", id);
        }
    }
}
