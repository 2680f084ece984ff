//! Board representation: the tile graph and the variant builders.
//!
//! Tiles form an id-indexed arena; each tile stores its successor as an id
//! rather than a reference, so the race chain and the property ring need no
//! ownership cycles. Builders create the fixed topology for a variant and
//! attach its action set; the board is never restructured afterwards, only
//! the tiles it owns mutate (property ownership).

use crate::actions::{ColorGroup, LadderDirection, TileAction};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tile identifier, unique within a board.
pub type TileId = u32;

/// Player identifier: index into the engine's roster.
pub type PlayerId = u8;

/// Number of tiles on a race course.
pub const RACE_TILE_COUNT: TileId = 90;

/// Number of tiles on the property ring.
pub const PROPERTY_TILE_COUNT: TileId = 40;

/// The predefined board configurations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BoardVariant {
    /// Balanced mix of ladders and setbacks over 90 tiles.
    RaceClassic,
    /// Ladder-dense course skewed toward forward jumps.
    RaceBoosted,
    /// Setback-dense course with long falls and extra waits.
    RaceTreacherous,
    /// 40-tile wrapping property ring.
    Property,
}

impl BoardVariant {
    /// All variants.
    pub const ALL: [BoardVariant; 4] = [
        BoardVariant::RaceClassic,
        BoardVariant::RaceBoosted,
        BoardVariant::RaceTreacherous,
        BoardVariant::Property,
    ];

    /// Whether this is the property-ring variant.
    pub fn is_property(&self) -> bool {
        matches!(self, BoardVariant::Property)
    }

    /// Dice rolled per turn. Doubles only exist on the two-die ring.
    pub fn dice_count(&self) -> usize {
        if self.is_property() {
            2
        } else {
            1
        }
    }

    /// Number of tiles the variant's board holds.
    pub fn tile_count(&self) -> TileId {
        if self.is_property() {
            PROPERTY_TILE_COUNT
        } else {
            RACE_TILE_COUNT
        }
    }

    /// Human-readable title.
    pub fn title(&self) -> &'static str {
        match self {
            BoardVariant::RaceClassic => "Classic Race",
            BoardVariant::RaceBoosted => "Boosted Race",
            BoardVariant::RaceTreacherous => "Treacherous Race",
            BoardVariant::Property => "Property Ring",
        }
    }
}

/// A node in the board graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    /// Stable identifier
    pub id: TileId,
    /// Successor along the course; `None` only at the race terminal
    pub next_id: Option<TileId>,
    /// Effect triggered when a player occupies this tile
    pub action: Option<TileAction>,
}

impl Tile {
    /// Create a tile with no action.
    pub fn new(id: TileId, next_id: Option<TileId>) -> Self {
        Self {
            id,
            next_id,
            action: None,
        }
    }

    /// Create a tile with an action attached.
    pub fn with_action(id: TileId, next_id: Option<TileId>, action: TileAction) -> Self {
        Self {
            id,
            next_id,
            action: Some(action),
        }
    }
}

/// Ladder/wait/back-to-start placements for one race layout.
struct RaceLayout {
    ladders: &'static [(TileId, TileId)],
    waits: &'static [TileId],
    back_to_start: &'static [TileId],
}

const RACE_CLASSIC: RaceLayout = RaceLayout {
    ladders: &[
        (2, 18),
        (8, 31),
        (22, 45),
        (28, 52),
        (36, 57),
        (46, 68),
        (61, 79),
        (71, 86),
        (17, 7),
        (33, 13),
        (49, 24),
        (54, 34),
        (63, 42),
        (77, 58),
        (84, 66),
        (89, 73),
    ],
    waits: &[15, 40, 65],
    back_to_start: &[48],
};

const RACE_BOOSTED: RaceLayout = RaceLayout {
    ladders: &[
        (3, 16),
        (7, 25),
        (12, 33),
        (19, 41),
        (27, 50),
        (35, 59),
        (44, 70),
        (52, 77),
        (60, 83),
        (69, 88),
        (39, 21),
        (75, 55),
    ],
    waits: &[30],
    back_to_start: &[],
};

const RACE_TREACHEROUS: RaceLayout = RaceLayout {
    ladders: &[
        (5, 27),
        (15, 37),
        (30, 49),
        (56, 72),
        (11, 2),
        (24, 9),
        (38, 18),
        (47, 29),
        (58, 36),
        (66, 44),
        (74, 53),
        (82, 61),
        (87, 68),
    ],
    waits: &[20, 43, 62, 78],
    back_to_start: &[69, 85],
};

/// Tile ids of the special (non-property) tiles on the ring.
pub const START_TILE: TileId = 1;
pub const TAX_TILE: TileId = 5;
pub const CHANCE_TILE: TileId = 8;
pub const JAIL_TILE: TileId = 11;
pub const FREE_PARKING_TILE: TileId = 21;
pub const GO_TO_JAIL_TILE: TileId = 31;
pub const WEALTH_TAX_TILE: TileId = 39;

/// The four landmark tiles, one per quarter of the ring.
pub const LANDMARK_TILES: [TileId; 4] = [6, 16, 26, 36];

/// Tax tile configuration.
const TAX_PERCENT: u32 = 10;
const TAX_FIXED: i64 = 200;
const WEALTH_TAX_AMOUNT: i64 = 100;
const LANDMARK_COST: i64 = 200;

/// Property catalog: (tile id, name, cost, color group).
const PROPERTY_CATALOG: &[(TileId, &str, i64, ColorGroup)] = &[
    (2, "Mill Lane", 60, ColorGroup::Brown),
    (3, "Tanner Row", 60, ColorGroup::Brown),
    (4, "Harbor Walk", 100, ColorGroup::Teal),
    (7, "Quay Street", 100, ColorGroup::Teal),
    (9, "Ferry Road", 120, ColorGroup::Teal),
    (10, "Orchard Close", 140, ColorGroup::Pink),
    (12, "Magnolia Avenue", 140, ColorGroup::Pink),
    (13, "Bloom Street", 160, ColorGroup::Pink),
    (14, "Foundry Way", 180, ColorGroup::Orange),
    (15, "Anvil Court", 180, ColorGroup::Orange),
    (17, "Forge Street", 200, ColorGroup::Orange),
    (18, "Market Square", 220, ColorGroup::Red),
    (19, "Guild Row", 220, ColorGroup::Red),
    (20, "Merchant Street", 240, ColorGroup::Red),
    (22, "Sunfield Drive", 260, ColorGroup::Yellow),
    (23, "Amber Terrace", 260, ColorGroup::Yellow),
    (24, "Goldleaf Road", 280, ColorGroup::Yellow),
    (25, "Arbor Heights", 300, ColorGroup::Green),
    (27, "Cedar Park", 300, ColorGroup::Green),
    (28, "Willow Crescent", 320, ColorGroup::Green),
    (29, "Elm Gardens", 320, ColorGroup::Green),
    (30, "Regent Parade", 340, ColorGroup::Indigo),
    (32, "Crown Esplanade", 340, ColorGroup::Indigo),
    (33, "Palace Walk", 360, ColorGroup::Indigo),
    (34, "Royal Mile", 360, ColorGroup::Indigo),
    (35, "Summit Boulevard", 380, ColorGroup::Violet),
    (37, "Skyline Avenue", 380, ColorGroup::Violet),
    (38, "Pinnacle Place", 400, ColorGroup::Violet),
    (40, "Grand Promenade", 400, ColorGroup::Violet),
    (6, "Old Lighthouse", LANDMARK_COST, ColorGroup::Landmark),
    (16, "Grand Terminal", LANDMARK_COST, ColorGroup::Landmark),
    (26, "Observatory", LANDMARK_COST, ColorGroup::Landmark),
    (36, "Harbor Pier", LANDMARK_COST, ColorGroup::Landmark),
];

/// The complete board: an id-keyed tile registry plus variant metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    name: String,
    description: String,
    variant: BoardVariant,
    tiles: BTreeMap<TileId, Tile>,
}

impl Board {
    /// Build the full board for a variant: topology plus its action set.
    pub fn build(variant: BoardVariant) -> Self {
        let mut board = Self::topology(variant);
        board.attach_variant_actions();
        board
    }

    /// Build the bare chain/ring with no actions attached. The board codec
    /// overlays persisted actions onto this.
    pub(crate) fn topology(variant: BoardVariant) -> Self {
        let count = variant.tile_count();
        let mut tiles = BTreeMap::new();

        for id in 1..=count {
            let next_id = if id < count {
                Some(id + 1)
            } else if variant.is_property() {
                // The ring wraps.
                Some(1)
            } else {
                // The race chain terminates.
                None
            };
            tiles.insert(id, Tile::new(id, next_id));
        }

        Self {
            name: variant.title().to_string(),
            description: format!("{} ({} tiles)", variant.title(), count),
            variant,
            tiles,
        }
    }

    fn attach_variant_actions(&mut self) {
        match self.variant {
            BoardVariant::RaceClassic => self.attach_race_layout(&RACE_CLASSIC),
            BoardVariant::RaceBoosted => self.attach_race_layout(&RACE_BOOSTED),
            BoardVariant::RaceTreacherous => self.attach_race_layout(&RACE_TREACHEROUS),
            BoardVariant::Property => self.attach_property_layout(),
        }
    }

    fn attach_race_layout(&mut self, layout: &RaceLayout) {
        for &(from, to) in layout.ladders {
            self.set_action(
                from,
                TileAction::Ladder {
                    destination: to,
                    direction: LadderDirection::between(from, to),
                },
            );
        }
        for &id in layout.waits {
            self.set_action(id, TileAction::Wait);
        }
        for &id in layout.back_to_start {
            self.set_action(id, TileAction::BackToStart);
        }
    }

    fn attach_property_layout(&mut self) {
        self.set_action(START_TILE, TileAction::Start);
        self.set_action(
            TAX_TILE,
            TileAction::Tax {
                percent: TAX_PERCENT,
                fixed: TAX_FIXED,
            },
        );
        self.set_action(CHANCE_TILE, TileAction::Chance);
        self.set_action(JAIL_TILE, TileAction::Jail);
        self.set_action(FREE_PARKING_TILE, TileAction::FreeParking);
        self.set_action(
            GO_TO_JAIL_TILE,
            TileAction::GoToJail {
                jail_tile: JAIL_TILE,
            },
        );
        self.set_action(
            WEALTH_TAX_TILE,
            TileAction::WealthTax {
                amount: WEALTH_TAX_AMOUNT,
            },
        );

        for &(id, name, cost, group) in PROPERTY_CATALOG {
            self.set_action(
                id,
                TileAction::Property {
                    name: name.to_string(),
                    cost,
                    group,
                    owner: None,
                },
            );
        }
    }

    /// Which variant this board was built for.
    pub fn variant(&self) -> BoardVariant {
        self.variant
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Display description.
    pub fn description(&self) -> &str {
        &self.description
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub(crate) fn set_description(&mut self, description: String) {
        self.description = description;
    }

    /// Register a tile. A tile with the same id is replaced.
    pub fn add_tile(&mut self, tile: Tile) {
        self.tiles.insert(tile.id, tile);
    }

    /// Look up a tile by id.
    pub fn get_tile(&self, id: TileId) -> Option<&Tile> {
        self.tiles.get(&id)
    }

    /// Attach or replace a tile's action. Returns false if the tile is
    /// unknown.
    pub(crate) fn set_action(&mut self, id: TileId, action: TileAction) -> bool {
        match self.tiles.get_mut(&id) {
            Some(tile) => {
                tile.action = Some(action);
                true
            }
            None => false,
        }
    }

    /// Record or clear a property tile's owner. Returns false if the tile is
    /// unknown or not a property.
    pub(crate) fn set_property_owner(&mut self, id: TileId, new_owner: Option<PlayerId>) -> bool {
        match self.tiles.get_mut(&id) {
            Some(Tile {
                action: Some(TileAction::Property { owner, .. }),
                ..
            }) => {
                *owner = new_owner;
                true
            }
            _ => false,
        }
    }

    /// All tiles in id order.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.values()
    }

    /// Number of tiles.
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Lowest tile id; the course start.
    pub fn first_tile_id(&self) -> Option<TileId> {
        self.tiles.keys().next().copied()
    }

    /// Highest tile id; the race terminal.
    pub fn last_tile_id(&self) -> Option<TileId> {
        self.tiles.keys().next_back().copied()
    }

    /// Follow the `next` chain from `from` for `steps` tiles, stopping early
    /// at an unlinked terminal. Returns `None` when `from` is unknown or a
    /// link points at a missing tile.
    pub fn walk(&self, from: TileId, steps: u32) -> Option<TileId> {
        let mut current = self.tiles.get(&from)?;
        for _ in 0..steps {
            match current.next_id {
                Some(next) => current = self.tiles.get(&next)?,
                None => break,
            }
        }
        Some(current.id)
    }

    /// Tiles carrying a property action.
    pub fn property_tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles
            .values()
            .filter(|t| matches!(t.action, Some(TileAction::Property { .. })))
    }

    /// Ids of every property in a color group.
    pub fn group_members(&self, group: ColorGroup) -> Vec<TileId> {
        self.property_tiles()
            .filter(|t| matches!(t.action, Some(TileAction::Property { group: g, .. }) if g == group))
            .map(|t| t.id)
            .collect()
    }

    /// Whether `player` owns every property in `group`.
    pub fn owner_holds_group(&self, group: ColorGroup, player: PlayerId) -> bool {
        let members = self.group_members(group);
        !members.is_empty()
            && members.iter().all(|&id| {
                self.get_tile(id)
                    .and_then(|t| t.action.as_ref())
                    .and_then(TileAction::owner)
                    == Some(player)
            })
    }

    /// Landmark tile for a position bucket, if the position falls in one.
    pub fn landmark_for_position(position: TileId) -> Option<TileId> {
        match position {
            1..=5 => Some(LANDMARK_TILES[0]),
            11..=15 => Some(LANDMARK_TILES[1]),
            21..=25 => Some(LANDMARK_TILES[2]),
            31..=35 => Some(LANDMARK_TILES[3]),
            _ => None,
        }
    }
}
