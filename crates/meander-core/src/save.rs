//! Round-trip persistence of board layout and player roster.
//!
//! A save is two companion files. The board file is JSON holding the variant
//! id and the per-tile actions; the chain topology itself is not stored, it
//! is rebuilt deterministically from the variant and the actions are overlaid
//! by tile id. The player file is delimited text, one line per player, with
//! property holdings referenced by stable tile id and resolved against the
//! rebuilt board. Load failures surface with file context and leave any live
//! session untouched.

use crate::actions::{ColorGroup, LadderDirection, TileAction};
use crate::board::{Board, BoardVariant, TileId};
use crate::game::Game;
use crate::player::{Player, Token};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Errors at the board-file boundary.
#[derive(Debug, Error)]
pub enum BoardFileError {
    #[error("failed to read board file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write board file {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("board file {path} is not valid JSON")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("board file {path} references unknown tile {tile}")]
    UnknownTile { path: PathBuf, tile: TileId },

    #[error("board file {path} is for variant {found:?}, expected {expected:?}")]
    VariantMismatch {
        path: PathBuf,
        found: BoardVariant,
        expected: BoardVariant,
    },
}

/// Errors at the player-file boundary.
#[derive(Debug, Error)]
pub enum PlayerFileError {
    #[error("failed to read player file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write player file {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("player file {path} line {line}: {reason}")]
    Malformed {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("player file {path} line {line}: tile {tile} is not a property on this board")]
    UnknownProperty {
        path: PathBuf,
        line: usize,
        tile: TileId,
    },

    #[error("player file {path}: property {tile} is owned by more than one player")]
    DuplicateOwner { path: PathBuf, tile: TileId },

    #[error("player file {path}: duplicate player name '{name}'")]
    DuplicatePlayer { path: PathBuf, name: String },

    #[error("player file {path}: current player '{name}' is not in the roster")]
    UnknownCurrentPlayer { path: PathBuf, name: String },

    #[error("player file {path} lists no players")]
    EmptyRoster { path: PathBuf },
}

/// Errors from whole-save operations.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("failed to create save directory {path}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Board(#[from] BoardFileError),

    #[error(transparent)]
    Player(#[from] PlayerFileError),
}

/// Marker line naming the active player in the player file.
const CURRENT_PLAYER_PREFIX: &str = "CURRENT_PLAYER:";

// ==================== Board file ====================

/// On-disk shape of a board file.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BoardFile {
    name: String,
    description: String,
    variant_id: BoardVariant,
    tiles: Vec<TileRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TileRecord {
    id: TileId,
    #[serde(flatten)]
    action: ActionRecord,
}

/// Wire form of a tile action. Property ownership is not stored here; it
/// lives in the player file.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "actionType", rename_all = "camelCase")]
enum ActionRecord {
    #[serde(rename_all = "camelCase")]
    Ladder {
        destination_id: TileId,
        direction: LadderDirection,
    },
    BackToStart,
    Wait,
    #[serde(rename_all = "camelCase")]
    Property {
        property_name: String,
        cost: i64,
        color_group: ColorGroup,
    },
    Chance,
    Tax {
        percent: u32,
        fixed: i64,
    },
    WealthTax {
        amount: i64,
    },
    Start,
    Jail,
    #[serde(rename_all = "camelCase")]
    GoToJail {
        jail_tile_id: TileId,
    },
    FreeParking,
}

impl ActionRecord {
    fn from_action(action: &TileAction) -> Self {
        match action {
            TileAction::Ladder {
                destination,
                direction,
            } => ActionRecord::Ladder {
                destination_id: *destination,
                direction: *direction,
            },
            TileAction::BackToStart => ActionRecord::BackToStart,
            TileAction::Wait => ActionRecord::Wait,
            TileAction::Property {
                name, cost, group, ..
            } => ActionRecord::Property {
                property_name: name.clone(),
                cost: *cost,
                color_group: *group,
            },
            TileAction::Chance => ActionRecord::Chance,
            TileAction::Tax { percent, fixed } => ActionRecord::Tax {
                percent: *percent,
                fixed: *fixed,
            },
            TileAction::WealthTax { amount } => ActionRecord::WealthTax { amount: *amount },
            TileAction::Start => ActionRecord::Start,
            TileAction::Jail => ActionRecord::Jail,
            TileAction::GoToJail { jail_tile } => ActionRecord::GoToJail {
                jail_tile_id: *jail_tile,
            },
            TileAction::FreeParking => ActionRecord::FreeParking,
        }
    }

    fn into_action(self) -> TileAction {
        match self {
            ActionRecord::Ladder {
                destination_id,
                direction,
            } => TileAction::Ladder {
                destination: destination_id,
                direction,
            },
            ActionRecord::BackToStart => TileAction::BackToStart,
            ActionRecord::Wait => TileAction::Wait,
            ActionRecord::Property {
                property_name,
                cost,
                color_group,
            } => TileAction::Property {
                name: property_name,
                cost,
                group: color_group,
                owner: None,
            },
            ActionRecord::Chance => TileAction::Chance,
            ActionRecord::Tax { percent, fixed } => TileAction::Tax { percent, fixed },
            ActionRecord::WealthTax { amount } => TileAction::WealthTax { amount },
            ActionRecord::Start => TileAction::Start,
            ActionRecord::Jail => TileAction::Jail,
            ActionRecord::GoToJail { jail_tile_id } => TileAction::GoToJail {
                jail_tile: jail_tile_id,
            },
            ActionRecord::FreeParking => TileAction::FreeParking,
        }
    }
}

/// Serialize a board's layout and actions to `path`.
pub fn write_board(board: &Board, path: &Path) -> Result<(), BoardFileError> {
    let file = BoardFile {
        name: board.name().to_string(),
        description: board.description().to_string(),
        variant_id: board.variant(),
        tiles: board
            .tiles()
            .filter_map(|tile| {
                tile.action.as_ref().map(|action| TileRecord {
                    id: tile.id,
                    action: ActionRecord::from_action(action),
                })
            })
            .collect(),
    };

    let json = serde_json::to_string_pretty(&file).map_err(|source| BoardFileError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, json).map_err(|source| BoardFileError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Rebuild a board from `path`: fresh topology for the stored variant, with
/// the stored actions overlaid by tile id.
pub fn read_board(path: &Path) -> Result<Board, BoardFileError> {
    let text = fs::read_to_string(path).map_err(|source| BoardFileError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let file: BoardFile = serde_json::from_str(&text).map_err(|source| BoardFileError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let mut board = Board::topology(file.variant_id);
    board.set_name(file.name);
    board.set_description(file.description);
    for record in file.tiles {
        let id = record.id;
        if !board.set_action(id, record.action.into_action()) {
            return Err(BoardFileError::UnknownTile {
                path: path.to_path_buf(),
                tile: id,
            });
        }
    }
    Ok(board)
}

// ==================== Player file ====================

/// Write the roster to `path`, one line per player, with an optional leading
/// current-player marker.
pub fn write_roster(
    players: &[Player],
    current: Option<&str>,
    path: &Path,
) -> Result<(), PlayerFileError> {
    let mut out = String::new();
    if let Some(name) = current {
        out.push_str(CURRENT_PLAYER_PREFIX);
        out.push_str(name);
        out.push('\n');
    }
    for player in players {
        let position = match player.position {
            Some(tile) => tile.to_string(),
            None => "-".to_string(),
        };
        let owned: Vec<String> = player.owned.iter().map(ToString::to_string).collect();
        out.push_str(&format!(
            "{}, {}, {}, {}, {}\n",
            player.name,
            player.token,
            position,
            player.money,
            owned.join(";")
        ));
    }
    fs::write(path, out).map_err(|source| PlayerFileError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse the roster at `path`, resolving property references against `board`
/// and recording the owners on its tiles. Returns the players and the name
/// from the current-player marker, if present.
pub fn read_roster(
    path: &Path,
    board: &mut Board,
) -> Result<(Vec<Player>, Option<String>), PlayerFileError> {
    let text = fs::read_to_string(path).map_err(|source| PlayerFileError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let mut players: Vec<Player> = Vec::new();
    let mut current: Option<String> = None;

    for (index, line) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(name) = line.strip_prefix(CURRENT_PLAYER_PREFIX) {
            current = Some(name.trim().to_string());
            continue;
        }

        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() != 5 {
            return Err(PlayerFileError::Malformed {
                path: path.to_path_buf(),
                line: line_no,
                reason: format!("expected 5 fields, found {}", fields.len()),
            });
        }

        let name = fields[0];
        if name.is_empty() {
            return Err(PlayerFileError::Malformed {
                path: path.to_path_buf(),
                line: line_no,
                reason: "empty player name".to_string(),
            });
        }
        if players.iter().any(|p| p.name == name) {
            return Err(PlayerFileError::DuplicatePlayer {
                path: path.to_path_buf(),
                name: name.to_string(),
            });
        }

        let token: Token = fields[1].parse().map_err(|reason| PlayerFileError::Malformed {
            path: path.to_path_buf(),
            line: line_no,
            reason,
        })?;

        let position = match fields[2] {
            "-" | "" => None,
            raw => {
                let tile: TileId = raw.parse().map_err(|_| PlayerFileError::Malformed {
                    path: path.to_path_buf(),
                    line: line_no,
                    reason: format!("invalid tile id '{}'", raw),
                })?;
                if board.get_tile(tile).is_none() {
                    return Err(PlayerFileError::Malformed {
                        path: path.to_path_buf(),
                        line: line_no,
                        reason: format!("tile {} is not on this board", tile),
                    });
                }
                Some(tile)
            }
        };

        let money: i64 = fields[3].parse().map_err(|_| PlayerFileError::Malformed {
            path: path.to_path_buf(),
            line: line_no,
            reason: format!("invalid money amount '{}'", fields[3]),
        })?;

        let id = players.len() as crate::board::PlayerId;
        let mut player = Player::new(id, name.to_string(), token);
        player.position = position;
        player.money = money;

        for raw in fields[4].split(';').map(str::trim).filter(|s| !s.is_empty()) {
            let tile: TileId = raw.parse().map_err(|_| PlayerFileError::Malformed {
                path: path.to_path_buf(),
                line: line_no,
                reason: format!("invalid property id '{}'", raw),
            })?;
            let is_property = board
                .get_tile(tile)
                .and_then(|t| t.action.as_ref())
                .is_some_and(|a| matches!(a, TileAction::Property { .. }));
            if !is_property {
                return Err(PlayerFileError::UnknownProperty {
                    path: path.to_path_buf(),
                    line: line_no,
                    tile,
                });
            }
            let already_owned = board
                .get_tile(tile)
                .and_then(|t| t.action.as_ref())
                .and_then(TileAction::owner)
                .is_some();
            if already_owned {
                return Err(PlayerFileError::DuplicateOwner {
                    path: path.to_path_buf(),
                    tile,
                });
            }
            board.set_property_owner(tile, Some(id));
            player.owned.insert(tile);
        }

        players.push(player);
    }

    if players.is_empty() {
        return Err(PlayerFileError::EmptyRoster {
            path: path.to_path_buf(),
        });
    }
    if let Some(name) = &current {
        if !players.iter().any(|p| &p.name == name) {
            return Err(PlayerFileError::UnknownCurrentPlayer {
                path: path.to_path_buf(),
                name: name.clone(),
            });
        }
    }

    Ok((players, current))
}

// ==================== Save slots ====================

fn board_path(dir: &Path, slot: &str) -> PathBuf {
    dir.join(format!("{}.board.json", slot))
}

fn roster_path(dir: &Path, slot: &str) -> PathBuf {
    dir.join(format!("{}.players.txt", slot))
}

/// Snapshot a session into the `slot` pair of files under `dir`.
pub fn save_game(game: &Game, dir: &Path, slot: &str) -> Result<(), SaveError> {
    fs::create_dir_all(dir).map_err(|source| SaveError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;

    write_board(game.board(), &board_path(dir, slot))?;
    let current = game.active_player().map(|p| p.name.clone());
    write_roster(game.players(), current.as_deref(), &roster_path(dir, slot))?;
    info!(slot, variant = ?game.variant(), "game saved");
    Ok(())
}

/// Rebuild a resumable session from the `slot` pair of files under `dir`.
/// The stored board must match the requested variant.
pub fn load_game(dir: &Path, variant: BoardVariant, slot: &str) -> Result<Game, SaveError> {
    let board_path = board_path(dir, slot);
    let mut board = read_board(&board_path)?;
    if board.variant() != variant {
        return Err(BoardFileError::VariantMismatch {
            path: board_path,
            found: board.variant(),
            expected: variant,
        }
        .into());
    }

    let (players, current) = read_roster(&roster_path(dir, slot), &mut board)?;
    let active = current
        .and_then(|name| players.iter().position(|p| p.name == name))
        .unwrap_or(0);
    info!(slot, ?variant, "game loaded");
    Ok(Game::from_loaded(board, players, active))
}

impl Game {
    /// Snapshot this session into a save slot.
    pub fn save(&self, dir: &Path, slot: &str) -> Result<(), SaveError> {
        save_game(self, dir, slot)
    }

    /// Rebuild a session from a save slot.
    pub fn load(dir: &Path, variant: BoardVariant, slot: &str) -> Result<Game, SaveError> {
        load_game(dir, variant, slot)
    }
}
