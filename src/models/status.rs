// src/models/status.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// Scored game mode a server is running, as carried by the style code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameMode {
    TeamFFA,
    ClassicCTF,
    OpenFFA,
    RabbitChase,
}

impl GameMode {
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            0 => Some(Self::TeamFFA),
            1 => Some(Self::ClassicCTF),
            2 => Some(Self::OpenFFA),
            3 => Some(Self::RabbitChase),
            _ => None,
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TeamFFA => write!(f, "TeamFFA"),
            Self::ClassicCTF => write!(f, "ClassicCTF"),
            Self::OpenFFA => write!(f, "OpenFFA"),
            Self::RabbitChase => write!(f, "RabbitChase"),
        }
    }
}

/// Player capacity per team.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMaxima {
    pub rogue: u16,
    pub red: u16,
    pub green: u16,
    pub blue: u16,
    pub purple: u16,
}

impl TeamMaxima {
    pub fn from_wire_order(values: [u16; 5]) -> Self {
        let [rogue, red, green, blue, purple] = values;
        Self { rogue, red, green, blue, purple }
    }
}

/// Optional gameplay rules toggled by one bit each of the option field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameOption {
    Flags,
    Jumping,
    Inertia,
    Ricochet,
    Shaking,
    Antidote,
    Handicap,
    NoTeamKills,
}

impl GameOption {
    pub const ALL: [GameOption; 8] = [
        GameOption::Flags,
        GameOption::Jumping,
        GameOption::Inertia,
        GameOption::Ricochet,
        GameOption::Shaking,
        GameOption::Antidote,
        GameOption::Handicap,
        GameOption::NoTeamKills,
    ];

    pub fn bit(self) -> u16 {
        match self {
            Self::Flags => 0x0002,
            Self::Jumping => 0x0008,
            Self::Inertia => 0x0010,
            Self::Ricochet => 0x0020,
            Self::Shaking => 0x0040,
            Self::Antidote => 0x0080,
            Self::Handicap => 0x0100,
            Self::NoTeamKills => 0x0400,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Flags => "flags",
            Self::Jumping => "jumping",
            Self::Inertia => "inertia",
            Self::Ricochet => "ricochet",
            Self::Shaking => "shaking",
            Self::Antidote => "antidote",
            Self::Handicap => "handicap",
            Self::NoTeamKills => "no-team-kills",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOptions {
    pub flags: bool,
    pub jumping: bool,
    pub inertia: bool,
    pub ricochet: bool,
    pub shaking: bool,
    pub antidote: bool,
    pub handicap: bool,
    #[serde(rename = "no-team-kills")]
    pub no_team_kills: bool,
}

impl GameOptions {
    /// Bits outside the eight known options are ignored.
    pub fn from_bits(bits: u16) -> Self {
        let has = |option: GameOption| bits & option.bit() != 0;
        Self {
            flags: has(GameOption::Flags),
            jumping: has(GameOption::Jumping),
            inertia: has(GameOption::Inertia),
            ricochet: has(GameOption::Ricochet),
            shaking: has(GameOption::Shaking),
            antidote: has(GameOption::Antidote),
            handicap: has(GameOption::Handicap),
            no_team_kills: has(GameOption::NoTeamKills),
        }
    }

    pub fn is_enabled(&self, option: GameOption) -> bool {
        match option {
            GameOption::Flags => self.flags,
            GameOption::Jumping => self.jumping,
            GameOption::Inertia => self.inertia,
            GameOption::Ricochet => self.ricochet,
            GameOption::Shaking => self.shaking,
            GameOption::Antidote => self.antidote,
            GameOption::Handicap => self.handicap,
            GameOption::NoTeamKills => self.no_team_kills,
        }
    }

    /// Names of the enabled options, in bit order.
    pub fn enabled_names(&self) -> Vec<&'static str> {
        GameOption::ALL
            .iter()
            .filter(|option| self.is_enabled(**option))
            .map(|option| option.name())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerScore {
    pub name: String,
    pub score: i32,
}

/// Decoded payload of a status query, before enrichment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerReport {
    pub protocol_version: String,
    pub game_mode: GameMode,
    pub max_players: TeamMaxima,
    pub options: GameOptions,
    pub players: Vec<PlayerScore>,
    pub reported_ip: String,
}

/// State of a server that answered the status query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    pub display_name: Option<String>,
    pub protocol_version: String,
    pub game_mode: GameMode,
    pub max_players: TeamMaxima,
    pub options: GameOptions,
    pub players: Vec<PlayerScore>,
    pub reported_ip: String,
    pub fetched_at: u64,
}

impl StatusRecord {
    pub fn from_report(report: ServerReport, display_name: Option<String>, fetched_at: u64) -> Self {
        Self {
            display_name,
            protocol_version: report.protocol_version,
            game_mode: report.game_mode,
            max_players: report.max_players,
            options: report.options,
            players: report.players,
            reported_ip: report.reported_ip,
            fetched_at,
        }
    }

    pub fn minutes_since(&self, now: u64) -> u64 {
        now.saturating_sub(self.fetched_at) / 60
    }
}

/// Result of asking a server for its status. `Unreachable` carries no data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum QueryOutcome {
    Success(StatusRecord),
    Unreachable,
}

impl QueryOutcome {
    pub fn record(&self) -> Option<&StatusRecord> {
        match self {
            Self::Success(record) => Some(record),
            Self::Unreachable => None,
        }
    }

    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Unreachable)
    }
}
