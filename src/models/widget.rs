// src/models/widget.rs
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::status::{GameOptions, TeamMaxima};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParamError {
    #[error("expected 5 comma-separated player maximums, got {0}")]
    PlayerCount(usize),
    #[error("invalid player maximum: {0:?}")]
    PlayerMax(String),
}

fn default_name() -> String {
    "My First Server".to_string()
}

fn default_server() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    5154
}

fn default_mode() -> String {
    "FFA".to_string()
}

fn default_players() -> String {
    "0,0,0,0,0".to_string()
}

fn default_true() -> bool {
    true
}

/// Parameters a page embeds a server widget with.
#[derive(Debug, Clone, Deserialize)]
pub struct WidgetParams {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_server")]
    pub server: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_mode")]
    pub mode: String,
    #[serde(default = "default_players")]
    pub players: String,
    #[serde(rename = "static", default)]
    pub static_mode: bool,
    #[serde(alias = "header-visibility", default = "default_true")]
    pub header: bool,
    #[serde(default)]
    pub flags: bool,
    #[serde(default)]
    pub jumping: bool,
    #[serde(default)]
    pub inertia: bool,
    #[serde(default)]
    pub ricochet: bool,
    #[serde(default)]
    pub shaking: bool,
    #[serde(default)]
    pub antidote: bool,
    #[serde(default)]
    pub handicap: bool,
    #[serde(rename = "no-team-kills", default)]
    pub no_team_kills: bool,
}

impl WidgetParams {
    pub fn options(&self) -> GameOptions {
        GameOptions {
            flags: self.flags,
            jumping: self.jumping,
            inertia: self.inertia,
            ricochet: self.ricochet,
            shaking: self.shaking,
            antidote: self.antidote,
            handicap: self.handicap,
            no_team_kills: self.no_team_kills,
        }
    }

    /// Caller-supplied defaults, echoed without touching the network.
    pub fn static_view(&self) -> Result<StaticView, ParamError> {
        Ok(StaticView {
            name: self.name.clone(),
            server: self.server.clone(),
            port: self.port,
            mode: self.mode.clone(),
            header: self.header,
            max_players: parse_max_players(&self.players)?,
            options: self.options(),
            enabled_options: self.options().enabled_names(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaticView {
    pub name: String,
    pub server: String,
    pub port: u16,
    pub mode: String,
    pub header: bool,
    pub max_players: TeamMaxima,
    pub options: GameOptions,
    pub enabled_options: Vec<&'static str>,
}

/// Parses `rogue,red,green,blue,purple`. Anything but exactly five
/// non-negative integers is rejected.
pub fn parse_max_players(raw: &str) -> Result<TeamMaxima, ParamError> {
    let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
    if parts.len() != 5 {
        return Err(ParamError::PlayerCount(parts.len()));
    }

    let mut values = [0u16; 5];
    for (slot, part) in values.iter_mut().zip(&parts) {
        *slot = part
            .parse()
            .map_err(|_| ParamError::PlayerMax(part.to_string()))?;
    }
    Ok(TeamMaxima::from_wire_order(values))
}
