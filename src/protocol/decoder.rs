// src/protocol/decoder.rs
//! Decoding of the game server's reply to a status query.
//!
//! The reply is a fixed 22 byte header followed by text:
//!
//! ```text
//! 0   magic "BZFS"
//! 4   protocol version, four ASCII digits
//! 8   u16 game style code
//! 10  u16 game option bits
//! 12  u16 x5 team maximums (rogue, red, green, blue, purple)
//! 22  reported IP, terminated by '\n'
//! ..  zero or more "<name> <score>\n" player lines
//! ```
//!
//! All integers are big-endian.

use std::io::Cursor;
use std::io::Read;

use byteorder::{BigEndian, ReadBytesExt};
use thiserror::Error;

use crate::models::status::{GameMode, GameOptions, PlayerScore, ServerReport, TeamMaxima};

pub const MAGIC: &[u8; 4] = b"BZFS";
pub const HEADER_LEN: usize = 22;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("malformed status response: {0}")]
    Malformed(&'static str),
    #[error("unknown game style code {0}")]
    UnknownGameStyle(u16),
}

struct Header {
    protocol_version: String,
    style: u16,
    option_bits: u16,
    maxima: [u16; 5],
}

fn read_header(raw: &[u8]) -> Result<Header, DecodeError> {
    if raw.len() < HEADER_LEN {
        return Err(DecodeError::Malformed("truncated header"));
    }

    let truncated = |_: std::io::Error| DecodeError::Malformed("truncated header");
    let mut cursor = Cursor::new(raw);

    let mut magic = [0u8; 4];
    cursor.read_exact(&mut magic).map_err(truncated)?;
    if &magic != MAGIC {
        return Err(DecodeError::Malformed("bad magic"));
    }

    let mut version = [0u8; 4];
    cursor.read_exact(&mut version).map_err(truncated)?;
    if !version.iter().all(u8::is_ascii_digit) {
        return Err(DecodeError::Malformed("protocol version is not numeric"));
    }

    let style = cursor.read_u16::<BigEndian>().map_err(truncated)?;
    let option_bits = cursor.read_u16::<BigEndian>().map_err(truncated)?;
    let mut maxima = [0u16; 5];
    cursor
        .read_u16_into::<BigEndian>(&mut maxima)
        .map_err(truncated)?;

    Ok(Header {
        // checked as ASCII digits above
        protocol_version: version.iter().map(|b| char::from(*b)).collect(),
        style,
        option_bits,
        maxima,
    })
}

fn split_reported_ip(body: &[u8]) -> Result<(String, &[u8]), DecodeError> {
    let newline = body
        .iter()
        .position(|b| *b == b'\n')
        .ok_or(DecodeError::Malformed("reported ip is not terminated"))?;

    let ip = std::str::from_utf8(&body[..newline])
        .map_err(|_| DecodeError::Malformed("reported ip is not valid UTF-8"))?
        .trim_end_matches('\r');

    if ip.is_empty() {
        return Err(DecodeError::Malformed("reported ip is empty"));
    }
    if ip.chars().any(char::is_whitespace) {
        return Err(DecodeError::Malformed("reported ip contains whitespace"));
    }

    Ok((ip.to_string(), &body[newline + 1..]))
}

fn parse_players(body: &[u8]) -> Result<Vec<PlayerScore>, DecodeError> {
    let text = std::str::from_utf8(body)
        .map_err(|_| DecodeError::Malformed("player list is not valid UTF-8"))?;

    let mut players = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        // Names may contain spaces, the score is always the last token.
        let (name, score) = line
            .rsplit_once(char::is_whitespace)
            .ok_or(DecodeError::Malformed("player line without score"))?;
        let score = score
            .parse::<i32>()
            .map_err(|_| DecodeError::Malformed("player score is not an integer"))?;
        let name = name.trim_end();
        if name.is_empty() {
            return Err(DecodeError::Malformed("player line without name"));
        }

        players.push(PlayerScore {
            name: name.to_string(),
            score,
        });
    }
    Ok(players)
}

/// Decodes a complete status response.
///
/// Structural problems are reported before the game style is checked, so a
/// truncated reply is always `Malformed` regardless of its style byte.
pub fn decode(raw: &[u8]) -> Result<ServerReport, DecodeError> {
    let header = read_header(raw)?;
    let (reported_ip, rest) = split_reported_ip(&raw[HEADER_LEN..])?;
    let players = parse_players(rest)?;

    let game_mode =
        GameMode::from_code(header.style).ok_or(DecodeError::UnknownGameStyle(header.style))?;

    Ok(ServerReport {
        protocol_version: header.protocol_version,
        game_mode,
        max_players: TeamMaxima::from_wire_order(header.maxima),
        options: GameOptions::from_bits(header.option_bits),
        players,
        reported_ip,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::status::GameOption;
    use byteorder::WriteBytesExt;

    fn response(style: u16, options: u16, maxima: [u16; 5], ip: &str, players: &str) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(MAGIC);
        buf.extend_from_slice(b"0221");
        buf.write_u16::<BigEndian>(style).unwrap();
        buf.write_u16::<BigEndian>(options).unwrap();
        for max in maxima {
            buf.write_u16::<BigEndian>(max).unwrap();
        }
        buf.extend_from_slice(ip.as_bytes());
        buf.push(b'\n');
        buf.extend_from_slice(players.as_bytes());
        buf
    }

    #[test]
    fn decodes_classic_ctf_scenario() {
        let raw = response(1, 0x002A, [0, 10, 10, 10, 0], "203.0.113.7", "Ace 12\nBee 7\n");
        let report = decode(&raw).unwrap();

        assert_eq!(report.protocol_version, "0221");
        assert_eq!(report.game_mode, GameMode::ClassicCTF);
        assert_eq!(report.max_players, TeamMaxima::from_wire_order([0, 10, 10, 10, 0]));
        assert_eq!(
            report.options,
            GameOptions {
                flags: true,
                jumping: true,
                inertia: false,
                ricochet: true,
                shaking: false,
                antidote: false,
                handicap: false,
                no_team_kills: false,
            }
        );
        assert_eq!(report.reported_ip, "203.0.113.7");
        assert_eq!(
            report.players,
            vec![
                PlayerScore { name: "Ace".to_string(), score: 12 },
                PlayerScore { name: "Bee".to_string(), score: 7 },
            ]
        );
    }

    #[test]
    fn every_known_option_combination_decodes_exactly() {
        let unknown = 0x0001 | 0x0004 | 0x0200 | 0xF800;
        for combo in 0u16..256 {
            let mut bits = unknown;
            for (i, option) in GameOption::ALL.iter().enumerate() {
                if combo & (1 << i) != 0 {
                    bits |= option.bit();
                }
            }

            let report = decode(&response(0, bits, [1; 5], "10.0.0.1", "")).unwrap();
            for (i, option) in GameOption::ALL.iter().enumerate() {
                assert_eq!(
                    report.options.is_enabled(*option),
                    combo & (1 << i) != 0,
                    "option {:?} in combination {:#010b}",
                    option,
                    combo
                );
            }
        }
    }

    #[test]
    fn no_player_lines_is_an_empty_list() {
        let report = decode(&response(2, 0, [5, 0, 0, 0, 0], "10.0.0.1", "")).unwrap();
        assert_eq!(report.game_mode, GameMode::OpenFFA);
        assert!(report.players.is_empty());
    }

    #[test]
    fn unknown_style_is_rejected() {
        let raw = response(4, 0, [0; 5], "10.0.0.1", "");
        assert_eq!(decode(&raw), Err(DecodeError::UnknownGameStyle(4)));
    }

    #[test]
    fn truncation_wins_over_unknown_style() {
        let raw = response(9, 0, [0; 5], "10.0.0.1", "");
        let cut = &raw[..raw.len() - 1];
        assert_eq!(decode(cut), Err(DecodeError::Malformed("reported ip is not terminated")));
    }

    #[test]
    fn every_short_prefix_is_malformed() {
        let raw = response(1, 0x002A, [0, 10, 10, 10, 0], "10.0.0.1", "");
        for len in 0..raw.len() {
            assert!(
                matches!(decode(&raw[..len]), Err(DecodeError::Malformed(_))),
                "prefix of {} bytes",
                len
            );
        }
    }

    #[test]
    fn rejects_bad_magic_and_version() {
        let mut raw = response(1, 0, [0; 5], "10.0.0.1", "");
        raw[0] = b'X';
        assert_eq!(decode(&raw), Err(DecodeError::Malformed("bad magic")));

        let mut raw = response(1, 0, [0; 5], "10.0.0.1", "");
        raw[5] = b'x';
        assert_eq!(decode(&raw), Err(DecodeError::Malformed("protocol version is not numeric")));
    }

    #[test]
    fn rejects_empty_ip() {
        let raw = response(1, 0, [0; 5], "", "");
        assert_eq!(decode(&raw), Err(DecodeError::Malformed("reported ip is empty")));
    }

    #[test]
    fn bad_player_line_fails_whole_response() {
        let raw = response(1, 0, [0; 5], "10.0.0.1", "Ace 12\nBee seven\n");
        assert_eq!(decode(&raw), Err(DecodeError::Malformed("player score is not an integer")));

        let raw = response(1, 0, [0; 5], "10.0.0.1", "lonely\n");
        assert_eq!(decode(&raw), Err(DecodeError::Malformed("player line without score")));
    }

    #[test]
    fn player_lines_keep_server_order() {
        let raw = response(
            3,
            0,
            [0; 5],
            "10.0.0.1\r",
            "zed 1\r\n\r\nmister pink -4\r\nalpha 30\r\n",
        );
        let report = decode(&raw).unwrap();
        assert_eq!(report.reported_ip, "10.0.0.1");
        let names: Vec<_> = report.players.iter().map(|p| (p.name.as_str(), p.score)).collect();
        assert_eq!(names, vec![("zed", 1), ("mister pink", -4), ("alpha", 30)]);
    }
}
