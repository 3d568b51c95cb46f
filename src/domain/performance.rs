use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

/// A single box-score line that reached the alert threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Performance {
    pub player: String,
    pub team: String,
    pub points: u32,
    #[serde(default)]
    pub game_id: String,
    #[serde(default)]
    pub rebounds: u32,
    #[serde(default)]
    pub assists: u32,
    #[serde(default = "default_minutes")]
    pub minutes: String,
}

fn default_minutes() -> String {
    String::from("N/A")
}

impl Performance {
    /// Luka's 73 point night (DAL @ ATL, 2024-01-26), used by previews and test sends.
    pub fn sample() -> Self {
        Self {
            player: String::from("Luka Doncic"),
            team: String::from("DAL"),
            points: 73,
            game_id: String::from("0022300629"),
            rebounds: 10,
            assists: 7,
            minutes: String::from("45:25"),
        }
    }
}

/// Decomposes accented characters and drops whatever is left outside ASCII,
/// so "Luka Dončić" is stored as "Luka Doncic".
pub fn normalize_player_name(name: &str) -> String {
    name.nfkd().filter(char::is_ascii).collect()
}
