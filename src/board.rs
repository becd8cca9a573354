use anyhow::{bail, Result};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Target hardware; changes pin menus and which peripherals are built in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Board {
    #[default]
    ActivityBoard,
    Flip,
    HebBadge,
    HebBadgeWx,
    Scribbler3,
    Other,
}

impl Board {
    pub fn name(self) -> &'static str {
        match self {
            Board::ActivityBoard => "activity-board",
            Board::Flip => "flip",
            Board::HebBadge => "heb",
            Board::HebBadgeWx => "heb-wx",
            Board::Scribbler3 => "s3",
            Board::Other => "other",
        }
    }

    /// General purpose pins offered in pin dropdowns.
    pub fn digital_pins(self) -> Vec<u8> {
        match self {
            Board::ActivityBoard => (0..=17).chain([26, 27]).collect(),
            Board::Flip => (0..=27).collect(),
            Board::HebBadge => (0..=11).collect(),
            Board::HebBadgeWx => (0..=15).collect(),
            Board::Scribbler3 => (0..=5).collect(),
            Board::Other => (0..=31).collect(),
        }
    }

    /// The Activity Board wires its micro-SD socket to fixed pins.
    pub fn has_builtin_sd(self) -> bool {
        self == Board::ActivityBoard
    }
}

impl FromStr for Board {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let board = match s.trim().to_lowercase().as_str() {
            "activity-board" | "activity" | "ab" => Board::ActivityBoard,
            "flip" => Board::Flip,
            "heb" => Board::HebBadge,
            "heb-wx" => Board::HebBadgeWx,
            "s3" | "scribbler" => Board::Scribbler3,
            "other" => Board::Other,
            other => bail!(
                "Unknown board '{}'. Expected one of: activity-board, flip, heb, heb-wx, s3, other.",
                other
            ),
        };
        Ok(board)
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
