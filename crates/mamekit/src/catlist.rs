//! Interpretation of `catlist.ini` section strings.
//!
//! Sections look like `Arcade: Shooter / Flying Vertical` or
//! `Handheld / Plug n' Play TV Game / Sports * Mature`; the part after
//! ` * ` is an extra marker (Mature, TTL).

use serde::Serialize;

/// What kind of thing a machine is, beyond "it's in MAME".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MachineKind {
    /// Ordinary arcade game.
    Arcade,
    /// Arcade system BIOS that runs other games.
    Bios,
    CoinPusher,
    /// Cartridge with its own hardware, emulated as a separate machine.
    ConsoleCartridge,
    /// Casino hardware rather than arcade hardware.
    Gambling,
    /// Handheld console with inbuilt games.
    Handheld,
    /// Handheld game with ink graphics.
    LcdHandheld,
    /// Ticket redemption game.
    Redemption,
    MedalGame,
    Mechanical,
    Pinball,
    /// TV-connected console without separate games.
    PlugAndPlay,
    /// Photo booth.
    PrintClub,
    Other,
}

impl MachineKind {
    /// Display label matching the variant name.
    pub fn label(self) -> &'static str {
        match self {
            MachineKind::Arcade => "Arcade",
            MachineKind::Bios => "BIOS",
            MachineKind::CoinPusher => "Coin Pusher",
            MachineKind::ConsoleCartridge => "Console Cartridge",
            MachineKind::Gambling => "Gambling",
            MachineKind::Handheld => "Handheld",
            MachineKind::LcdHandheld => "LCD Handheld",
            MachineKind::Redemption => "Redemption",
            MachineKind::MedalGame => "Medal Game",
            MachineKind::Mechanical => "Mechanical",
            MachineKind::Pinball => "Pinball",
            MachineKind::PlugAndPlay => "Plug & Play",
            MachineKind::PrintClub => "Print Club",
            MachineKind::Other => "Other",
        }
    }
}

/// A parsed `catlist.ini` section string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatlistCategory {
    category: String,
    extra: Option<String>,
    components: Vec<String>,
    arcade: bool,
}

impl CatlistCategory {
    pub fn parse(section: &str) -> Self {
        let (category, extra) = match section.split_once(" * ") {
            Some((category, extra)) => (category.to_string(), Some(extra.to_string())),
            None => (section.to_string(), None),
        };
        let arcade = category.starts_with("Arcade: ");
        let components = category
            .strip_prefix("Arcade: ")
            .unwrap_or(&category)
            .split(" / ")
            .map(str::to_string)
            .collect();
        CatlistCategory {
            category,
            extra,
            components,
            arcade,
        }
    }

    pub fn is_arcade(&self) -> bool {
        self.arcade
    }

    pub fn is_mature(&self) -> bool {
        self.extra.as_deref() == Some("Mature")
    }

    /// Game built from discrete logic, no CPU.
    pub fn is_ttl(&self) -> bool {
        self.extra.as_deref() == Some("TTL")
    }

    fn component(&self, index: usize) -> Option<&str> {
        self.components.get(index).map(String::as_str)
    }

    fn is_plug_and_play(&self) -> bool {
        self.component(0) == Some("Handheld")
            && self
                .components
                .iter()
                .any(|c| c == "Plug n' Play TV Game")
    }

    pub fn kind(&self) -> MachineKind {
        if self.category == "Arcade: System / BIOS" {
            return MachineKind::Bios;
        }
        match self.component(0) {
            Some("Slot Machine") | Some("Casino") => return MachineKind::Gambling,
            Some("Redemption Game") => return MachineKind::Redemption,
            Some("Medal Game") => return MachineKind::MedalGame,
            Some("Coin Pusher") => return MachineKind::CoinPusher,
            Some("Print Club") => return MachineKind::PrintClub,
            Some("Electromechanical") => {
                return if self.component(1) == Some("Pinball") {
                    MachineKind::Pinball
                } else {
                    MachineKind::Mechanical
                };
            }
            _ => {}
        }
        if self.arcade {
            return MachineKind::Arcade;
        }
        if self.is_plug_and_play() {
            return MachineKind::PlugAndPlay;
        }
        if self.category == "Handheld / Electronic Game" {
            return MachineKind::LcdHandheld;
        }
        MachineKind::Other
    }

    pub fn genre(&self) -> Option<&str> {
        match self.kind() {
            MachineKind::Mechanical | MachineKind::Redemption | MachineKind::MedalGame => {
                self.component(1)
            }
            _ if self.arcade => self.component(0),
            _ if self.is_plug_and_play() => self.component(2),
            _ => None,
        }
    }

    pub fn subgenre(&self) -> Option<&str> {
        match self.kind() {
            MachineKind::Mechanical | MachineKind::Redemption | MachineKind::MedalGame => {
                self.component(2)
            }
            _ if self.arcade => self.component(1),
            _ => None,
        }
    }

    /// The section string before the ` * ` marker.
    pub fn full(&self) -> &str {
        &self.category
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arcade_sections() {
        let cat = CatlistCategory::parse("Arcade: Shooter / Flying Vertical");
        assert!(cat.is_arcade());
        assert_eq!(cat.kind(), MachineKind::Arcade);
        assert_eq!(cat.genre(), Some("Shooter"));
        assert_eq!(cat.subgenre(), Some("Flying Vertical"));
        assert!(!cat.is_mature());
    }

    #[test]
    fn extras_and_bios() {
        let cat = CatlistCategory::parse("Arcade: Maze / Collect * Mature");
        assert!(cat.is_mature());
        assert_eq!(cat.genre(), Some("Maze"));

        let ttl = CatlistCategory::parse("Arcade: Ball & Paddle / Pong * TTL");
        assert!(ttl.is_ttl());

        let bios = CatlistCategory::parse("Arcade: System / BIOS");
        assert_eq!(bios.kind(), MachineKind::Bios);
    }

    #[test]
    fn non_arcade_kinds() {
        let cases = [
            ("Slot Machine / Video Slot", MachineKind::Gambling),
            ("Casino / Cards", MachineKind::Gambling),
            ("Redemption Game / Skill", MachineKind::Redemption),
            ("Medal Game / Horse Racing", MachineKind::MedalGame),
            ("Coin Pusher / Prize", MachineKind::CoinPusher),
            ("Print Club / Photo", MachineKind::PrintClub),
            ("Electromechanical / Pinball", MachineKind::Pinball),
            ("Electromechanical / Utilities", MachineKind::Mechanical),
            ("Handheld / Electronic Game", MachineKind::LcdHandheld),
            ("Computer / Home System", MachineKind::Other),
        ];
        for (section, expected) in cases {
            assert_eq!(CatlistCategory::parse(section).kind(), expected, "{section}");
        }
    }

    #[test]
    fn plug_and_play_genre_comes_third() {
        let cat = CatlistCategory::parse("Handheld / Plug n' Play TV Game / Sports");
        assert_eq!(cat.kind(), MachineKind::PlugAndPlay);
        assert_eq!(cat.genre(), Some("Sports"));
        assert_eq!(cat.subgenre(), None);
    }

    #[test]
    fn redemption_genre_and_subgenre() {
        let cat = CatlistCategory::parse("Redemption Game / Coin Roll Down / Prize");
        assert_eq!(cat.genre(), Some("Coin Roll Down"));
        assert_eq!(cat.subgenre(), Some("Prize"));
    }
}
