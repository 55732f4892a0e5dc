use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Broadcast season for seasonal catalog listings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Fall,
}

impl Season {
    /// Wire form expected by the upstream catalog API.
    pub fn as_api_str(&self) -> &'static str {
        match self {
            Season::Winter => "WINTER",
            Season::Spring => "SPRING",
            Season::Summer => "SUMMER",
            Season::Fall => "FALL",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Season::Winter => "winter",
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Fall => "fall",
        };
        f.write_str(name)
    }
}

impl FromStr for Season {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "winter" => Ok(Season::Winter),
            "spring" => Ok(Season::Spring),
            "summer" => Ok(Season::Summer),
            "fall" | "autumn" => Ok(Season::Fall),
            other => Err(format!("unknown season: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_season_parse_case_insensitive() {
        assert_eq!("FALL".parse::<Season>(), Ok(Season::Fall));
        assert_eq!("Winter".parse::<Season>(), Ok(Season::Winter));
        assert_eq!("autumn".parse::<Season>(), Ok(Season::Fall));
    }

    #[test]
    fn test_season_api_form() {
        assert_eq!(Season::Spring.as_api_str(), "SPRING");
    }
}
