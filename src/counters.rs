use chrono::{Local, NaiveDate};

pub const TOTAL_VISITS: &str = "totalVisits";
pub const TODAY_VISITS_PREFIX: &str = "todayVisits_";
pub const DISCORD_CLICKS: &str = "discordClicks";

/// Languages the lobby can be switched to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Pt,
    En,
    Tr,
    Es,
}

impl Language {
    /// Unknown codes yield `None`; callers treat that as a no-op.
    pub fn parse(code: &str) -> Option<Self> {
        match code.trim() {
            "pt" => Some(Self::Pt),
            "en" => Some(Self::En),
            "tr" => Some(Self::Tr),
            "es" => Some(Self::Es),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::Pt => "pt",
            Self::En => "en",
            Self::Tr => "tr",
            Self::Es => "es",
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Self::Pt => "langPt",
            Self::En => "langEn",
            Self::Tr => "langTr",
            Self::Es => "langEs",
        }
    }
}

/// Storage keys for one tracker. The daily key is fixed at construction,
/// so a session that crosses midnight keeps counting on its start day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterKeys {
    pub total_visits: String,
    pub today_visits: String,
    pub discord_clicks: String,
}

impl CounterKeys {
    pub fn today() -> Self {
        Self::for_date(Local::now().date_naive())
    }

    pub fn for_date(date: NaiveDate) -> Self {
        Self {
            total_visits: TOTAL_VISITS.to_string(),
            today_visits: daily_key(date),
            discord_clicks: DISCORD_CLICKS.to_string(),
        }
    }
}

pub fn daily_key(date: NaiveDate) -> String {
    format!("{TODAY_VISITS_PREFIX}{}", date.format("%Y-%m-%d"))
}

/// Path of a counter inside the remote store.
pub fn remote_path(key: &str) -> String {
    format!("stats/{key}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn daily_key_uses_iso_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(CounterKeys::for_date(date).today_visits, "todayVisits_2024-03-05");
    }

    #[test]
    fn language_codes_round_trip_to_keys() {
        assert_eq!(Language::parse("pt").map(Language::key), Some("langPt"));
        assert_eq!(Language::parse("es").map(Language::key), Some("langEs"));
        assert_eq!(Language::parse("xx"), None);
        assert_eq!(Language::parse("PT"), None);
    }

    #[test]
    fn remote_path_is_under_stats() {
        assert_eq!(remote_path(DISCORD_CLICKS), "stats/discordClicks");
    }
}
