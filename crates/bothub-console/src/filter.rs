//! Search/status reducer over the roster.
//!
//! Pure: the same roster, term and status selector always yield the same
//! subsequence, in roster order. Recomputed on every input change.

use std::fmt;
use std::str::FromStr;

use bothub_common::models::{Bot, BotStatus, bot::UnknownStatus};

/// Status selector of the roster view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(BotStatus),
}

impl StatusFilter {
    pub fn admits(self, status: BotStatus) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == status,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        s.parse().map(Self::Only)
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Only(status) => status.fmt(f),
        }
    }
}

/// Whether `bot` survives the filter. `needle` must already be lowercased.
fn admits(bot: &Bot, needle: &str, status: StatusFilter) -> bool {
    if !status.admits(bot.status) {
        return false;
    }
    if needle.is_empty() {
        return true;
    }
    bot.bot_name.to_lowercase().contains(needle)
        || bot
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(needle))
}

pub fn matches(bot: &Bot, term: &str, status: StatusFilter) -> bool {
    admits(bot, &term.to_lowercase(), status)
}

/// The bots to show for `term` and `status`, preserving roster order.
pub fn visible<'a>(bots: &'a [Bot], term: &str, status: StatusFilter) -> Vec<&'a Bot> {
    let needle = term.to_lowercase();
    bots.iter().filter(|bot| admits(bot, &needle, status)).collect()
}

/// Search box plus status dropdown, as held by the roster view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterFilter {
    pub term: String,
    pub status: StatusFilter,
}

impl RosterFilter {
    pub fn new(term: impl Into<String>, status: StatusFilter) -> Self {
        Self { term: term.into(), status }
    }

    pub fn apply<'a>(&self, bots: &'a [Bot]) -> Vec<&'a Bot> {
        visible(bots, &self.term, self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::bot;
    use BotStatus::*;

    fn roster() -> Vec<Bot> {
        vec![
            bot("a", "Helper", Online, Some("支持文档")),
            bot("b", "Indexer", Offline, None),
            bot("c", "Pager", Online, Some("Wakes the on-call HELPER")),
            bot("d", "Triage", Error, Some("routes tickets")),
            bot("e", "Newbie", Unclaimed, None),
        ]
    }

    fn ids(bots: &[&Bot]) -> Vec<String> {
        bots.iter().map(|b| b.bot_id.clone()).collect()
    }

    #[test]
    fn empty_term_and_all_is_identity() {
        let bots = roster();
        let shown = visible(&bots, "", StatusFilter::All);
        assert_eq!(shown.len(), bots.len());
        assert!(shown.iter().zip(&bots).all(|(a, b)| *a == b));
    }

    #[test]
    fn status_filter_is_exact_match() {
        let bots = roster();
        let shown = visible(&bots, "", StatusFilter::Only(Online));
        assert_eq!(ids(&shown), ["a", "c"]);
        assert!(shown.iter().all(|b| b.status == Online));
    }

    #[test]
    fn search_is_case_insensitive_over_name_and_description() {
        let bots = vec![bot("a", "Helper", Online, Some("支持文档"))];
        assert_eq!(visible(&bots, "help", StatusFilter::All).len(), 1);
        assert_eq!(visible(&bots, "HELP", StatusFilter::All).len(), 1);
        assert_eq!(visible(&bots, "文档", StatusFilter::All).len(), 1);
        assert!(visible(&bots, "zzz", StatusFilter::All).is_empty());
    }

    #[test]
    fn missing_description_never_matches_a_term() {
        let bots = vec![bot("b", "Pager", Offline, None)];
        assert!(visible(&bots, "x", StatusFilter::All).is_empty());
        assert!(visible(&bots, "tickets", StatusFilter::All).is_empty());
        assert_eq!(visible(&bots, "PAG", StatusFilter::All).len(), 1);
        assert_eq!(visible(&bots, "", StatusFilter::All).len(), 1);
    }

    #[test]
    fn result_is_an_ordered_subsequence() {
        let bots = roster();
        for term in ["", "e", "help", "er", "q"] {
            for status in [StatusFilter::All, StatusFilter::Only(Online), StatusFilter::Only(Error)] {
                let shown = visible(&bots, term, status);
                let mut cursor = bots.iter();
                for picked in shown {
                    assert!(cursor.any(|b| std::ptr::eq(b, picked)), "order broken for {term:?}");
                }
            }
        }
    }

    #[test]
    fn term_and_status_combine() {
        let bots = roster();
        assert_eq!(ids(&visible(&bots, "helper", StatusFilter::Only(Online))), ["a", "c"]);
        assert!(visible(&bots, "helper", StatusFilter::Only(Offline)).is_empty());
    }

    #[test]
    fn status_filter_parses_all_and_statuses() {
        assert_eq!("all".parse::<StatusFilter>().unwrap(), StatusFilter::All);
        assert_eq!("busy".parse::<StatusFilter>().unwrap(), StatusFilter::Only(Busy));
        assert!("nap".parse::<StatusFilter>().is_err());
        assert_eq!(StatusFilter::Only(Unclaimed).to_string(), "unclaimed");
    }

    #[test]
    fn roster_filter_applies_its_selectors() {
        let bots = roster();
        let filter = RosterFilter::new("IND", StatusFilter::All);
        assert_eq!(ids(&filter.apply(&bots)), ["b"]);
    }
}
