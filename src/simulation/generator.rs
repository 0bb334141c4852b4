//! Mock visit generation

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;

pub const REFERERS: &[&str] = &[
    "google.com",
    "facebook.com",
    "twitter.com",
    "bing.com",
    "reddit.com",
    "linkedin.com",
    "yahoo.com",
    "duckduckgo.com",
    "news.ycombinator.com",
    "pinterest.com",
];

pub const LANDING_PAGES: &[&str] = &[
    "/",
    "/pricing",
    "/docs",
    "/blog",
    "/signup",
    "/about",
    "/contact",
    "/features",
];

/// One page visit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub visitor_id: String,
    pub timestamp: i64,
    pub referer: String,
    pub landing_page: String,
}

impl Event {
    /// Feature values keyed by feature name
    pub fn features(&self) -> HashMap<String, String> {
        HashMap::from([
            ("landing_page".to_string(), self.landing_page.clone()),
            ("referer".to_string(), self.referer.clone()),
        ])
    }

    pub fn to_csv(&self) -> String {
        format!(
            "\"{}\",\"{}\",\"{}\",\"{}\"",
            self.visitor_id, self.timestamp, self.referer, self.landing_page
        )
    }
}

/// Endless stream of visits drawn from a fixed visitor pool.
///
/// Timestamps are uniform over the inclusive `[start, end]` range.
pub struct EventGenerator {
    rng: StdRng,
    visitors: Vec<String>,
    start: i64,
    end: i64,
}

impl EventGenerator {
    /// A `seed` makes the stream reproducible; without one the generator seeds from the OS.
    /// The pool always holds at least one visitor and `end` is clamped to `start`.
    pub fn new(visitors: usize, start: i64, end: i64, seed: Option<u64>) -> Self {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let visitors = (0..visitors.max(1))
            .map(|_| format!("{:032x}", rng.gen::<u128>()))
            .collect();

        Self {
            rng,
            visitors,
            start,
            end: end.max(start),
        }
    }

    pub fn visitors(&self) -> &[String] {
        &self.visitors
    }

    pub fn next_event(&mut self) -> Event {
        let visitor = self.rng.gen_range(0..self.visitors.len());
        let referer = self.rng.gen_range(0..REFERERS.len());
        let landing_page = self.rng.gen_range(0..LANDING_PAGES.len());

        Event {
            visitor_id: self.visitors[visitor].clone(),
            timestamp: self.rng.gen_range(self.start..=self.end),
            referer: REFERERS[referer].to_string(),
            landing_page: LANDING_PAGES[landing_page].to_string(),
        }
    }
}

impl Iterator for EventGenerator {
    type Item = Event;

    fn next(&mut self) -> Option<Event> {
        Some(self.next_event())
    }
}
