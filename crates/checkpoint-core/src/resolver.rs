//! Genre resolution: collapses provider metadata into one canonical [`Genre`].
//!
//! Rules are applied in a fixed order and the first one that fires wins:
//!
//! 1. Theme override: a theme containing "horror" or "survival" gives Horror.
//! 2. Phrase override: a short list of unambiguous phrases in the name or
//!    summary (e.g. "survival horror", "turn-based strategy", "soulslike").
//! 3. Provider genres: each genre name is normalised through a lookup table
//!    and the most specific label present is picked. RPG together with Action
//!    collapses to Action RPG.
//! 4. Fallback: Other when there was some descriptive text, otherwise `None`.
//!
//! Short acronyms ("rts", "fps", "4x") only match as whole words, using the
//! regex crate's Unicode `\b`. "60 fps" matches; "60fps" does not, because a
//! digit followed by a letter is not a word boundary.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;

use crate::genre::Genre;

/// The four provider fields the resolver looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenreInput<'a> {
    pub name: Option<&'a str>,
    pub summary: Option<&'a str>,
    pub genres: Vec<&'a str>,
    pub themes: Vec<&'a str>,
}

impl<'a> GenreInput<'a> {
    pub fn new(name: Option<&'a str>, summary: Option<&'a str>) -> Self {
        Self {
            name,
            summary,
            ..Self::default()
        }
    }

    pub fn with_genres<S: AsRef<str>>(mut self, genres: &'a [S]) -> Self {
        self.genres = genres.iter().map(|g| g.as_ref()).collect();
        self
    }

    pub fn with_themes<S: AsRef<str>>(mut self, themes: &'a [S]) -> Self {
        self.themes = themes.iter().map(|t| t.as_ref()).collect();
        self
    }

    pub fn resolve(&self) -> Option<Genre> {
        resolve(self.name, self.summary, &self.genres, &self.themes)
    }
}

enum Phrase {
    Substring(&'static str),
    Word(&'static str),
}

use Phrase::{Substring, Word};

/// Checked top to bottom against the lower-cased name + summary.
const PHRASES: &[(Phrase, Genre)] = &[
    (Substring("survival horror"), Genre::Horror),
    (Substring("turn-based strategy"), Genre::Strategy),
    (Substring("real-time strategy"), Genre::Strategy),
    (Substring("strategy game"), Genre::Strategy),
    (Word("rts"), Genre::Strategy),
    (Word("4x"), Genre::Strategy),
    (Substring("first-person shooter"), Genre::Shooter),
    (Substring("first person shooter"), Genre::Shooter),
    (Substring("battle royale"), Genre::Shooter),
    (Substring("tactical shooter"), Genre::Shooter),
    (Word("fps"), Genre::Shooter),
    (Substring("souls-like"), Genre::ActionRpg),
    (Substring("soulslike"), Genre::ActionRpg),
    (Substring("open world rpg"), Genre::Rpg),
    (Substring("open world role-playing"), Genre::Rpg),
    (Substring("roguelike"), Genre::Roguelike),
    (Substring("rogue-like"), Genre::Roguelike),
];

/// Provider genre name (lower-case) -> canonical label.
/// Includes IGDB's own genre names alongside common aliases.
const GENRE_MAPPINGS: &[(&str, Genre)] = &[
    ("action", Genre::Action),
    ("arcade", Genre::Action),
    ("hack and slash", Genre::Action),
    ("hack and slash/beat 'em up", Genre::Action),
    ("beat 'em up", Genre::Action),
    ("platformer", Genre::Action),
    ("platform", Genre::Action),
    ("adventure", Genre::Adventure),
    ("point-and-click", Genre::Adventure),
    ("visual novel", Genre::Adventure),
    ("shooter", Genre::Shooter),
    ("tactical shooter", Genre::Shooter),
    ("role-playing (rpg)", Genre::Rpg),
    ("role-playing", Genre::Rpg),
    ("rpg", Genre::Rpg),
    ("jrpg", Genre::Rpg),
    ("action rpg", Genre::ActionRpg),
    ("action role-playing", Genre::ActionRpg),
    ("strategy", Genre::Strategy),
    ("real-time strategy (rts)", Genre::Strategy),
    ("real time strategy (rts)", Genre::Strategy),
    ("turn-based strategy", Genre::Strategy),
    ("turn-based strategy (tbs)", Genre::Strategy),
    ("tactical", Genre::Strategy),
    ("moba", Genre::Strategy),
    ("fighting", Genre::Fighting),
    ("racing", Genre::Racing),
    ("sport", Genre::Sports),
    ("sports", Genre::Sports),
    ("simulation", Genre::Simulation),
    ("simulator", Genre::Simulation),
    ("puzzle", Genre::Puzzle),
    ("roguelike", Genre::Roguelike),
    ("rogue-like", Genre::Roguelike),
    ("indie", Genre::Other),
    ("music", Genre::Other),
    ("pinball", Genre::Other),
    ("card", Genre::Other),
    ("card & board game", Genre::Other),
    ("board", Genre::Other),
    ("quiz", Genre::Other),
    ("quiz/trivia", Genre::Other),
];

static PHRASE_PATTERNS: LazyLock<Vec<(Regex, Genre)>> = LazyLock::new(|| {
    PHRASES
        .iter()
        .map(|(phrase, genre)| {
            let pattern = match phrase {
                Substring(text) => regex::escape(text),
                Word(text) => format!(r"\b{}\b", regex::escape(text)),
            };
            let re = Regex::new(&pattern).expect("phrase patterns are escaped literals");
            (re, *genre)
        })
        .collect()
});

static GENRE_TABLE: LazyLock<HashMap<&'static str, Genre>> =
    LazyLock::new(|| GENRE_MAPPINGS.iter().copied().collect());

/// Resolve a single canonical genre from provider metadata.
///
/// Pure and deterministic; never fails. `None` means no signal of any kind
/// was available and should be shown as "unknown", not as Other.
pub fn resolve<S: AsRef<str>>(
    name: Option<&str>,
    summary: Option<&str>,
    provider_genres: &[S],
    provider_themes: &[S],
) -> Option<Genre> {
    if has_horror_theme(provider_themes) {
        return Some(Genre::Horror);
    }

    let text = combined_text(name, summary);
    if let Some(genre) = phrase_override(&text) {
        return Some(genre);
    }

    let candidates: HashSet<Genre> = provider_genres
        .iter()
        .filter_map(|g| map_provider_genre(g.as_ref()))
        .collect();

    if candidates.is_empty() {
        return if text.is_empty() { None } else { Some(Genre::Other) };
    }

    if candidates.contains(&Genre::Rpg) && candidates.contains(&Genre::Action) {
        return Some(Genre::ActionRpg);
    }

    Genre::PRIORITY
        .into_iter()
        .find(|genre| candidates.contains(genre))
}

/// Same as [`resolve`], returning the stored string form.
pub fn resolve_label<S: AsRef<str>>(
    name: Option<&str>,
    summary: Option<&str>,
    provider_genres: &[S],
    provider_themes: &[S],
) -> Option<&'static str> {
    resolve(name, summary, provider_genres, provider_themes).map(|g| g.as_str())
}

/// Map one provider genre name to a canonical label.
///
/// Exact (case-insensitive) match first, then the longest table key the
/// name starts with. Returns `None` for names the table does not know.
pub fn map_provider_genre(raw: &str) -> Option<Genre> {
    let key = raw.trim().to_lowercase();
    if let Some(genre) = GENRE_TABLE.get(key.as_str()) {
        return Some(*genre);
    }

    GENRE_MAPPINGS
        .iter()
        .filter(|(prefix, _)| key.starts_with(prefix))
        .max_by_key(|(prefix, _)| prefix.len())
        .map(|(_, genre)| *genre)
}

fn has_horror_theme<S: AsRef<str>>(themes: &[S]) -> bool {
    themes.iter().any(|theme| {
        let theme = theme.as_ref().to_lowercase();
        theme.contains("horror") || theme.contains("survival")
    })
}

fn combined_text(name: Option<&str>, summary: Option<&str>) -> String {
    let name = name.unwrap_or_default().trim();
    let summary = summary.unwrap_or_default().trim();
    format!("{name} {summary}").trim().to_lowercase()
}

fn phrase_override(text: &str) -> Option<Genre> {
    if text.is_empty() {
        return None;
    }
    PHRASE_PATTERNS
        .iter()
        .find(|(re, _)| re.is_match(text))
        .map(|(_, genre)| *genre)
}
