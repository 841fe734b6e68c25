//! Integration tests for genre resolution against realistic backlog entries.

use checkpoint_core::resolver::resolve_label;
use checkpoint_core::{resolve, DisplayBucket, Genre, GenreInput};
use proptest::prelude::*;

const NONE: &[&str] = &[];

// ---------------------------------------------------------------------------
// Fallbacks
// ---------------------------------------------------------------------------

#[test]
fn test_no_input_is_unknown() {
    assert_eq!(resolve(None, None, NONE, NONE), None);
    assert_eq!(resolve(Some(""), Some("   "), NONE, NONE), None);
}

#[test]
fn test_name_only_is_other() {
    assert_eq!(resolve(Some("Some Game"), None, NONE, NONE), Some(Genre::Other));
}

#[test]
fn test_unmapped_genres_with_text_fall_back_to_other() {
    assert_eq!(
        resolve(Some("Mystery Box"), None, &["Experimental"], NONE),
        Some(Genre::Other)
    );
}

// ---------------------------------------------------------------------------
// Overrides
// ---------------------------------------------------------------------------

#[test]
fn test_horror_theme_beats_adventure_genre() {
    assert_eq!(
        resolve(Some("Game"), None, &["Adventure"], &["Horror"]),
        Some(Genre::Horror)
    );
}

#[test]
fn test_survival_horror_phrase() {
    assert_eq!(
        resolve(
            Some("Resident Evil"),
            Some("A survival horror game."),
            &["Adventure"],
            NONE
        ),
        Some(Genre::Horror)
    );
}

#[test]
fn test_horror_theme_beats_strategy_and_rpg_phrases() {
    let label = resolve_label(
        Some("Darkest Descent"),
        Some("A turn-based strategy game with open world RPG elements."),
        &["Strategy", "Role-playing (RPG)"],
        &["Horror"],
    );
    assert_eq!(label, Some("Horror"));
}

#[test]
fn test_civilization_is_strategy() {
    let genre = resolve(
        Some("Sid Meier's Civilization VI"),
        Some("Civilization VI is a turn-based strategy game in which you build an empire."),
        &["Strategy", "Turn-based strategy (TBS)"],
        NONE,
    );
    assert_eq!(genre, Some(Genre::Strategy));

    let genre = resolve(
        Some("Civ VI"),
        Some("Turn-based strategy game. Build an empire."),
        &["Strategy", "Turn-based"],
        NONE,
    );
    assert_eq!(genre, Some(Genre::Strategy));
}

#[test]
fn test_fps_needs_word_boundary() {
    assert_eq!(
        resolve(Some("Speedrunner"), Some("Runs at 60fps on every platform."), NONE, NONE),
        Some(Genre::Other)
    );
    assert_eq!(
        resolve(Some("Speedrunner"), Some("Runs at 60 fps on every platform."), NONE, NONE),
        Some(Genre::Shooter)
    );
}

#[test]
fn test_generic_words_do_not_pick_strategy() {
    assert_eq!(
        resolve(Some("Tactics Arena"), Some("A campaign of magic and tactics."), NONE, NONE),
        Some(Genre::Other)
    );
}

// ---------------------------------------------------------------------------
// Provider genres
// ---------------------------------------------------------------------------

#[test]
fn test_rpg_and_action_collapse_in_any_order() {
    for genres in [["RPG", "Action"], ["Action", "RPG"]] {
        assert_eq!(
            resolve(Some("Game"), None, &genres, NONE),
            Some(Genre::ActionRpg)
        );
    }
}

#[test]
fn test_three_genres_collapse_to_action_rpg() {
    assert_eq!(
        resolve_label(Some("Game"), None, &["Adventure", "Action", "RPG"], NONE),
        Some("Action RPG")
    );
}

#[test]
fn test_provider_genres_are_case_insensitive() {
    let lower = resolve(Some("Game"), None, &["shooter"], NONE);
    let upper = resolve(Some("Game"), None, &["SHOOTER"], NONE);
    let padded = resolve(Some("Game"), None, &["  Shooter "], NONE);
    assert_eq!(lower, Some(Genre::Shooter));
    assert_eq!(lower, upper);
    assert_eq!(lower, padded);
}

#[test]
fn test_role_playing_label_is_rpg() {
    assert_eq!(
        resolve(Some("Game"), None, &["Role-Playing (RPG)"], NONE),
        Some(Genre::Rpg)
    );
}

#[test]
fn test_priority_pick_prefers_shooter_over_adventure() {
    assert_eq!(
        resolve(Some("Game"), None, &["Adventure", "Shooter", "Puzzle"], NONE),
        Some(Genre::Shooter)
    );
}

#[test]
fn test_builder_matches_free_function() {
    let input = GenreInput::new(Some("Hades"), Some("A rogue-like dungeon crawler."))
        .with_genres(&["Action", "Indie"])
        .with_themes(&["Fantasy"]);
    assert_eq!(input.resolve(), Some(Genre::Roguelike));
    assert_eq!(
        input.resolve(),
        resolve(input.name, input.summary, &input.genres, &input.themes)
    );
}

#[test]
fn test_every_result_has_a_bucket() {
    let cases: [(&str, &[&str]); 4] = [
        ("Forza", &["Racing"]),
        ("Tetris", &["Puzzle"]),
        ("Street Brawler", &["Fighting"]),
        ("FIFA", &["Sport"]),
    ];
    let buckets: Vec<DisplayBucket> = cases
        .iter()
        .map(|(name, genres)| resolve(Some(*name), None, *genres, NONE))
        .map(|g| DisplayBucket::from(g.unwrap()))
        .collect();
    assert_eq!(
        buckets,
        vec![
            DisplayBucket::SimSports,
            DisplayBucket::Strategy,
            DisplayBucket::Action,
            DisplayBucket::SimSports,
        ]
    );
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

fn provider_genre() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::sample::select(vec![
            "Action",
            "Adventure",
            "Role-playing (RPG)",
            "Shooter",
            "Strategy",
            "Turn-based strategy (TBS)",
            "Racing",
            "Sport",
            "Simulator",
            "Puzzle",
            "Fighting",
            "Indie",
            "Hack and slash/Beat 'em up",
            "Card & Board Game",
        ])
        .prop_map(str::to_string),
        "[A-Za-z ()'/&-]{0,24}",
    ]
}

fn provider_theme() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::sample::select(vec!["Horror", "Survival", "Fantasy", "Science fiction", "Comedy"])
            .prop_map(str::to_string),
        "[A-Za-z ]{0,16}",
    ]
}

proptest! {
    #[test]
    fn prop_resolution_is_idempotent(
        name in proptest::option::of(".{0,40}"),
        summary in proptest::option::of(".{0,120}"),
        genres in prop::collection::vec(provider_genre(), 0..5),
        themes in prop::collection::vec(provider_theme(), 0..4),
    ) {
        let first = resolve(name.as_deref(), summary.as_deref(), &genres, &themes);
        let second = resolve(name.as_deref(), summary.as_deref(), &genres, &themes);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_result_is_in_vocabulary(
        name in proptest::option::of(".{0,40}"),
        summary in proptest::option::of(".{0,120}"),
        genres in prop::collection::vec(provider_genre(), 0..5),
        themes in prop::collection::vec(provider_theme(), 0..4),
    ) {
        if let Some(label) = resolve_label(name.as_deref(), summary.as_deref(), &genres, &themes) {
            prop_assert!(Genre::ALL.iter().any(|g| g.as_str() == label));
            prop_assert_eq!(label.parse::<Genre>().map(|g| g.as_str()), Ok(label));
        }
    }

    #[test]
    fn prop_genre_order_does_not_matter(
        genres in prop::collection::vec(provider_genre(), 0..5),
    ) {
        let no_themes: Vec<String> = Vec::new();
        let mut reversed = genres.clone();
        reversed.reverse();
        prop_assert_eq!(
            resolve(Some("Game"), None, &genres, &no_themes),
            resolve(Some("Game"), None, &reversed, &no_themes)
        );
    }
}
