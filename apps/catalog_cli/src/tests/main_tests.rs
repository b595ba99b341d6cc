use super::*;

fn parse(args: &[&str]) -> Args {
    Args::try_parse_from(std::iter::once("catalog_cli").chain(args.iter().copied()))
        .expect("args")
}

#[test]
fn recommendation_message_omits_default_view() {
    let genre = GenreId::from("horror");
    assert_eq!(
        no_recommendation_message(CatalogView::All, &genre),
        "no unwatched movie in genre horror"
    );
    assert_eq!(
        no_recommendation_message(CatalogView::Watched, &genre),
        "no unwatched movie in genre horror (watched view)"
    );
}

#[test]
fn only_editing_commands_mutate() {
    for args in [
        &["add", "--title", "Jaws", "--year", "1975"][..],
        &["remove", "1"],
        &["toggle", "1"],
        &["add-genre", "Western"],
        &["remove-genre", "test-genre"],
    ] {
        assert!(parse(args).command.mutates(), "{args:?} should mutate");
    }
    for args in [
        &["list"][..],
        &["genres"],
        &["grouped"],
        &["recommend", "test-genre"],
    ] {
        assert!(!parse(args).command.mutates(), "{args:?} should not mutate");
    }
}

#[test]
fn view_flag_parses_into_catalog_view() {
    match parse(&["list", "--view", "unwatched", "--search", "spider"]).command {
        Command::List { view, search, .. } => {
            assert_eq!(view, CatalogView::Unwatched);
            assert_eq!(search.as_deref(), Some("spider"));
        }
        other => panic!("unexpected command: {other:?}"),
    }
}
