use engine::directory::{display_name, restore_umlaut_digraphs};
use engine::{Config, MapFetcher, MonsterEntry, StatblockError, list_monsters, search};

const LISTING: &str = r#"{
  "result": {
    "objects": [
      "https://openrpg.de/srd/5e/de/api/monster/junger-roter-drache/",
      "https://openrpg.de/srd/5e/de/api/monster/goblin/",
      "https://openrpg.de/srd/5e/de/api/monster/alter-gruener-drache/",
      "https://openrpg.de/srd/5e/de/api/zauber/feuerball/",
      42
    ]
  }
}"#;

fn entry(name: &str) -> MonsterEntry {
    MonsterEntry {
        name: name.to_string(),
        url: String::new(),
    }
}

#[test]
fn title_cases_segments() {
    assert_eq!(display_name("adult-red-dragon", false), "Adult Red Dragon");
    assert_eq!(display_name("goblin", true), "Goblin");
}

#[test]
fn umlaut_digraphs_restored_before_capitalising() {
    assert_eq!(display_name("gro-er-ae-ae", true), "Gro Er Ä Ä");
    assert_eq!(display_name("gro-er-ae-ae", false), "Gro Er Ae Ae");
    assert_eq!(display_name("alter-gruener-drache", true), "Alter Grüner Drache");
    assert_eq!(restore_umlaut_digraphs("Aeffchen Oel Ueber"), "Äffchen Öl Über");
}

#[test]
fn eu_and_au_words_keep_their_spelling() {
    assert_eq!(display_name("feuer-elementar", true), "Feuer Elementar");
    assert_eq!(display_name("ungeheuer", true), "Ungeheuer");
    assert_eq!(display_name("abenteurer", true), "Abenteurer");
    assert_eq!(display_name("grauer-schleim", true), "Grauer Schleim");
    assert_eq!(display_name("feuer-baer", true), "Feuer Bär");
    // vowel pairs outside eu/au/qu cannot be told apart from digraphs
    assert_eq!(display_name("poet", true), "Pöt");
}

#[test]
fn listing_maps_urls_to_entries() {
    let config = Config::default();
    let fetcher = MapFetcher::new().with(config.directory_url(), LISTING);
    let monsters = list_monsters(&fetcher, &config).unwrap();
    assert_eq!(
        monsters.iter().map(|m| m.name.as_str()).collect::<Vec<_>>(),
        ["Junger Roter Drache", "Goblin", "Alter Grüner Drache"]
    );
    assert_eq!(
        monsters[1].url,
        "https://openrpg.de/srd/5e/de/api/monster/goblin/fantasystatblocks.yaml"
    );
    assert_eq!(fetcher.requests(), ["https://openrpg.de/srd/5e/de/api/monster"]);
}

#[test]
fn envelope_without_objects_is_empty() {
    let config = Config::default();
    let fetcher = MapFetcher::new().with(config.directory_url(), r#"{"result": {}}"#);
    assert!(list_monsters(&fetcher, &config).unwrap().is_empty());
    let fetcher = MapFetcher::new().with(config.directory_url(), r#"{"status": "ok"}"#);
    assert!(list_monsters(&fetcher, &config).unwrap().is_empty());
}

#[test]
fn network_and_shape_failures_are_directory_errors() {
    let config = Config::default();
    let offline = MapFetcher::new();
    assert!(matches!(
        list_monsters(&offline, &config),
        Err(StatblockError::DirectoryFetchFailed(_))
    ));
    let html = MapFetcher::new().with(config.directory_url(), "<html>502</html>");
    assert!(matches!(
        list_monsters(&html, &config),
        Err(StatblockError::DirectoryFetchFailed(_))
    ));
}

#[test]
fn search_is_case_insensitive_and_ordered() {
    let entries = vec![
        entry("Junger Roter Drache"),
        entry("Goblin"),
        entry("Alter Grüner Drache"),
    ];
    let hits: Vec<_> = search(&entries, "DRACHE").into_iter().map(|m| m.name.as_str()).collect();
    assert_eq!(hits, ["Junger Roter Drache", "Alter Grüner Drache"]);
    assert_eq!(search(&entries, "").len(), 3);
    assert!(search(&entries, "lich").is_empty());
}
