//! Adding and refreshing players through the API client.

mod common;

use serde_json::json;

use champlb::api::ApiError;
use champlb::leaderboard::{
    add_players, standings, update_mastery, LeaderboardError, LeaderboardStore, UpdateScope,
};
use champlb::models::{PlayerRecord, Region, SummonerId};

use common::{batch_names, client, json, mastery_target, status, ScriptedTransport};

fn tracked(id: &str, region: Region, name: &str, mastery: u64) -> PlayerRecord {
    PlayerRecord::new(SummonerId::new(id), region, name).with_mastery(mastery)
}

/// Batch lookups echo every name except "ghost"; mastery is the id times 100,
/// except summoner "bad" which always errors.
fn fake_riot() -> std::sync::Arc<ScriptedTransport> {
    ScriptedTransport::new(|url, _| match mastery_target(url) {
        Some((id, _)) if id == "bad" => status(500),
        Some((id, _)) => {
            let points: u64 = id.parse::<u64>().unwrap_or(0) * 100;
            json(json!({"championPoints": points}))
        }
        None => {
            let found: serde_json::Map<String, serde_json::Value> = batch_names(url)
                .into_iter()
                .filter(|n| n != "ghost")
                .map(|n| {
                    let id = n.trim_start_matches("p").to_string();
                    (n.clone(), json!({"id": id, "name": n.to_uppercase()}))
                })
                .collect();
            json(serde_json::Value::Object(found))
        }
    })
}

#[tokio::test]
async fn test_add_players_stores_mastery_and_reports_unknowns() {
    let api = client(fake_riot());
    let mut store = LeaderboardStore::new();

    let names = vec!["p1".to_string(), "ghost".to_string(), "p2".to_string()];
    let report = add_players(&api, &mut store, Region::Euw, &names, Some(497)).await;

    assert_eq!(report.succeeded.len(), 2);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].item, "ghost");
    assert!(matches!(
        report.failed[0].error,
        LeaderboardError::Api(ApiError::UnknownUser { .. })
    ));

    assert_eq!(store.len(), 2);
    let p2 = store.get(Region::Euw, "P2").unwrap();
    assert_eq!(p2.name, "P2");
    assert_eq!(p2.mastery, 200);
    assert_eq!(p2.region, Region::Euw);
}

#[tokio::test]
async fn test_add_players_without_fetch_leaves_mastery_at_zero() {
    let transport = fake_riot();
    let api = client(transport.clone());
    let mut store = LeaderboardStore::new();

    let names = vec!["p3".to_string()];
    add_players(&api, &mut store, Region::Na, &names, None).await;

    assert_eq!(store.get(Region::Na, "p3").unwrap().mastery, 0);
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test]
async fn test_add_reports_records_the_store_rejects() {
    let transport = ScriptedTransport::new(|_, _| {
        json(json!({
            "p1": {"id": 1, "name": "P1"},
            "blank": {"id": 9, "name": "   "}
        }))
    });
    let api = client(transport);
    let mut store = LeaderboardStore::new();

    let names = vec!["p1".to_string(), "blank".to_string()];
    let report = add_players(&api, &mut store, Region::Na, &names, None).await;

    assert_eq!(report.succeeded.len(), store.len());
    assert_eq!(report.succeeded.len(), 1);
    assert_eq!(report.failed.len(), 1);
    assert!(matches!(report.failed[0].error, LeaderboardError::InvalidName(_)));
    assert!(store.get(Region::Na, "p1").is_some());
}

#[tokio::test]
async fn test_add_existing_player_overwrites_in_place() {
    let api = client(fake_riot());
    let mut store = LeaderboardStore::new();
    store.add(Region::Na, tracked("9", Region::Na, "P1", 5)).unwrap();
    store.add(Region::Na, tracked("8", Region::Na, "Other", 5)).unwrap();

    let names = vec!["p1".to_string()];
    let report = add_players(&api, &mut store, Region::Na, &names, Some(497)).await;

    assert!(report.is_clean());
    assert_eq!(store.len(), 2);
    let p1 = store.get(Region::Na, "p1").unwrap();
    assert_eq!(p1.id, SummonerId::new("1"));
    assert_eq!(p1.mastery, 100);

    // Overwriting keeps the insertion slot.
    let keys: Vec<&String> = store.partitions()[&Region::Na].keys().collect();
    assert_eq!(keys, vec!["p1", "other"]);
}

#[tokio::test(start_paused = true)]
async fn test_update_all_reports_partial_failures() {
    let api = client(fake_riot());
    let mut store = LeaderboardStore::new();
    store.add(Region::Na, tracked("1", Region::Na, "P1", 0)).unwrap();
    store.add(Region::Na, tracked("bad", Region::Na, "Broken", 777)).unwrap();
    store.add(Region::Euw, tracked("3", Region::Euw, "P3", 50)).unwrap();

    let report = update_mastery(&api, &mut store, &UpdateScope::All, 497).await;

    assert_eq!(report.succeeded.len(), 2);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].item, "Broken");
    assert!(matches!(
        report.failed[0].error,
        LeaderboardError::Api(ApiError::FetchFailure { attempts: 4, .. })
    ));

    assert_eq!(store.get(Region::Na, "p1").unwrap().mastery, 100);
    assert_eq!(store.get(Region::Euw, "p3").unwrap().mastery, 300);
    assert_eq!(store.get(Region::Na, "broken").unwrap().mastery, 777);

    let p3 = report.succeeded.iter().find(|c| c.name == "P3").unwrap();
    assert_eq!(p3.previous, 50);
    assert_eq!(p3.delta(), 250);

    let order: Vec<String> = standings(&store, None).into_iter().map(|s| s.name).collect();
    assert_eq!(order, vec!["Broken", "P3", "P1"]);
}

#[tokio::test]
async fn test_update_region_leaves_other_regions_alone() {
    let transport = fake_riot();
    let api = client(transport.clone());
    let mut store = LeaderboardStore::new();
    store.add(Region::Na, tracked("1", Region::Na, "P1", 0)).unwrap();
    store.add(Region::Kr, tracked("2", Region::Kr, "P2", 0)).unwrap();

    let report = update_mastery(&api, &mut store, &UpdateScope::Region(Region::Kr), 497).await;

    assert!(report.is_clean());
    assert_eq!(transport.call_count(), 1);
    assert_eq!(store.get(Region::Kr, "p2").unwrap().mastery, 200);
    assert_eq!(store.get(Region::Na, "p1").unwrap().mastery, 0);
}

#[tokio::test]
async fn test_update_single_player() {
    let api = client(fake_riot());
    let mut store = LeaderboardStore::new();
    store.add(Region::Na, tracked("4", Region::Na, "P 4", 1)).unwrap();
    store.add(Region::Na, tracked("5", Region::Na, "P5", 1)).unwrap();

    let scope = UpdateScope::Player(Region::Na, "p4".to_string());
    let report = update_mastery(&api, &mut store, &scope, 497).await;

    assert_eq!(report.succeeded.len(), 1);
    assert_eq!(store.get(Region::Na, "p4").unwrap().mastery, 400);
    assert_eq!(store.get(Region::Na, "p5").unwrap().mastery, 1);
}

#[tokio::test]
async fn test_update_missing_player_makes_no_call() {
    let transport = fake_riot();
    let api = client(transport.clone());
    let mut store = LeaderboardStore::new();

    let scope = UpdateScope::Player(Region::Na, "Nobody".to_string());
    let report = update_mastery(&api, &mut store, &scope, 497).await;

    assert!(report.succeeded.is_empty());
    assert!(matches!(
        &report.failed[0].error,
        LeaderboardError::MissingRecord { region: Region::Na, key } if key == "nobody"
    ));
    assert_eq!(transport.call_count(), 0);
}
