mod common;

use std::sync::Arc;

use common::{MockWeatherProvider, city};
use dashboard_core::{
    CityRoster, DashboardError, ErrorKind, RefreshStatus, WeatherProvider,
    filter::{ConditionCategory, FilterCriteria, TemperatureBand},
};

fn roster_with(provider: &Arc<MockWeatherProvider>) -> CityRoster {
    CityRoster::new(provider.clone() as Arc<dyn WeatherProvider>)
}

async fn seeded(names: &[(&str, i32)]) -> (Arc<MockWeatherProvider>, CityRoster) {
    let provider = MockWeatherProvider::new();
    for (name, temp) in names {
        provider.succeed(city(name, *temp, "Despejado"));
    }
    let roster = roster_with(&provider);
    for (name, _) in names {
        roster.add(name).await.expect("seed city");
    }
    provider.take_calls();
    (provider, roster)
}

#[tokio::test]
async fn add_appends_in_call_order() {
    let (_, roster) = seeded(&[("Lima", 20), ("Quito", 14), ("Cusco", 9)]).await;

    let names: Vec<String> = roster.snapshot().into_iter().map(|c| c.name).collect();
    assert_eq!(names, ["Lima", "Quito", "Cusco"]);
}

#[tokio::test]
async fn duplicate_is_rejected_without_a_request() {
    let (provider, roster) = seeded(&[("Lima", 20)]).await;
    let before = roster.snapshot();

    let err = roster.add("  lIMA ").await.unwrap_err();

    assert_eq!(err, DashboardError::DuplicateCity("lIMA".into()));
    assert!(provider.calls().is_empty());
    assert_eq!(roster.snapshot(), before);
}

#[tokio::test]
async fn canonical_name_collision_is_a_duplicate() {
    let (provider, roster) = seeded(&[("Lima", 20)]).await;
    provider.respond("Lima, PE", Ok(city("Lima", 21, "Despejado")));

    let err = roster.add("Lima, PE").await.unwrap_err();

    assert_eq!(err, DashboardError::DuplicateCity("Lima".into()));
    assert_eq!(roster.len(), 1);
    assert_eq!(roster.get("lima").unwrap().temperature, 20);
}

#[tokio::test]
async fn failed_add_leaves_roster_unchanged() {
    let (provider, roster) = seeded(&[("Lima", 20)]).await;
    provider.fail("Slowville", DashboardError::RequestTimeout);

    let err = roster.add("Slowville").await.unwrap_err();
    assert_eq!(err, DashboardError::RequestTimeout);

    let err = roster.add("Atlantis").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CityNotFound);

    assert_eq!(roster.len(), 1);
}

#[tokio::test]
async fn blank_name_is_rejected() {
    let provider = MockWeatherProvider::new();
    let roster = roster_with(&provider);

    let err = roster.add("   ").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn refresh_on_empty_roster_is_a_noop() {
    let provider = MockWeatherProvider::new();
    let roster = roster_with(&provider);

    let summary = roster.refresh_all().await.unwrap();

    assert!(summary.is_noop());
    assert_eq!((summary.succeeded, summary.failed), (0, 0));
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn refresh_isolates_a_failing_city() {
    let cities = [("Lima", 20), ("Quito", 14), ("Cusco", 9), ("Arequipa", 22)];
    let (provider, roster) = seeded(&cities).await;
    let before = roster.snapshot();

    for (name, temp) in cities {
        provider.succeed(city(name, temp + 5, "Lluvia ligera"));
    }
    provider.fail("Cusco", DashboardError::ServerError(502));

    let summary = roster.refresh_all().await.unwrap();

    assert_eq!(summary.succeeded, 3);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.succeeded + summary.failed, cities.len());
    assert_eq!(summary.discarded, 0);

    let after = roster.snapshot();
    assert_eq!(after[2], before[2], "failed city keeps its previous snapshot");
    for i in [0, 1, 3] {
        assert_eq!(after[i].temperature, before[i].temperature + 5);
        assert_eq!(after[i].description, "Lluvia ligera");
    }

    let cusco = summary.outcomes.iter().find(|o| o.city == "Cusco").unwrap();
    assert_eq!(cusco.index, 2);
    assert!(!cusco.succeeded());
    assert_eq!(cusco.error_kind(), Some(ErrorKind::ServerError));
}

#[tokio::test]
async fn refresh_launches_every_request_before_any_settles() {
    let (provider, roster) = seeded(&[("Lima", 20), ("Quito", 14), ("Cusco", 9)]).await;
    let gate = provider.hold();

    let refresh = roster.refresh_all();
    let observe = async {
        while provider.calls().len() < 3 {
            tokio::task::yield_now().await;
        }
        // nothing has been applied while requests are pending
        assert_eq!(roster.get("Lima").unwrap().temperature, 20);
        provider.succeed(city("Lima", 30, "Despejado"));
        gate.add_permits(3);
    };

    let (summary, ()) = tokio::join!(refresh, observe);
    let summary = summary.unwrap();

    assert_eq!(summary.attempted(), 3);
    assert_eq!(summary.succeeded, 3);
    assert_eq!(roster.get("Lima").unwrap().temperature, 30);
}

#[tokio::test]
async fn clear_during_refresh_discards_stale_results() {
    let (provider, roster) = seeded(&[("Lima", 20), ("Quito", 14)]).await;
    provider.succeed(city("Arica", 24, "Despejado"));
    let gate = provider.hold();

    let refresh = roster.refresh_all();
    let interfere = async {
        while provider.calls().len() < 2 {
            tokio::task::yield_now().await;
        }
        roster.clear().unwrap();
        provider.release_hold();
        roster.add("Arica").await.unwrap();
        gate.add_permits(2);
    };

    let (summary, ()) = tokio::join!(refresh, interfere);
    let summary = summary.unwrap();

    assert_eq!(summary.discarded, 2);
    assert_eq!(summary.succeeded + summary.failed, 0);
    assert!(summary.outcomes.iter().all(|o| o.status == RefreshStatus::Discarded));

    let names: Vec<String> = roster.snapshot().into_iter().map(|c| c.name).collect();
    assert_eq!(names, ["Arica"]);
    assert_eq!(roster.get("Arica").unwrap().temperature, 24);
}

#[tokio::test]
async fn add_during_refresh_is_left_alone() {
    let (provider, roster) = seeded(&[("Lima", 20), ("Quito", 14)]).await;
    provider.succeed(city("Lima", 26, "Despejado"));
    provider.succeed(city("Quito", 12, "Nubes"));
    provider.succeed(city("Arica", 24, "Despejado"));
    let gate = provider.hold();

    let refresh = roster.refresh_all();
    let interfere = async {
        while provider.calls().len() < 2 {
            tokio::task::yield_now().await;
        }
        provider.release_hold();
        roster.add("Arica").await.unwrap();
        gate.add_permits(2);
    };

    let (summary, ()) = tokio::join!(refresh, interfere);
    let summary = summary.unwrap();

    assert_eq!(summary.attempted(), 2);
    assert_eq!(summary.succeeded, 2);

    let temps: Vec<(String, i32)> =
        roster.snapshot().into_iter().map(|c| (c.name, c.temperature)).collect();
    assert_eq!(
        temps,
        [("Lima".to_string(), 26), ("Quito".to_string(), 12), ("Arica".to_string(), 24)]
    );
}

#[tokio::test]
async fn refresh_that_renames_into_a_sibling_is_rejected() {
    let (provider, roster) = seeded(&[("Lima", 20), ("Callao", 19)]).await;
    provider.respond("Callao", Ok(city("Lima", 25, "Despejado")));

    let summary = roster.refresh_all().await.unwrap();

    assert_eq!(summary.failed, 1);
    let callao = summary.outcomes.iter().find(|o| o.city == "Callao").unwrap();
    assert_eq!(callao.error_kind(), Some(ErrorKind::DuplicateCity));
    assert_eq!(roster.get("Callao").unwrap().temperature, 19);
    assert_eq!(roster.len(), 2);
}

#[tokio::test]
async fn filtered_view_tracks_roster_changes() {
    let provider = MockWeatherProvider::new();
    provider.succeed(city("Lima", 27, "Despejado"));
    provider.succeed(city("Oslo", -2, "Nieve"));
    let roster = roster_with(&provider);
    let criteria = FilterCriteria::default().with_band(TemperatureBand::Cold);

    roster.add("Lima").await.unwrap();
    assert!(roster.filtered(&criteria).is_empty());

    roster.add("Oslo").await.unwrap();
    let visible = roster.filtered(&criteria.clone().with_condition(ConditionCategory::Snow));
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].name, "Oslo");

    roster.clear().unwrap();
    assert!(roster.filtered(&FilterCriteria::default()).is_empty());
}
