//! Scorecard service: validation, ownership, sharing and patches.

use std::sync::Arc;

use scorebook_core::{
    FieldSpec, NewScorecard, ScoreError, ScorecardId, ScorecardKind, ScorecardPatch,
    ScorecardService, UserId,
};
use scorebook_state::fakes::MemoryScorecardStore;
use scorebook_state::{
    FieldType, FieldValue, ScorecardStore, ScorecardValue, SurrealHandle, SurrealScorecardStore,
};

fn alice() -> UserId {
    UserId::new("alice")
}

fn bob() -> UserId {
    UserId::new("bob")
}

#[tokio::test]
async fn create_normalizes_input() {
    let service = ScorecardService::new(MemoryScorecardStore::new());
    let mut input = NewScorecard::from_template("  Club final  ", ScorecardKind::Cricket)
        .with_description("   ");
    input.fields[0].id = Some("team".to_string());

    let card = service.create(&alice(), input).await.unwrap();

    assert_eq!(card.title, "Club final");
    assert_eq!(card.description, None);
    assert_eq!(card.created_by, alice());
    assert!(!card.is_public);
    assert!(card.share_token.is_none());
    assert_eq!(card.created_at, card.updated_at);
    assert_eq!(card.fields[0].id, "team");
    let orders: Vec<u32> = card.fields.iter().map(|f| f.order).collect();
    assert_eq!(orders, vec![0, 1, 2, 3]);
}

#[tokio::test]
async fn create_requires_title_and_fields() {
    let service = ScorecardService::new(MemoryScorecardStore::new());

    let err = service
        .create(&alice(), NewScorecard::from_template(" ", ScorecardKind::Custom))
        .await
        .unwrap_err();
    assert!(matches!(err, ScoreError::Validation(_)));

    let mut empty = NewScorecard::from_template("No fields", ScorecardKind::Custom);
    empty.fields.clear();
    let err = service.create(&alice(), empty).await.unwrap_err();
    assert!(matches!(err, ScoreError::Validation(_)));
}

#[tokio::test]
async fn values_must_reference_known_fields() {
    let service = ScorecardService::new(MemoryScorecardStore::new());
    let mut input = NewScorecard::from_template("Derby", ScorecardKind::Football);
    input.values.push(ScorecardValue {
        field_id: "missing".to_string(),
        value: FieldValue::Number(2.0),
    });
    let err = service.create(&alice(), input).await.unwrap_err();
    assert!(matches!(err, ScoreError::Validation(_)));
}

#[tokio::test]
async fn only_the_owner_may_mutate() {
    let service = ScorecardService::new(MemoryScorecardStore::new());
    let card = service
        .create(&alice(), NewScorecard::from_template("Mine", ScorecardKind::Custom))
        .await
        .unwrap();

    let patch = ScorecardPatch {
        title: Some("Stolen".to_string()),
        ..Default::default()
    };
    assert!(matches!(
        service.update(&bob(), &card.id, patch).await.unwrap_err(),
        ScoreError::Forbidden { .. }
    ));
    assert!(matches!(
        service.share(&bob(), &card.id).await.unwrap_err(),
        ScoreError::Forbidden { .. }
    ));
    assert!(matches!(
        service.delete(&bob(), &card.id).await.unwrap_err(),
        ScoreError::Forbidden { .. }
    ));

    // Reads by id are open.
    assert_eq!(service.get(&card.id).await.unwrap().title, "Mine");
}

#[tokio::test]
async fn unknown_id_is_not_found() {
    let service = ScorecardService::new(MemoryScorecardStore::new());
    let id = ScorecardId("nope".to_string());
    assert!(matches!(
        service.get(&id).await.unwrap_err(),
        ScoreError::ScorecardNotFound(_)
    ));
    assert!(matches!(
        service.delete(&alice(), &id).await.unwrap_err(),
        ScoreError::ScorecardNotFound(_)
    ));
}

#[tokio::test]
async fn patch_replaces_only_listed_parts() {
    let service = ScorecardService::new(MemoryScorecardStore::new());
    let card = service
        .create(
            &alice(),
            NewScorecard::from_template("Nets", ScorecardKind::Custom).with_description("Tuesday"),
        )
        .await
        .unwrap();
    let score_id = card.fields[1].id.clone();

    let updated = service
        .update(
            &alice(),
            &card.id,
            ScorecardPatch {
                values: Some(vec![ScorecardValue {
                    field_id: score_id.clone(),
                    value: FieldValue::Number(88.0),
                }]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.title, "Nets");
    assert_eq!(updated.description.as_deref(), Some("Tuesday"));
    assert_eq!(updated.fields, card.fields);
    assert_eq!(updated.value_of(&score_id), Some(&FieldValue::Number(88.0)));
    assert!(updated.updated_at >= card.updated_at);
    assert_eq!(updated.created_at, card.created_at);
}

#[tokio::test]
async fn replacing_fields_drops_orphaned_values() {
    let service = ScorecardService::new(MemoryScorecardStore::new());
    let card = service
        .create(&alice(), NewScorecard::from_template("Nets", ScorecardKind::Custom))
        .await
        .unwrap();
    let team_id = card.fields[0].id.clone();
    let card = service
        .set_values(
            &alice(),
            &card.id,
            &[
                ("Team Name".to_string(), "Royals".to_string()),
                ("score".to_string(), "140".to_string()),
            ],
        )
        .await
        .unwrap();
    assert_eq!(card.values.len(), 2);

    let keep_team = card.fields[0].clone();
    let updated = service
        .update(
            &alice(),
            &card.id,
            ScorecardPatch {
                fields: Some(vec![
                    FieldSpec {
                        id: Some(team_id.clone()),
                        name: keep_team.name,
                        field_type: keep_team.field_type,
                        options: None,
                        required: true,
                    },
                    FieldSpec::new("Won", FieldType::Checkbox, false),
                ]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.fields.len(), 2);
    assert_eq!(updated.values.len(), 1);
    assert_eq!(
        updated.value_of(&team_id),
        Some(&FieldValue::Text("Royals".to_string()))
    );
}

#[tokio::test]
async fn set_values_parses_by_field_type() {
    let service = ScorecardService::new(MemoryScorecardStore::new());
    let card = service
        .create(&alice(), NewScorecard::from_template("Derby", ScorecardKind::Football))
        .await
        .unwrap();

    let err = service
        .set_values(&alice(), &card.id, &[("Goals".to_string(), "two".to_string())])
        .await
        .unwrap_err();
    assert!(matches!(err, ScoreError::Validation(_)));

    let err = service
        .set_values(&alice(), &card.id, &[("Corners".to_string(), "3".to_string())])
        .await
        .unwrap_err();
    assert!(matches!(err, ScoreError::Validation(_)));

    let card = service
        .set_values(&alice(), &card.id, &[("goals".to_string(), "2".to_string())])
        .await
        .unwrap();
    let goals = &card.fields[1].id;
    assert_eq!(card.value_of(goals), Some(&FieldValue::Number(2.0)));

    let card = service
        .set_values(&alice(), &card.id, &[("Goals".to_string(), "3".to_string())])
        .await
        .unwrap();
    assert_eq!(card.values.len(), 1);
    assert_eq!(card.value_of(goals), Some(&FieldValue::Number(3.0)));
}

#[tokio::test]
async fn required_fields_may_stay_empty() {
    let service = ScorecardService::new(MemoryScorecardStore::new());
    let card = service
        .create(&alice(), NewScorecard::from_template("Nets", ScorecardKind::Cricket))
        .await
        .unwrap();
    assert!(card.fields.iter().all(|f| f.required));
    assert!(card.values.is_empty());

    let card = service
        .set_values(&alice(), &card.id, &[("Runs".to_string(), "12".to_string())])
        .await
        .unwrap();
    assert_eq!(card.values.len(), 1);

    let card = service
        .update(
            &alice(),
            &card.id,
            ScorecardPatch {
                values: Some(Vec::new()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(card.values.is_empty());

    let token = service.share(&alice(), &card.id).await.unwrap();
    assert_eq!(service.get_shared(&token).await.unwrap().id, card.id);
}

#[tokio::test]
async fn share_issues_token_for_public_lookup() {
    let service = ScorecardService::new(MemoryScorecardStore::new());
    let card = service
        .create(&alice(), NewScorecard::from_template("Final", ScorecardKind::Cricket))
        .await
        .unwrap();

    let token = service.share(&alice(), &card.id).await.unwrap();
    let shared = service.get_shared(&token).await.unwrap();
    assert_eq!(shared.id, card.id);
    assert!(shared.is_public);

    // A second share rotates the token.
    let rotated = service.share(&alice(), &card.id).await.unwrap();
    assert_ne!(rotated, token);
    assert!(matches!(
        service.get_shared(&token).await.unwrap_err(),
        ScoreError::SharedScorecardNotFound(_)
    ));

    // Turning the card private hides it from token lookups.
    service
        .update(
            &alice(),
            &card.id,
            ScorecardPatch {
                is_public: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(matches!(
        service.get_shared(&rotated).await.unwrap_err(),
        ScoreError::SharedScorecardNotFound(_)
    ));
}

async fn lifecycle<S: ScorecardStore>(service: ScorecardService<S>) {
    let first = service
        .create(&alice(), NewScorecard::from_template("First", ScorecardKind::Custom))
        .await
        .unwrap();
    let second = service
        .create(&alice(), NewScorecard::from_template("Second", ScorecardKind::Cricket))
        .await
        .unwrap();
    service
        .create(&bob(), NewScorecard::from_template("Bob's", ScorecardKind::Football))
        .await
        .unwrap();

    let mine = service.list(&alice()).await.unwrap();
    let titles: Vec<&str> = mine.iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, vec!["Second", "First"]);

    service.delete(&alice(), &second.id).await.unwrap();
    let mine = service.list(&alice()).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].id, first.id);
}

#[tokio::test]
async fn lifecycle_on_memory_store() {
    lifecycle(ScorecardService::new(MemoryScorecardStore::new())).await;
}

#[tokio::test]
async fn lifecycle_on_surreal_store() {
    let handle = Arc::new(SurrealHandle::setup_db().await.unwrap());
    lifecycle(ScorecardService::new(SurrealScorecardStore::new(handle))).await;
}
