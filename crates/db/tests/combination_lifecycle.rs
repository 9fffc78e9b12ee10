//! Integration tests for the combination repository lifecycle invariants:
//! tuple uniqueness, the deployed-row lock, mixed bulk deletes, and the
//! deploy claim.

use adcraft_core::combo::ComboTuple;
use adcraft_core::scoring::CombinationScores;
use adcraft_db::models::ad_set::CreateAdSet;
use adcraft_db::models::combination::{CombinationStatus, NewCombination};
use adcraft_db::models::fragment::CreateFragment;
use adcraft_db::repositories::{AdSetRepo, CombinationRepo, FragmentRepo, MutationOutcome};
use assert_matches::assert_matches;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_adset(pool: &PgPool) -> i64 {
    AdSetRepo::create(
        pool,
        &CreateAdSet {
            name: "summer-sale".to_string(),
            external_id: None,
        },
    )
    .await
    .expect("create ad set")
    .id
}

async fn seed_fragment(pool: &PgPool, ad_set_id: i64, kind: &str, content: &str) -> i64 {
    let media_kind = (kind == "asset").then(|| "image".to_string());
    FragmentRepo::create(
        pool,
        &CreateFragment {
            ad_set_id,
            kind: kind.to_string(),
            content: content.to_string(),
            media_kind,
            width: None,
            height: None,
            generated_by_ai: None,
        },
    )
    .await
    .expect("create fragment")
    .id
}

/// Seed one fragment per mandatory kind and return a tuple over them.
async fn seed_tuple(pool: &PgPool, ad_set_id: i64) -> ComboTuple {
    ComboTuple {
        asset_id: seed_fragment(pool, ad_set_id, "asset", "uploads/beach.png").await,
        hook_id: None,
        headline_id: seed_fragment(pool, ad_set_id, "headline", "Summer sale").await,
        body_id: seed_fragment(pool, ad_set_id, "body", "Everything must go.").await,
        description_id: seed_fragment(pool, ad_set_id, "description", "Up to 50% off").await,
        cta_text_id: seed_fragment(pool, ad_set_id, "cta_text", "Shop the sale").await,
        cta_type: "SHOP_NOW".to_string(),
    }
}

fn new_combination(tuple: ComboTuple) -> NewCombination {
    NewCombination {
        tuple,
        scores: CombinationScores {
            hook: 50,
            alignment: 60,
            fit: 70,
            clarity: 80,
            matching: 55,
            overall: 63,
        },
        predicted_engagement: 1.53,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn create_and_list_orders_by_score(pool: PgPool) {
    let ad_set_id = seed_adset(&pool).await;
    let tuple_a = seed_tuple(&pool, ad_set_id).await;
    let mut tuple_b = tuple_a.clone();
    tuple_b.cta_type = "LEARN_MORE".to_string();

    let mut row_a = new_combination(tuple_a);
    row_a.scores.overall = 40;
    let mut row_b = new_combination(tuple_b);
    row_b.scores.overall = 90;

    let created = CombinationRepo::create_many(&pool, ad_set_id, &[row_a, row_b])
        .await
        .expect("batch insert");
    assert_eq!(created.len(), 2);
    assert!(created
        .iter()
        .all(|c| c.status == CombinationStatus::Pending));

    let listed = CombinationRepo::list_by_adset(&pool, ad_set_id).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].score_overall, 90);
    assert_eq!(listed[1].score_overall, 40);
}

#[sqlx::test(migrations = "./migrations")]
async fn duplicate_tuple_rejected_by_unique_index(pool: PgPool) {
    let ad_set_id = seed_adset(&pool).await;
    let tuple = seed_tuple(&pool, ad_set_id).await;

    CombinationRepo::create_many(&pool, ad_set_id, &[new_combination(tuple.clone())])
        .await
        .expect("first insert");

    let err = CombinationRepo::create_many(&pool, ad_set_id, &[new_combination(tuple)])
        .await
        .expect_err("duplicate tuple must violate uq_combinations_tuple");
    assert_matches!(err, sqlx::Error::Database(db) if db.constraint() == Some("uq_combinations_tuple"));
}

#[sqlx::test(migrations = "./migrations")]
async fn null_hooks_participate_in_uniqueness(pool: PgPool) {
    let ad_set_id = seed_adset(&pool).await;
    let tuple = seed_tuple(&pool, ad_set_id).await;
    assert!(tuple.hook_id.is_none());

    CombinationRepo::create_many(&pool, ad_set_id, &[new_combination(tuple.clone())])
        .await
        .expect("first insert");

    // Two NULL hooks are the same tuple thanks to the COALESCE index.
    let err = CombinationRepo::create_many(&pool, ad_set_id, &[new_combination(tuple)])
        .await
        .expect_err("NULL hook must not bypass uniqueness");
    assert_matches!(err, sqlx::Error::Database(_));
}

#[sqlx::test(migrations = "./migrations")]
async fn existing_tuples_round_trip(pool: PgPool) {
    let ad_set_id = seed_adset(&pool).await;
    let tuple = seed_tuple(&pool, ad_set_id).await;
    CombinationRepo::create_many(&pool, ad_set_id, &[new_combination(tuple.clone())])
        .await
        .unwrap();

    let tuples = CombinationRepo::existing_tuples(&pool, ad_set_id).await.unwrap();
    assert_eq!(tuples, vec![tuple]);
}

#[sqlx::test(migrations = "./migrations")]
async fn deployed_row_is_locked(pool: PgPool) {
    let ad_set_id = seed_adset(&pool).await;
    let tuple = seed_tuple(&pool, ad_set_id).await;
    let created = CombinationRepo::create_many(&pool, ad_set_id, &[new_combination(tuple)])
        .await
        .unwrap();
    let id = created[0].id;

    // Drive to deployed through the claim.
    CombinationRepo::claim_for_deploy(&pool, ad_set_id, id)
        .await
        .unwrap()
        .expect("claim");
    let deployed = CombinationRepo::mark_deployed(&pool, id, "act_123/ads/456")
        .await
        .unwrap()
        .expect("mark deployed");
    assert_eq!(deployed.status, CombinationStatus::Deployed);
    assert_eq!(deployed.external_ad_id.as_deref(), Some("act_123/ads/456"));

    // Locked against delete, CTA edit, and re-claim.
    assert_matches!(
        CombinationRepo::delete(&pool, ad_set_id, id).await.unwrap(),
        MutationOutcome::Locked
    );
    assert_matches!(
        CombinationRepo::update_cta_type(&pool, ad_set_id, id, "SIGN_UP")
            .await
            .unwrap(),
        MutationOutcome::Locked
    );
    assert!(CombinationRepo::claim_for_deploy(&pool, ad_set_id, id)
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn claim_is_exclusive_until_resolved(pool: PgPool) {
    let ad_set_id = seed_adset(&pool).await;
    let tuple = seed_tuple(&pool, ad_set_id).await;
    let created = CombinationRepo::create_many(&pool, ad_set_id, &[new_combination(tuple)])
        .await
        .unwrap();
    let id = created[0].id;

    let first = CombinationRepo::claim_for_deploy(&pool, ad_set_id, id).await.unwrap();
    assert!(first.is_some());

    // Second claim while deploying must not double-submit.
    let second = CombinationRepo::claim_for_deploy(&pool, ad_set_id, id).await.unwrap();
    assert!(second.is_none());

    // A failed deployment releases the claim for retry.
    let failed = CombinationRepo::mark_deploy_failed(&pool, id, "rate limit hit")
        .await
        .unwrap()
        .expect("mark failed");
    assert_eq!(failed.status, CombinationStatus::DeployFailed);
    assert_eq!(failed.deploy_error.as_deref(), Some("rate limit hit"));

    assert!(CombinationRepo::claim_for_deploy(&pool, ad_set_id, id)
        .await
        .unwrap()
        .is_some());
}

#[sqlx::test(migrations = "./migrations")]
async fn bulk_delete_skips_locked_rows(pool: PgPool) {
    let ad_set_id = seed_adset(&pool).await;
    let base = seed_tuple(&pool, ad_set_id).await;

    // Three rows differing only in CTA type.
    let mut rows = Vec::new();
    for cta_type in ["SHOP_NOW", "LEARN_MORE", "SIGN_UP"] {
        let mut tuple = base.clone();
        tuple.cta_type = cta_type.to_string();
        rows.push(new_combination(tuple));
    }
    let created = CombinationRepo::create_many(&pool, ad_set_id, &rows).await.unwrap();
    let ids: Vec<i64> = created.iter().map(|c| c.id).collect();

    // Deploy the middle one.
    CombinationRepo::claim_for_deploy(&pool, ad_set_id, ids[1])
        .await
        .unwrap()
        .unwrap();
    CombinationRepo::mark_deployed(&pool, ids[1], "act_1/ads/9")
        .await
        .unwrap()
        .unwrap();

    let result = CombinationRepo::delete_many(&pool, ad_set_id, &ids).await.unwrap();
    assert_eq!(result.deleted, 2);
    assert_eq!(result.skipped, 1);

    // The deployed row survives.
    assert!(CombinationRepo::find_by_id(&pool, ids[1]).await.unwrap().is_some());
    assert!(CombinationRepo::find_by_id(&pool, ids[0]).await.unwrap().is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn delete_missing_row_reports_not_found(pool: PgPool) {
    let ad_set_id = seed_adset(&pool).await;
    assert_matches!(
        CombinationRepo::delete(&pool, ad_set_id, 424242).await.unwrap(),
        MutationOutcome::NotFound
    );
}
