//! Integration tests for the fragment store.

use adcraft_db::models::ad_set::CreateAdSet;
use adcraft_db::models::fragment::CreateFragment;
use adcraft_db::repositories::{AdSetRepo, FragmentRepo};
use sqlx::PgPool;

fn new_fragment(ad_set_id: i64, kind: &str, content: &str) -> CreateFragment {
    CreateFragment {
        ad_set_id,
        kind: kind.to_string(),
        content: content.to_string(),
        media_kind: None,
        width: None,
        height: None,
        generated_by_ai: None,
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn create_defaults_generated_flag_to_false(pool: PgPool) {
    let ad_set = AdSetRepo::create(
        &pool,
        &CreateAdSet {
            name: "launch".into(),
            external_id: None,
        },
    )
    .await
    .unwrap();

    let fragment = FragmentRepo::create(&pool, &new_fragment(ad_set.id, "headline", "New drop"))
        .await
        .unwrap();
    assert!(!fragment.generated_by_ai);
    assert_eq!(fragment.kind, "headline");
}

#[sqlx::test(migrations = "./migrations")]
async fn asset_fragment_carries_media_metadata(pool: PgPool) {
    let ad_set = AdSetRepo::create(
        &pool,
        &CreateAdSet {
            name: "launch".into(),
            external_id: None,
        },
    )
    .await
    .unwrap();

    let mut input = new_fragment(ad_set.id, "asset", "generated/abc.png");
    input.media_kind = Some("image".into());
    input.width = Some(1024);
    input.height = Some(1024);
    input.generated_by_ai = Some(true);

    let fragment = FragmentRepo::create(&pool, &input).await.unwrap();
    assert_eq!(fragment.media_kind.as_deref(), Some("image"));
    assert_eq!(fragment.width, Some(1024));
    assert!(fragment.generated_by_ai);
}

#[sqlx::test(migrations = "./migrations")]
async fn media_kind_rejected_on_copy_fragments(pool: PgPool) {
    let ad_set = AdSetRepo::create(
        &pool,
        &CreateAdSet {
            name: "launch".into(),
            external_id: None,
        },
    )
    .await
    .unwrap();

    let mut input = new_fragment(ad_set.id, "body", "Plain copy");
    input.media_kind = Some("image".into());
    assert!(FragmentRepo::create(&pool, &input).await.is_err());
}

#[sqlx::test(migrations = "./migrations")]
async fn list_by_kind_filters(pool: PgPool) {
    let ad_set = AdSetRepo::create(
        &pool,
        &CreateAdSet {
            name: "launch".into(),
            external_id: None,
        },
    )
    .await
    .unwrap();

    for (kind, content) in [
        ("headline", "A"),
        ("headline", "B"),
        ("body", "C"),
    ] {
        FragmentRepo::create(&pool, &new_fragment(ad_set.id, kind, content))
            .await
            .unwrap();
    }

    let headlines = FragmentRepo::list_by_adset_and_kind(&pool, ad_set.id, "headline")
        .await
        .unwrap();
    assert_eq!(headlines.len(), 2);

    let all = FragmentRepo::list_by_adset(&pool, ad_set.id).await.unwrap();
    assert_eq!(all.len(), 3);
}

#[sqlx::test(migrations = "./migrations")]
async fn find_many_returns_only_existing(pool: PgPool) {
    let ad_set = AdSetRepo::create(
        &pool,
        &CreateAdSet {
            name: "launch".into(),
            external_id: None,
        },
    )
    .await
    .unwrap();
    let fragment = FragmentRepo::create(&pool, &new_fragment(ad_set.id, "hook", "Psst"))
        .await
        .unwrap();

    let found = FragmentRepo::find_many(&pool, &[fragment.id, 999_999]).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, fragment.id);
}
