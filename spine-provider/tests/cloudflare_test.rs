//! Cloudflare CNAME Provider 集成测试
//!
//! 运行方式:
//! ```bash
//! CLOUDFLARE_API_TOKEN=xxx SPINE_TEST_ROOT_DOMAIN=example.com \
//!     cargo test -p spine-provider --test cloudflare_test -- --ignored --nocapture --test-threads=1
//! ```

mod common;

use common::{TestContext, generate_test_subdomain};
use spine_provider::{CnameProvider, ProviderError};

#[tokio::test]
#[ignore = "integration test: requires CLOUDFLARE_API_TOKEN and SPINE_TEST_ROOT_DOMAIN"]
async fn test_cloudflare_validate_credentials() {
    skip_if_no_credentials!("CLOUDFLARE_API_TOKEN", "SPINE_TEST_ROOT_DOMAIN");

    let ctx = require_some!(TestContext::cloudflare(), "创建测试上下文失败");
    let valid = require_ok!(
        ctx.provider.validate_credentials().await,
        "validate_credentials 调用失败"
    );
    assert!(valid, "凭证应该有效");
}

#[tokio::test]
#[ignore = "integration test: requires CLOUDFLARE_API_TOKEN and SPINE_TEST_ROOT_DOMAIN"]
async fn test_cloudflare_invalid_token_is_rejected() {
    skip_if_no_credentials!("CLOUDFLARE_API_TOKEN");

    let provider = require_ok!(
        spine_provider::CloudflareProvider::new("definitely-not-a-token"),
        "创建 provider 失败"
    );
    let valid = require_ok!(
        provider.validate_credentials().await,
        "validate_credentials 调用失败"
    );
    assert!(!valid, "无效 token 不应通过校验");
}

#[tokio::test]
#[ignore = "integration test: requires CLOUDFLARE_API_TOKEN and SPINE_TEST_ROOT_DOMAIN"]
async fn test_cloudflare_list_available_root_domains() {
    skip_if_no_credentials!("CLOUDFLARE_API_TOKEN", "SPINE_TEST_ROOT_DOMAIN");

    let ctx = require_some!(TestContext::cloudflare(), "创建测试上下文失败");
    let roots = require_ok!(
        ctx.provider.list_available_root_domains().await,
        "list_available_root_domains 调用失败"
    );
    println!("可用根域名: {roots:?}");

    let mut sorted = roots.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(roots, sorted, "结果应排序且去重");
}

#[tokio::test]
#[ignore = "integration test: requires CLOUDFLARE_API_TOKEN and SPINE_TEST_ROOT_DOMAIN"]
async fn test_cloudflare_cname_lifecycle() {
    skip_if_no_credentials!("CLOUDFLARE_API_TOKEN", "SPINE_TEST_ROOT_DOMAIN");

    let ctx = require_some!(TestContext::cloudflare(), "创建测试上下文失败");
    let sub = generate_test_subdomain();

    let created = require_ok!(
        ctx.provider.create_cname("integration-test", &sub, &ctx.root).await,
        "create_cname 调用失败"
    );
    assert_eq!(created.name, format!("{sub}.{}", ctx.root));
    assert_eq!(created.content, ctx.root);
    assert_eq!(created.owner_tag(), Some("integration-test"));

    // 重复创建应报 RecordExists
    let dup = ctx.provider.create_cname("integration-test", &sub, &ctx.root).await;
    assert!(
        matches!(dup, Err(ProviderError::RecordExists { .. })),
        "重复创建应失败: {dup:?}"
    );

    let found = require_ok!(
        ctx.provider.find_cname(&sub, &ctx.root).await,
        "find_cname 调用失败"
    );
    assert_eq!(found.as_ref().map(|r| r.id.as_str()), Some(created.id.as_str()));

    require_ok!(
        ctx.provider.delete_cname(&created.zone_id, &created.id).await,
        "delete_cname 调用失败"
    );

    let again = ctx.provider.delete_cname(&created.zone_id, &created.id).await;
    assert!(
        matches!(&again, Err(e) if e.is_not_found()),
        "再次删除应返回 RecordNotFound: {again:?}"
    );

    let gone = require_ok!(
        ctx.provider.find_cname(&sub, &ctx.root).await,
        "find_cname 调用失败"
    );
    assert!(gone.is_none(), "删除后不应再找到记录");
}

#[tokio::test]
#[ignore = "integration test: requires CLOUDFLARE_API_TOKEN and SPINE_TEST_ROOT_DOMAIN"]
async fn test_cloudflare_find_cname_unknown_zone() {
    skip_if_no_credentials!("CLOUDFLARE_API_TOKEN", "SPINE_TEST_ROOT_DOMAIN");

    let ctx = require_some!(TestContext::cloudflare(), "创建测试上下文失败");
    let found = require_ok!(
        ctx.provider
            .find_cname("nobody", "zone-that-does-not-exist.invalid")
            .await,
        "find_cname 调用失败"
    );
    assert!(found.is_none());
}
