//! 共享测试工具和辅助函数

#![allow(dead_code)]

use std::env;

use spine_provider::CloudflareProvider;

/// 跳过测试的宏（当环境变量缺失时）
#[macro_export]
macro_rules! skip_if_no_credentials {
    ($($var:expr),+) => {
        $(
            if std::env::var($var).is_err() {
                eprintln!("跳过测试: 缺少环境变量 {}", $var);
                return;
            }
        )+
    };
}

/// 断言 `Option` 为 `Some`，并解包返回内部值（失败则直接让测试失败）。
#[macro_export]
macro_rules! require_some {
    ($expr:expr, $($msg:tt)+) => {{
        let opt = $expr;
        assert!(opt.is_some(), "{}", format_args!($($msg)+));
        let Some(val) = opt else {
            return;
        };
        val
    }};
}

/// 断言 `Result` 为 `Ok`，并解包返回内部值（失败则直接让测试失败）。
#[macro_export]
macro_rules! require_ok {
    ($expr:expr, $($msg:tt)+) => {{
        let res = $expr;
        assert!(res.is_ok(), "{}: {res:?}", format_args!($($msg)+));
        let Ok(val) = res else {
            return;
        };
        val
    }};
}

/// 生成唯一的测试子域名
pub fn generate_test_subdomain() -> String {
    let uuid = uuid::Uuid::new_v4();
    format!("spine-test-{}", &uuid.simple().to_string()[..8])
}

/// 测试上下文 - 封装 Provider 和测试根域名
pub struct TestContext {
    pub provider: CloudflareProvider,
    pub root: String,
}

impl TestContext {
    pub fn cloudflare() -> Option<Self> {
        let api_token = env::var("CLOUDFLARE_API_TOKEN").ok()?;
        let root = env::var("SPINE_TEST_ROOT_DOMAIN").ok()?;
        let mut provider = CloudflareProvider::new(api_token).ok()?;
        if let Ok(tag) = env::var("SPINE_TEST_AVAILABILITY_TAG") {
            provider = provider.with_availability_tag(tag);
        }
        Some(Self { provider, root })
    }
}
