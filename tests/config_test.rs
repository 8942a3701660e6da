use secrecy::ExposeSecret;
use sitewatch::config::Config;
use std::sync::Mutex;
use std::time::Duration;

// Environment is process-global; serialize tests that touch it.
static ENV_LOCK: Mutex<()> = Mutex::new(());

const CREDENTIAL_VARS: [&str; 8] = [
    "SEARCH_CONSUMERKEY",
    "SEARCH_CONSUMERSECRET",
    "SEARCH_ACCESSTOKEN",
    "SEARCH_ACCESSTOKENSECRET",
    "TWEET_CONSUMERKEY",
    "TWEET_CONSUMERSECRET",
    "TWEET_ACCESSTOKEN",
    "TWEET_ACCESSTOKENSECRET",
];

const OPTIONAL_VARS: [&str; 6] = [
    "SEARCH_SLEEP_SECS",
    "POST_SLEEP_SECS",
    "SEARCH_BATCH_SIZE",
    "LEDGER_PATH",
    "SITES_CSV_URL",
    "API_BASE_URL",
];

fn set_credentials() {
    for name in CREDENTIAL_VARS {
        unsafe { std::env::set_var(name, format!("value-of-{name}")) };
    }
}

fn clear_all() {
    for name in CREDENTIAL_VARS.iter().chain(OPTIONAL_VARS.iter()) {
        unsafe { std::env::remove_var(name) };
    }
}

#[test]
fn config_from_env_loads_both_identities_with_defaults() {
    let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    clear_all();
    set_credentials();

    let config = Config::from_env().unwrap();
    assert_eq!(
        config.search_credentials.consumer_key.expose_secret(),
        "value-of-SEARCH_CONSUMERKEY"
    );
    assert_eq!(
        config.post_credentials.access_token_secret.expose_secret(),
        "value-of-TWEET_ACCESSTOKENSECRET"
    );
    assert_eq!(config.pacing.search_sleep, Duration::from_secs(10));
    assert_eq!(config.pacing.post_sleep, Duration::from_secs(60));
    assert_eq!(config.pacing.batch_size, 100);
    assert_eq!(config.ledger_path.to_str(), Some("posted.csv"));
    assert!(!config.log_level.is_empty());

    // Secrets never show up in debug output.
    let debug = format!("{config:?}");
    assert!(!debug.contains("value-of-SEARCH_CONSUMERSECRET"));

    clear_all();
}

#[test]
fn config_overrides_pacing_from_env() {
    let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    clear_all();
    set_credentials();
    unsafe {
        std::env::set_var("SEARCH_SLEEP_SECS", "0");
        std::env::set_var("POST_SLEEP_SECS", "5");
        std::env::set_var("SEARCH_BATCH_SIZE", "25");
        std::env::set_var("LEDGER_PATH", "/var/lib/sitewatch/posted.csv");
    }

    let config = Config::from_env().unwrap();
    assert_eq!(config.pacing.search_sleep, Duration::ZERO);
    assert_eq!(config.pacing.post_sleep, Duration::from_secs(5));
    assert_eq!(config.pacing.batch_size, 25);
    assert_eq!(
        config.ledger_path.to_str(),
        Some("/var/lib/sitewatch/posted.csv")
    );

    clear_all();
}

#[test]
fn config_rejects_malformed_numbers() {
    let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    clear_all();
    set_credentials();
    unsafe { std::env::set_var("SEARCH_BATCH_SIZE", "lots") };

    assert!(Config::from_env().is_err());

    clear_all();
}

#[test]
fn config_from_env_fails_without_required() {
    let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    clear_all();
    set_credentials();
    unsafe { std::env::remove_var("TWEET_ACCESSTOKEN") };

    let err = Config::from_env().unwrap_err();
    assert!(err.to_string().contains("TWEET_ACCESSTOKEN"));

    clear_all();
}
