use std::sync::OnceLock;

use ctask_core::config::ClientConfig;
use ctask_core::datetime::SystemClock;

const CLIENT_CONFIG_TOML: &str =
  include_str!("../assets/client.toml");

static CLIENT_CONFIG: OnceLock<
  ClientConfig
> = OnceLock::new();

pub fn client_config()
-> &'static ClientConfig {
  CLIENT_CONFIG.get_or_init(|| {
    ClientConfig::from_toml_or_default(
      CLIENT_CONFIG_TOML
    )
  })
}

pub fn clock() -> SystemClock {
  client_config().clock()
}
