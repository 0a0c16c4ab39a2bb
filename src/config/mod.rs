use std::{env, path::PathBuf};

use ::config::{Config as config_config, File as config_file};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::declare;

const CONFIG_PATH: &str = "app.json";

const TBOC_URL_KEY: &str = "GOLD_TBOC_URL";
const WDPM_URL_KEY: &str = "GOLD_WDPM_URL";
const DATA_DIR_KEY: &str = "GOLD_DATA_DIR";

/// 應用程式設定，可由 app.json 或環境變數覆蓋預設值
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct App {
    /// 台銀黃金存摺牌價頁網址
    #[serde(default = "default_tboc_url")]
    pub tboc_url: String,
    /// 金品零售頁網址
    #[serde(default = "default_wdpm_url")]
    pub wdpm_url: String,
    /// 輸出檔存放目錄
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

impl Default for App {
    fn default() -> Self {
        App {
            tboc_url: default_tboc_url(),
            wdpm_url: default_wdpm_url(),
            data_dir: default_data_dir(),
        }
    }
}

fn default_tboc_url() -> String {
    declare::TBOC_URL.to_string()
}

fn default_wdpm_url() -> String {
    declare::WDPM_URL.to_string()
}

fn default_data_dir() -> String {
    "data".to_string()
}

pub static SETTINGS: Lazy<App> = Lazy::new(|| App::get().expect("Config error"));

impl App {
    fn get() -> Result<Self, ::config::ConfigError> {
        let config_path = config_path();
        if config_path.exists() {
            let config: App = config_config::builder()
                .add_source(config_file::from(config_path))
                .build()?
                .try_deserialize()?;
            return Ok(config.override_with_env());
        }

        Ok(App::default().override_with_env())
    }

    /// 將來至於 env 的設定值覆蓋掉 json 上的設定值
    fn override_with_env(mut self) -> Self {
        if let Ok(url) = env::var(TBOC_URL_KEY) {
            self.tboc_url = url;
        }

        if let Ok(url) = env::var(WDPM_URL_KEY) {
            self.wdpm_url = url;
        }

        if let Ok(dir) = env::var(DATA_DIR_KEY) {
            self.data_dir = dir;
        }

        self
    }
}

/// 回傳設定檔的路徑
fn config_path() -> PathBuf {
    PathBuf::from(CONFIG_PATH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let app = App::default();
        assert_eq!(app.tboc_url, declare::TBOC_URL);
        assert_eq!(app.wdpm_url, declare::WDPM_URL);
        assert_eq!(app.data_dir, "data");
    }
}
