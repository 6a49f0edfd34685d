use std::net::IpAddr;
use std::path::PathBuf;

use clap::Parser;

use crate::server::DEFAULT_MOUNT_PATH;

#[derive(Parser, Debug, Clone)]
#[command(name = "materials-server")]
#[command(about = "Study materials catalog API", long_about = None)]
pub struct Config {
    /// Directory holding material documents and the link index
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// JSON file of known users; defaults to <data-dir>/users.json
    #[arg(short, long)]
    users_file: Option<PathBuf>,

    #[arg(short, long, default_value = "127.0.0.1")]
    pub address: IpAddr,

    #[arg(short, long, default_value_t = 8000)]
    pub port: u16,

    /// Number of documents kept in the read cache, 0 disables it
    #[arg(long, default_value_t = 100)]
    pub cache_size: usize,

    #[arg(long, default_value = DEFAULT_MOUNT_PATH)]
    pub mount_path: String,
}

impl Config {
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .map(|dir| dir.join("study-materials"))
                .unwrap_or_else(|| PathBuf::from("./storage"))
        })
    }

    pub fn users_file(&self) -> PathBuf {
        self.users_file
            .clone()
            .unwrap_or_else(|| self.data_dir().join("users.json"))
    }
}
