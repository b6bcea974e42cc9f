// mac-vendor command line lookup
//
// Loads the dataset from a base location (URL or directory) and prints the
// manufacturer of each address given on the command line.

use std::process::ExitCode;
use std::time::Duration;

use mac_vendor::{LocalizationPolicy, SourceConfig, VendorIndex};

const USAGE: &str = "Usage: mac-vendor [OPTIONS] <BASE> <MAC>...

Options:
  --delay-ms <N>             wait before fetching the dataset (default: 0)
  --data-version <V>         append ?v=<V> to dataset locations
  --optional-localization    keep going if oui_cn.json cannot be loaded
  -h, --help                 show this help message";

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("mac_vendor=info")
    ).init();

    let mut args = std::env::args().skip(1);
    let mut delay = Duration::ZERO;
    let mut data_version = None;
    let mut policy = LocalizationPolicy::Required;
    let mut positional = Vec::new();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--delay-ms" => match args.next().and_then(|s| s.parse().ok()) {
                Some(ms) => delay = Duration::from_millis(ms),
                None => {
                    eprintln!("--delay-ms expects a number of milliseconds");
                    return ExitCode::from(2);
                }
            },
            "--data-version" => data_version = args.next(),
            "--optional-localization" => policy = LocalizationPolicy::Optional,
            "--help" | "-h" => {
                println!("{}", USAGE);
                return ExitCode::SUCCESS;
            }
            _ => positional.push(arg),
        }
    }

    if positional.len() < 2 {
        eprintln!("{}", USAGE);
        return ExitCode::from(2);
    }
    let base = positional.remove(0);

    let mut config = SourceConfig::from_base(&base)
        .with_start_delay(delay)
        .with_localization_policy(policy);
    if let Some(v) = data_version {
        config = config.with_data_version(v);
    }

    let index = match VendorIndex::new(config) {
        Ok(index) => index,
        Err(e) => {
            log::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let vendors = match index.ready().await {
        Ok(query) => query,
        Err(e) => {
            log::error!("Vendor lookup unavailable: {}", e);
            return ExitCode::FAILURE;
        }
    };

    for mac in &positional {
        match vendors.query(mac) {
            Some(hit) => println!(
                "{}\t{}\t{}",
                mac,
                hit.vendor,
                hit.vendor_localized.as_deref().unwrap_or("")
            ),
            None => println!("{}\t-", mac),
        }
    }

    ExitCode::SUCCESS
}
