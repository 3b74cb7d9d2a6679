#![deny(clippy::implicit_return)]
#![allow(clippy::needless_return)]

mod application;
mod configuration;
mod domain;
mod infrastructure;

use std::env;
use std::process;

use anyhow::Error;
use yansi::Paint;

use crate::application::cli;
use crate::application::ui;

fn handle_error(err: Error) {
    eprintln!(
        "{}",
        Paint::red(format!(
            "Oh no! aichatbox has failed with the following app version and error.\n\nVersion: {}\nBuilt: {}\nError: {}",
            env!("CARGO_PKG_VERSION"),
            env!("VERGEN_BUILD_TIMESTAMP"),
            err
        ))
    );

    let backtrace = err.backtrace();
    if backtrace.to_string() == "disabled backtrace" {
        let args = env::args().collect::<Vec<String>>().join(" ");
        eprintln!("\nRunning the following can help explain further what the issue is:");
        eprintln!("\nRUST_BACKTRACE=1 {args}");
    } else {
        eprintln!("\n{}", backtrace);
    }

    process::exit(1);
}

#[tokio::main]
async fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));

    let mut _guard = None;
    if env::var("RUST_LOG")
        .unwrap_or_else(|_| return "".to_string())
        .contains("aichatbox")
    {
        let debug_log_dir = env::var("AICHATBOX_LOG_DIR").unwrap_or_else(|_| {
            return dirs::cache_dir()
                .unwrap_or_else(env::temp_dir)
                .join("aichatbox")
                .to_string_lossy()
                .to_string();
        });

        let file_appender = tracing_appender::rolling::never(debug_log_dir, "debug.log");
        let (writer, guard) = tracing_appender::non_blocking(file_appender);
        _guard = Some(guard);

        tracing_subscriber::fmt()
            .json()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(writer)
            .init();
    }

    let launch = match cli::parse().await {
        Ok(Some(launch)) => launch,
        Ok(None) => process::exit(0),
        Err(err) => {
            handle_error(err);
            return;
        }
    };

    if let Err(err) = ui::start(launch).await {
        handle_error(err);
    }

    drop(_guard);
    process::exit(0);
}
