use clap::Parser;
use key_switcher_lib::cli::Cli;
use std::process;

fn main() {
    let cli = Cli::parse();

    // 默认只显示错误日志，避免 INFO 日志干扰命令输出
    let log_level = if cli.verbose { "debug" } else { "error" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    if let Err(e) = key_switcher_lib::cli::run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
