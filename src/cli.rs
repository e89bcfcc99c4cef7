//! CLI parser
use clap::Parser;
use std::num::NonZeroU16;

#[derive(Parser, Debug)]
/// CLI Options
pub struct CliOptions {
    #[clap(long, help = "Enable debug logging", env = "VENDARI_DEBUG")]
    /// Enable debug logging. Env: VENDARI_DEBUG
    pub debug: bool,
    #[clap(long, short, default_value = "3000", env = "VENDARI_PORT")]
    /// http listener, defaults to `3000`.
    /// Env: VENDARI_PORT
    pub port: NonZeroU16,
    #[clap(
        long,
        short,
        default_value = "127.0.0.1",
        env = "VENDARI_LISTEN_ADDRESS"
    )]
    /// Listen address, defaults to `127.0.0.1`.
    /// Env: VENDARI_LISTEN_ADDRESS
    pub listen_address: String,

    #[clap(
        long,
        short,
        default_value = "vendari.sqlite",
        env = "VENDARI_DATABASE_PATH"
    )]
    /// Path to the state database file, eg `/data/vendari.sqlite`.
    /// Env: VENDARI_DATABASE_PATH
    pub database_path: String,

    #[clap(long, help = "Always use the mock generator", env = "VENDARI_FORCE_MOCK")]
    /// Skip the provider and render mock images. Env: VENDARI_FORCE_MOCK
    pub force_mock: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_parse() {
        let cli = CliOptions::parse_from(["vendari-studio"]);
        assert_eq!(cli.port.get(), 3000);
        assert_eq!(cli.listen_address, "127.0.0.1");
        assert_eq!(cli.database_path, "vendari.sqlite");
        assert!(!cli.force_mock);
    }

    #[test]
    fn force_mock_flag() {
        let cli = CliOptions::parse_from(["vendari-studio", "--force-mock", "-p", "8080"]);
        assert!(cli.force_mock);
        assert_eq!(cli.port.get(), 8080);
    }
}
