// cheatguessr/src/cli.rs
use clap::Parser;
use common::{Config, FeedConfig};

/// Command line flags; anything given here overrides files and environment
#[derive(Debug, Parser)]
#[command(name = "cheatguessr", about = "Real-time location-guess broadcast relay")]
pub struct Args {
    /// Address to proxy requests to
    #[arg(long)]
    pub proxy: Option<String>,

    /// Enable development proxy mode; don't use this when running standalone
    #[arg(long)]
    pub dev: bool,

    /// Listen on address and port
    #[arg(long)]
    pub listen: Option<String>,

    /// Upstream websocket feed to inject as a bot; empty disables it
    #[arg(long)]
    pub ws: Option<String>,

    /// Identity attached to guesses from the --ws feed
    #[arg(long, default_value = "bot")]
    pub ws_name: String,
}

impl Args {
    pub fn apply(&self, config: &mut Config) {
        if let Some(proxy) = &self.proxy {
            config.proxy_url = proxy.clone();
        }
        if self.dev {
            config.dev = true;
        }
        if let Some(listen) = &self.listen {
            config.listen_addr = listen.clone();
        }
        if let Some(url) = self.ws.as_deref().filter(|url| !url.is_empty()) {
            config.feeds.push(FeedConfig::new(self.ws_name.clone(), url));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config() {
        let args = Args::try_parse_from([
            "cheatguessr",
            "--dev",
            "--listen",
            "127.0.0.1:9000",
            "--proxy",
            "http://localhost:5173/",
            "--ws",
            "ws://feed.local/stream",
        ])
        .unwrap();

        let mut config = Config::default();
        args.apply(&mut config);

        assert!(config.dev);
        assert_eq!(config.listen_addr, "127.0.0.1:9000");
        assert_eq!(config.proxy_url, "http://localhost:5173/");
        assert_eq!(config.feeds, vec![FeedConfig::new("bot", "ws://feed.local/stream")]);
    }

    #[test]
    fn empty_ws_disables_the_feed() {
        let args = Args::try_parse_from(["cheatguessr", "--ws", ""]).unwrap();
        let mut config = Config::default();
        args.apply(&mut config);
        assert!(config.feeds.is_empty());
    }

    #[test]
    fn no_flags_leave_config_untouched() {
        let args = Args::try_parse_from(["cheatguessr"]).unwrap();
        let mut config = Config::default();
        args.apply(&mut config);

        assert!(!config.dev);
        assert_eq!(config.listen_addr, ":8080");
        assert!(config.feeds.is_empty());
    }
}
