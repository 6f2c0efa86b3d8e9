//! The command line interface.
//!
//! Everything the CLI can set can also come from the configuration file;
//! flags win over the file. The whitelist and blacklist flags are
//! mutually exclusive because a tracker runs in one mode at a time.
use clap::Parser;
use swarm_tracker_configuration::{Configuration, HttpTracker, UdpTracker};
use swarm_tracker_primitives::TrackerMode;

#[derive(Parser, Debug, Default)]
#[command(name = "swarm-tracker", version, about = "A lightweight, in-memory BitTorrent tracker.")]
pub struct Args {
    /// Configuration file (TOML).
    #[arg(short = 'f', long = "config", value_name = "FILE")]
    pub config: Option<String>,

    /// HTTP tracker listener, for example `0.0.0.0:7070`. May be repeated.
    #[arg(short = 'p', long = "http", value_name = "SOCKET_ADDR")]
    pub http_listeners: Vec<String>,

    /// UDP tracker listener, for example `0.0.0.0:6969`. May be repeated.
    #[arg(short = 'P', long = "udp", value_name = "SOCKET_ADDR")]
    pub udp_listeners: Vec<String>,

    /// Where `GET /` redirects to.
    #[arg(short = 'r', long = "redirect-url", value_name = "URL")]
    pub redirect_url: Option<String>,

    /// Whitelist file: only the listed infohashes are tracked.
    #[arg(short = 'w', long = "whitelist", value_name = "FILE", conflicts_with = "blacklist")]
    pub whitelist: Option<String>,

    /// Blacklist file: the listed infohashes are refused.
    #[arg(short = 'b', long = "blacklist", value_name = "FILE")]
    pub blacklist: Option<String>,

    /// Grant every permission to an IP. May be repeated.
    #[arg(short = 'A', long = "admin-ip", value_name = "IP")]
    pub admin_ips: Vec<std::net::IpAddr>,

    /// Live-sync multicast group, for example `224.0.23.5:9696`.
    #[arg(short = 's', long = "livesync", value_name = "SOCKET_ADDR")]
    pub livesync: Option<String>,

    /// Saved-state file to cold-load download counters from.
    #[arg(short = 'l', long = "load-state", value_name = "FILE")]
    pub state_file: Option<String>,
}

impl Args {
    /// Applies the CLI overrides on top of the loaded configuration.
    pub fn override_configuration(&self, config: &mut Configuration) {
        if !self.http_listeners.is_empty() {
            config.http_trackers = self
                .http_listeners
                .iter()
                .map(|bind_address| HttpTracker {
                    enabled: true,
                    bind_address: bind_address.clone(),
                })
                .collect();
        }

        if !self.udp_listeners.is_empty() {
            config.udp_trackers = self
                .udp_listeners
                .iter()
                .map(|bind_address| UdpTracker {
                    enabled: true,
                    bind_address: bind_address.clone(),
                })
                .collect();
        }

        if let Some(redirect_url) = &self.redirect_url {
            config.redirect_url = Some(redirect_url.clone());
        }

        if let Some(whitelist) = &self.whitelist {
            config.mode = TrackerMode::Listed;
            config.accesslist_path = Some(whitelist.clone());
        }

        if let Some(blacklist) = &self.blacklist {
            config.mode = TrackerMode::Blacklisted;
            config.accesslist_path = Some(blacklist.clone());
        }

        for admin_ip in &self.admin_ips {
            config.access.admin.push(*admin_ip);
        }

        if let Some(livesync) = &self.livesync {
            config.livesync.enabled = true;
            config.livesync.multicast_address.clone_from(livesync);
        }

        if let Some(state_file) = &self.state_file {
            config.state_file_path = Some(state_file.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use swarm_tracker_configuration::Configuration;
    use swarm_tracker_primitives::TrackerMode;

    use super::Args;

    #[test]
    fn it_should_parse_without_any_argument() {
        let args = Args::try_parse_from(["swarm-tracker"]).unwrap();

        assert!(args.config.is_none());
        assert!(args.http_listeners.is_empty());
    }

    #[test]
    fn it_should_reject_a_whitelist_combined_with_a_blacklist() {
        let args = Args::try_parse_from(["swarm-tracker", "-w", "white.txt", "-b", "black.txt"]);

        assert!(args.is_err());
    }

    #[test]
    fn it_should_override_the_listeners() {
        let args = Args::try_parse_from(["swarm-tracker", "-p", "0.0.0.0:7171", "-P", "0.0.0.0:7070", "-P", "0.0.0.0:7272"])
            .unwrap();

        let mut config = Configuration::default();
        args.override_configuration(&mut config);

        assert_eq!(config.http_trackers.len(), 1);
        assert!(config.http_trackers[0].enabled);
        assert_eq!(config.http_trackers[0].bind_address, "0.0.0.0:7171");
        assert_eq!(config.udp_trackers.len(), 2);
    }

    #[test]
    fn a_whitelist_file_should_switch_the_tracker_into_listed_mode() {
        let args = Args::try_parse_from(["swarm-tracker", "-w", "white.txt"]).unwrap();

        let mut config = Configuration::default();
        args.override_configuration(&mut config);

        assert_eq!(config.mode, TrackerMode::Listed);
        assert_eq!(config.accesslist_path, Some("white.txt".to_owned()));
    }

    #[test]
    fn an_admin_ip_should_be_appended_to_the_admin_list() {
        let args = Args::try_parse_from(["swarm-tracker", "-A", "126.0.0.1"]).unwrap();

        let mut config = Configuration::default();
        args.override_configuration(&mut config);

        assert_eq!(config.access.admin, vec!["126.0.0.1".parse::<std::net::IpAddr>().unwrap()]);
    }
}
