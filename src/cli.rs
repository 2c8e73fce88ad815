//! Command-line interface for gridmatch.

use clap::{Parser, Subcommand};

/// Gridmatch - matchmaking and refereed two-player grid game sessions
#[derive(Parser, Debug)]
#[command(name = "gridmatch")]
#[command(about = "Matchmaking queue and two-player grid game referee", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the coordinator over newline-delimited JSON events on stdin,
    /// writing outbound deliveries to stdout
    Serve {
        /// Queue ttl in seconds before a waiting player is evicted
        /// (overrides GRIDMATCH_QUEUE_TTL_SECS, default 300)
        #[arg(long)]
        queue_ttl: Option<u64>,

        /// Seconds between queue eviction ticks
        /// (overrides GRIDMATCH_EVICTION_TICK_SECS, default 60)
        #[arg(long)]
        eviction_tick: Option<u64>,
    },

    /// Play a scripted two-player demo game and print the event flow
    Demo,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_flags_stay_unset_when_not_passed() {
        let cli = Cli::try_parse_from(["gridmatch", "serve"]).expect("parse failed");
        let Command::Serve {
            queue_ttl,
            eviction_tick,
        } = cli.command
        else {
            panic!("expected serve command");
        };
        assert_eq!(queue_ttl, None);
        assert_eq!(eviction_tick, None);
    }

    #[test]
    fn serve_flags_parse_when_passed() {
        let cli = Cli::try_parse_from(["gridmatch", "serve", "--queue-ttl", "10"])
            .expect("parse failed");
        let Command::Serve {
            queue_ttl,
            eviction_tick,
        } = cli.command
        else {
            panic!("expected serve command");
        };
        assert_eq!(queue_ttl, Some(10));
        assert_eq!(eviction_tick, None);
    }
}
