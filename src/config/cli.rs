use crate::domain::model::FreightKind;
use crate::domain::status::ParcelStatus;
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "cegonha")]
#[command(about = "Track parcels from creation to delivery")]
pub struct CliConfig {
    #[arg(long, help = "TOML configuration file")]
    pub config: Option<String>,

    #[arg(long, help = "JSON data file (overrides storage.data_file)")]
    pub data_file: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Create a parcel shipped from the default origin
    Create(CreateArgs),
    /// Move a parcel one step forward in its lifecycle
    Advance { code: String },
    /// Show a parcel by tracking code
    Find { code: String },
    /// Cancel a parcel by its numeric id
    Cancel {
        id: u64,
        #[arg(long)]
        reason: String,
    },
    /// Cancel a parcel by tracking code
    CancelByCode {
        code: String,
        #[arg(long)]
        reason: String,
    },
    /// List parcels, optionally leaving some statuses out
    List {
        #[arg(long, value_delimiter = ',', value_parser = parse_status)]
        exclude: Vec<ParcelStatus>,
    },
}

#[derive(Debug, Clone, Args)]
pub struct CreateArgs {
    #[arg(long)]
    pub description: String,

    #[arg(long)]
    pub weight_kg: f64,

    #[arg(long, default_value = "0")]
    pub declared_value_cents: i64,

    #[arg(long, default_value = "STANDARD", value_parser = parse_freight_kind)]
    pub freight_kind: FreightKind,

    #[arg(long)]
    pub postal_code: String,

    #[arg(long)]
    pub street: String,

    #[arg(long)]
    pub number: String,

    #[arg(long)]
    pub neighborhood: String,

    #[arg(long)]
    pub city: String,

    #[arg(long)]
    pub state: String,
}

fn parse_status(value: &str) -> Result<ParcelStatus, String> {
    value.parse().map_err(|e: crate::ParcelError| e.to_string())
}

fn parse_freight_kind(value: &str) -> Result<FreightKind, String> {
    value.parse().map_err(|e: crate::ParcelError| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list_with_exclusions() {
        let cli = CliConfig::parse_from([
            "cegonha",
            "list",
            "--exclude",
            "delivered,cancelled",
        ]);
        match cli.command {
            Command::List { exclude } => assert_eq!(
                exclude,
                vec![ParcelStatus::Delivered, ParcelStatus::Cancelled]
            ),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_cancel_by_code() {
        let cli = CliConfig::parse_from([
            "cegonha",
            "--verbose",
            "cancel-by-code",
            "CE20240101000001",
            "--reason",
            "damaged in transit",
        ]);
        assert!(cli.verbose);
        match cli.command {
            Command::CancelByCode { code, reason } => {
                assert_eq!(code, "CE20240101000001");
                assert_eq!(reason, "damaged in transit");
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let result = CliConfig::try_parse_from(["cegonha", "list", "--exclude", "lost"]);
        assert!(result.is_err());
    }
}
