use cegonha_express::config::{Command, CreateArgs};
use cegonha_express::core::{AddressRequest, CreateParcelRequest};
use cegonha_express::domain::model::ParcelId;
use cegonha_express::utils::error::ErrorSeverity;
use cegonha_express::utils::{logger, validation::Validate};
use cegonha_express::{
    AppConfig, CliConfig, InMemoryStore, ParcelError, ParcelService, RateFreightCalculator,
    ViaCepClient,
};
use clap::Parser;

type Service = ParcelService<InMemoryStore, ViaCepClient, RateFreightCalculator>;

fn load_config(cli: &CliConfig) -> Result<AppConfig, ParcelError> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::default(),
    };
    if let Some(data_file) = &cli.data_file {
        config.storage.data_file = data_file.clone();
    }
    config.validate()?;
    Ok(config)
}

async fn build_service(config: &AppConfig) -> Result<Service, ParcelError> {
    let store = InMemoryStore::open(&config.storage.data_file).await?;
    let postal_lookup = ViaCepClient::new(&config.postal_lookup.base_url, config.lookup_timeout())?;
    let calculator = RateFreightCalculator::new(config.freight.clone());
    Ok(ParcelService::new(store, postal_lookup, calculator).with_settings(config.service_settings()?))
}

fn create_request(args: CreateArgs) -> CreateParcelRequest {
    CreateParcelRequest {
        description: args.description,
        weight_kg: args.weight_kg,
        declared_value_cents: args.declared_value_cents,
        freight_kind: args.freight_kind,
        destination: AddressRequest {
            postal_code: args.postal_code,
            street: args.street,
            number: args.number,
            neighborhood: args.neighborhood,
            city: args.city,
            state: args.state,
        },
        customer: None,
    }
}

async fn execute(service: &Service, command: Command) -> Result<serde_json::Value, ParcelError> {
    let output = match command {
        Command::Create(args) => {
            serde_json::to_value(service.create_parcel(&create_request(args)).await?)?
        }
        Command::Advance { code } => {
            let status = service.advance_status(&code).await?;
            serde_json::json!({ "code": code, "status": status })
        }
        Command::Find { code } => serde_json::to_value(service.find_by_code(&code).await?)?,
        Command::Cancel { id, reason } => {
            let status = service.cancel(ParcelId(id), &reason).await?;
            serde_json::json!({ "id": id, "status": status })
        }
        Command::CancelByCode { code, reason } => {
            let status = service.cancel_by_code(&code, &reason).await?;
            serde_json::json!({ "code": code, "status": status })
        }
        Command::List { exclude } => {
            let parcels = if exclude.is_empty() {
                service.list_all().await?
            } else {
                service.list_excluding_statuses(&exclude).await?
            };
            serde_json::to_value(parcels)?
        }
    };
    Ok(output)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }
    tracing::debug!("CLI config: {:?}", cli);

    let outcome = match load_config(&cli) {
        Ok(config) => match build_service(&config).await {
            Ok(service) => execute(&service, cli.command).await,
            Err(e) => Err(e),
        },
        Err(e) => Err(e),
    };

    match outcome {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
        Err(e) => {
            tracing::error!(
                "Command failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("{}", e.user_friendly_message());
            eprintln!("Suggestion: {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 2,
                ErrorSeverity::Medium => 3,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 4,
            };
            std::process::exit(exit_code);
        }
    }
}
