use abstract_api_mcp::client::{AbstractClient, ServiceKey};
use abstract_api_mcp::config::{find_config_file, load_config, Config};
use abstract_api_mcp::mcp::health::serve_health;
use abstract_api_mcp::mcp::McpServer;
use abstract_api_mcp::models::TimezoneQuery;
use anyhow::{Context, Result};
use base64::Engine;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Abstract API MCP - Validation, IP, time, currency and web enrichment tools
#[derive(Parser, Debug)]
#[command(name = "abstract-api-mcp")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "MCP server and CLI for the Abstract API enrichment services", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (-v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short)]
    quiet: bool,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Request timeout in seconds (overrides the config file)
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Show all environment variables
    #[arg(long, global = true)]
    env: bool,

    /// Print JSON on a single line
    #[arg(long, global = true)]
    compact: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the MCP server (for Claude Desktop and other MCP clients)
    Serve {
        /// Run in stdio mode
        #[arg(long, default_value_t = true)]
        stdio: bool,

        /// Run in streamable HTTP mode (overrides --stdio)
        #[arg(long)]
        http: bool,

        /// Port for HTTP mode
        #[arg(long, short, default_value_t = 3000)]
        port: u16,

        /// Host to bind to for HTTP mode
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port for the /health endpoint in HTTP mode (default: port + 1)
        #[arg(long)]
        health_port: Option<u16>,
    },

    /// List services and whether a key is configured for each
    Services,

    /// Validate an email address
    #[command(alias = "email")]
    ValidateEmail { email: String },

    /// Validate a phone number
    #[command(alias = "phone")]
    ValidatePhone {
        phone: String,

        /// ISO 3166-1 alpha-2 country code
        #[arg(long)]
        country_code: Option<String>,
    },

    /// Validate an EU VAT number
    #[command(alias = "vat")]
    ValidateVat { vat_number: String },

    /// Geolocate an IP address (the caller's own when omitted)
    #[command(alias = "ip")]
    GeolocateIp {
        ip_address: Option<String>,

        /// Comma-separated fields to return
        #[arg(long)]
        fields: Option<String>,
    },

    /// Detailed IP information
    IpInfo { ip_address: Option<String> },

    /// IP geolocation with VPN/proxy/tor detection
    IpSecurity { ip_address: Option<String> },

    /// Current time for a location or coordinates
    #[command(alias = "tz")]
    Timezone {
        /// Location name (e.g., "New York")
        #[arg(long, conflicts_with_all = ["latitude", "longitude"])]
        location: Option<String>,

        #[arg(long, requires = "longitude", allow_hyphen_values = true)]
        latitude: Option<f64>,

        #[arg(long, requires = "latitude", allow_hyphen_values = true)]
        longitude: Option<f64>,
    },

    /// Convert a datetime between locations
    ConvertTimezone {
        base_location: String,
        base_datetime: String,
        target_location: String,
    },

    /// Public holidays for a country and year
    Holidays {
        /// ISO 3166-1 alpha-2 country code
        country: String,

        year: i32,

        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: Option<u32>,

        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=31))]
        day: Option<u32>,
    },

    /// Live exchange rates
    #[command(alias = "rates")]
    ExchangeRates {
        #[arg(long, default_value = "USD")]
        base: String,

        #[arg(long)]
        target: Option<String>,
    },

    /// Convert an amount between currencies
    #[command(alias = "convert")]
    ConvertCurrency {
        base: String,
        target: String,
        amount: f64,

        /// Historical date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
    },

    /// Company details for a domain
    #[command(alias = "company")]
    CompanyInfo { domain: String },

    /// Extract content from a web page
    Scrape {
        url: String,

        /// Render JavaScript before extracting
        #[arg(long)]
        render_js: bool,
    },

    /// Capture a screenshot of a web page
    Screenshot {
        url: String,

        #[arg(long, default_value_t = abstract_api_mcp::client::DEFAULT_SCREENSHOT_WIDTH)]
        width: u32,

        #[arg(long, default_value_t = abstract_api_mcp::client::DEFAULT_SCREENSHOT_HEIGHT)]
        height: u32,

        #[arg(long)]
        full_page: bool,

        /// Write the decoded image here instead of printing JSON
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

/// Print all available environment variables
fn print_env_vars() {
    println!("Abstract API MCP - Environment Variables");
    println!();
    println!("API Keys (one per service):");
    for service in ServiceKey::ALL {
        println!("  {:<32} {} API key", service.env_var(), service.name());
    }
    println!();
    println!("HTTP Settings:");
    println!("  ABSTRACT_MCP_HTTP__TIMEOUT_SECS          Request timeout (default: 30)");
    println!("  ABSTRACT_MCP_HTTP__LONG_TIMEOUT_SECS     Scrape/screenshot timeout (default: 60)");
    println!("  ABSTRACT_MCP_HTTP__CONNECT_TIMEOUT_SECS  Connect timeout (default: 10)");
    println!("  ABSTRACT_MCP_HTTP__BASE_URL              Route every service through one base URL");
    println!("  ABSTRACT_MCP_HTTP__USER_AGENT            Override the User-Agent header");
    println!();
    println!("Other Settings:");
    println!("  RUST_LOG                         Rust logging level (e.g., debug, info, warn, error)");
    println!();
    println!("A .env file in the working directory is loaded at startup.");
    println!();
    println!("Example:");
    println!("  export ABSTRACT_EMAIL_API_KEY=\"your-key-here\"");
    std::process::exit(0);
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    if cli.env {
        print_env_vars();
    }

    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let env_filter = if cli.quiet { "error" } else { log_level };

    // stdout belongs to the stdio transport
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| format!("abstract_api_mcp={}", env_filter)),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = if let Some(config_path) = &cli.config {
        load_config(config_path)
            .with_context(|| format!("Failed to load config {}", config_path.display()))?
    } else if let Some(config_path) = find_config_file() {
        tracing::info!("Using config file: {}", config_path.display());
        load_config(&config_path)?
    } else {
        Config::default()
    };

    if let Some(timeout) = cli.timeout {
        config.http.timeout_secs = timeout;
    }

    let client = AbstractClient::from_config(&config)?;
    let compact = cli.compact;

    match cli.command {
        Some(Commands::Serve {
            stdio,
            http,
            port,
            host,
            health_port,
        }) => {
            let configured = client.credentials().configured();
            if configured.is_empty() {
                tracing::warn!("No API keys configured; every tool call will fail until one is set");
            } else {
                tracing::info!(
                    "Configured services: {}",
                    configured
                        .iter()
                        .map(|s| s.id())
                        .collect::<Vec<_>>()
                        .join(", ")
                );
            }

            let server = McpServer::new(client)?;

            let use_http = http || !stdio;

            if use_http {
                let addr = format!("{}:{}", host, port);
                let (bound_addr, handle) = server.run_http(&addr).await?;
                tracing::info!("MCP server listening on {}", bound_addr);

                let health_addr = SocketAddr::new(
                    bound_addr.ip(),
                    health_port.unwrap_or_else(|| port.saturating_add(1)),
                );
                let (_, health_handle) = serve_health(health_addr)
                    .await
                    .with_context(|| format!("Failed to bind health endpoint on {}", health_addr))?;

                tokio::select! {
                    result = handle => {
                        result.map_err(|e| anyhow::anyhow!("Server task failed: {}", e))?;
                    }
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("Shutting down");
                    }
                }
                health_handle.abort();
            } else {
                server.run().await?;
            }
        }

        Some(Commands::Services) => {
            let credentials = client.credentials();
            for service in ServiceKey::ALL {
                let status = if credentials.is_configured(service) {
                    "configured"
                } else {
                    "missing"
                };
                println!(
                    "{:<11} {:<28} {:<10} {}",
                    service.id(),
                    service.name(),
                    status,
                    service.env_var()
                );
            }
        }

        Some(Commands::ValidateEmail { email }) => {
            print_json(&client.validate_email(&email).await?, compact)?;
        }

        Some(Commands::ValidatePhone {
            phone,
            country_code,
        }) => {
            print_json(
                &client
                    .validate_phone(&phone, country_code.as_deref())
                    .await?,
                compact,
            )?;
        }

        Some(Commands::ValidateVat { vat_number }) => {
            print_json(&client.validate_vat(&vat_number).await?, compact)?;
        }

        Some(Commands::GeolocateIp { ip_address, fields }) => {
            print_json(
                &client
                    .geolocate_ip(ip_address.as_deref(), fields.as_deref())
                    .await?,
                compact,
            )?;
        }

        Some(Commands::IpInfo { ip_address }) => {
            print_json(&client.get_ip_info(ip_address.as_deref()).await?, compact)?;
        }

        Some(Commands::IpSecurity { ip_address }) => {
            print_json(
                &client.geolocate_ip_security(ip_address.as_deref()).await?,
                compact,
            )?;
        }

        Some(Commands::Timezone {
            location,
            latitude,
            longitude,
        }) => {
            let query = TimezoneQuery::from_parts(location.as_deref(), latitude, longitude)?;
            print_json(&client.get_timezone(&query).await?, compact)?;
        }

        Some(Commands::ConvertTimezone {
            base_location,
            base_datetime,
            target_location,
        }) => {
            print_json(
                &client
                    .convert_timezone(&base_location, &base_datetime, &target_location)
                    .await?,
                compact,
            )?;
        }

        Some(Commands::Holidays {
            country,
            year,
            month,
            day,
        }) => {
            print_json(
                &client.get_holidays(&country, year, month, day).await?,
                compact,
            )?;
        }

        Some(Commands::ExchangeRates { base, target }) => {
            print_json(
                &client.get_exchange_rates(&base, target.as_deref()).await?,
                compact,
            )?;
        }

        Some(Commands::ConvertCurrency {
            base,
            target,
            amount,
            date,
        }) => {
            print_json(
                &client
                    .convert_currency(&base, &target, amount, date.as_deref())
                    .await?,
                compact,
            )?;
        }

        Some(Commands::CompanyInfo { domain }) => {
            print_json(&client.get_company_info(&domain).await?, compact)?;
        }

        Some(Commands::Scrape { url, render_js }) => {
            print_json(&client.scrape_url(&url, render_js).await?, compact)?;
        }

        Some(Commands::Screenshot {
            url,
            width,
            height,
            full_page,
            output,
        }) => {
            let screenshot = client
                .generate_screenshot(&url, width, height, full_page)
                .await?;

            match output {
                Some(path) => {
                    let data = screenshot
                        .image_data
                        .as_deref()
                        .context("Screenshot response carried no image data")?;
                    let bytes = base64::engine::general_purpose::STANDARD
                        .decode(data)
                        .context("Screenshot data is not valid base64")?;
                    std::fs::write(&path, &bytes)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!("Saved {} bytes to {}", bytes.len(), path.display());
                }
                None => print_json(&screenshot, compact)?,
            }
        }

        None => {
            // Print help if no command specified
            println!("Abstract API MCP v{}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Usage: abstract-api-mcp <COMMAND>");
            println!();
            println!("Run 'abstract-api-mcp --help' for more information.");
            println!("Run 'abstract-api-mcp serve' to start the MCP server.");
            let configured = client.credentials().configured();
            println!();
            println!("{} of {} services configured.", configured.len(), ServiceKey::ALL.len());
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T, compact: bool) -> Result<()> {
    let text = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{}", text);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["abstract-api-mcp"]);
        assert_eq!(cli.verbose, 0);
        assert!(!cli.quiet);
        assert!(!cli.compact);
        assert_eq!(cli.timeout, None);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_verbose_flag() {
        let cli = Cli::parse_from(["abstract-api-mcp", "-vv"]);
        assert_eq!(cli.verbose, 2);

        let cli = Cli::parse_from(["abstract-api-mcp", "--verbose"]);
        assert_eq!(cli.verbose, 1);
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "abstract-api-mcp",
            "email",
            "test@example.com",
            "--timeout",
            "5",
            "--compact",
        ]);
        assert_eq!(cli.timeout, Some(5));
        assert!(cli.compact);
        match cli.command {
            Some(Commands::ValidateEmail { email }) => assert_eq!(email, "test@example.com"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_serve_command() {
        let cli = Cli::parse_from(["abstract-api-mcp", "serve"]);
        match cli.command {
            Some(Commands::Serve {
                stdio,
                http,
                port,
                host,
                health_port,
            }) => {
                assert!(stdio);
                assert!(!http);
                assert_eq!(port, 3000);
                assert_eq!(host, "127.0.0.1");
                assert_eq!(health_port, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_serve_http_mode() {
        let cli = Cli::parse_from([
            "abstract-api-mcp",
            "serve",
            "--http",
            "--port",
            "8080",
            "--health-port",
            "9090",
        ]);
        match cli.command {
            Some(Commands::Serve {
                http,
                port,
                health_port,
                ..
            }) => {
                assert!(http);
                assert_eq!(port, 8080);
                assert_eq!(health_port, Some(9090));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_timezone_coordinates() {
        let cli = Cli::parse_from([
            "abstract-api-mcp",
            "timezone",
            "--latitude",
            "40.7",
            "--longitude",
            "-74.0",
        ]);
        match cli.command {
            Some(Commands::Timezone {
                location,
                latitude,
                longitude,
            }) => {
                assert_eq!(location, None);
                assert_eq!(latitude, Some(40.7));
                assert_eq!(longitude, Some(-74.0));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_timezone_rejects_location_and_coordinates() {
        let result = Cli::try_parse_from([
            "abstract-api-mcp",
            "timezone",
            "--location",
            "Paris",
            "--latitude",
            "1",
            "--longitude",
            "2",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_holidays_month_range() {
        let cli = Cli::parse_from(["abstract-api-mcp", "holidays", "US", "2025", "--month", "7"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Holidays {
                year: 2025,
                month: Some(7),
                day: None,
                ..
            })
        ));

        let result =
            Cli::try_parse_from(["abstract-api-mcp", "holidays", "US", "2025", "--month", "13"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_exchange_rates_default_base() {
        let cli = Cli::parse_from(["abstract-api-mcp", "rates"]);
        match cli.command {
            Some(Commands::ExchangeRates { base, target }) => {
                assert_eq!(base, "USD");
                assert_eq!(target, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_screenshot_defaults() {
        let cli = Cli::parse_from(["abstract-api-mcp", "screenshot", "https://example.com"]);
        match cli.command {
            Some(Commands::Screenshot {
                width,
                height,
                full_page,
                output,
                ..
            }) => {
                assert_eq!(width, 1920);
                assert_eq!(height, 1080);
                assert!(!full_page);
                assert!(output.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_env_flag() {
        let cli = Cli::parse_from(["abstract-api-mcp", "--env"]);
        assert!(cli.env);
    }

    #[test]
    fn test_print_json_compact() {
        print_json(&serde_json::json!({"a": 1}), true).unwrap();
    }
}
