//! Payments CLI
//!
//! Command-line interface for the Payment API.

use anyhow::Result;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

use payments_client::PaymentsClient;
use payments_types::{SearchPaymentParams, Timestamp, TransactionId, TransactionStatus};

#[derive(Parser)]
#[command(name = "payments")]
#[command(author, version, about = "Payment API CLI client", long_about = None)]
struct Cli {
    /// Base URL of the Payment API
    #[arg(
        long,
        env = "PAYMENTS_API_URL",
        default_value = "http://localhost:3000"
    )]
    api_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Charge a payment through a bank
    Pay {
        /// Bank identifier (akbank, garanti, yapikredi)
        #[arg(long)]
        bank: String,
        #[arg(long)]
        amount: Decimal,
        #[arg(long)]
        order_reference: String,
    },
    /// Cancel a transaction made today
    Cancel {
        /// Transaction ID (UUID)
        id: TransactionId,
    },
    /// Refund a transaction at least one day old
    Refund {
        /// Transaction ID (UUID)
        id: TransactionId,
    },
    /// Search transactions with their details
    Search {
        #[arg(long)]
        bank: Option<String>,
        /// Success or Fail
        #[arg(long)]
        status: Option<TransactionStatus>,
        #[arg(long)]
        order_reference: Option<String>,
        /// yyyy-MM-dd, yyyy-MM-ddTHH:mm:ss or RFC 3339
        #[arg(long)]
        start_date: Option<Timestamp>,
        #[arg(long)]
        end_date: Option<Timestamp>,
    },
    /// Check API health
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let client = PaymentsClient::new(cli.api_url.as_str());

    match cli.command {
        Commands::Health => {
            let healthy = client.health().await?;
            if healthy {
                println!("✓ API is healthy");
            } else {
                println!("✗ API is not healthy");
                std::process::exit(1);
            }
        }

        Commands::Pay {
            bank,
            amount,
            order_reference,
        } => {
            let tx = client.pay(&bank, amount, &order_reference).await?;
            println!("{}", serde_json::to_string_pretty(&tx)?);
        }

        Commands::Cancel { id } => {
            let tx = client.cancel(id).await?;
            println!("{}", serde_json::to_string_pretty(&tx)?);
        }

        Commands::Refund { id } => {
            let tx = client.refund(id).await?;
            println!("{}", serde_json::to_string_pretty(&tx)?);
        }

        Commands::Search {
            bank,
            status,
            order_reference,
            start_date,
            end_date,
        } => {
            let params = SearchPaymentParams {
                bank_id: bank,
                status,
                order_reference,
                start_date,
                end_date,
            };
            let rows = client.search(&params).await?;
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pay_arguments() {
        let cli = Cli::try_parse_from([
            "payments",
            "--api-url",
            "http://payments:3000",
            "pay",
            "--bank",
            "Akbank",
            "--amount",
            "1000.00",
            "--order-reference",
            "ORDER_001",
        ])
        .unwrap();

        assert_eq!(cli.api_url, "http://payments:3000");
        match cli.command {
            Commands::Pay { bank, amount, .. } => {
                assert_eq!(bank, "Akbank");
                assert_eq!(amount, Decimal::new(100000, 2));
            }
            _ => panic!("expected pay"),
        }
    }

    #[test]
    fn test_search_parses_filters() {
        let cli = Cli::try_parse_from([
            "payments",
            "search",
            "--status",
            "Success",
            "--start-date",
            "2024-01-01",
        ])
        .unwrap();

        match cli.command {
            Commands::Search {
                status, start_date, ..
            } => {
                assert_eq!(status, Some(TransactionStatus::Success));
                assert!(matches!(start_date, Some(Timestamp::Unspecified(_))));
            }
            _ => panic!("expected search"),
        }
    }

    #[test]
    fn test_cancel_rejects_bad_uuid() {
        assert!(Cli::try_parse_from(["payments", "cancel", "not-a-uuid"]).is_err());
    }
}
