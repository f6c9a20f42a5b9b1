//! Command-line driver for the shopping cart.
//!
//! Runs a JSON script of cart steps against an in-memory event store and
//! reports the resulting cart and its event log.

pub mod config;
pub mod error;

use common::IdGenerator;
use domain::{
    AddItem, Aggregate, CartEvent, CartService, DomainError, Money, ProductId, RemoveItem,
    ShoppingCart,
};
use event_store::InMemoryEventStore;
use serde::{Deserialize, Serialize};

pub use config::{Config, LogFormat};
pub use error::CliError;

/// One scripted operation on the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Add {
        product_id: ProductId,
        quantity: u32,
        price: Money,
    },
    Remove {
        product_id: ProductId,
        quantity: u32,
    },
}

/// A step the cart refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    /// Zero-based index of the step in the script.
    pub step: usize,
    pub error: String,
}

/// Outcome of a script run.
#[derive(Debug, Serialize)]
pub struct Report {
    pub cart: ShoppingCart,
    pub events: Vec<CartEvent>,
    pub rejections: Vec<Rejection>,
}

/// Parses a script from its JSON text.
pub fn parse_script(text: &str) -> Result<Vec<Step>, CliError> {
    Ok(serde_json::from_str(text)?)
}

/// Reads and parses a script file, or stdin when `path` is `-`.
pub async fn read_script(path: &str) -> Result<Vec<Step>, CliError> {
    let read = if path == "-" {
        tokio::task::spawn_blocking(|| std::io::read_to_string(std::io::stdin()))
            .await
            .unwrap_or_else(|err| Err(std::io::Error::other(err)))
    } else {
        tokio::fs::read_to_string(path).await
    };
    let text = read.map_err(|source| CliError::Io {
        path: path.to_string(),
        source,
    })?;

    parse_script(&text)
}

/// Runs `steps` against a fresh cart owned by the configured user.
///
/// Steps the cart rejects are collected in the report; any other failure
/// stops the run.
#[tracing::instrument(skip_all, fields(user_id = %config.user_id, steps = steps.len()))]
pub async fn run_script(
    config: &Config,
    ids: &impl IdGenerator,
    steps: &[Step],
) -> Result<Report, CliError> {
    let service =
        CartService::with_retry_policy(InMemoryEventStore::new(), config.retry_policy());
    let user_id = config.user_id;
    let mut cart = service.open_cart(user_id, ids);
    let mut rejections = Vec::new();

    for (index, step) in steps.iter().enumerate() {
        let result = match *step {
            Step::Add {
                product_id,
                quantity,
                price,
            } => {
                service
                    .add_item(user_id, AddItem::new(cart.id(), product_id, quantity, price))
                    .await
            }
            Step::Remove {
                product_id,
                quantity,
            } => {
                service
                    .remove_item(user_id, RemoveItem::new(cart.id(), product_id, quantity))
                    .await
            }
        };

        match result {
            Ok(outcome) => cart = outcome.aggregate,
            Err(DomainError::Cart(err)) => {
                tracing::info!(step = index, error = %err, "step rejected");
                rejections.push(Rejection {
                    step: index,
                    error: err.to_string(),
                });
            }
            Err(err) => return Err(err.into()),
        }
    }

    let events = service.history(cart.id()).await?;
    tracing::info!(
        cart_id = %cart.id(),
        events = events.len(),
        rejected = rejections.len(),
        "script finished"
    );

    Ok(Report {
        cart,
        events,
        rejections,
    })
}
