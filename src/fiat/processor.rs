use tracing::{debug, info, warn};

use super::{
    FiatOrder, FiatOrderProvider,
    wyre::{self, Reconciliation, WyreApi},
};
use crate::database::{Error, fiat_orders::FiatOrdersTable};

/// Where the poller reads pending orders from and writes updated ones to
pub trait OrderStore: Send + Sync {
    fn pending_orders(&self) -> Result<Vec<FiatOrder>, Error>;
    fn save(&self, order: &FiatOrder) -> Result<(), Error>;
}

impl OrderStore for FiatOrdersTable {
    fn pending_orders(&self) -> Result<Vec<FiatOrder>, Error> {
        FiatOrdersTable::pending_orders(self)
    }

    fn save(&self, order: &FiatOrder) -> Result<(), Error> {
        FiatOrdersTable::save(self, order)
    }
}

/// Reconcile an order with the processor it was placed with
pub async fn process_order(api: &dyn WyreApi, order: FiatOrder) -> Reconciliation {
    match order.provider {
        FiatOrderProvider::Wyre | FiatOrderProvider::WyreApplePay => {
            wyre::reconcile(api, order).await
        }
    }
}

/// Reconcile every stored pending order one after another and save the ones that changed
///
/// Returns the orders that were updated and saved. An order that fails to save is skipped and
/// stays pending for the next poll.
pub async fn process_pending_orders(
    api: &dyn WyreApi,
    store: &dyn OrderStore,
) -> Result<Vec<FiatOrder>, Error> {
    let pending = store.pending_orders()?;
    debug!("processing {} pending fiat orders", pending.len());

    let mut updated = Vec::new();
    for order in pending {
        let previous = order.clone();

        let Reconciliation::Updated(order) = process_order(api, order).await else {
            continue;
        };

        if order == previous {
            continue;
        }

        if let Err(error) = store.save(&order) {
            warn!("unable to save updated fiat order {}: {error}", order.id);
            continue;
        }

        info!("fiat order {} updated, state: {}", order.id, order.state);
        updated.push(order);
    }

    Ok(updated)
}
