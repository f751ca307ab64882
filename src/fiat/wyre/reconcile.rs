use tracing::debug;

use super::{WyreApi, WyreClientError};
use crate::fiat::order::{FiatOrder, FiatOrderData};

/// Outcome of a best effort poll, a failed poll leaves the order as it was
#[derive(Debug, Clone, PartialEq)]
pub enum Reconciliation {
    Updated(FiatOrder),
    Unchanged(FiatOrder),
}

impl Reconciliation {
    pub fn into_order(self) -> FiatOrder {
        match self {
            Self::Updated(order) | Self::Unchanged(order) => order,
        }
    }

    pub fn is_updated(&self) -> bool {
        matches!(self, Self::Updated(_))
    }
}

/// Merge the remote order, and its transfer once one has started, into the local order
///
/// Never fails, network and parse errors come back as [`Reconciliation::Unchanged`] and the
/// order is picked up again on the next poll
pub async fn reconcile(api: &dyn WyreApi, order: FiatOrder) -> Reconciliation {
    match fetch_and_merge(api, &order).await {
        Ok(Some(updated)) => Reconciliation::Updated(updated),
        Ok(None) => {
            debug!("empty wyre order response for {}", order.id);
            Reconciliation::Unchanged(order)
        }
        Err(error) => {
            debug!("unable to reconcile wyre order {}: {error}", order.id);
            Reconciliation::Unchanged(order)
        }
    }
}

async fn fetch_and_merge(
    api: &dyn WyreApi,
    order: &FiatOrder,
) -> Result<Option<FiatOrder>, WyreClientError> {
    let Some(remote) = api.order_status(&order.network, &order.id).await? else {
        return Ok(None);
    };

    let transfer = match &remote.value.transfer_id {
        Some(transfer_id) => api.transfer_status(&order.network, transfer_id).await?,
        None => None,
    };

    let mut updated = order.clone();
    remote.value.overlay_onto(&mut updated);

    if let Some(transfer) = &transfer {
        transfer.value.overlay_onto(&mut updated);
    }

    updated.data = Some(FiatOrderData {
        order: remote.raw,
        transfer: transfer.map(|transfer| transfer.raw),
    });

    Ok(Some(updated))
}
