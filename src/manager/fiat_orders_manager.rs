use std::sync::{Arc, LazyLock};

use flume::{Receiver, Sender};
use tap::TapFallible as _;
use tracing::{debug, error};

use crate::{
    database::{Database, Error, fiat_orders::FiatOrdersTable},
    fiat::{
        FiatOrder, processor,
        wyre::{Reconciliation, WYRE_CLIENT, WyreApi},
    },
};

type Message = FiatOrdersManagerReconcileMessage;

pub static FIAT_ORDERS_MANAGER: LazyLock<Arc<RustFiatOrdersManager>> =
    LazyLock::new(RustFiatOrdersManager::init);

#[derive(Debug, Clone, PartialEq, uniffi::Enum)]
pub enum FiatOrdersManagerReconcileMessage {
    OrderUpdated(FiatOrder),
}

#[uniffi::export(callback_interface)]
pub trait FiatOrdersManagerReconciler: Send + Sync + std::fmt::Debug + 'static {
    /// Tells the frontend to reconcile the manager changes
    fn reconcile(&self, message: FiatOrdersManagerReconcileMessage);
}

#[derive(Clone, Debug, uniffi::Object)]
pub struct RustFiatOrdersManager {
    orders: FiatOrdersTable,
    api: Arc<dyn WyreApi>,
    pub reconciler: Sender<Message>,
    pub reconcile_receiver: Arc<Receiver<Message>>,
}

impl RustFiatOrdersManager {
    fn init() -> Arc<Self> {
        let orders = Database::global().fiat_orders.clone();
        let api = Arc::new(WYRE_CLIENT.clone());

        Self::with_api(orders, api).into()
    }

    pub fn with_api(orders: FiatOrdersTable, api: Arc<dyn WyreApi>) -> Self {
        let (sender, receiver) = flume::bounded(100);

        Self { orders, api, reconciler: sender, reconcile_receiver: Arc::new(receiver) }
    }

    fn send(&self, message: Message) {
        if let Err(error) = self.reconciler.try_send(message) {
            error!("unable to send message: {error:?}");
        }
    }

    fn save_and_notify(&self, order: &FiatOrder) -> Result<(), Error> {
        self.orders.save(order)?;
        self.send(Message::OrderUpdated(order.clone()));

        Ok(())
    }
}

#[uniffi::export(async_runtime = "tokio")]
impl RustFiatOrdersManager {
    #[uniffi::constructor]
    pub fn new() -> Arc<Self> {
        FIAT_ORDERS_MANAGER.clone()
    }

    #[uniffi::method]
    pub fn listen_for_updates(&self, reconciler: Box<dyn FiatOrdersManagerReconciler>) {
        let reconcile_receiver = self.reconcile_receiver.clone();

        std::thread::spawn(move || {
            while let Ok(field) = reconcile_receiver.recv() {
                // call the reconcile method on the frontend
                reconciler.reconcile(field);
            }
        });
    }

    /// Start tracking an order, replaces a tracked order with the same id
    pub fn add_order(&self, order: FiatOrder) -> Result<(), Error> {
        debug!("tracking fiat order {}", order.id);
        self.save_and_notify(&order)
    }

    pub fn orders(&self) -> Vec<FiatOrder> {
        self.orders
            .orders()
            .tap_err(|error| error!("unable to get fiat orders: {error}"))
            .unwrap_or_default()
    }

    pub fn pending_orders(&self) -> Vec<FiatOrder> {
        self.orders
            .pending_orders()
            .tap_err(|error| error!("unable to get pending fiat orders: {error}"))
            .unwrap_or_default()
    }

    /// Reconcile a single order, saving it when the processor reported changes
    pub async fn process_order(&self, order: FiatOrder) -> Result<FiatOrder, Error> {
        let previous = order.clone();

        match processor::process_order(self.api.as_ref(), order).await {
            Reconciliation::Updated(order) if order != previous => {
                self.save_and_notify(&order)?;
                Ok(order)
            }
            reconciliation => Ok(reconciliation.into_order()),
        }
    }

    /// Reconcile every pending order, called by the frontend on its polling schedule
    ///
    /// Returns the orders that changed, each one is also sent to the reconciler
    pub async fn poll_pending_orders(&self) -> Result<Vec<FiatOrder>, Error> {
        let api = self.api.as_ref();
        let updated = processor::process_pending_orders(api, &self.orders).await?;

        for order in &updated {
            self.send(Message::OrderUpdated(order.clone()));
        }

        Ok(updated)
    }
}
