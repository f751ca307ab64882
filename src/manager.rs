pub mod fiat_orders_manager;
